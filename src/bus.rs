//! In-process publish/subscribe for status and settings notifications
//!
//! Subscribers run synchronously on the publishing task, in subscription order.
//! There is no unsubscribe; a panicking subscriber aborts the remaining ones.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::model::StatusLine;

type StatusListener = Arc<dyn Fn(&StatusLine) + Send + Sync>;
type SettingsListener = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone, Default)]
pub struct EventBus {
    status_listeners: Arc<Mutex<Vec<StatusListener>>>,
    settings_listeners: Arc<Mutex<Vec<SettingsListener>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish_status(&self, status: StatusLine) {
        tracing::trace!(
            primary = %status.primary,
            secondary = %status.secondary,
            style = status.style.as_str(),
            "Status published"
        );
        // Snapshot so a listener may subscribe without deadlocking.
        let listeners = self.status_listeners.lock().clone();
        for listener in listeners {
            listener(&status);
        }
    }

    pub fn publish_settings_changed(&self) {
        tracing::trace!("Settings change published");
        let listeners = self.settings_listeners.lock().clone();
        for listener in listeners {
            listener();
        }
    }

    pub fn subscribe_status(&self, listener: impl Fn(&StatusLine) + Send + Sync + 'static) {
        self.status_listeners.lock().push(Arc::new(listener));
    }

    pub fn subscribe_settings_changed(&self, listener: impl Fn() + Send + Sync + 'static) {
        self.settings_listeners.lock().push(Arc::new(listener));
    }
}

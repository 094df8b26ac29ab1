//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::PanelField;

use super::AppController;

const VOLUME_STEP: u8 = 5;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.request_quit();
            return Ok(());
        }

        let (widget_open, focus) = {
            let ui = self.ctx.ui.lock();
            (ui.widget_open, ui.focus)
        };

        // Text fields swallow printable keys
        if widget_open && focus.is_text_input() {
            match key.code {
                KeyCode::Char(c) => {
                    self.edit_field(focus, |value| value.push(c));
                    return Ok(());
                }
                KeyCode::Backspace => {
                    self.edit_field(focus, |value| {
                        value.pop();
                    });
                    return Ok(());
                }
                KeyCode::Enter => {
                    self.commit_field(focus);
                    return Ok(());
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.request_quit();
                return Ok(());
            }
            // Toggle button in the host player bar
            KeyCode::Char('w') | KeyCode::Char('W') => {
                self.ctx.host.toggle_widget();
                return Ok(());
            }
            _ => {}
        }

        if !widget_open {
            return Ok(());
        }

        match key.code {
            KeyCode::Esc => {
                self.commit_field(focus);
                self.ctx.host.toggle_widget();
            }
            KeyCode::Tab => self.move_focus(focus, true),
            KeyCode::BackTab => self.move_focus(focus, false),
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.settings_panel.toggle_settings();
                self.fix_focus();
            }
            KeyCode::Left | KeyCode::Right => {
                let forward = key.code == KeyCode::Right;
                match focus {
                    PanelField::Device => self.cycle_device(forward),
                    PanelField::Volume => {
                        let step = if key.modifiers.contains(KeyModifiers::SHIFT) { 1 } else { VOLUME_STEP };
                        self.nudge_volume(forward, step);
                    }
                    _ => self.move_focus(focus, forward),
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.activate(focus),
            KeyCode::Char('n') | KeyCode::Char('N') => self.activate(PanelField::Next),
            KeyCode::Char('b') | KeyCode::Char('B') => self.activate(PanelField::Prev),
            KeyCode::Char('x') | KeyCode::Char('X') => self.activate(PanelField::Stop),
            KeyCode::Char('p') | KeyCode::Char('P') => self.activate(PanelField::Play),
            _ => {}
        }
        Ok(())
    }

    fn edit_field(&self, field: PanelField, edit: impl FnOnce(&mut String)) {
        let mut ui = self.ctx.ui.lock();
        match field {
            PanelField::ApiUrl => edit(&mut ui.form.api_url),
            PanelField::ApiKey => edit(&mut ui.form.api_key),
            _ => {}
        }
    }

    fn commit_field(&self, field: PanelField) {
        match field {
            PanelField::ApiUrl => self.settings_panel.on_api_url_changed(),
            PanelField::ApiKey => self.settings_panel.on_api_key_changed(),
            _ => {}
        }
    }

    fn move_focus(&self, from: PanelField, forward: bool) {
        self.commit_field(from);
        let mut ui = self.ctx.ui.lock();
        let order = PanelField::cycle(ui.settings_open, self.ctx.profile.has_volume());
        ui.focus = if forward { from.next_in(&order) } else { from.prev_in(&order) };
    }

    fn fix_focus(&self) {
        let mut ui = self.ctx.ui.lock();
        let order = PanelField::cycle(ui.settings_open, self.ctx.profile.has_volume());
        if !order.contains(&ui.focus) {
            ui.focus = PanelField::Play;
        }
    }

    fn cycle_device(&self, forward: bool) {
        let choice = {
            let ui = self.ctx.ui.lock();
            let count = ui.form.device_options.len();
            if count == 0 {
                return;
            }
            // Entries are the placeholder followed by each device
            let current = ui.form.device_choice.map(|i| i + 1).unwrap_or(0);
            let next = if forward {
                (current + 1) % (count + 1)
            } else {
                (current + count) % (count + 1)
            };
            next.checked_sub(1)
        };
        self.settings_panel.on_device_chosen(choice);
    }

    fn nudge_volume(&self, up: bool, step: u8) {
        let slider = {
            let ui = self.ctx.ui.lock();
            if ui.volume.is_disabled() {
                return;
            }
            if up {
                ui.volume_slider.saturating_add(step).min(100)
            } else {
                ui.volume_slider.saturating_sub(step)
            }
        };
        self.transport.on_volume_input(slider);
        self.transport.on_volume_change(slider);
    }

    /// Click the control behind `field`. Handlers run detached so the UI keeps drawing.
    fn activate(&self, field: PanelField) {
        let controller = self.clone();
        match field {
            PanelField::Check => {
                tokio::spawn(async move { controller.settings_panel.check().await });
            }
            PanelField::Play => {
                tokio::spawn(async move { controller.transport.play().await });
            }
            PanelField::Stop => {
                tokio::spawn(async move { controller.transport.stop().await });
            }
            PanelField::Prev => {
                tokio::spawn(async move { controller.transport.prev().await });
            }
            PanelField::Next => {
                tokio::spawn(async move { controller.transport.next().await });
            }
            PanelField::ApiUrl | PanelField::ApiKey | PanelField::Device | PanelField::Volume => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventState;

    use super::*;
    use crate::config::Profile;
    use crate::controller::testing::Harness;
    use crate::model::{Device, HttpMethod};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    async fn type_text(controller: &AppController, text: &str) {
        for c in text.chars() {
            controller.handle_key_event(press(KeyCode::Char(c))).await.unwrap();
        }
    }

    #[tokio::test]
    async fn widget_keys_do_nothing_until_opened() {
        let harness = Harness::configured(Profile::Basic);
        let controller = AppController::new(harness.ctx.clone());
        controller.settings_panel.bind();

        controller.handle_key_event(press(KeyCode::Char('s'))).await.unwrap();
        assert!(!harness.ctx.ui.lock().settings_open);

        controller.handle_key_event(press(KeyCode::Char('w'))).await.unwrap();
        controller.handle_key_event(press(KeyCode::Char('s'))).await.unwrap();
        let ui = harness.ctx.ui.lock();
        assert!(ui.widget_open);
        assert!(ui.settings_open);
    }

    #[tokio::test]
    async fn typing_then_tab_commits_the_field() {
        let harness = Harness::new(Profile::Basic);
        let controller = AppController::new(harness.ctx.clone());
        controller.settings_panel.bind();
        {
            let mut ui = harness.ctx.ui.lock();
            ui.widget_open = true;
            ui.settings_open = true;
            ui.focus = PanelField::ApiUrl;
        }

        type_text(&controller, "https://xy").await;
        controller.handle_key_event(press(KeyCode::Backspace)).await.unwrap();
        assert_eq!(harness.ctx.settings.lock().api_url(), None);

        controller.handle_key_event(press(KeyCode::Tab)).await.unwrap();
        assert_eq!(harness.ctx.settings.lock().api_url(), Some("https://x"));
        assert_eq!(harness.ctx.ui.lock().focus, PanelField::ApiKey);

        type_text(&controller, "qk").await;
        controller.handle_key_event(press(KeyCode::Enter)).await.unwrap();
        assert_eq!(harness.ctx.settings.lock().api_key(), Some("qk"));
        assert!(!controller.should_quit());
    }

    #[tokio::test]
    async fn device_selector_cycles_through_placeholder() {
        let harness = Harness::configured(Profile::Basic);
        {
            let mut settings = harness.ctx.settings.lock();
            settings.set_devices(vec![Device::new("S1", "Speaker"), Device::new("S2", "Kitchen")]);
            settings.save().unwrap();
        }
        let controller = AppController::new(harness.ctx.clone());
        controller.settings_panel.bind();
        {
            let mut ui = harness.ctx.ui.lock();
            ui.widget_open = true;
            ui.settings_open = true;
            ui.focus = PanelField::Device;
        }

        controller.handle_key_event(press(KeyCode::Right)).await.unwrap();
        assert_eq!(harness.ctx.ui.lock().form.device_choice, Some(1));
        controller.handle_key_event(press(KeyCode::Right)).await.unwrap();
        assert_eq!(harness.ctx.ui.lock().form.device_choice, None);
        assert!(harness.ctx.settings.lock().device_selected().is_none());
        controller.handle_key_event(press(KeyCode::Right)).await.unwrap();
        assert_eq!(harness.ctx.ui.lock().form.device_choice, Some(0));
    }

    #[tokio::test]
    async fn closing_settings_moves_focus_back_to_controls() {
        let harness = Harness::configured(Profile::Basic);
        let controller = AppController::new(harness.ctx.clone());
        {
            let mut ui = harness.ctx.ui.lock();
            ui.widget_open = true;
            ui.settings_open = true;
            ui.focus = PanelField::Check;
        }

        controller.handle_key_event(press(KeyCode::Char('s'))).await.unwrap();
        assert_eq!(harness.ctx.ui.lock().focus, PanelField::Play);
    }

    #[tokio::test]
    async fn shortcut_runs_command_in_background() {
        let harness = Harness::configured(Profile::Basic);
        harness.transport.ok(HttpMethod::Post, "/api/next", serde_json::json!({"status": "success"}));
        let controller = AppController::new(harness.ctx.clone());
        controller.transport.bind();
        harness.ctx.ui.lock().widget_open = true;

        controller.handle_key_event(press(KeyCode::Char('n'))).await.unwrap();
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        assert_eq!(harness.transport.count(HttpMethod::Post, "/api/next"), 1);
    }

    #[tokio::test]
    async fn q_quits_outside_text_fields() {
        let harness = Harness::configured(Profile::Basic);
        let controller = AppController::new(harness.ctx.clone());
        controller.handle_key_event(press(KeyCode::Char('q'))).await.unwrap();
        assert!(controller.should_quit());
    }
}

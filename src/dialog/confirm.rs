//! Yes/No confirmation dialog body
//!
//! Confirming closes the dialog with `true`, declining dismisses it
//! with `false`. Props: `{"title", "question", "yes", "no"}`.

use super::item::DialogContext;
use super::types::{DialogComponent, DialogConfig, DialogSize, DialogValue};
use crate::tui::{theme::Theme, Frame};
use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use serde_json::json;

pub struct ConfirmDialog {
    config: DialogConfig,
    question: String,
    yes_label: String,
    no_label: String,
    /// Currently selected button (defaults to "No" for safety)
    selected_yes: bool,
}

fn prop_str(props: &DialogValue, key: &str, fallback: &str) -> String {
    props
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or(fallback)
        .to_string()
}

impl ConfirmDialog {
    pub fn new(props: DialogValue) -> Self {
        let config = DialogConfig::new()
            .with_title(prop_str(&props, "title", "Confirm"))
            .with_size(DialogSize::Fixed(44, 9));

        Self {
            config,
            question: prop_str(&props, "question", "Are you sure?"),
            yes_label: prop_str(&props, "yes", "Yes"),
            no_label: prop_str(&props, "no", "No"),
            selected_yes: false,
        }
    }

    fn toggle_selection(&mut self) {
        self.selected_yes = !self.selected_yes;
    }

    fn confirm(&self, dialog: &DialogContext) {
        if self.selected_yes {
            let _ = dialog.close(json!(true));
        } else {
            let _ = dialog.dismiss(json!(false));
        }
    }

    fn render_buttons(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let selected = Style::default()
            .bg(theme.primary)
            .fg(theme.surface)
            .add_modifier(Modifier::BOLD);
        let unselected = Style::default().fg(theme.text);

        let yes = Paragraph::new(format!(" {} ", self.yes_label))
            .style(if self.selected_yes { selected } else { unselected })
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(yes, layout[0]);

        let no = Paragraph::new(format!(" {} ", self.no_label))
            .style(if self.selected_yes { unselected } else { selected })
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(no, layout[1]);
    }
}

#[async_trait]
impl DialogComponent for ConfirmDialog {
    fn config(&self) -> &DialogConfig {
        &self.config
    }

    fn props_changed(&mut self, props: &DialogValue) {
        if let Some(question) = props.get("question").and_then(|v| v.as_str()) {
            self.question = question.to_string();
        }
    }

    async fn handle_key_event(&mut self, key: KeyEvent, dialog: &DialogContext) -> Result<bool> {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                self.toggle_selection();
                Ok(true)
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.confirm(dialog);
                Ok(true)
            }
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.selected_yes = true;
                self.confirm(dialog);
                Ok(true)
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.selected_yes = false;
                self.confirm(dialog);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn render_body(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, _dialog: &DialogContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(2), Constraint::Length(3)])
            .split(area);

        let question = Paragraph::new(self.question.clone())
            .style(Style::default().fg(theme.text))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(question, chunks[0]);

        self.render_buttons(frame, chunks[1], theme);
    }
}

#[cfg(test)]
mod tests {
    use super::super::host::DialogHost;
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_yes_shortcut_closes_with_true() {
        let host = DialogHost::new();
        let props = json!({"question": "Quit?"});
        let handle = host.show_modal(Box::new(ConfirmDialog::new(props.clone())), props);

        let context = host.snapshot()[0].context();
        let mut body = host.snapshot()[0].item().take_component().unwrap();
        assert!(body.handle_key_event(key(KeyCode::Char('y')), &context).await.unwrap());

        // The close issued by the body is the pending transition
        let same = handle.close(json!("ignored"));
        assert_eq!(same.await.unwrap(), json!(true));
    }

    #[tokio::test]
    async fn test_toggle_then_enter_dismisses_with_false() {
        let host = DialogHost::new();
        let mut body = ConfirmDialog::new(json!({}));
        let handle = host.show_modal(Box::new(super::super::testing::StubBody::new()), json!({}));
        let context = host.snapshot()[0].context();

        // Default selection is "No"
        assert!(body.handle_key_event(key(KeyCode::Enter), &context).await.unwrap());
        assert_eq!(handle.dismiss(json!("ignored")).await.unwrap(), json!(false));
    }

    #[tokio::test]
    async fn test_props_changed_updates_question() {
        let mut body = ConfirmDialog::new(json!({"question": "old"}));
        body.props_changed(&json!({"question": "new"}));
        assert_eq!(body.question, "new");

        // Unrelated patches leave the question alone
        body.props_changed(&json!({"other": 1}));
        assert_eq!(body.question, "new");
    }

    #[tokio::test]
    async fn test_unhandled_keys_fall_through() {
        let host = DialogHost::new();
        host.show_modal(Box::new(ConfirmDialog::new(json!({}))), json!({}));
        let context = host.snapshot()[0].context();

        let mut body = ConfirmDialog::new(json!({}));
        assert!(!body.handle_key_event(key(KeyCode::Char('x')), &context).await.unwrap());
        assert!(!body.handle_key_event(key(KeyCode::Esc), &context).await.unwrap());
    }
}

//! Single-line text prompt dialog body
//!
//! Enter closes the dialog with the entered text. Props: `{"title",
//! "placeholder", "initial"}`.

use super::item::DialogContext;
use super::types::{DialogComponent, DialogConfig, DialogSize, DialogValue};
use crate::tui::{theme::Theme, Frame};
use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders},
};
use serde_json::json;
use tui_textarea::TextArea;

pub struct PromptDialog {
    config: DialogConfig,
    textarea: TextArea<'static>,
}

impl PromptDialog {
    pub fn new(props: DialogValue) -> Self {
        let title = props
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or("Input");
        let config = DialogConfig::new()
            .with_title(title)
            .with_size(DialogSize::Fixed(50, 8));

        let mut textarea = TextArea::default();
        textarea.set_cursor_line_style(Style::default());
        if let Some(placeholder) = props.get("placeholder").and_then(|v| v.as_str()) {
            textarea.set_placeholder_text(placeholder);
        }
        if let Some(initial) = props.get("initial").and_then(|v| v.as_str()) {
            textarea.insert_str(initial);
        }

        Self { config, textarea }
    }

    /// The first line of the editor (the prompt is single-line)
    pub fn text(&self) -> String {
        self.textarea
            .lines()
            .first()
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DialogComponent for PromptDialog {
    fn config(&self) -> &DialogConfig {
        &self.config
    }

    async fn handle_key_event(&mut self, key: KeyEvent, dialog: &DialogContext) -> Result<bool> {
        match key.code {
            KeyCode::Enter => {
                let _ = dialog.close(json!(self.text()));
                Ok(true)
            }
            // Esc falls through to the chrome's dismiss
            KeyCode::Esc => Ok(false),
            _ => {
                self.textarea.input(key);
                Ok(true)
            }
        }
    }

    fn render_body(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, _dialog: &DialogContext) {
        let input_area = Rect {
            height: 3.min(area.height),
            ..area
        };
        self.textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .style(Style::default().fg(theme.border)),
        );
        self.textarea
            .set_style(Style::default().fg(theme.text));
        frame.render_widget(self.textarea.widget(), input_area);
    }
}

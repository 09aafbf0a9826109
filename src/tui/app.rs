//! Demo application: the caller side of the dialog host
//!
//! Mounts a dialog host view over the whole screen, opens the built-in
//! confirm/prompt dialogs from key bindings through `wrap`, and shows
//! their settled outcomes in a log pane.

use crate::config::Config;
use crate::dialog::{wrap, ConfirmDialog, DialogHostView, PromptDialog, WrappedDialog};
use crate::tui::{events::Event, theme::Theme, Component, Frame};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

pub struct App {
    theme: Theme,
    /// The render boundary; owns the process default host
    dialogs: DialogHostView,
    confirm: WrappedDialog,
    prompt: WrappedDialog,
    /// Settled dialog outcomes, pushed from outcome handlers
    outcomes: Arc<Mutex<Vec<String>>>,
    quit_requested: Arc<AtomicBool>,
}

impl App {
    pub fn new(config: Config) -> Self {
        info!(theme = %config.theme, "starting demo app");
        Self {
            theme: Theme::by_name(&config.theme),
            dialogs: DialogHostView::new_default_host().with_dim_background(config.dim_background),
            confirm: wrap(ConfirmDialog::new),
            prompt: wrap(PromptDialog::new),
            outcomes: Arc::new(Mutex::new(Vec::new())),
            quit_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    fn log_outcome(
        &self,
        label: &'static str,
    ) -> impl Fn(serde_json::Value) -> anyhow::Result<serde_json::Value> {
        let outcomes = self.outcomes.clone();
        move |value| {
            outcomes.lock().unwrap().push(format!("{label}: {value}"));
            Ok(value)
        }
    }

    fn open_confirm(&self) -> Result<()> {
        let handle = self.confirm.show_modal(json!({
            "title": "Confirm",
            "question": "Proceed with the demo action?",
        }))?;
        handle
            .on_close(self.log_outcome("confirmed"))
            .on_dismiss(self.log_outcome("dismissed"));
        Ok(())
    }

    fn open_prompt(&self) -> Result<()> {
        let handle = self.prompt.show_modal(json!({
            "title": "Your name",
            "placeholder": "type and press Enter",
        }))?;
        handle
            .on_close(self.log_outcome("entered"))
            .on_dismiss(self.log_outcome("prompt dismissed"));
        Ok(())
    }

    fn open_quit(&self) -> Result<()> {
        let handle = self.confirm.show_modal(json!({
            "title": "Quit",
            "question": "Quit usher?",
        }))?;
        let quit = self.quit_requested.clone();
        handle.on_close(move |value| {
            quit.store(true, Ordering::SeqCst);
            Ok(value)
        });
        Ok(())
    }

    /// Handle one event; returns true when the app should exit
    pub async fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Key(key) => {
                if self.dialogs.has_open_dialogs() {
                    self.dialogs.handle_key_event(key).await?;
                } else {
                    return self.handle_global_key(key);
                }
            }
            Event::Mouse(mouse) => {
                if self.dialogs.has_open_dialogs() {
                    self.dialogs.handle_mouse_event(mouse).await?;
                }
            }
            Event::Resize(width, height) => {
                self.dialogs.set_size(Rect::new(0, 0, width, height));
            }
            Event::Tick | Event::Custom(..) => {}
        }
        Ok(self.quit_requested.load(Ordering::SeqCst))
    }

    fn handle_global_key(&mut self, key: KeyEvent) -> Result<bool> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => return Ok(true),
            (KeyCode::Char('q'), _) => self.open_quit()?,
            (KeyCode::Char('c'), _) => self.open_confirm()?,
            (KeyCode::Char('p'), _) => self.open_prompt()?,
            _ => {}
        }
        Ok(self.quit_requested.load(Ordering::SeqCst))
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let title = Paragraph::new("usher — dialog host demo").style(
            Style::default()
                .fg(self.theme.primary)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(title, chunks[0]);

        {
            let outcomes = self.outcomes.lock().unwrap();
            let items: Vec<ListItem> = outcomes
                .iter()
                .rev()
                .map(|line| ListItem::new(Line::raw(line.clone())))
                .collect();
            let log = List::new(items)
                .style(Style::default().fg(self.theme.text))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .style(Style::default().fg(self.theme.border))
                        .title("outcomes"),
                );
            frame.render_widget(log, chunks[1]);
        }

        let help = Paragraph::new("c: confirm • p: prompt • q: quit • Ctrl+C: force quit")
            .style(Style::default().fg(self.theme.muted));
        frame.render_widget(help, chunks[2]);

        // Dialog layer on top of everything
        self.dialogs.render(frame, area, &self.theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::testing::DEFAULT_HOST_TEST_LOCK;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn test_confirm_flow_records_outcome() {
        let _serial = DEFAULT_HOST_TEST_LOCK.lock().unwrap();
        let mut app = App::new(Config::default());

        app.handle_event(key(KeyCode::Char('c'))).await.unwrap();
        assert!(app.dialogs.has_open_dialogs());

        // 'y' confirms; the outcome handler records the settled value
        app.handle_event(key(KeyCode::Char('y'))).await.unwrap();
        tokio::task::yield_now().await;

        let outcomes = app.outcomes.lock().unwrap().clone();
        assert_eq!(outcomes, vec!["confirmed: true".to_string()]);
    }

    #[tokio::test]
    async fn test_quit_confirmation_requests_exit() {
        let _serial = DEFAULT_HOST_TEST_LOCK.lock().unwrap();
        let mut app = App::new(Config::default());

        let exit = app.handle_event(key(KeyCode::Char('q'))).await.unwrap();
        assert!(!exit);

        app.handle_event(key(KeyCode::Char('y'))).await.unwrap();
        tokio::task::yield_now().await;
        let exit = app.handle_event(Event::Tick).await.unwrap();
        assert!(exit);
    }

    #[tokio::test]
    async fn test_ctrl_c_exits_immediately() {
        let _serial = DEFAULT_HOST_TEST_LOCK.lock().unwrap();
        let mut app = App::new(Config::default());

        let event = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.handle_event(event).await.unwrap());
    }
}

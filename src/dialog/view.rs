//! The render boundary mounting all active dialogs
//!
//! `DialogHostView` subscribes to a `DialogHost`, draws every visible
//! dialog in snapshot order (dim backdrop, chrome, body, button row),
//! routes input to the top visible dialog, and fires `after_close` for
//! hidden items one render pass after the transition cleanup so the
//! hide is presentable before the item is reclaimed. Dropping the view
//! tears the host down: all outstanding dialogs are dismissed with a
//! synthetic reason so no caller hangs.

use super::host::{DialogHost, OpenDialog};
use super::types::{ButtonProps, DialogLayout, ModalProps};
use super::wrap::{clear_default_host, install_default_host};
use crate::tui::{theme::Theme, Component, ComponentState, Frame};
use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;
use unicode_width::UnicodeWidthStr;

pub struct DialogHostView {
    state: ComponentState,
    host: DialogHost,
    /// Latest snapshot written by the change listener
    snapshot: Arc<Mutex<Vec<OpenDialog>>>,
    /// Guards the snapshot slot: notifications arriving after teardown
    /// are ignored
    destroyed: Arc<AtomicBool>,
    /// Whether this view installed the process default host
    installed_default: bool,
    /// Whether open dialogs dim the rest of the screen
    dim_background: bool,
}

impl DialogHostView {
    /// Mount a view over an explicit host
    pub fn new(host: DialogHost) -> Self {
        let snapshot = Arc::new(Mutex::new(host.snapshot()));
        let destroyed = Arc::new(AtomicBool::new(false));

        let slot = snapshot.clone();
        let guard = destroyed.clone();
        host.set_change_listener(move |items| {
            if guard.load(Ordering::SeqCst) {
                return;
            }
            *slot.lock().unwrap() = items;
        });

        Self {
            state: ComponentState::new(),
            host,
            snapshot,
            destroyed,
            installed_default: false,
            dim_background: true,
        }
    }

    pub fn with_dim_background(mut self, dim: bool) -> Self {
        self.dim_background = dim;
        self
    }

    /// Construct a host, install it as the process default, and mount a
    /// view over it. The registration is cleared when the view drops.
    pub fn new_default_host() -> Self {
        let host = DialogHost::new();
        install_default_host(host.clone());
        let mut view = Self::new(host);
        view.installed_default = true;
        view
    }

    pub fn host(&self) -> &DialogHost {
        &self.host
    }

    pub fn has_open_dialogs(&self) -> bool {
        !self.snapshot.lock().unwrap().is_empty()
    }

    /// The top visible dialog receives all input
    fn top_visible(&self) -> Option<OpenDialog> {
        self.snapshot
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|dialog| dialog.item().modal_props().visible)
            .cloned()
    }

    fn render_backdrop(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let dim = Block::default().style(
            Style::default()
                .bg(theme.surface)
                .add_modifier(Modifier::DIM),
        );
        frame.render_widget(dim, area);
    }

    fn button_label(text: &str, props: &ButtonProps) -> String {
        if props.loading {
            format!("[ {text}… ]")
        } else {
            format!("[ {text} ]")
        }
    }

    fn button_style(props: &ButtonProps, theme: &Theme, primary: bool) -> Style {
        if props.disabled {
            Style::default().fg(theme.muted).add_modifier(Modifier::DIM)
        } else if primary {
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        }
    }

    /// Right-aligned OK/Cancel row with loading/disabled affordances
    fn render_buttons(&self, frame: &mut Frame, area: Rect, theme: &Theme, modal: &ModalProps) {
        let cancel_label = Self::button_label("Cancel", &modal.cancel_button);
        let ok_label = Self::button_label("OK", &modal.ok_button);

        let row = Line::from(vec![
            Span::styled(
                cancel_label.clone(),
                Self::button_style(&modal.cancel_button, theme, false),
            ),
            Span::raw(" "),
            Span::styled(
                ok_label.clone(),
                Self::button_style(&modal.ok_button, theme, true),
            ),
        ]);

        let width = (cancel_label.width() + 1 + ok_label.width()) as u16;
        let buttons = Rect {
            x: area.x + area.width.saturating_sub(width),
            y: area.y,
            width: width.min(area.width),
            height: 1.min(area.height),
        };
        frame.render_widget(Paragraph::new(row).alignment(Alignment::Left), buttons);
    }

    fn render_dialog(&self, frame: &mut Frame, area: Rect, theme: &Theme, dialog: &OpenDialog) {
        let item = dialog.item();
        let Some(config) = item.component_config() else {
            return;
        };
        let modal = item.modal_props();
        let layout = DialogLayout::calculate(&config, area);

        frame.render_widget(Clear, layout.dialog_area);
        if config.has_border {
            let mut block = Block::default()
                .borders(Borders::ALL)
                .style(Style::default().fg(theme.border));
            if let Some(title) = &config.title {
                block = block.title(title.clone());
            }
            frame.render_widget(block, layout.dialog_area);
        }

        let content = layout.content_area;
        let body = Rect {
            height: content.height.saturating_sub(1),
            ..content
        };
        let buttons = Rect {
            y: content.y + content.height.saturating_sub(1),
            height: 1.min(content.height),
            ..content
        };

        let context = dialog.context();
        item.render_with(|component| {
            component.render_body(frame, body, theme, &context);
        });
        self.render_buttons(frame, buttons, theme, &modal);
    }

    /// Fire `after_close` for every item whose hide has now been
    /// presented; destruction is deferred to the presentation layer.
    fn sweep_hidden(&self, snapshot: &[OpenDialog]) {
        for dialog in snapshot {
            if !dialog.item().modal_props().visible {
                dialog.context().after_close();
            }
        }
    }
}

#[async_trait]
impl Component for DialogHostView {
    async fn handle_key_event(&mut self, event: KeyEvent) -> Result<()> {
        let Some(top) = self.top_visible() else {
            return Ok(());
        };
        let context = top.context();
        let modal = context.modal_props();

        // Interaction is frozen while a transition is in flight
        if modal.ok_button.loading || modal.cancel_button.loading {
            return Ok(());
        }

        // The body gets first chance at the event
        let item = top.item().clone();
        if let Some(mut component) = item.take_component() {
            let handled = component.handle_key_event(event, &context).await;
            item.restore_component(component);
            if handled? {
                return Ok(());
            }
        }

        // Unconsumed Enter/Esc fall through to the chrome
        match event.code {
            KeyCode::Enter if !modal.ok_button.disabled => {
                let _ = context.close(Value::Null);
            }
            KeyCode::Esc if modal.closable => {
                let _ = context.dismiss(Value::Null);
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_mouse_event(&mut self, event: MouseEvent) -> Result<()> {
        if !matches!(event.kind, MouseEventKind::Down(MouseButton::Left)) {
            return Ok(());
        }
        let Some(top) = self.top_visible() else {
            return Ok(());
        };
        let context = top.context();
        let modal = context.modal_props();
        if !modal.mask_closable {
            return Ok(());
        }
        let Some(config) = top.item().component_config() else {
            return Ok(());
        };

        let dialog_area = DialogLayout::calculate(&config, self.state.size).dialog_area;
        let inside = event.column >= dialog_area.x
            && event.column < dialog_area.x + dialog_area.width
            && event.row >= dialog_area.y
            && event.row < dialog_area.y + dialog_area.height;
        if !inside {
            let _ = context.dismiss(Value::Null);
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.state.size = area;
        let snapshot = self.snapshot.lock().unwrap().clone();
        if snapshot.is_empty() {
            return;
        }

        if self.dim_background && snapshot.iter().any(|d| d.item().modal_props().visible) {
            self.render_backdrop(frame, area, theme);
        }
        for dialog in &snapshot {
            if dialog.item().modal_props().visible {
                self.render_dialog(frame, area, theme, dialog);
            }
        }
        self.sweep_hidden(&snapshot);
    }

    fn size(&self) -> Rect {
        self.state.size
    }

    fn set_size(&mut self, size: Rect) {
        self.state.size = size;
    }

    fn has_focus(&self) -> bool {
        self.has_open_dialogs()
    }

    fn is_visible(&self) -> bool {
        self.has_open_dialogs()
    }
}

impl Drop for DialogHostView {
    fn drop(&mut self) {
        self.destroyed.store(true, Ordering::SeqCst);
        self.host.clear_change_listener();
        if self.installed_default {
            clear_default_host();
        }
        // Settle every outstanding dialog so no caller hangs; in-flight
        // handler work is not cancelled and settles on its own.
        let _ = self.host.dismiss_all(DialogHost::host_destroyed_reason());
        debug!("dialog host view destroyed");
    }
}

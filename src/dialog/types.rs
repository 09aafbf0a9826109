//! Core dialog types and traits
//!
//! This module defines the vocabulary of the dialog host: keys, dynamic
//! prop values, visual modal properties, chrome configuration, layout
//! math, and the `DialogComponent` trait every dialog body implements.

use crate::tui::{theme::Theme, Frame};
use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use std::sync::Arc;
use uuid::Uuid;

use super::item::DialogContext;

/// Dynamic payload type for dialog props, close results, and dismiss
/// reasons. Typed convenience lives in the dialog body components, not
/// in the host.
pub type DialogValue = serde_json::Value;

/// Unique, stable identity for one open dialog instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DialogKey(Uuid);

impl DialogKey {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for DialogKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visual affordances of one modal button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonProps {
    pub disabled: bool,
    pub loading: bool,
}

/// The visual-affordance set of one dialog, recomputed on every
/// transition. Spread onto the modal chrome by the render boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalProps {
    /// Whether the dialog is drawn at all
    pub visible: bool,
    /// Whether Escape dismisses the dialog
    pub closable: bool,
    /// Whether a click outside the dialog dismisses it
    pub mask_closable: bool,
    pub ok_button: ButtonProps,
    pub cancel_button: ButtonProps,
}

impl Default for ModalProps {
    fn default() -> Self {
        Self {
            visible: true,
            closable: true,
            mask_closable: true,
            ok_button: ButtonProps::default(),
            cancel_button: ButtonProps::default(),
        }
    }
}

/// Dialog positioning options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogPosition {
    /// Center the dialog in the available area
    #[default]
    Center,
    /// Position at specific coordinates relative to the available area
    Fixed(u16, u16),
    /// Position at top of screen, horizontally centered
    Top,
    /// Position at bottom of screen, horizontally centered
    Bottom,
}

/// Dialog size options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogSize {
    /// Fixed size in cells (width, height)
    Fixed(u16, u16),
    /// Percentage of available area (width_pct, height_pct)
    Percentage(u16, u16),
    /// Full screen
    FullScreen,
}

impl Default for DialogSize {
    fn default() -> Self {
        Self::Fixed(44, 9)
    }
}

/// Chrome configuration for a dialog body component
#[derive(Debug, Clone, Default)]
pub struct DialogConfig {
    /// Dialog title shown in the border (optional)
    pub title: Option<String>,
    pub position: DialogPosition,
    pub size: DialogSize,
    pub has_border: bool,
}

impl DialogConfig {
    pub fn new() -> Self {
        Self {
            title: None,
            position: DialogPosition::default(),
            size: DialogSize::default(),
            has_border: true,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_position(mut self, position: DialogPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_size(mut self, size: DialogSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_border(mut self, has_border: bool) -> Self {
        self.has_border = has_border;
        self
    }
}

/// Result type for dialog operations
pub type DialogResult<T> = std::result::Result<T, DialogError>;

/// Dialog-specific error types. Clone so every waiter on a shared
/// transition future receives the same outcome.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DialogError {
    #[error("no dialog host installed")]
    NoHost,

    #[error("dialog host destroyed")]
    HostDestroyed,

    #[error("dialog '{0}' no longer exists")]
    Destroyed(DialogKey),

    #[error("dialog handler failed: {0}")]
    Handler(Arc<anyhow::Error>),

    #[error("dialog transition interrupted")]
    Interrupted,
}

/// Core trait for dialog body components
///
/// Component-as-value polymorphism over a single capability: render me
/// with an injected `DialogContext` and my current props. Bodies trigger
/// their own completion through `dialog.close(..)` / `dialog.dismiss(..)`.
#[async_trait]
pub trait DialogComponent: Send {
    /// Chrome configuration (title, position, size, border)
    fn config(&self) -> &DialogConfig;

    /// Called after `update()` merged new props into the open dialog
    fn props_changed(&mut self, props: &DialogValue) {
        let _ = props;
    }

    /// Handle a key event routed to this dialog. Return `Ok(true)` when
    /// the event was consumed; unconsumed Enter/Esc fall through to the
    /// chrome's OK/Cancel handling.
    async fn handle_key_event(&mut self, key: KeyEvent, dialog: &DialogContext) -> Result<bool> {
        let _ = (key, dialog);
        Ok(false)
    }

    /// Render the dialog body inside the chrome's content area
    fn render_body(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, dialog: &DialogContext);
}

/// Shallow merge of a props patch into the current props: when both are
/// JSON objects the patch keys overwrite the base keys; any other shape
/// replaces wholesale.
pub(crate) fn merge_props(target: &mut DialogValue, patch: DialogValue) {
    match patch {
        serde_json::Value::Object(additions) => {
            if let Some(base) = target.as_object_mut() {
                for (key, value) in additions {
                    base.insert(key, value);
                }
            } else {
                *target = serde_json::Value::Object(additions);
            }
        }
        other => *target = other,
    }
}

/// Helper struct for dialog layout calculations
#[derive(Debug, Clone)]
pub struct DialogLayout {
    /// Dialog area (including border)
    pub dialog_area: Rect,
    /// Content area (excluding border)
    pub content_area: Rect,
}

impl DialogLayout {
    pub fn calculate(config: &DialogConfig, available_area: Rect) -> Self {
        let (width, height) = Self::calculate_size(config, available_area);
        let (x, y) = Self::calculate_position(config, available_area, width, height);

        let dialog_area = Rect {
            x,
            y,
            width,
            height,
        };

        let content_area = if config.has_border {
            Rect {
                x: dialog_area.x + 1,
                y: dialog_area.y + 1,
                width: dialog_area.width.saturating_sub(2),
                height: dialog_area.height.saturating_sub(2),
            }
        } else {
            dialog_area
        };

        Self {
            dialog_area,
            content_area,
        }
    }

    fn calculate_size(config: &DialogConfig, available_area: Rect) -> (u16, u16) {
        let (width, height) = match config.size {
            DialogSize::Fixed(w, h) => (w, h),
            DialogSize::Percentage(w_pct, h_pct) => {
                let width = (available_area.width as u32 * w_pct.min(100) as u32 / 100) as u16;
                let height = (available_area.height as u32 * h_pct.min(100) as u32 / 100) as u16;
                (width, height)
            }
            DialogSize::FullScreen => (available_area.width, available_area.height),
        };

        // Never exceed the available area
        (
            width.min(available_area.width),
            height.min(available_area.height),
        )
    }

    fn calculate_position(
        config: &DialogConfig,
        available_area: Rect,
        width: u16,
        height: u16,
    ) -> (u16, u16) {
        match config.position {
            DialogPosition::Center => {
                let x = available_area.x + (available_area.width.saturating_sub(width)) / 2;
                let y = available_area.y + (available_area.height.saturating_sub(height)) / 2;
                (x, y)
            }
            DialogPosition::Fixed(x, y) => (
                available_area.x + x.min(available_area.width.saturating_sub(width)),
                available_area.y + y.min(available_area.height.saturating_sub(height)),
            ),
            DialogPosition::Top => {
                let x = available_area.x + (available_area.width.saturating_sub(width)) / 2;
                (x, available_area.y)
            }
            DialogPosition::Bottom => {
                let x = available_area.x + (available_area.width.saturating_sub(width)) / 2;
                let y = available_area.y + available_area.height.saturating_sub(height);
                (x, y)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dialog_keys_are_unique() {
        let a = DialogKey::new();
        let b = DialogKey::new();
        assert_ne!(a, b);
        assert_eq!(a, a);
    }

    #[test]
    fn test_merge_props_shallow_object_merge() {
        let mut props = json!({"title": "Hello", "count": 1});
        merge_props(&mut props, json!({"count": 2, "extra": true}));
        assert_eq!(props, json!({"title": "Hello", "count": 2, "extra": true}));
    }

    #[test]
    fn test_merge_props_non_object_replaces_wholesale() {
        let mut props = json!({"title": "Hello"});
        merge_props(&mut props, json!("replaced"));
        assert_eq!(props, json!("replaced"));

        let mut scalar = json!(42);
        merge_props(&mut scalar, json!({"a": 1}));
        assert_eq!(scalar, json!({"a": 1}));
    }

    #[test]
    fn test_layout_centers_fixed_size() {
        let config = DialogConfig::new().with_size(DialogSize::Fixed(40, 10));
        let area = Rect::new(0, 0, 80, 24);
        let layout = DialogLayout::calculate(&config, area);

        assert_eq!(layout.dialog_area, Rect::new(20, 7, 40, 10));
        // Border shrinks the content area by one cell on each side
        assert_eq!(layout.content_area, Rect::new(21, 8, 38, 8));
    }

    #[test]
    fn test_layout_clamps_to_available_area() {
        let config = DialogConfig::new().with_size(DialogSize::Fixed(200, 100));
        let area = Rect::new(0, 0, 80, 24);
        let layout = DialogLayout::calculate(&config, area);

        assert_eq!(layout.dialog_area.width, 80);
        assert_eq!(layout.dialog_area.height, 24);
    }

    #[test]
    fn test_layout_percentage_and_positions() {
        let config = DialogConfig::new()
            .with_size(DialogSize::Percentage(50, 50))
            .with_position(DialogPosition::Bottom);
        let area = Rect::new(0, 0, 80, 24);
        let layout = DialogLayout::calculate(&config, area);

        assert_eq!(layout.dialog_area.width, 40);
        assert_eq!(layout.dialog_area.height, 12);
        assert_eq!(layout.dialog_area.y, 12);
    }

    #[test]
    fn test_modal_props_default_is_interactive() {
        let modal = ModalProps::default();
        assert!(modal.visible);
        assert!(modal.closable);
        assert!(modal.mask_closable);
        assert!(!modal.ok_button.loading);
        assert!(!modal.cancel_button.disabled);
    }
}

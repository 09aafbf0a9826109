//! Promise-style modal dialog host
//!
//! A small in-memory registry that manages the lifecycle of modal
//! dialogs layered over the rest of the UI, decoupling "who opens a
//! dialog" from "who renders and disposes it". Callers bind a body
//! component with [`wrap`], open it with `show_modal`, and receive a
//! [`DialogHandle`] whose `close`/`dismiss` settle like promises; the
//! mounted [`DialogHostView`] renders every open dialog and reclaims
//! items once their hide has been presented.
//!
//! ```no_run
//! use usher::dialog::{wrap, ConfirmDialog};
//! # use serde_json::json;
//!
//! let confirm = wrap(ConfirmDialog::new);
//! let handle = confirm.show_modal(json!({"question": "Delete session?"}))?;
//! handle.on_close(|result| Ok(result));
//! # Ok::<(), usher::dialog::DialogError>(())
//! ```

pub mod confirm;
mod host;
mod item;
pub mod prompt;
mod types;
mod view;
mod wrap;

pub use confirm::ConfirmDialog;
pub use host::{ChangeListener, DialogHost, OpenDialog};
pub use item::{DialogContext, DialogHandle, DialogHandler, Transition};
pub use prompt::PromptDialog;
pub use types::{
    ButtonProps, DialogComponent, DialogConfig, DialogError, DialogKey, DialogLayout,
    DialogPosition, DialogResult, DialogSize, DialogValue, ModalProps,
};
pub use view::DialogHostView;
pub use wrap::{clear_default_host, default_host, install_default_host, wrap, WrappedDialog};

#[cfg(test)]
pub(crate) mod testing {
    //! Shared test fixtures for the dialog modules

    use super::types::{DialogComponent, DialogConfig, DialogSize, DialogValue};
    use crate::tui::{theme::Theme, Frame};
    use async_trait::async_trait;
    use ratatui::layout::Rect;
    use std::sync::{Arc, Mutex};

    /// The default host is process-wide state; tests touching it run
    /// under this lock to stay order-independent.
    pub(crate) static DEFAULT_HOST_TEST_LOCK: Mutex<()> = Mutex::new(());

    /// Minimal dialog body that records the props pushed to it
    pub(crate) struct StubBody {
        config: DialogConfig,
        seen_props: Option<Arc<Mutex<Vec<DialogValue>>>>,
    }

    impl StubBody {
        pub(crate) fn new() -> Self {
            Self::titled("stub")
        }

        pub(crate) fn titled(title: &str) -> Self {
            Self {
                config: DialogConfig::new()
                    .with_title(title)
                    .with_size(DialogSize::Fixed(40, 8)),
                seen_props: None,
            }
        }

        /// A stub plus the recorder its `props_changed` writes to
        pub(crate) fn recording() -> (Self, Arc<Mutex<Vec<DialogValue>>>) {
            let recorder = Arc::new(Mutex::new(Vec::new()));
            let mut stub = Self::new();
            stub.seen_props = Some(recorder.clone());
            (stub, recorder)
        }
    }

    #[async_trait]
    impl DialogComponent for StubBody {
        fn config(&self) -> &DialogConfig {
            &self.config
        }

        fn props_changed(&mut self, props: &DialogValue) {
            if let Some(recorder) = &self.seen_props {
                recorder.lock().unwrap().push(props.clone());
            }
        }

        fn render_body(
            &mut self,
            _frame: &mut Frame,
            _area: Rect,
            _theme: &Theme,
            _dialog: &super::DialogContext,
        ) {
        }
    }
}

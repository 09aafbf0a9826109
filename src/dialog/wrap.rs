//! Dialog binding factory and the process default host
//!
//! `wrap()` binds a dialog body constructor to host semantics so
//! callers can open it without plumbing a host reference. The default
//! host has a single registration point with explicit init/teardown
//! (owned by `DialogHostView::new_default_host`) and a loud error when
//! absent.

use super::host::DialogHost;
use super::item::DialogHandle;
use super::types::{DialogComponent, DialogError, DialogResult, DialogValue};
use std::sync::{Arc, Mutex};
use tracing::debug;

static DEFAULT_HOST: Mutex<Option<DialogHost>> = Mutex::new(None);

/// Install the process default host, returning the previous
/// registration when one existed
pub fn install_default_host(host: DialogHost) -> Option<DialogHost> {
    debug!("default dialog host installed");
    DEFAULT_HOST.lock().unwrap().replace(host)
}

/// Clear the process default host
pub fn clear_default_host() -> Option<DialogHost> {
    DEFAULT_HOST.lock().unwrap().take()
}

/// The currently installed default host, if any
pub fn default_host() -> Option<DialogHost> {
    DEFAULT_HOST.lock().unwrap().clone()
}

/// A dialog body bound to host semantics. Cloneable; each `show_modal`
/// constructs a fresh body instance from the caller's props.
#[derive(Clone)]
pub struct WrappedDialog {
    constructor: Arc<dyn Fn(DialogValue) -> Box<dyn DialogComponent> + Send + Sync>,
}

/// Bind a dialog body constructor to the host. The constructor receives
/// the caller's props and produces the component instance to mount.
pub fn wrap<C, F>(constructor: F) -> WrappedDialog
where
    C: DialogComponent + 'static,
    F: Fn(DialogValue) -> C + Send + Sync + 'static,
{
    WrappedDialog {
        constructor: Arc::new(move |props| Box::new(constructor(props))),
    }
}

impl WrappedDialog {
    /// Open on the process default host. Fails loudly when no host is
    /// mounted anywhere: a caller expecting a dialog must not be misled
    /// by a silent no-op.
    pub fn show_modal(&self, props: DialogValue) -> DialogResult<DialogHandle> {
        let host = default_host().ok_or(DialogError::NoHost)?;
        Ok(self.show_modal_in(&host, props))
    }

    /// Open on an explicit host
    pub fn show_modal_in(&self, host: &DialogHost, props: DialogValue) -> DialogHandle {
        let component = (self.constructor)(props.clone());
        host.show_modal(component, props)
    }
}

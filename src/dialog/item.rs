//! Per-dialog lifecycle: transitions, handlers, and the facade split
//!
//! One `DialogItem` backs each open dialog. Two restricted facades wrap
//! the same `Arc<DialogItem>`: `DialogHandle` for the code that opened
//! the dialog and `DialogContext` for the rendered body component. Both
//! drive the identical transition machinery, which is the deliberately
//! shared capability boundary of the design.

use super::host::HostInner;
use super::types::{
    merge_props, ButtonProps, DialogComponent, DialogConfig, DialogError, DialogKey, DialogResult,
    DialogValue, ModalProps,
};
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, Weak};
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::trace;

/// A close/dismiss outcome handler. Receives the raw result/reason and
/// produces the transformed value the transition settles with.
pub type DialogHandler =
    Arc<dyn Fn(DialogValue) -> BoxFuture<'static, anyhow::Result<DialogValue>> + Send + Sync>;

fn identity_handler() -> DialogHandler {
    Arc::new(|value| async move { Ok(value) }.boxed())
}

/// The in-flight (or settled) close/dismiss operation of one dialog.
///
/// Backed by a shared future fed from the spawned driver task: the work
/// is eager (it runs whether or not anyone awaits) and every clone
/// settles with the same outcome.
#[derive(Clone)]
pub struct Transition {
    inner: Shared<BoxFuture<'static, DialogResult<DialogValue>>>,
}

impl Transition {
    fn from_receiver(rx: oneshot::Receiver<DialogResult<DialogValue>>) -> Self {
        let fut = async move { rx.await.unwrap_or(Err(DialogError::Interrupted)) }.boxed();
        Self {
            inner: fut.shared(),
        }
    }

    fn settled(outcome: DialogResult<DialogValue>) -> Self {
        let fut = async move { outcome }.boxed();
        Self {
            inner: fut.shared(),
        }
    }

    /// True when `other` is a clone of the same underlying operation
    pub fn same_transition(&self, other: &Self) -> bool {
        self.inner.ptr_eq(&other.inner)
    }

    /// True once the outcome is available without awaiting
    pub fn is_settled(&self) -> bool {
        self.inner.peek().is_some()
    }
}

impl Future for Transition {
    type Output = DialogResult<DialogValue>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.inner).poll(cx)
    }
}

/// Which button shows the busy affordance while the handler runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransitionFlavor {
    /// `close`: ok button loading, cancel button disabled
    Confirm,
    /// `dismiss`: cancel button loading, ok button disabled
    Cancel,
}

struct ItemState {
    props: DialogValue,
    modal: ModalProps,
    close_handler: DialogHandler,
    dismiss_handler: DialogHandler,
    /// At most one in-flight transition; `None` when idle
    pending: Option<Transition>,
    /// Set once `after_close` fired and the item left the registry
    destroyed: bool,
}

/// Backing object for one open dialog. Owned by the host's registry,
/// shared with both facades.
pub(crate) struct DialogItem {
    key: DialogKey,
    host: Weak<HostInner>,
    state: Mutex<ItemState>,
    /// Taken out of the slot for the duration of an async body call so
    /// no lock is held across an await
    component: Mutex<Option<Box<dyn DialogComponent>>>,
}

impl DialogItem {
    pub(crate) fn new(
        host: Weak<HostInner>,
        component: Box<dyn DialogComponent>,
        props: DialogValue,
    ) -> Arc<Self> {
        Arc::new(Self {
            key: DialogKey::new(),
            host,
            state: Mutex::new(ItemState {
                props,
                modal: ModalProps::default(),
                close_handler: identity_handler(),
                dismiss_handler: identity_handler(),
                pending: None,
                destroyed: false,
            }),
            component: Mutex::new(Some(component)),
        })
    }

    pub(crate) fn key(&self) -> DialogKey {
        self.key
    }

    pub(crate) fn props(&self) -> DialogValue {
        self.state.lock().unwrap().props.clone()
    }

    pub(crate) fn modal_props(&self) -> ModalProps {
        self.state.lock().unwrap().modal.clone()
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.state.lock().unwrap().destroyed
    }

    pub(crate) fn set_close_handler(&self, handler: DialogHandler) {
        self.state.lock().unwrap().close_handler = handler;
    }

    pub(crate) fn set_dismiss_handler(&self, handler: DialogHandler) {
        self.state.lock().unwrap().dismiss_handler = handler;
    }

    pub(crate) fn take_component(&self) -> Option<Box<dyn DialogComponent>> {
        self.component.lock().unwrap().take()
    }

    pub(crate) fn restore_component(&self, component: Box<dyn DialogComponent>) {
        *self.component.lock().unwrap() = Some(component);
    }

    pub(crate) fn component_config(&self) -> Option<DialogConfig> {
        self.component
            .lock()
            .unwrap()
            .as_ref()
            .map(|c| c.config().clone())
    }

    pub(crate) fn render_with<F>(&self, f: F)
    where
        F: FnOnce(&mut dyn DialogComponent),
    {
        if let Some(component) = self.component.lock().unwrap().as_mut() {
            f(component.as_mut());
        }
    }

    /// Shallow-merge a props patch, inform the body, re-render
    pub(crate) fn update(&self, patch: DialogValue) {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            if state.destroyed {
                return;
            }
            merge_props(&mut state.props, patch);
            state.props.clone()
        };
        if let Some(component) = self.component.lock().unwrap().as_mut() {
            component.props_changed(&snapshot);
        }
        self.notify_host();
    }

    pub(crate) fn close(self: &Arc<Self>, result: DialogValue) -> Transition {
        self.transition(result, TransitionFlavor::Confirm)
    }

    pub(crate) fn dismiss(self: &Arc<Self>, reason: DialogValue) -> Transition {
        self.transition(reason, TransitionFlavor::Cancel)
    }

    /// The shared transition procedure. Idempotent while one is pending:
    /// a concurrent call returns a clone of the in-flight operation and
    /// the handler runs exactly once.
    fn transition(self: &Arc<Self>, value: DialogValue, flavor: TransitionFlavor) -> Transition {
        let (handler, transition, tx) = {
            let mut state = self.state.lock().unwrap();
            if state.destroyed {
                return Transition::settled(Err(DialogError::Destroyed(self.key)));
            }
            if let Some(pending) = &state.pending {
                return pending.clone();
            }

            // Freeze interaction while the handler runs
            state.modal.closable = false;
            state.modal.mask_closable = false;
            match flavor {
                TransitionFlavor::Confirm => {
                    state.modal.ok_button.loading = true;
                    state.modal.cancel_button.disabled = true;
                }
                TransitionFlavor::Cancel => {
                    state.modal.cancel_button.loading = true;
                    state.modal.ok_button.disabled = true;
                }
            }

            // Snapshot the handler now: registrations that arrive after
            // this point never affect the in-flight transition.
            let handler = match flavor {
                TransitionFlavor::Confirm => state.close_handler.clone(),
                TransitionFlavor::Cancel => state.dismiss_handler.clone(),
            };
            let (tx, rx) = oneshot::channel();
            let transition = Transition::from_receiver(rx);
            state.pending = Some(transition.clone());
            (handler, transition, tx)
        };
        self.notify_host();
        trace!(key = %self.key, ?flavor, "dialog transition started");

        // Invoke the handler at issuance time so synchronous handlers
        // observe issuance order, then drive the returned future on a
        // task of its own: the transition is eager and settles whether
        // or not anyone awaits it.
        let fut = handler(value);
        let item = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = fut.await.map_err(|e| DialogError::Handler(Arc::new(e)));
            // Cleanup runs unconditionally: the dialog hides even when
            // the handler failed.
            item.finish_transition();
            trace!(key = %item.key, ok = outcome.is_ok(), "dialog transition settled");
            let _ = tx.send(outcome);
        });
        transition
    }

    /// Unconditional cleanup at transition settlement: hide the dialog,
    /// restore interaction affordances, clear the pending marker.
    fn finish_transition(&self) {
        {
            let mut state = self.state.lock().unwrap();
            state.modal.visible = false;
            state.modal.closable = true;
            state.modal.mask_closable = true;
            state.modal.ok_button = ButtonProps::default();
            state.modal.cancel_button = ButtonProps::default();
            state.pending = None;
        }
        self.notify_host();
    }

    /// Fired by the render boundary once the hide has been presented.
    /// Idempotent; removes the item from the registry.
    pub(crate) fn after_close(&self) {
        {
            let mut state = self.state.lock().unwrap();
            if state.destroyed {
                return;
            }
            state.destroyed = true;
        }
        trace!(key = %self.key, "dialog reclaimed");
        if let Some(host) = self.host.upgrade() {
            HostInner::destroy(&host, &self.key);
        }
    }

    fn notify_host(&self) {
        // Notifications after the host has been dropped are absorbed;
        // post-teardown transitions still settle their futures.
        if let Some(host) = self.host.upgrade() {
            HostInner::notify(&host);
        }
    }
}

fn sync_handler<F>(f: F) -> DialogHandler
where
    F: Fn(DialogValue) -> anyhow::Result<DialogValue> + Send + Sync + 'static,
{
    Arc::new(move |value| {
        let outcome = f(value);
        async move { outcome }.boxed()
    })
}

fn async_handler<F, Fut>(f: F) -> DialogHandler
where
    F: Fn(DialogValue) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<DialogValue>> + Send + 'static,
{
    Arc::new(move |value| f(value).boxed())
}

/// External instance: the caller-facing view of an open dialog,
/// returned by `show_modal`. Registers outcome handlers, pushes prop
/// updates, and may force-close the dialog it opened.
#[derive(Clone)]
pub struct DialogHandle {
    item: Arc<DialogItem>,
}

impl DialogHandle {
    pub(crate) fn new(item: Arc<DialogItem>) -> Self {
        Self { item }
    }

    pub fn key(&self) -> DialogKey {
        self.item.key()
    }

    /// Merge new props into the still-open dialog and trigger a
    /// re-render. No-op after the dialog has been destroyed.
    pub fn update(&self, props: DialogValue) {
        self.item.update(props);
    }

    /// Register the close-outcome handler. Chainable; must be called
    /// before the dialog closes to take effect (an in-flight transition
    /// keeps the handler it snapshotted at start).
    pub fn on_close<F>(&self, handler: F) -> &Self
    where
        F: Fn(DialogValue) -> anyhow::Result<DialogValue> + Send + Sync + 'static,
    {
        self.item.set_close_handler(sync_handler(handler));
        self
    }

    pub fn on_close_async<F, Fut>(&self, handler: F) -> &Self
    where
        F: Fn(DialogValue) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<DialogValue>> + Send + 'static,
    {
        self.item.set_close_handler(async_handler(handler));
        self
    }

    /// Register the dismiss-outcome handler. Chainable.
    pub fn on_dismiss<F>(&self, handler: F) -> &Self
    where
        F: Fn(DialogValue) -> anyhow::Result<DialogValue> + Send + Sync + 'static,
    {
        self.item.set_dismiss_handler(sync_handler(handler));
        self
    }

    pub fn on_dismiss_async<F, Fut>(&self, handler: F) -> &Self
    where
        F: Fn(DialogValue) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<DialogValue>> + Send + 'static,
    {
        self.item.set_dismiss_handler(async_handler(handler));
        self
    }

    /// Programmatically confirm-close the dialog
    pub fn close(&self, result: DialogValue) -> Transition {
        self.item.close(result)
    }

    /// Programmatically cancel-dismiss the dialog
    pub fn dismiss(&self, reason: DialogValue) -> Transition {
        self.item.dismiss(reason)
    }

    pub fn is_open(&self) -> bool {
        !self.item.is_destroyed()
    }

    /// Facade identity check: true when both facades view the same
    /// underlying dialog
    pub fn shares_item_with(&self, context: &DialogContext) -> bool {
        Arc::ptr_eq(&self.item, &context.item)
    }
}

/// Internal instance: the body-facing view of an open dialog, injected
/// into the rendered component and the modal chrome.
#[derive(Clone)]
pub struct DialogContext {
    item: Arc<DialogItem>,
}

impl DialogContext {
    pub(crate) fn new(item: Arc<DialogItem>) -> Self {
        Self { item }
    }

    pub fn key(&self) -> DialogKey {
        self.item.key()
    }

    pub fn props(&self) -> DialogValue {
        self.item.props()
    }

    pub fn modal_props(&self) -> ModalProps {
        self.item.modal_props()
    }

    /// The body's own way to confirm-complete (e.g. from a custom Save
    /// action instead of the chrome's OK button)
    pub fn close(&self, result: DialogValue) -> Transition {
        self.item.close(result)
    }

    pub fn dismiss(&self, reason: DialogValue) -> Transition {
        self.item.dismiss(reason)
    }

    /// Signal that the hide has been presented; destroys the item
    pub fn after_close(&self) {
        self.item.after_close();
    }

    pub(crate) fn item(&self) -> &Arc<DialogItem> {
        &self.item
    }
}

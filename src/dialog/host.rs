//! Dialog registry and change notification
//!
//! `DialogHost` owns the ordered collection of open dialogs (insertion
//! order is render/z order) and fans every mutation out to a single
//! change listener as a freshly allocated snapshot, never the live
//! collection.

use super::item::{DialogContext, DialogHandle, DialogItem, Transition};
use super::types::{DialogComponent, DialogKey, DialogValue, ModalProps};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Listener invoked with a snapshot of the open dialogs after any
/// mutation (add, remove, prop update, transition visual change)
pub type ChangeListener = Arc<dyn Fn(Vec<OpenDialog>) + Send + Sync>;

/// Immutable view of one open dialog, handed out in snapshots. The
/// modal props are captured at snapshot time.
#[derive(Clone)]
pub struct OpenDialog {
    item: Arc<DialogItem>,
    modal: ModalProps,
}

impl OpenDialog {
    fn new(item: Arc<DialogItem>) -> Self {
        let modal = item.modal_props();
        Self { item, modal }
    }

    pub fn key(&self) -> DialogKey {
        self.item.key()
    }

    pub fn modal_props(&self) -> &ModalProps {
        &self.modal
    }

    /// The internal facade of this dialog
    pub fn context(&self) -> DialogContext {
        DialogContext::new(self.item.clone())
    }

    pub(crate) fn item(&self) -> &Arc<DialogItem> {
        &self.item
    }
}

pub(crate) struct HostInner {
    items: Mutex<Vec<Arc<DialogItem>>>,
    listener: Mutex<Option<ChangeListener>>,
}

impl HostInner {
    fn snapshot(&self) -> Vec<OpenDialog> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .map(|item| OpenDialog::new(item.clone()))
            .collect()
    }

    /// Deliver a fresh snapshot to the listener, outside all locks
    pub(crate) fn notify(self: &Arc<Self>) {
        let listener = self.listener.lock().unwrap().clone();
        if let Some(listener) = listener {
            listener(self.snapshot());
        }
    }

    /// Remove by key; no-op safe when absent (async teardown may race a
    /// second invocation). Notifies only when something was removed.
    pub(crate) fn destroy(self: &Arc<Self>, key: &DialogKey) -> bool {
        let removed = {
            let mut items = self.items.lock().unwrap();
            let before = items.len();
            items.retain(|item| item.key() != *key);
            before != items.len()
        };
        if removed {
            debug!(%key, "dialog destroyed");
            self.notify();
        }
        removed
    }
}

/// The registry of open dialogs. Cheap to clone; all clones share one
/// collection.
#[derive(Clone)]
pub struct DialogHost {
    inner: Arc<HostInner>,
}

impl DialogHost {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HostInner {
                items: Mutex::new(Vec::new()),
                listener: Mutex::new(None),
            }),
        }
    }

    /// Open a dialog: construct the item, append it, notify, and return
    /// the external facade. Props are forwarded untouched.
    pub fn show_modal(&self, component: Box<dyn DialogComponent>, props: DialogValue) -> DialogHandle {
        let item = DialogItem::new(Arc::downgrade(&self.inner), component, props);
        let key = item.key();
        self.inner.items.lock().unwrap().push(item.clone());
        self.inner.notify();
        debug!(%key, "dialog opened");
        DialogHandle::new(item)
    }

    /// Remove a dialog by key. No-op safe when already absent.
    pub fn destroy_dialog(&self, key: &DialogKey) -> bool {
        self.inner.destroy(key)
    }

    /// Issue a dismissal to every open dialog in render order and
    /// return the transitions without awaiting them. Completion order
    /// is unspecified.
    pub fn dismiss_all(&self, reason: DialogValue) -> Vec<Transition> {
        let items: Vec<Arc<DialogItem>> = self.inner.items.lock().unwrap().clone();
        if !items.is_empty() {
            debug!(count = items.len(), "dismissing all dialogs");
        }
        items
            .iter()
            .map(|item| item.dismiss(reason.clone()))
            .collect()
    }

    /// Install the change listener, replacing any previous one
    pub fn set_change_listener<F>(&self, listener: F)
    where
        F: Fn(Vec<OpenDialog>) + Send + Sync + 'static,
    {
        *self.inner.listener.lock().unwrap() = Some(Arc::new(listener));
    }

    pub fn clear_change_listener(&self) {
        *self.inner.listener.lock().unwrap() = None;
    }

    /// Pull-style snapshot, identical in shape to what the listener
    /// receives
    pub fn snapshot(&self) -> Vec<OpenDialog> {
        self.inner.snapshot()
    }

    pub fn open_count(&self) -> usize {
        self.inner.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.open_count() == 0
    }

    pub fn contains(&self, key: &DialogKey) -> bool {
        self.inner
            .items
            .lock()
            .unwrap()
            .iter()
            .any(|item| item.key() == *key)
    }

    /// The synthetic dismiss reason used when a host is torn down with
    /// dialogs still open
    pub fn host_destroyed_reason() -> DialogValue {
        json!({"error": "dialog host destroyed"})
    }
}

impl Default for DialogHost {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::StubBody;
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_show_modal_grows_collection_with_unique_keys() {
        let host = DialogHost::new();
        let handles: Vec<_> = (0..5)
            .map(|i| host.show_modal(Box::new(StubBody::new()), json!({"n": i})))
            .collect();

        assert_eq!(host.open_count(), 5);
        let keys: HashSet<_> = host.snapshot().iter().map(|d| d.key()).collect();
        assert_eq!(keys.len(), 5);

        host.destroy_dialog(&handles[2].key());
        assert_eq!(host.open_count(), 4);
        assert!(!host.contains(&handles[2].key()));
        assert!(host.contains(&handles[0].key()));
    }

    #[tokio::test]
    async fn test_destroy_dialog_is_noop_safe_when_absent() {
        let host = DialogHost::new();
        let handle = host.show_modal(Box::new(StubBody::new()), json!({}));

        let notifications = Arc::new(AtomicUsize::new(0));
        let seen = notifications.clone();
        host.set_change_listener(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        assert!(host.destroy_dialog(&handle.key()));
        assert!(!host.destroy_dialog(&handle.key()));
        // Only the successful removal notified
        assert_eq!(notifications.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_listener_receives_snapshot_unaffected_by_later_mutations() {
        let host = DialogHost::new();
        let latest: Arc<std::sync::Mutex<Vec<OpenDialog>>> =
            Arc::new(std::sync::Mutex::new(Vec::new()));
        let slot = latest.clone();
        host.set_change_listener(move |snapshot| {
            *slot.lock().unwrap() = snapshot;
        });

        let first = host.show_modal(Box::new(StubBody::new()), json!({}));
        let captured = latest.lock().unwrap().clone();
        assert_eq!(captured.len(), 1);

        host.show_modal(Box::new(StubBody::new()), json!({}));
        host.destroy_dialog(&first.key());

        // The earlier snapshot still describes the state at capture time
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].key(), first.key());
    }

    #[tokio::test]
    async fn test_listener_replacement_keeps_single_listener() {
        let host = DialogHost::new();
        let first_count = Arc::new(AtomicUsize::new(0));
        let second_count = Arc::new(AtomicUsize::new(0));

        let seen = first_count.clone();
        host.set_change_listener(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        let seen = second_count.clone();
        host.set_change_listener(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        host.show_modal(Box::new(StubBody::new()), json!({}));
        assert_eq!(first_count.load(Ordering::SeqCst), 0);
        assert!(second_count.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_dismiss_all_issues_in_render_order() {
        let host = DialogHost::new();
        let order: Arc<std::sync::Mutex<Vec<&'static str>>> =
            Arc::new(std::sync::Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let handle = host.show_modal(Box::new(StubBody::new()), json!({}));
            let record = order.clone();
            handle.on_dismiss(move |reason| {
                record.lock().unwrap().push(name);
                Ok(reason)
            });
        }

        let transitions = host.dismiss_all(json!("teardown"));
        assert_eq!(transitions.len(), 3);
        // Synchronous handler prologues ran at issuance, in render order
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);

        for transition in transitions {
            assert_eq!(transition.await.unwrap(), json!("teardown"));
        }
    }

    #[tokio::test]
    async fn test_update_targets_only_the_updated_dialog() {
        let host = DialogHost::new();
        let (first_body, first_seen) = StubBody::recording();
        let (second_body, second_seen) = StubBody::recording();

        host.show_modal(Box::new(first_body), json!({"label": "a"}));
        let second = host.show_modal(Box::new(second_body), json!({"label": "b"}));

        second.update(json!({"label": "b2", "extra": 1}));

        assert!(first_seen.lock().unwrap().is_empty());
        let seen = second_seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], json!({"label": "b2", "extra": 1}));
    }

    #[tokio::test]
    async fn test_host_survives_item_notifications_after_drop() {
        let host = DialogHost::new();
        let handle = host.show_modal(Box::new(StubBody::new()), json!({}));
        drop(host);

        // The weak back-reference absorbs the notification; the
        // transition still settles.
        let outcome = handle.close(json!("late")).await;
        assert_eq!(outcome.unwrap(), json!("late"));
    }
}

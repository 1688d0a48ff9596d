use std::sync::Arc;

use anyhow::Result;
use tokio::sync::broadcast;

use crate::list::Snapshot;
use crate::render::Render;

/// Handle to the remote append/remove collection. Both operations are
/// fire-and-forget: they queue the request and return without waiting for
/// the store to apply it. Confirmation arrives later as a snapshot.
pub trait RemoteList: Send {
    fn append(&self, value: &str) -> Result<()>;
    fn clear_all(&self) -> Result<()>;
}

/// Bridges the remote collection to a view.
///
/// Holds no list state of its own: the view is always a pure function of
/// the last snapshot fed through [`on_snapshot`](Self::on_snapshot), and
/// every snapshot triggers a full re-render. Values are passed through
/// unvalidated; non-empty input is the caller's responsibility.
pub struct ListSync<R> {
    remote: R,
    render: Box<dyn Render>,
}

impl<R: RemoteList> ListSync<R> {
    pub fn new(remote: R, render: Box<dyn Render>) -> Self {
        Self { remote, render }
    }

    /// Send `value` to the remote collection. The view updates when the
    /// resulting snapshot arrives, not before.
    pub fn append(&mut self, value: &str) -> Result<()> {
        self.remote.append(value)
    }

    /// Request deletion of the entire collection, then feed an empty
    /// snapshot through the normal render path so the view clears at once
    /// instead of showing stale entries until the notification lands.
    pub fn clear_all(&mut self) -> Result<()> {
        self.remote.clear_all()?;
        self.on_snapshot(&Snapshot::absent());
        Ok(())
    }

    /// Called with every change notification (including the initial one on
    /// subscribe). An absent collection renders as an empty list.
    pub fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.render.render(snapshot.values());
    }

    /// Consume snapshots from a subscription until the sender side closes.
    /// A lagged receiver just waits for the next message: every snapshot
    /// is complete, so skipped ones are superseded anyway.
    pub async fn drive(&mut self, mut snapshots: broadcast::Receiver<Arc<Snapshot>>) {
        loop {
            match snapshots.recv().await {
                Ok(snapshot) => self.on_snapshot(&snapshot),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "snapshot stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::Entry;
    use parking_lot::Mutex;

    /// Stand-in for the remote store: applies mutations to a shared vec
    /// the way the real store would, but emits no notifications. Tests
    /// deliver snapshots by hand.
    #[derive(Clone, Default)]
    struct FakeStore {
        values: Arc<Mutex<Vec<String>>>,
    }

    impl FakeStore {
        fn snapshot(&self) -> Snapshot {
            let values = self.values.lock();
            if values.is_empty() {
                Snapshot::absent()
            } else {
                Snapshot::of(values.iter().cloned())
            }
        }
    }

    impl RemoteList for FakeStore {
        fn append(&self, value: &str) -> Result<()> {
            self.values.lock().push(value.to_string());
            Ok(())
        }

        fn clear_all(&self) -> Result<()> {
            self.values.lock().clear();
            Ok(())
        }
    }

    fn recording_render(log: Arc<Mutex<Vec<Vec<String>>>>) -> Box<dyn Render> {
        Box::new(move |entries: &[Entry]| {
            log.lock()
                .push(entries.iter().map(|e| e.as_str().to_string()).collect());
        })
    }

    #[test]
    fn test_snapshot_renders_exactly_the_reported_values() {
        let store = FakeStore::default();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut sync = ListSync::new(store.clone(), recording_render(log.clone()));

        sync.append("https://a.com").unwrap();
        sync.append("https://b.com").unwrap();
        sync.append("https://c.com").unwrap();

        // Nothing rendered until a snapshot arrives.
        assert!(log.lock().is_empty());

        sync.on_snapshot(&store.snapshot());
        assert_eq!(
            log.lock().last().unwrap(),
            &vec!["https://a.com", "https://b.com", "https://c.com"]
        );
    }

    #[test]
    fn test_clear_all_empties_view_before_notification() {
        let store = FakeStore::default();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut sync = ListSync::new(store.clone(), recording_render(log.clone()));

        sync.append("https://a.com").unwrap();
        sync.on_snapshot(&store.snapshot());
        assert_eq!(log.lock().last().unwrap().len(), 1);

        sync.clear_all().unwrap();
        assert!(log.lock().last().unwrap().is_empty());
        assert!(store.values.lock().is_empty());
    }

    #[test]
    fn test_absent_snapshot_renders_empty_not_error() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut sync = ListSync::new(FakeStore::default(), recording_render(log.clone()));

        sync.on_snapshot(&Snapshot::absent());
        assert_eq!(log.lock().last().unwrap(), &Vec::<String>::new());
    }

    #[test]
    fn test_clear_all_is_idempotent() {
        let store = FakeStore::default();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut sync = ListSync::new(store.clone(), recording_render(log.clone()));

        sync.append("https://a.com").unwrap();
        sync.clear_all().unwrap();
        sync.clear_all().unwrap();

        assert!(log.lock().last().unwrap().is_empty());
        assert!(store.values.lock().is_empty());
        assert!(!store.snapshot().exists());
    }

    #[test]
    fn test_html_scenario_end_to_end() {
        use crate::render::HtmlList;

        let store = FakeStore::default();
        let view = Arc::new(Mutex::new(String::new()));
        let view_out = view.clone();
        let mut html = HtmlList::new();
        let render = Box::new(move |entries: &[Entry]| {
            html.render(entries);
            *view_out.lock() = html.html().to_string();
        });
        let mut sync = ListSync::new(store.clone(), render);

        sync.append("https://a.com").unwrap();
        sync.on_snapshot(&store.snapshot());
        assert_eq!(view.lock().matches("<li>").count(), 1);
        assert!(view.lock().contains("href=\"https://a.com\""));

        sync.append("https://b.com").unwrap();
        sync.on_snapshot(&store.snapshot());
        let rendered = view.lock().clone();
        assert_eq!(rendered.matches("<li>").count(), 2);
        assert!(
            rendered.find("https://a.com").unwrap() < rendered.find("https://b.com").unwrap()
        );

        sync.clear_all().unwrap();
        assert_eq!(view.lock().as_str(), "");
        assert!(!store.snapshot().exists());
    }
}

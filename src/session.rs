//! Run lifecycle for a consumer that re-submits inputs over time.
//!
//! Retrieval is the only asynchronous step. A run that is overtaken by a
//! newer submission while its bytes are in flight is discarded: its result
//! is never delivered and any handles it registered are released. The last
//! submission wins, regardless of which retrieval finishes first.

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::assets::{AssetHandle, ResourceTracker};
use crate::error::{Error, Result};
use crate::model::Overlay;
use crate::pipeline::Extractor;

/// Outcome of [`OverlaySession::load`].
#[derive(Debug)]
pub enum LoadOutcome {
    /// This was the newest submission; here is its result.
    Ready(Result<Arc<Overlay>>),
    /// A newer submission arrived first; nothing was delivered.
    Superseded,
}

impl LoadOutcome {
    pub fn is_superseded(&self) -> bool {
        matches!(self, LoadOutcome::Superseded)
    }
}

struct SessionState<T> {
    tracker: T,
    /// Handles owned by the displayed run.
    handles: Vec<AssetHandle>,
    displayed: Option<Arc<Overlay>>,
}

impl<T: ResourceTracker> SessionState<T> {
    fn release_all(&mut self) {
        for handle in self.handles.drain(..) {
            debug!("Releasing asset handle {}", truncate(handle.as_str()));
            self.tracker.release(&handle);
        }
    }
}

/// Owns the current run and the asset handles it registered.
pub struct OverlaySession<T: ResourceTracker> {
    extractor: Extractor,
    generation: AtomicU64,
    state: Mutex<SessionState<T>>,
}

impl<T: ResourceTracker> OverlaySession<T> {
    pub fn new(tracker: T) -> Self {
        Self::with_extractor(Extractor::new(), tracker)
    }

    pub fn with_extractor(extractor: Extractor, tracker: T) -> Self {
        Self {
            extractor,
            generation: AtomicU64::new(0),
            state: Mutex::new(SessionState {
                tracker,
                handles: Vec::new(),
                displayed: None,
            }),
        }
    }

    /// Submit a new input.
    ///
    /// Handles of the previous run are released right away. `fetch` is then
    /// awaited; if a newer submission was made meanwhile, this run ends as
    /// [`LoadOutcome::Superseded`]. A failed fetch becomes
    /// [`Error::Retrieval`] with the fetch error's message.
    pub async fn load<F, E>(&self, fetch: F) -> LoadOutcome
    where
        F: Future<Output = std::result::Result<Vec<u8>, E>>,
        E: Display,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.lock();
            state.release_all();
            state.displayed = None;
        }

        let fetched = fetch.await;

        let mut state = self.lock();
        if !self.is_current(ticket) {
            debug!("Run {} superseded during retrieval", ticket);
            return LoadOutcome::Superseded;
        }

        let result = match fetched {
            Ok(data) => self.extractor.process(&data, &mut state.tracker),
            Err(e) => Err(Error::retrieval(e)),
        };

        if !self.is_current(ticket) {
            debug!("Run {} superseded during extraction", ticket);
            if let Ok(overlay) = &result {
                for handle in &overlay.assets {
                    state.tracker.release(handle);
                }
            }
            return LoadOutcome::Superseded;
        }

        LoadOutcome::Ready(result.map(|overlay| {
            let overlay = Arc::new(overlay);
            state.handles = overlay.assets.clone();
            state.displayed = Some(Arc::clone(&overlay));
            overlay
        }))
    }

    /// Like [`load`](Self::load), but hands the result to `on_result`. The
    /// callback is never invoked for a superseded run.
    pub async fn load_with<F, E, C>(&self, fetch: F, on_result: C)
    where
        F: Future<Output = std::result::Result<Vec<u8>, E>>,
        E: Display,
        C: FnOnce(Result<Arc<Overlay>>),
    {
        if let LoadOutcome::Ready(result) = self.load(fetch).await {
            on_result(result);
        }
    }

    /// The overlay of the newest successful run, if it is still displayed.
    pub fn displayed(&self) -> Option<Arc<Overlay>> {
        self.lock().displayed.clone()
    }

    /// Number of handles currently owned by the session.
    pub fn live_handles(&self) -> usize {
        self.lock().handles.len()
    }

    /// Release every handle and forget the displayed overlay. In-flight runs
    /// are superseded.
    pub fn teardown(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut state = self.lock();
        state.release_all();
        state.displayed = None;
    }

    /// Access the tracker, e.g. to inspect it.
    pub fn with_tracker<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock().tracker)
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    fn lock(&self) -> MutexGuard<'_, SessionState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: ResourceTracker> Drop for OverlaySession<T> {
    fn drop(&mut self) {
        self.state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .release_all();
    }
}

fn truncate(s: &str) -> &str {
    match s.char_indices().nth(48) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::DataUriTracker;

    const POINT: &[u8] =
        b"<kml><Placemark><Point><coordinates>1,2</coordinates></Point></Placemark></kml>";

    #[tokio::test]
    async fn test_load_ready() {
        let session = OverlaySession::new(DataUriTracker::new());
        let outcome = session.load(async { Ok::<_, String>(POINT.to_vec()) }).await;

        match outcome {
            LoadOutcome::Ready(Ok(overlay)) => assert_eq!(overlay.features.len(), 1),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(session.displayed().is_some());
        assert_eq!(session.with_tracker(|t| t.live()), 0);
    }

    #[tokio::test]
    async fn test_retrieval_failure_is_verbatim() {
        let session = OverlaySession::new(DataUriTracker::new());
        let outcome = session
            .load(async { Err::<Vec<u8>, _>("connection reset") })
            .await;

        match outcome {
            LoadOutcome::Ready(Err(Error::Retrieval(msg))) => assert_eq!(msg, "connection reset"),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(session.displayed().is_none());
    }

    #[tokio::test]
    async fn test_error_clears_displayed() {
        let session = OverlaySession::new(DataUriTracker::new());
        session.load(async { Ok::<_, String>(POINT.to_vec()) }).await;
        assert!(session.displayed().is_some());

        let outcome = session
            .load(async { Ok::<_, String>(b"<kml/>".to_vec()) })
            .await;
        assert!(matches!(outcome, LoadOutcome::Ready(Err(Error::NoGeometry))));
        assert!(session.displayed().is_none());
    }

    #[tokio::test]
    async fn test_callback_suppressed_when_superseded() {
        let session = OverlaySession::new(DataUriTracker::new());
        let (tx, rx) = tokio::sync::oneshot::channel::<Vec<u8>>();
        let mut delivered = Vec::new();

        let first = session.load_with(
            async { rx.await.map_err(|e| e.to_string()) },
            |r| delivered.push(r.is_ok()),
        );
        let second = async {
            // Submitted while the first retrieval is pending
            let outcome = session.load(async { Ok::<_, String>(POINT.to_vec()) }).await;
            let _ = tx.send(POINT.to_vec());
            outcome
        };

        let ((), second) = tokio::join!(first, second);
        assert!(!second.is_superseded());
        assert!(delivered.is_empty());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short"), "short");
        assert_eq!(truncate(&"x".repeat(100)).len(), 48);
    }
}

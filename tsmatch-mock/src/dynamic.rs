use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use tsmatch_core::{CandidateSource, Enumeration, MatchError, TimeSeries};

/// Instruction for how a method should behave for a given input.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Fail immediately with the provided error.
    Fail(MatchError),
    /// Hang indefinitely (simulate a timeout).
    Hang,
}

#[derive(Default)]
struct InternalState {
    listing: Option<MockBehavior<Enumeration>>,
    candidates: BTreeMap<String, MockBehavior<TimeSeries>>,
    fetch_log: Vec<String>,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Set the behavior for `fetch` calls for one candidate.
    ///
    /// Candidates with a behavior are listed by `list_candidates` unless a
    /// listing override is set.
    pub async fn set_candidate(&self, candidate_id: impl Into<String>, behavior: MockBehavior<TimeSeries>) {
        let mut guard = self.state.lock().await;
        guard.candidates.insert(candidate_id.into(), behavior);
    }

    /// Override what `list_candidates` returns.
    pub async fn set_listing(&self, behavior: MockBehavior<Enumeration>) {
        let mut guard = self.state.lock().await;
        guard.listing = Some(behavior);
    }

    /// Candidate ids passed to `fetch`, in call order.
    pub async fn fetch_log(&self) -> Vec<String> {
        let guard = self.state.lock().await;
        guard.fetch_log.clone()
    }

    /// Clear all configured behaviors and the fetch log.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.listing = None;
        guard.candidates.clear();
        guard.fetch_log.clear();
    }
}

/// A candidate source that defers all behavior to an external controller.
pub struct DynamicMockSource {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockSource {
    /// Create a new dynamic mock source and its controller.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
    ) -> (Arc<dyn CandidateSource>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { name, state });
        (me as Arc<dyn CandidateSource>, controller)
    }
}

#[async_trait]
impl CandidateSource for DynamicMockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn list_candidates(&self) -> Result<Enumeration, MatchError> {
        // Snapshot without holding the lock across the hang
        let behavior = {
            let guard = self.state.lock().await;
            match &guard.listing {
                Some(b) => b.clone(),
                None => MockBehavior::Return(Enumeration::new(
                    guard.candidates.keys().cloned().collect(),
                )),
            }
        };

        match behavior {
            MockBehavior::Return(e) => Ok(e),
            MockBehavior::Fail(e) => Err(e),
            MockBehavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }

    async fn fetch(&self, candidate_id: &str) -> Result<TimeSeries, MatchError> {
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.fetch_log.push(candidate_id.to_string());
            guard.candidates.get(candidate_id).cloned()
        };

        match behavior {
            Some(MockBehavior::Return(series)) => Ok(series),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Err(MatchError::not_found(format!(
                "candidate {candidate_id} on {}",
                self.name
            ))),
        }
    }
}

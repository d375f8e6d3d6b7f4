//! Fetch-cycle state machine for the dashboard.
//!
//! States move `Idle → Loading → {Ready | Failed}`; a failed cycle is
//! always retryable. Refreshes may overlap when a caller retries while a
//! previous cycle's sub-requests are still in flight; the stored state
//! follows a last-started-cycle-wins policy, so a slow stale cycle can
//! never overwrite the snapshot of a newer one.

use crate::dashboard::aggregator::fetch_dashboard;
use crate::gateway::SurveyApi;
use crate::models::DashboardSnapshot;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Observable state of the dashboard between and during fetch cycles.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    /// No cycle has run yet.
    Idle,
    /// A cycle is in flight; no partial results are exposed.
    Loading,
    /// The last completed cycle produced this snapshot.
    Ready(DashboardSnapshot),
    /// The last completed cycle failed; the message is opaque and the
    /// presentation layer decides how to show it. Stats are back at
    /// their zero defaults.
    Failed(String),
}

struct ControllerState {
    state: FetchState,
    cycles_started: u64,
}

/// Runs fetch cycles against a gateway and reconciles their outcomes.
pub struct DashboardController<S> {
    api: S,
    inner: Mutex<ControllerState>,
}

impl<S: SurveyApi> DashboardController<S> {
    pub fn new(api: S) -> Self {
        Self {
            api,
            inner: Mutex::new(ControllerState {
                state: FetchState::Idle,
                cycles_started: 0,
            }),
        }
    }

    /// Current state, as last reconciled.
    #[allow(dead_code)] // Observer for embedding presentation layers
    pub fn state(&self) -> FetchState {
        self.lock().state.clone()
    }

    /// Run one fetch cycle and return its outcome.
    ///
    /// The returned value is always this cycle's own result. The stored
    /// state is only updated when no newer cycle has started in the
    /// meantime; stale outcomes are discarded.
    pub async fn refresh(&self) -> FetchState {
        let cycle = {
            let mut inner = self.lock();
            inner.cycles_started += 1;
            inner.state = FetchState::Loading;
            inner.cycles_started
        };
        debug!("fetch cycle {cycle} started");

        let outcome = match fetch_dashboard(&self.api).await {
            Ok(snapshot) => {
                info!(
                    "fetch cycle {cycle} ready: {} surveys, {} responses",
                    snapshot.stats.total_surveys, snapshot.stats.total_responses
                );
                FetchState::Ready(snapshot)
            }
            Err(err) => {
                warn!("fetch cycle {cycle} failed: {err}");
                FetchState::Failed(err.to_string())
            }
        };

        let mut inner = self.lock();
        if cycle == inner.cycles_started {
            inner.state = outcome.clone();
        } else {
            debug!("fetch cycle {cycle} finished stale; result discarded");
        }
        outcome
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ControllerState> {
        self.inner.lock().expect("dashboard state lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::TransportError;
    use crate::models::Survey;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// One scripted reply per expected `list_surveys` call, optionally
    /// held back until a gate is released.
    struct ScriptedList {
        gate: Option<Arc<Notify>>,
        reply: Result<Vec<Survey>, StatusCode>,
    }

    struct ScriptedApi {
        lists: Mutex<VecDeque<ScriptedList>>,
        started: Arc<Notify>,
    }

    impl ScriptedApi {
        fn new(lists: Vec<ScriptedList>) -> Self {
            Self {
                lists: Mutex::new(lists.into()),
                started: Arc::new(Notify::new()),
            }
        }
    }

    #[async_trait]
    impl SurveyApi for ScriptedApi {
        async fn list_surveys(&self) -> Result<Vec<Survey>, TransportError> {
            let scripted = self
                .lists
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected list_surveys call");
            self.started.notify_one();

            if let Some(gate) = scripted.gate {
                gate.notified().await;
            }
            scripted.reply.map_err(|status| TransportError::Status {
                status,
                url: "http://test/api/surveys/all".to_string(),
            })
        }

        async fn response_count(&self, _survey_id: i64) -> u64 {
            1
        }
    }

    fn survey(id: i64) -> Survey {
        Survey {
            id,
            title: format!("Survey {id}"),
            description: None,
            questions_json: None,
            creator_email: None,
            created_at: None,
            status: None,
        }
    }

    #[test]
    fn test_starts_idle() {
        let controller = DashboardController::new(ScriptedApi::new(vec![]));
        assert_eq!(controller.state(), FetchState::Idle);
    }

    #[test]
    fn test_successful_cycle_reaches_ready() {
        let api = ScriptedApi::new(vec![ScriptedList {
            gate: None,
            reply: Ok(vec![survey(1), survey(2)]),
        }]);
        let controller = DashboardController::new(api);

        let outcome = tokio_test::block_on(controller.refresh());

        match &outcome {
            FetchState::Ready(snapshot) => {
                assert_eq!(snapshot.stats.total_surveys, 2);
                assert_eq!(snapshot.stats.total_responses, 2);
            }
            other => panic!("expected Ready, got {other:?}"),
        }
        assert_eq!(controller.state(), outcome);
    }

    #[test]
    fn test_failed_cycle_is_retryable() {
        let api = ScriptedApi::new(vec![
            ScriptedList {
                gate: None,
                reply: Err(StatusCode::BAD_GATEWAY),
            },
            ScriptedList {
                gate: None,
                reply: Ok(vec![survey(1)]),
            },
        ]);
        let controller = DashboardController::new(api);

        let failed = tokio_test::block_on(controller.refresh());
        assert!(matches!(failed, FetchState::Failed(_)));
        assert_eq!(controller.state(), failed);

        let retried = tokio_test::block_on(controller.refresh());
        assert!(matches!(retried, FetchState::Ready(_)));
        assert_eq!(controller.state(), retried);
    }

    #[tokio::test]
    async fn test_stale_cycle_cannot_overwrite_newer_snapshot() {
        let gate = Arc::new(Notify::new());
        let api = ScriptedApi::new(vec![
            ScriptedList {
                gate: Some(gate.clone()),
                reply: Ok(vec![survey(1)]),
            },
            ScriptedList {
                gate: None,
                reply: Ok(vec![survey(2), survey(3)]),
            },
        ]);
        let started = api.started.clone();
        let controller = Arc::new(DashboardController::new(api));

        // Cycle 1 blocks on the gate inside list_surveys.
        let slow = controller.clone();
        let first = tokio::spawn(async move { slow.refresh().await });
        started.notified().await;

        // Cycle 2 starts while cycle 1 is still in flight and completes.
        let second = controller.refresh().await;
        match &second {
            FetchState::Ready(snapshot) => assert_eq!(snapshot.stats.total_surveys, 2),
            other => panic!("expected Ready, got {other:?}"),
        }

        // Cycle 1 finishes late; its outcome is returned but not stored.
        gate.notify_one();
        let first = first.await.unwrap();
        match &first {
            FetchState::Ready(snapshot) => assert_eq!(snapshot.stats.total_surveys, 1),
            other => panic!("expected Ready, got {other:?}"),
        }

        assert_eq!(controller.state(), second);
    }
}

//! Space version gating and single-flight version fetches.
//!
//! Every collection of a space asks for the current version token before it
//! syncs. `VersionCoordinator` makes concurrent askers share one request:
//!
//! - `Idle`: no request in flight. The next caller becomes the origin and
//!   spawns the request as its own task.
//! - `Fetching`: callers register a waiter and receive the same outcome.
//!
//! The request runs detached from the origin caller, so dropping the origin's
//! future still resolves the remaining waiters. A request that panics resolves
//! every waiter with an error and leaves the coordinator `Idle`.

use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};

use crate::error::{Error, Result};
use crate::source::ContentSource;

/// Whether the stored token proves the space unchanged.
///
/// True only when a stored token exists, parses as an integer and equals the
/// freshly fetched one.
pub fn is_up_to_date(stored: Option<&str>, fresh: Option<u64>) -> bool {
    let (Some(stored), Some(fresh)) = (stored, fresh) else {
        return false;
    };
    stored
        .trim()
        .parse::<u64>()
        .is_ok_and(|stored| stored == fresh)
}

type VersionOutcome = std::result::Result<u64, Arc<str>>;

enum FetchState {
    Idle,
    Fetching {
        origin: String,
        waiters: Vec<oneshot::Sender<VersionOutcome>>,
    },
}

/// Shares one in-flight version request between concurrent sync jobs
pub struct VersionCoordinator<S> {
    source: Arc<S>,
    state: Arc<Mutex<FetchState>>,
}

impl<S> Clone for VersionCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S> VersionCoordinator<S>
where
    S: ContentSource + 'static,
{
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(FetchState::Idle)),
        }
    }

    /// Whether no version request is currently in flight
    pub async fn is_idle(&self) -> bool {
        matches!(*self.state.lock().await, FetchState::Idle)
    }

    /// Current version token of the space, shared with concurrent callers.
    ///
    /// `origin` names the caller for logging.
    pub async fn current_version(&self, origin: &str) -> Result<u64> {
        let (tx, rx) = oneshot::channel();

        {
            let mut state = self.state.lock().await;
            if let FetchState::Fetching {
                origin: leader,
                waiters,
            } = &mut *state
            {
                tracing::debug!(
                    origin,
                    leader = %leader,
                    "Joining in-flight space version fetch"
                );
                waiters.push(tx);
            } else {
                *state = FetchState::Fetching {
                    origin: origin.to_string(),
                    waiters: vec![tx],
                };
                self.spawn_fetch(origin.to_string());
            }
        }

        match rx.await {
            Ok(Ok(version)) => Ok(version),
            Ok(Err(message)) => Err(Error::VersionUnavailable(message.to_string())),
            Err(_) => Err(Error::VersionUnavailable(
                "version request ended without a result".to_string(),
            )),
        }
    }

    fn spawn_fetch(&self, origin: String) {
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            tracing::debug!(origin = %origin, "Fetching space version");
            // The request runs in its own task so a panic surfaces as a
            // `JoinError` and the state still returns to `Idle`.
            let request = tokio::spawn(async move { source.fetch_version().await });
            let outcome: VersionOutcome = match request.await {
                Ok(result) => result.map_err(|error| Arc::from(error.to_string())),
                Err(error) => Err(Arc::from(format!("version request aborted: {error}"))),
            };

            if let Err(message) = &outcome {
                tracing::warn!(origin = %origin, error = %message, "Space version fetch failed");
            }

            let waiters = {
                let mut state = state.lock().await;
                match std::mem::replace(&mut *state, FetchState::Idle) {
                    FetchState::Fetching { waiters, .. } => waiters,
                    FetchState::Idle => Vec::new(),
                }
            };

            for waiter in waiters {
                // A dropped receiver only means that caller stopped waiting.
                let _ = waiter.send(outcome.clone());
            }
        });
    }
}

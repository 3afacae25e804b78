//! Single-flight token refresh coordination.
//!
//! When a request is rejected with 401 the client asks the coordinator for a
//! usable access token. The first caller becomes the leader and performs the
//! refresh; callers arriving while it is in flight are parked in a FIFO
//! queue and released, in enqueue order, with the leader's outcome.
//!
//! The in-flight flag, the stored-token read, and the enqueue all happen in
//! one synchronous critical section, so at most one refresh call is ever in
//! flight per coordinator regardless of runtime flavor.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::auth::{CredentialStore, TokenRefresher};
use crate::error::RefreshError;

use super::session::{SessionEnd, SessionObserver, TracingSessionObserver};

/// Upper bound on one refresh call when none is configured.
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of a recovery attempt after a 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// Replay the rejected request with this access token.
    Renewed(String),
    /// No session to restore; the original 401 stands.
    NoSession,
}

type Waiter = oneshot::Sender<Result<String, RefreshError>>;

#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    pending: VecDeque<Waiter>,
    refresh_calls: u64,
    // Set once the observer has heard about the end of the session.
    session_ended: bool,
}

enum Role {
    Leader(String),
    Follower(oneshot::Receiver<Result<String, RefreshError>>),
    Reuse(String),
    NoSession { notify: bool },
}

/// Owns the refresh state for one client (or a group of clients sharing it).
pub struct RefreshCoordinator {
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    observer: Arc<dyn SessionObserver>,
    refresh_timeout: Duration,
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    pub fn new(store: Arc<dyn CredentialStore>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            store,
            refresher,
            observer: Arc::new(TracingSessionObserver),
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            state: Mutex::new(RefreshState::default()),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn is_refreshing(&self) -> bool {
        self.lock_state().in_flight
    }

    /// Callers currently parked behind the in-flight refresh.
    pub fn pending_len(&self) -> usize {
        self.lock_state().pending.len()
    }

    /// Refresh calls dispatched over this coordinator's lifetime.
    pub fn refresh_calls(&self) -> u64 {
        self.lock_state().refresh_calls
    }

    /// Obtain a token to replay a request that was rejected with 401.
    ///
    /// `rejected_token` is the access token the failed request carried. If
    /// the store already holds a different token, a refresh completed in the
    /// meantime and that token is returned without another refresh call.
    pub async fn recover(&self, rejected_token: Option<&str>) -> Result<Recovery, RefreshError> {
        match self.claim(rejected_token) {
            Role::Reuse(token) => {
                tracing::debug!("token already renewed; replaying without refresh");
                Ok(Recovery::Renewed(token))
            }
            Role::NoSession { notify } => {
                if notify {
                    self.observer
                        .session_expired(&SessionEnd::MissingRefreshToken);
                }
                Ok(Recovery::NoSession)
            }
            Role::Follower(receiver) => match receiver.await {
                Ok(Ok(token)) => Ok(Recovery::Renewed(token)),
                Ok(Err(err)) => Err(err),
                Err(_) => Err(RefreshError::Abandoned),
            },
            Role::Leader(refresh_token) => self.lead(&refresh_token).await,
        }
    }

    fn claim(&self, rejected_token: Option<&str>) -> Role {
        let mut state = self.lock_state();
        if state.in_flight {
            let (sender, receiver) = oneshot::channel();
            state.pending.push_back(sender);
            tracing::debug!(queued = state.pending.len(), "refresh in flight; parking request");
            return Role::Follower(receiver);
        }

        let stored = match self.store.get() {
            Ok(pair) => pair,
            Err(err) => {
                tracing::warn!(error = %err, "could not read stored credentials");
                None
            }
        };
        let Some(pair) = stored else {
            return state.no_session();
        };
        if let Some(current) = pair.access() {
            if Some(current) != rejected_token {
                state.session_ended = false;
                return Role::Reuse(current.to_string());
            }
        }
        match pair.refresh() {
            Some(refresh_token) => {
                state.in_flight = true;
                state.session_ended = false;
                state.refresh_calls += 1;
                Role::Leader(refresh_token.to_string())
            }
            None => state.no_session(),
        }
    }

    async fn lead(&self, refresh_token: &str) -> Result<Recovery, RefreshError> {
        let mut flight = InFlight {
            coordinator: self,
            settled: false,
        };
        tracing::debug!("dispatching token refresh");
        let outcome =
            match tokio::time::timeout(self.refresh_timeout, self.refresher.refresh(refresh_token))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(RefreshError::Timeout(self.refresh_timeout)),
            };

        match outcome {
            Ok(pair) => {
                if let Err(err) = self.store.set(pair.clone()) {
                    // Stores keep the new pair in memory when persisting fails.
                    tracing::warn!(error = %err, "could not persist renewed credentials");
                }
                let access_token = pair.access_token;
                let released = flight.settle(Ok(access_token.clone()));
                tracing::info!(released, "session renewed");
                Ok(Recovery::Renewed(access_token))
            }
            Err(err) => {
                if let Err(clear_err) = self.store.clear() {
                    tracing::warn!(error = %clear_err, "could not clear stored credentials");
                }
                self.lock_state().session_ended = true;
                let released = flight.settle(Err(err.clone()));
                tracing::warn!(error = %err, released, "token refresh failed; session cleared");
                self.observer
                    .session_expired(&SessionEnd::RefreshFailed(err.clone()));
                Err(err)
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RefreshState {
    /// Later 401s of an already reported session end stay quiet.
    fn no_session(&mut self) -> Role {
        let notify = !std::mem::replace(&mut self.session_ended, true);
        Role::NoSession { notify }
    }
}

/// Leader-side handle on the in-flight refresh.
///
/// Dropping it unsettled (the leader's future was cancelled) releases every
/// parked caller with [`RefreshError::Abandoned`].
struct InFlight<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl InFlight<'_> {
    /// Clear the flag and release parked callers in enqueue order.
    fn settle(&mut self, result: Result<String, RefreshError>) -> usize {
        self.settled = true;
        let waiters = {
            let mut state = self.coordinator.lock_state();
            state.in_flight = false;
            std::mem::take(&mut state.pending)
        };
        let released = waiters.len();
        for waiter in waiters {
            let _ = waiter.send(result.clone());
        }
        released
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.settle(Err(RefreshError::Abandoned));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{CredentialPair, FileCredentialStore, MemoryCredentialStore};
    use crate::testsupport::TestTempDir;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;
    use tokio::task::JoinHandle;

    type Release = oneshot::Sender<Result<CredentialPair, RefreshError>>;

    /// Refresher whose single call blocks until the test releases it.
    struct GatedRefresher {
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
        started: Notify,
        gate: tokio::sync::Mutex<Option<oneshot::Receiver<Result<CredentialPair, RefreshError>>>>,
    }

    impl GatedRefresher {
        fn new() -> (Arc<Self>, Release) {
            let (release, gate) = oneshot::channel();
            let refresher = Arc::new(Self {
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
                started: Notify::new(),
                gate: tokio::sync::Mutex::new(Some(gate)),
            });
            (refresher, release)
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TokenRefresher for GatedRefresher {
        async fn refresh(&self, refresh_token: &str) -> Result<CredentialPair, RefreshError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(refresh_token.to_string());
            self.started.notify_one();
            let gate = self.gate.lock().await.take();
            match gate {
                Some(gate) => gate.await.unwrap_or(Err(RefreshError::Abandoned)),
                None => Err(RefreshError::Transport("unexpected second refresh".into())),
            }
        }
    }

    fn stored(access: &str, refresh: &str) -> Arc<MemoryCredentialStore> {
        Arc::new(MemoryCredentialStore::with_pair(CredentialPair::new(
            access, refresh,
        )))
    }

    fn spawn_recover(
        coordinator: &Arc<RefreshCoordinator>,
        rejected: &str,
    ) -> JoinHandle<Result<Recovery, RefreshError>> {
        let coordinator = Arc::clone(coordinator);
        let rejected = rejected.to_string();
        tokio::spawn(async move { coordinator.recover(Some(&rejected)).await })
    }

    async fn wait_for_pending(coordinator: &RefreshCoordinator, expected: usize) {
        for _ in 0..1000 {
            if coordinator.pending_len() >= expected {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!(
            "expected {expected} parked callers, found {}",
            coordinator.pending_len()
        );
    }

    #[tokio::test]
    async fn concurrent_recoveries_share_one_refresh() {
        let store = stored("a1", "r1");
        let (refresher, release) = GatedRefresher::new();
        let coordinator = Arc::new(RefreshCoordinator::new(store.clone(), refresher.clone()));

        let leader = spawn_recover(&coordinator, "a1");
        refresher.started.notified().await;
        assert!(coordinator.is_refreshing());

        let followers: Vec<_> = (0..4).map(|_| spawn_recover(&coordinator, "a1")).collect();
        wait_for_pending(&coordinator, 4).await;
        assert_eq!(refresher.calls(), 1);

        release.send(Ok(CredentialPair::new("a2", "r2"))).unwrap();
        assert_eq!(leader.await.unwrap(), Ok(Recovery::Renewed("a2".into())));
        for follower in followers {
            assert_eq!(follower.await.unwrap(), Ok(Recovery::Renewed("a2".into())));
        }

        assert_eq!(refresher.calls(), 1);
        assert_eq!(refresher.seen(), vec!["r1".to_string()]);
        assert_eq!(coordinator.refresh_calls(), 1);
        assert_eq!(store.get().unwrap(), Some(CredentialPair::new("a2", "r2")));
        assert!(!coordinator.is_refreshing());
        assert_eq!(coordinator.pending_len(), 0);
    }

    #[tokio::test]
    async fn parked_callers_are_released_in_enqueue_order() {
        let store = stored("a1", "r1");
        let (refresher, release) = GatedRefresher::new();
        let coordinator = Arc::new(RefreshCoordinator::new(store, refresher.clone()));
        let order = Arc::new(Mutex::new(Vec::new()));

        let leader = spawn_recover(&coordinator, "a1");
        refresher.started.notified().await;

        let mut followers = Vec::new();
        for (idx, label) in ["A", "B", "C"].into_iter().enumerate() {
            let coordinator_for_task = Arc::clone(&coordinator);
            let order = Arc::clone(&order);
            followers.push(tokio::spawn(async move {
                let outcome = coordinator_for_task.recover(Some("a1")).await;
                order.lock().unwrap().push(label);
                outcome
            }));
            wait_for_pending(&coordinator, idx + 1).await;
        }

        release.send(Ok(CredentialPair::new("a2", "r2"))).unwrap();
        leader.await.unwrap().unwrap();
        for follower in followers {
            assert_eq!(follower.await.unwrap(), Ok(Recovery::Renewed("a2".into())));
        }
        assert_eq!(*order.lock().unwrap(), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn failed_refresh_rejects_every_caller_and_clears_store() {
        let store = stored("a1", "r1");
        let (refresher, release) = GatedRefresher::new();
        let expired = Arc::new(Mutex::new(Vec::new()));
        let observed = Arc::clone(&expired);
        let coordinator = Arc::new(
            RefreshCoordinator::new(store.clone(), refresher.clone()).with_observer(Arc::new(
                move |reason: &SessionEnd| observed.lock().unwrap().push(reason.clone()),
            )),
        );

        let leader = spawn_recover(&coordinator, "a1");
        refresher.started.notified().await;
        let followers: Vec<_> = (0..2).map(|_| spawn_recover(&coordinator, "a1")).collect();
        wait_for_pending(&coordinator, 2).await;

        let failure = RefreshError::Status {
            code: 401,
            body: "refresh token expired".into(),
        };
        release.send(Err(failure.clone())).unwrap();

        assert_eq!(leader.await.unwrap(), Err(failure.clone()));
        for follower in followers {
            assert_eq!(follower.await.unwrap(), Err(failure.clone()));
        }
        assert_eq!(store.get().unwrap(), None);
        assert!(!coordinator.is_refreshing());
        assert_eq!(
            *expired.lock().unwrap(),
            vec![SessionEnd::RefreshFailed(failure)]
        );
    }

    #[tokio::test]
    async fn missing_refresh_token_skips_refresh() {
        let store = stored("a1", "");
        let (refresher, _release) = GatedRefresher::new();
        let expired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&expired);
        let coordinator = RefreshCoordinator::new(store, refresher.clone()).with_observer(
            Arc::new(move |reason: &SessionEnd| {
                assert_eq!(reason, &SessionEnd::MissingRefreshToken);
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(coordinator.recover(Some("a1")).await, Ok(Recovery::NoSession));
        assert_eq!(refresher.calls(), 0);
        assert_eq!(coordinator.refresh_calls(), 0);
        assert_eq!(expired.load(Ordering::SeqCst), 1);
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn ended_session_is_reported_once() {
        let store = stored("a1", "r1");
        let (refresher, release) = GatedRefresher::new();
        let expired = Arc::new(Mutex::new(Vec::new()));
        let observed = Arc::clone(&expired);
        let coordinator = RefreshCoordinator::new(store.clone(), refresher.clone())
            .with_observer(Arc::new(move |reason: &SessionEnd| {
                observed.lock().unwrap().push(reason.clone())
            }));

        let failure = RefreshError::Status {
            code: 401,
            body: "refresh token revoked".into(),
        };
        release.send(Err(failure.clone())).unwrap();
        assert_eq!(coordinator.recover(Some("a1")).await, Err(failure.clone()));

        // Requests that were already out come back 401 after the store was cleared.
        assert_eq!(coordinator.recover(Some("a1")).await, Ok(Recovery::NoSession));
        assert_eq!(coordinator.recover(None).await, Ok(Recovery::NoSession));
        assert_eq!(
            *expired.lock().unwrap(),
            vec![SessionEnd::RefreshFailed(failure)]
        );

        // A fresh login starts a new session that can end again.
        store.set(CredentialPair::new("a3", "r3")).unwrap();
        assert!(coordinator.recover(Some("a3")).await.is_err());
        assert_eq!(refresher.calls(), 2);
        assert_eq!(expired.lock().unwrap().len(), 2);
        assert_eq!(coordinator.recover(Some("a3")).await, Ok(Recovery::NoSession));
        assert_eq!(expired.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn renewed_pair_survives_failed_persist() {
        let dir = TestTempDir::new("refresh-unwritable");
        let path = dir.child("creds/credentials.json");
        let store = Arc::new(FileCredentialStore::new(&path));
        store.set(CredentialPair::new("a1", "r1")).unwrap();
        // Swap the credential directory for a regular file so the next write fails.
        std::fs::remove_dir_all(dir.child("creds")).unwrap();
        std::fs::write(dir.child("creds"), "").unwrap();

        let (refresher, release) = GatedRefresher::new();
        release.send(Ok(CredentialPair::new("a2", "r2"))).unwrap();
        let coordinator = RefreshCoordinator::new(store.clone(), refresher.clone());

        assert_eq!(
            coordinator.recover(Some("a1")).await,
            Ok(Recovery::Renewed("a2".into()))
        );
        assert_eq!(store.get().unwrap(), Some(CredentialPair::new("a2", "r2")));

        // A request that went out with the old token replays with the new one.
        assert_eq!(
            coordinator.recover(Some("a1")).await,
            Ok(Recovery::Renewed("a2".into()))
        );
        assert_eq!(refresher.calls(), 1);
        assert_eq!(coordinator.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn empty_store_has_no_session() {
        let (refresher, _release) = GatedRefresher::new();
        let coordinator =
            RefreshCoordinator::new(Arc::new(MemoryCredentialStore::new()), refresher.clone());
        assert_eq!(coordinator.recover(None).await, Ok(Recovery::NoSession));
        assert_eq!(refresher.calls(), 0);
    }

    #[tokio::test]
    async fn newer_stored_token_is_reused_without_refresh() {
        let store = stored("a2", "r2");
        let (refresher, _release) = GatedRefresher::new();
        let coordinator = RefreshCoordinator::new(store, refresher.clone());

        assert_eq!(
            coordinator.recover(Some("a1")).await,
            Ok(Recovery::Renewed("a2".into()))
        );
        assert_eq!(refresher.calls(), 0);
    }

    #[tokio::test]
    async fn hung_refresh_times_out_for_everyone() {
        let store = stored("a1", "r1");
        let (refresher, _release_kept_open) = GatedRefresher::new();
        let coordinator = Arc::new(
            RefreshCoordinator::new(store.clone(), refresher.clone())
                .with_refresh_timeout(Duration::from_millis(50)),
        );

        let leader = spawn_recover(&coordinator, "a1");
        refresher.started.notified().await;
        let follower = spawn_recover(&coordinator, "a1");
        wait_for_pending(&coordinator, 1).await;

        let timeout = RefreshError::Timeout(Duration::from_millis(50));
        assert_eq!(leader.await.unwrap(), Err(timeout.clone()));
        assert_eq!(follower.await.unwrap(), Err(timeout));
        assert_eq!(store.get().unwrap(), None);
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn cancelled_leader_releases_parked_callers() {
        let store = stored("a1", "r1");
        let (refresher, _release_kept_open) = GatedRefresher::new();
        let coordinator = Arc::new(RefreshCoordinator::new(store.clone(), refresher.clone()));

        let leader = spawn_recover(&coordinator, "a1");
        refresher.started.notified().await;
        let follower = spawn_recover(&coordinator, "a1");
        wait_for_pending(&coordinator, 1).await;

        leader.abort();
        assert!(leader.await.unwrap_err().is_cancelled());
        assert_eq!(follower.await.unwrap(), Err(RefreshError::Abandoned));
        assert!(!coordinator.is_refreshing());
        // Abandonment is not a verdict on the session; credentials stay.
        assert_eq!(store.get().unwrap(), Some(CredentialPair::new("a1", "r1")));
    }
}

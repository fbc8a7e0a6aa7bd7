//! Polling subscriptions: `{data, loading, error}` state bound to one resource.
//!
//! A [`Subscription`] fetches on creation and whenever its [`Query`] changes
//! (new parameters, or a bumped refresh generation). With a poll interval it
//! re-fetches on every tick until cancelled.
//!
//! # Lifecycle
//!
//! Each parameter generation gets a child [`CancellationToken`] captured by
//! every fetch it starts. State is only mutated inside the state channel's
//! write lock, after checking that token. Retiring a generation (or the whole
//! subscription) cancels the token under the same lock, so once
//! [`Subscription::cancel`] returns no fetch can touch the state again.
//! In-flight requests are not aborted over the wire; their results are
//! discarded on arrival.
//!
//! Overlapping polls for the same generation are allowed to race: the last
//! one to resolve wins.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::{ClientError, ClientResult};

mod feed;
mod resources;

pub use feed::{event_key, merge_events, EventFeed};
pub use resources::{
    watch_account, watch_events, watch_metrics, watch_policy, watch_tools, watch_usage,
    watch_usage_all,
};

/// Events re-poll interval used by the console.
pub const DEFAULT_EVENTS_INTERVAL: Duration = Duration::from_secs(7);

/// Poll intervals are clamped into this range.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(86_400);

/// Observable state of one subscribed resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    /// Last successfully fetched value. Kept across later failures.
    pub data: Option<T>,

    /// True while the first fetch of the current parameter generation is in flight.
    pub loading: bool,

    /// Last failure, cleared by the next success.
    pub error: Option<ClientError>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
        }
    }
}

/// Resource parameters plus a refresh generation.
///
/// Compared by value: a change in either field triggers a re-fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query<P> {
    pub params: P,
    pub refresh: u64,
}

/// State channel guarded by per-generation liveness tokens.
struct StateCell<T> {
    tx: watch::Sender<ResourceState<T>>,
}

impl<T> StateCell<T> {
    /// Apply `update` unless `live` has been cancelled. Returns whether it ran.
    fn apply(&self, live: &CancellationToken, update: impl FnOnce(&mut ResourceState<T>)) -> bool {
        self.tx.send_if_modified(|state| {
            if live.is_cancelled() {
                return false;
            }
            update(state);
            true
        })
    }

    /// Cancel `token` while holding the state lock.
    fn retire(&self, token: &CancellationToken) {
        self.tx.send_if_modified(|_| {
            token.cancel();
            false
        });
    }
}

/// A live binding between a resource fetcher and observable state.
///
/// Dropping the subscription cancels it.
pub struct Subscription<P, T> {
    state_rx: watch::Receiver<ResourceState<T>>,
    cell: Arc<StateCell<T>>,
    query_tx: watch::Sender<Query<P>>,
    token: CancellationToken,
}

impl<P, T> Subscription<P, T>
where
    P: Clone + PartialEq + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    /// Start a subscription on the current tokio runtime.
    ///
    /// `fetch` is called with the current parameters for the initial fetch of
    /// every generation and, when `poll` is set, on every tick after it.
    pub fn spawn<F, Fut>(params: P, poll: Option<Duration>, fetch: F) -> Self
    where
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let (state_tx, state_rx) = watch::channel(ResourceState::default());
        let cell = Arc::new(StateCell { tx: state_tx });
        let (query_tx, query_rx) = watch::channel(Query { params, refresh: 0 });
        let token = CancellationToken::new();

        tokio::spawn(drive(
            Arc::new(fetch),
            query_rx,
            Arc::clone(&cell),
            token.clone(),
            poll,
        ));

        Self {
            state_rx,
            cell,
            query_tx,
            token,
        }
    }
}

impl<P, T> Subscription<P, T>
where
    P: Clone + PartialEq,
    T: Clone,
{
    /// Snapshot of the current state.
    pub fn state(&self) -> ResourceState<T> {
        self.state_rx.borrow().clone()
    }

    /// Independent receiver for the state channel.
    pub fn receiver(&self) -> watch::Receiver<ResourceState<T>> {
        self.state_rx.clone()
    }

    /// Wait for the next state change. Returns `false` once cancelled.
    pub async fn changed(&mut self) -> bool {
        tokio::select! {
            _ = self.token.cancelled() => false,
            changed = self.state_rx.changed() => changed.is_ok() && !self.token.is_cancelled(),
        }
    }

    pub fn query(&self) -> Query<P> {
        self.query_tx.borrow().clone()
    }

    /// Replace the parameters. Equal parameters do not re-fetch.
    pub fn set_params(&self, params: P) {
        self.query_tx.send_if_modified(|query| {
            if query.params == params {
                return false;
            }
            query.params = params;
            true
        });
    }

    /// Force a re-fetch with unchanged parameters.
    pub fn refresh(&self) {
        self.query_tx.send_modify(|query| query.refresh += 1);
    }
}

impl<P, T> Subscription<P, T> {
    /// Tear down: stops polling and discards every in-flight result.
    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            self.cell.retire(&self.token);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl<P, T> Drop for Subscription<P, T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn drive<P, T, F, Fut>(
    fetch: Arc<F>,
    mut query_rx: watch::Receiver<Query<P>>,
    cell: Arc<StateCell<T>>,
    root: CancellationToken,
    poll: Option<Duration>,
) where
    P: Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ClientResult<T>> + Send + 'static,
{
    loop {
        let query = query_rx.borrow_and_update().clone();
        let generation = root.child_token();

        let started = cell.apply(&generation, |state| {
            state.loading = true;
            state.error = None;
        });
        if !started {
            break;
        }

        debug!(refresh = query.refresh, polling = poll.is_some(), "fetching resource");
        spawn_fetch(&fetch, &cell, &generation, query.params.clone());

        if let Some(period) = poll {
            tokio::spawn(poll_loop(
                Arc::clone(&fetch),
                Arc::clone(&cell),
                generation.clone(),
                query.params,
                period,
            ));
        }

        tokio::select! {
            _ = root.cancelled() => break,
            changed = query_rx.changed() => {
                cell.retire(&generation);
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    trace!("subscription driver stopped");
}

fn spawn_fetch<P, T, F, Fut>(
    fetch: &Arc<F>,
    cell: &Arc<StateCell<T>>,
    live: &CancellationToken,
    params: P,
) where
    T: Send + Sync + 'static,
    F: Fn(P) -> Fut,
    Fut: Future<Output = ClientResult<T>> + Send + 'static,
{
    let request = (**fetch)(params);
    let cell = Arc::clone(cell);
    let live = live.clone();

    tokio::spawn(async move {
        let outcome = request.await;
        let applied = cell.apply(&live, |state| {
            match outcome {
                Ok(data) => {
                    state.data = Some(data);
                    state.error = None;
                }
                Err(e) => state.error = Some(e),
            }
            state.loading = false;
        });

        if !applied {
            trace!("discarding result of retired fetch");
        }
    });
}

async fn poll_loop<P, T, F, Fut>(
    fetch: Arc<F>,
    cell: Arc<StateCell<T>>,
    live: CancellationToken,
    params: P,
    period: Duration,
) where
    P: Clone,
    T: Send + Sync + 'static,
    F: Fn(P) -> Fut,
    Fut: Future<Output = ClientResult<T>> + Send + 'static,
{
    let period = period.clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = live.cancelled() => break,
            _ = ticker.tick() => {
                if live.is_cancelled() {
                    break;
                }
                spawn_fetch(&fetch, &cell, &live, params.clone());
            }
        }
    }
}

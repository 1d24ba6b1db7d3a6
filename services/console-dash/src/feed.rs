// services/console-dash/src/feed.rs
//
// Polling feed: fetch once, then re-fetch on a fixed period.
// Results replace the data; failures keep the last good data (stale-while-error).
//

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Local};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use svckit::errors::ApiError;

type Fetcher<Q, T> = Arc<dyn Fn(Q) -> BoxFuture<'static, Result<Vec<T>, ApiError>> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone)]
pub struct FeedSnapshot<T> {
    pub status: FeedStatus,
    pub data: Vec<T>,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Local>>,
    /// Fetches issued since construction, timer and manual alike.
    pub fetches: u64,
}

impl<T> FeedSnapshot<T> {
    fn idle() -> Self {
        Self {
            status: FeedStatus::Idle,
            data: Vec::new(),
            error: None,
            last_updated: None,
            fetches: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == FeedStatus::Loading
    }
}

/// Bookkeeping that must change atomically with respect to `stop()`.
struct Control<Q> {
    query: Q,
    generation: u64,
    issued: u64,
    applied: u64,
    in_flight: u32,
    timer: Option<JoinHandle<()>>,
}

struct Inner<Q, T> {
    name: String,
    period: Duration,
    cap: usize,
    fetcher: Fetcher<Q, T>,
    running: AtomicBool,
    control: Mutex<Control<Q>>,
    state: watch::Sender<FeedSnapshot<T>>,
}

/// Cheap to clone; every clone drives the same feed. When the last
/// handle is dropped the timer is cancelled.
pub struct PollingFeed<Q, T> {
    inner: Arc<Inner<Q, T>>,
}

impl<Q, T> Clone for PollingFeed<Q, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<Q, T> PollingFeed<Q, T>
where
    Q: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(name: impl Into<String>, query: Q, period: Duration, cap: usize, fetch: F) -> Self
    where
        F: Fn(Q) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>, ApiError>> + Send + 'static,
    {
        let fetcher: Fetcher<Q, T> = Arc::new(move |q| Box::pin(fetch(q)));
        let (state, _) = watch::channel(FeedSnapshot::idle());

        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                period,
                cap,
                fetcher,
                running: AtomicBool::new(false),
                control: Mutex::new(Control {
                    query,
                    generation: 0,
                    issued: 0,
                    applied: 0,
                    in_flight: 0,
                    timer: None,
                }),
                state,
            }),
        }
    }

    /// Issue the first fetch immediately and arm the timer once it settles.
    /// Calling `start` on a running feed does nothing.
    pub fn start(&self) {
        let mut control = self.inner.control.lock();
        if self.inner.running.swap(true, Ordering::SeqCst) {
            return;
        }
        self.arm(&mut control);
        info!("{} feed started (period {:?})", self.inner.name, self.inner.period);
    }

    /// Cancel the timer and invalidate every fetch still in flight.
    pub fn stop(&self) {
        let mut control = self.inner.control.lock();
        if !self.inner.running.swap(false, Ordering::SeqCst) {
            return;
        }
        Inner::<Q, T>::disarm(&mut control);
        self.inner.state.send_modify(|s| s.status = FeedStatus::Idle);
        info!("{} feed stopped", self.inner.name);
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Out-of-band fetch-and-store. Leaves the timer alone.
    /// Returns `None` when the feed is not running.
    pub fn refresh(&self) -> Option<JoinHandle<()>> {
        if !self.is_running() {
            return None;
        }
        let generation = self.inner.control.lock().generation;
        let weak = Arc::downgrade(&self.inner);
        debug!("{} feed manual refresh", self.inner.name);
        Some(tokio::spawn(async move {
            Inner::fetch(&weak, generation).await;
        }))
    }

    /// Swap the query. A running feed cancels its timer first, then restarts
    /// with an immediate fetch under the new query.
    pub fn set_query(&self, query: Q) {
        let mut control = self.inner.control.lock();
        control.query = query;
        if self.is_running() {
            Inner::<Q, T>::disarm(&mut control);
            self.arm(&mut control);
            debug!("{} feed re-armed for new query", self.inner.name);
        }
    }

    pub fn query(&self) -> Q {
        self.inner.control.lock().query.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot<T>> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> FeedSnapshot<T> {
        self.inner.state.borrow().clone()
    }

    fn arm(&self, control: &mut Control<Q>) {
        let generation = control.generation;
        let weak = Arc::downgrade(&self.inner);
        let period = self.inner.period;
        control.timer = Some(tokio::spawn(Inner::run(weak, generation, period)));
    }
}

impl<Q, T> Inner<Q, T>
where
    Q: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn disarm(control: &mut Control<Q>) {
        control.generation += 1;
        control.in_flight = 0;
        if let Some(timer) = control.timer.take() {
            timer.abort();
        }
    }

    async fn run(weak: Weak<Self>, generation: u64, period: Duration) {
        if !Self::fetch(&weak, generation).await {
            return;
        }

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if !Self::fetch(&weak, generation).await {
                return;
            }
        }
    }

    /// One fetch-and-store cycle. Returns false once the feed is gone or the
    /// generation has moved on, which ends the timer loop.
    async fn fetch(weak: &Weak<Self>, generation: u64) -> bool {
        let (future, seq) = {
            let Some(inner) = weak.upgrade() else {
                return false;
            };
            let mut control = inner.control.lock();
            if control.generation != generation {
                return false;
            }
            control.issued += 1;
            control.in_flight += 1;
            let seq = control.issued;
            let future = (inner.fetcher)(control.query.clone());
            inner.state.send_modify(|s| {
                s.status = FeedStatus::Loading;
                s.fetches += 1;
            });
            (future, seq)
        };

        let result = future.await;

        match weak.upgrade() {
            Some(inner) => inner.apply(generation, seq, result),
            None => false,
        }
    }

    fn apply(&self, generation: u64, seq: u64, result: Result<Vec<T>, ApiError>) -> bool {
        let mut control = self.control.lock();
        if control.generation != generation {
            debug!("{} feed dropped result of a cancelled fetch", self.name);
            return false;
        }

        control.in_flight = control.in_flight.saturating_sub(1);
        // Overlapping fetches: the latest issued one wins.
        let superseded = seq < control.applied;
        if !superseded {
            control.applied = seq;
        }
        let still_loading = control.in_flight > 0;

        if let Err(e) = &result {
            warn!("{} feed fetch failed: {}", self.name, e);
        }

        self.state.send_modify(|s| {
            if !superseded {
                match result {
                    Ok(mut items) => {
                        items.truncate(self.cap);
                        s.data = items;
                        s.error = None;
                        s.last_updated = Some(Local::now());
                    }
                    Err(e) => s.error = Some(e.user_message()),
                }
            }
            s.status = if still_loading {
                FeedStatus::Loading
            } else if s.error.is_some() {
                FeedStatus::Error
            } else {
                FeedStatus::Ready
            };
        });

        true
    }
}

impl<Q, T> Drop for Inner<Q, T> {
    fn drop(&mut self) {
        if let Some(timer) = self.control.get_mut().timer.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicU64;
    use tokio::sync::Notify;
    use tokio::time::sleep;

    type Script = Arc<Mutex<VecDeque<Result<Vec<u32>, ApiError>>>>;

    fn counting_feed(period: Duration) -> (PollingFeed<u32, u32>, Arc<AtomicU64>) {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let feed = PollingFeed::new("test", 0u32, period, 10, move |q: u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, ApiError>(vec![q]) }
        });
        (feed, calls)
    }

    fn scripted_feed(period: Duration, script: Script) -> PollingFeed<(), u32> {
        PollingFeed::new("scripted", (), period, 10, move |_: ()| {
            let next = script
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Network("script exhausted".to_string())));
            async move { next }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_count_follows_period() {
        let (feed, calls) = counting_feed(Duration::from_secs(10));
        feed.start();

        sleep(Duration::from_secs(35)).await;

        // floor(35 / 10) + 1
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(feed.snapshot().fetches, 4);
        assert_eq!(feed.snapshot().status, FeedStatus::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_arms_one_timer() {
        let (feed, calls) = counting_feed(Duration::from_secs(10));
        feed.start();
        feed.start();
        feed.clone().start();

        sleep(Duration::from_secs(25)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_change_cancels_previous_timer() {
        let (feed, calls) = counting_feed(Duration::from_secs(10));
        feed.start();

        sleep(Duration::from_secs(5)).await;
        feed.set_query(7);

        // New timer fires at 15s and 25s; the old one would have fired at 10s and 20s.
        sleep(Duration::from_secs(21)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(feed.snapshot().data, vec![7]);
        assert_eq!(feed.query(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_timer() {
        let (feed, calls) = counting_feed(Duration::from_secs(10));
        feed.start();
        sleep(Duration::from_secs(15)).await;
        feed.stop();

        sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(feed.snapshot().status, FeedStatus::Idle);
        assert!(!feed.is_running());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_start_stop_keeps_timer_in_step() {
        let (feed, _) = counting_feed(Duration::from_secs(3600));
        let workers: Vec<_> = (0..4)
            .map(|i| {
                let feed = feed.clone();
                tokio::task::spawn_blocking(move || {
                    for n in 0..500 {
                        if (n + i) % 2 == 0 {
                            feed.start();
                        } else {
                            feed.stop();
                        }
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.await.unwrap();
        }

        let control = feed.inner.control.lock();
        assert_eq!(control.timer.is_some(), feed.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_after_teardown_is_dropped() {
        let gate = Arc::new(Notify::new());
        let release = gate.clone();
        let feed = PollingFeed::new("slow", (), Duration::from_secs(10), 10, move |_: ()| {
            let gate = gate.clone();
            async move {
                gate.notified().await;
                Ok::<_, ApiError>(vec![1u32, 2, 3])
            }
        });

        feed.start();
        sleep(Duration::from_millis(10)).await;
        assert!(feed.snapshot().is_loading());

        feed.stop();
        release.notify_one();
        sleep(Duration::from_secs(1)).await;

        let snapshot = feed.snapshot();
        assert!(snapshot.data.is_empty());
        assert!(snapshot.last_updated.is_none());
        assert_eq!(snapshot.status, FeedStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_resolving_after_teardown_is_dropped() {
        let gate = Arc::new(Notify::new());
        let release = gate.clone();
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let feed = PollingFeed::new("refresh", (), Duration::from_secs(60), 10, move |_: ()| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let gate = gate.clone();
            async move {
                if n > 0 {
                    gate.notified().await;
                    return Ok::<_, ApiError>(vec![9u32, 9]);
                }
                Ok(vec![1u32])
            }
        });

        feed.start();
        sleep(Duration::from_millis(1)).await;
        let pending = feed.refresh().unwrap();
        sleep(Duration::from_millis(1)).await;
        assert!(feed.snapshot().is_loading());

        feed.stop();
        release.notify_one();
        pending.await.unwrap();

        let snapshot = feed.snapshot();
        assert_eq!(snapshot.data, vec![1]);
        assert_eq!(snapshot.status, FeedStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_after_teardown_is_noop() {
        let (feed, calls) = counting_feed(Duration::from_secs(10));
        feed.start();
        sleep(Duration::from_millis(1)).await;
        feed.stop();

        assert!(feed.refresh().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_while_error() {
        let script: Script = Arc::new(Mutex::new(VecDeque::from(vec![
            Ok(vec![1, 2]),
            Err(ApiError::Http {
                status: 502,
                message: "Bad Gateway".to_string(),
            }),
        ])));
        let feed = scripted_feed(Duration::from_secs(60), script);
        feed.start();

        sleep(Duration::from_secs(1)).await;
        assert_eq!(feed.snapshot().data, vec![1, 2]);
        assert!(feed.snapshot().error.is_none());

        sleep(Duration::from_secs(60)).await;
        let snapshot = feed.snapshot();
        assert_eq!(snapshot.data, vec![1, 2]);
        assert_eq!(snapshot.error.as_deref(), Some("Bad Gateway (502)"));
        assert_eq!(snapshot.status, FeedStatus::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_clears_error() {
        let script: Script = Arc::new(Mutex::new(VecDeque::from(vec![
            Err(ApiError::Network("connection refused".to_string())),
            Ok(vec![5]),
        ])));
        let feed = scripted_feed(Duration::from_secs(30), script);
        feed.start();

        sleep(Duration::from_secs(1)).await;
        assert_eq!(feed.snapshot().status, FeedStatus::Error);
        assert!(feed.snapshot().data.is_empty());

        sleep(Duration::from_secs(30)).await;
        let snapshot = feed.snapshot();
        assert_eq!(snapshot.data, vec![5]);
        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.status, FeedStatus::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_keeps_timer_phase() {
        let (feed, calls) = counting_feed(Duration::from_secs(10));
        feed.start();

        sleep(Duration::from_secs(3)).await;
        feed.refresh().unwrap().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Timer still ticks at 10s, not 13s.
        sleep(Duration::from_secs(8)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_capped() {
        let feed = PollingFeed::new("capped", (), Duration::from_secs(10), 2, |_: ()| async {
            Ok::<_, ApiError>(vec![1u32, 2, 3, 4])
        });
        feed.start();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(feed.snapshot().data, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_older_result_does_not_overwrite_newer() {
        let slow_gate = Arc::new(Notify::new());
        let gate = slow_gate.clone();
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let feed = PollingFeed::new("race", (), Duration::from_secs(60), 10, move |_: ()| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let gate = gate.clone();
            async move {
                if n == 0 {
                    gate.notified().await;
                    Ok::<_, ApiError>(vec![0u32])
                } else {
                    Ok(vec![n as u32])
                }
            }
        });

        feed.start();
        sleep(Duration::from_millis(1)).await;
        feed.refresh().unwrap().await.unwrap();
        assert_eq!(feed.snapshot().data, vec![1]);
        assert!(feed.snapshot().is_loading());

        slow_gate.notify_one();
        sleep(Duration::from_millis(1)).await;
        let snapshot = feed.snapshot();
        assert_eq!(snapshot.data, vec![1]);
        assert_eq!(snapshot.status, FeedStatus::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_last_handle_cancels_timer() {
        let (feed, calls) = counting_feed(Duration::from_secs(10));
        feed.start();
        sleep(Duration::from_millis(1)).await;
        drop(feed);

        sleep(Duration::from_secs(40)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_updates() {
        let (feed, _) = counting_feed(Duration::from_secs(10));
        let mut rx = feed.subscribe();
        feed.start();

        rx.changed().await.unwrap();
        loop {
            if rx.borrow_and_update().status == FeedStatus::Ready {
                break;
            }
            rx.changed().await.unwrap();
        }
        assert_eq!(rx.borrow().data, vec![0]);
    }
}

//! Idle tracking core.
//!
//! Counts seconds since the last user activity and publishes each new count
//! on a hot broadcast stream.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use tracing::trace;

/// Fixed tick period: one published value per second of inactivity.
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Broadcast buffer size. A subscriber that falls further behind than this
/// observes a lag error and skips ahead; nothing is ever replayed.
const CHANNEL_CAPACITY: usize = 64;

/// Tracks elapsed seconds since the last user activity.
///
/// The daemon shares a single instance; tests construct their own. Counter
/// values are published on a hot stream, so subscribers only see values
/// published after they subscribed.
pub struct IdleTracker {
    shared: Arc<Shared>,
}

struct Shared {
    /// Counter and ticker handle behind one lock. The ticker publishes
    /// under this lock, so a ticker cancelled by `reset` can never publish
    /// after the `0` the reset sends while holding it.
    state: Mutex<State>,

    /// Publish side of the counter stream.
    tx: broadcast::Sender<u64>,
}

struct State {
    elapsed: u64,
    ticker: Option<JoinHandle<()>>,
}

impl IdleTracker {
    /// Create a tracker with the counter at zero and no ticker running.
    ///
    /// The channel exists from this point on, so the first reset always has
    /// a wired publish target regardless of when listeners attach.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    elapsed: 0,
                    ticker: None,
                }),
                tx,
            }),
        }
    }

    /// Subscribe to published counter values.
    ///
    /// Dropping the receiver unsubscribes; the ticker and other subscribers
    /// are unaffected.
    pub fn subscribe(&self) -> broadcast::Receiver<u64> {
        self.shared.tx.subscribe()
    }

    /// Seconds since the last reset.
    #[allow(dead_code)]
    pub async fn elapsed(&self) -> u64 {
        self.shared.state.lock().await.elapsed
    }

    /// Zero the counter, publish the zero, and restart the ticker.
    ///
    /// Safe to call repeatedly: each call cancels any pending tick before
    /// scheduling a fresh one, so at most one ticker is ever live and a
    /// tick from before the reset is never observed after its `0`.
    pub async fn reset(&self) {
        let mut state = self.shared.state.lock().await;
        state.elapsed = 0;

        // No subscribers yet just means the value goes unobserved.
        let _ = self.shared.tx.send(0);

        if let Some(ticker) = state.ticker.take() {
            ticker.abort();
        }
        state.ticker = Some(tokio::spawn(run_ticker(Arc::clone(&self.shared))));

        trace!("Idle counter reset");
    }
}

impl Default for IdleTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Increment and publish once per period until the next reset aborts us.
async fn run_ticker(shared: Arc<Shared>) {
    let mut interval = tokio::time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let mut state = shared.state.lock().await;
        state.elapsed += 1;
        debug!("Idle for {}s", state.elapsed);
        let _ = shared.tx.send(state.elapsed);
    }
}

//! Watch loop: reader thread, event channel and dispatch
//!
//! The notification source is read on its own thread so that a stop request
//! never waits on a blocking read. The reader stamps each batch with the
//! time it was read and forwards the events over a bounded channel; the
//! calling thread debounces and dispatches them in order.

use crate::debounce::DEBOUNCE_WINDOW;
use crate::dispatch::Dispatcher;
use crate::handler::HandlerMap;
use crate::{RawEvent, Result, WatchError};
use crossbeam_channel::{bounded, select, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A notification facility that yields decoded events
///
/// Implementations wait at most `timeout` and return `Ok(None)` when
/// nothing arrived. Dropping the source releases the facility.
pub trait EventSource: Send + 'static {
    fn next_batch(&mut self, timeout: Duration) -> Result<Option<Vec<RawEvent>>>;
}

/// An event together with the instant it was read
#[derive(Debug, Clone)]
pub struct Observed {
    pub event: RawEvent,
    pub at: Instant,
}

/// Tuning for the watch loop
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Longest wait before the stop flag is checked again
    pub poll_interval: Duration,
    /// Events buffered between reader and dispatcher
    pub channel_capacity: usize,
    /// Debounce entries idle this long are dropped
    pub evict_after: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            channel_capacity: 1024,
            evict_after: DEBOUNCE_WINDOW * 10,
        }
    }
}

/// Cloneable request to stop a running [`Watcher`]
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the watch loop to finish
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Event engine: owns a source and dispatches what it reports
pub struct Watcher<S: EventSource> {
    source: S,
    dispatcher: Dispatcher,
    config: WatchConfig,
    stop: StopHandle,
}

#[cfg(target_os = "linux")]
impl Watcher<crate::registry::WatchRegistry> {
    /// Open an inotify-backed watcher with no directories registered yet
    pub fn new(handlers: HandlerMap, config: WatchConfig) -> Result<Self> {
        let registry = crate::registry::WatchRegistry::open()?;
        Ok(Self::with_source(registry, handlers, config))
    }

    /// Register a directory for modify, create and delete events
    pub fn watch_directory(
        &mut self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<crate::WatchHandle> {
        self.source.watch_directory(path)
    }
}

impl<S: EventSource> Watcher<S> {
    pub fn with_source(source: S, handlers: HandlerMap, config: WatchConfig) -> Self {
        Self {
            source,
            dispatcher: Dispatcher::new(handlers),
            config,
            stop: StopHandle::new(),
        }
    }

    /// Handle that stops [`Watcher::run`] from another thread or a signal handler
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run until stopped or until the source fails
    ///
    /// Returns `Ok(())` after a stop request. The source is released before
    /// this returns, on every path.
    pub fn run(self) -> Result<()> {
        let Watcher {
            source,
            mut dispatcher,
            config,
            stop,
        } = self;

        let (tx, rx) = bounded(config.channel_capacity.max(1));
        let reader_stop = stop.clone();
        let poll_interval = config.poll_interval;
        let reader = thread::Builder::new()
            .name("watch-reader".into())
            .spawn(move || read_loop(source, tx, reader_stop, poll_interval))
            .map_err(|source| WatchError::SpawnFailed { source })?;

        // Stops the reader even if a handler panics out of the loop.
        let guard = StopOnDrop(&stop);
        info!("Watch loop started");
        let dispatched = dispatch_loop(&mut dispatcher, &rx, &stop, &config);

        // Unblock the reader whether we stopped or it hung up.
        drop(guard);
        drop(rx);

        let outcome = match reader.join() {
            Ok(outcome) => outcome,
            Err(_) => Err(WatchError::ReaderPanicked),
        };
        info!("Watch loop finished after {} dispatches", dispatched);
        outcome
    }
}

struct StopOnDrop<'a>(&'a StopHandle);

impl Drop for StopOnDrop<'_> {
    fn drop(&mut self) {
        self.0.stop();
    }
}

fn read_loop<S: EventSource>(
    mut source: S,
    tx: Sender<Observed>,
    stop: StopHandle,
    poll_interval: Duration,
) -> Result<()> {
    while !stop.is_stopped() {
        let Some(batch) = source.next_batch(poll_interval)? else {
            continue;
        };
        let at = Instant::now();
        for event in batch {
            if tx.send(Observed { event, at }).is_err() {
                debug!("Dispatcher gone, reader exiting");
                return Ok(());
            }
        }
    }
    Ok(())
}

fn dispatch_loop(
    dispatcher: &mut Dispatcher,
    rx: &Receiver<Observed>,
    stop: &StopHandle,
    config: &WatchConfig,
) -> usize {
    let mut dispatched = 0;
    let mut last_sweep = Instant::now();
    while !stop.is_stopped() {
        select! {
            recv(rx) -> msg => match msg {
                Ok(Observed { event, at }) => {
                    dispatched += dispatcher.process(&event, at);
                }
                Err(_) => {
                    if !stop.is_stopped() {
                        warn!("Event reader stopped");
                    }
                    break;
                }
            },
            default(config.poll_interval) => {}
        }

        // Sweep on a timer so steady traffic cannot keep the table growing.
        let now = Instant::now();
        if now.duration_since(last_sweep) >= config.evict_after {
            dispatcher.evict_stale(now, config.evict_after);
            last_sweep = now;
        }
    }
    dispatched
}

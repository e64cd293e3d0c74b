//! Single-worker background batch processor.
//!
//! This is the concurrency core of the crate. A [`BackgroundProcessor`] owns
//! exactly one worker thread that drains a FIFO queue of batches, so that
//! producers (the capture loop, the GUI) hand off slow work (cloud uploads)
//! without ever waiting on it themselves.
//!
//! # Architecture
//!
//! ```text
//! Capture loop ──kick_off()──▶ channel (FIFO) ──recv()──▶ worker thread
//!                                                             │
//!                                                     BatchWorker::process()
//! ```
//!
//! The channel plays the role of a mutex/condvar pair: `send` is the
//! lock-append-notify step and the blocking `recv` is the idle wait, so the
//! worker consumes no CPU while the queue is empty. Shutdown is a dedicated
//! [`Job::Shutdown`] variant pushed through the same queue, which means every
//! batch accepted before `cleanup()` is still processed before the worker
//! exits.
//!
//! # Failure semantics
//!
//! Batch failures are isolated: an `Err` from [`BatchWorker::process`] is
//! logged and the worker moves on to the next batch. A panic inside `process`
//! still tears the worker down; [`BackgroundProcessor::is_alive`] and the
//! boolean return of [`BackgroundProcessor::kick_off`] surface that to
//! producers instead of silently accumulating work that will never drain.
//!
//! # Example
//!
//! ```no_run
//! use photobooth_upload::processor::{BackgroundProcessor, BatchWorker, ParamStore};
//! use photobooth_upload::error::UploadResult;
//!
//! struct Printer;
//!
//! impl BatchWorker for Printer {
//!     type Item = String;
//!
//!     fn process(&self, _params: &ParamStore, batch: Vec<String>) -> UploadResult<()> {
//!         for item in batch {
//!             println!("{item}");
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> UploadResult<()> {
//! let processor = BackgroundProcessor::new("printer", Printer)?;
//! processor.kick_off(vec!["a.jpg".into(), "b.jpg".into()]);
//! processor.cleanup();
//! processor.join();
//! # Ok(())
//! # }
//! ```

use crate::error::{UploadError, UploadResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Per-batch work hooks supplied by a concrete uploader.
///
/// The same value is shared between the caller side and the worker thread
/// (via `Arc`), so implementations must be `Sync`. `pre_work` runs
/// synchronously on the caller's thread before the batch is enqueued;
/// `process` runs on the worker thread, one batch at a time, never
/// concurrently with itself.
pub trait BatchWorker: Send + Sync + 'static {
    /// One payload element of a batch (a file path, for the uploaders here).
    type Item: Send + 'static;

    /// Validate or prepare for a batch before it is committed to the queue.
    ///
    /// Returning `false` rejects the batch: it is never enqueued and
    /// [`BackgroundProcessor::kick_off`] reports `false` to the caller.
    fn pre_work(&self, _params: &ParamStore, _batch: &[Self::Item]) -> bool {
        true
    }

    /// Perform the actual work for one dequeued batch.
    ///
    /// Errors are logged by the processor and do not stop the worker; the
    /// next queued batch is processed normally.
    fn process(&self, params: &ParamStore, batch: Vec<Self::Item>) -> UploadResult<()>;
}

/// Keyed auxiliary configuration passed into [`BatchWorker`] hooks.
///
/// Plain string map, last write wins. Not used on the hot path; producers may
/// update it between batches to steer worker behavior (e.g. switching the
/// destination folder).
#[derive(Debug, Default)]
pub struct ParamStore {
    values: Mutex<HashMap<String, String>>,
}

impl ParamStore {
    /// Set a parameter, replacing any previous value.
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        self.lock_values().insert(name.into(), value.into());
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<String> {
        self.lock_values().get(name).cloned()
    }

    fn lock_values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned lock only means a panic elsewhere; the map itself is
        // still usable.
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Queue element: either a payload batch or the shutdown marker.
///
/// Termination is a dedicated variant rather than a reserved payload value,
/// so it can never collide with real data.
enum Job<T> {
    Batch(Vec<T>),
    Shutdown,
}

/// A long-lived single-worker task queue.
///
/// One instance per concrete uploader; the worker thread starts in
/// [`BackgroundProcessor::new`] and runs until [`cleanup`] is observed.
/// Intended to be owned by a long-lived registry (see
/// [`crate::uploaders::dispatcher::UploadDispatcher`]) rather than hidden in
/// global state.
///
/// [`cleanup`]: BackgroundProcessor::cleanup
pub struct BackgroundProcessor<W: BatchWorker> {
    worker: Arc<W>,
    params: Arc<ParamStore>,
    tx: Sender<Job<W::Item>>,
    accepting: AtomicBool,
    alive: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl<W: BatchWorker> BackgroundProcessor<W> {
    /// Create the processor and start its worker thread immediately.
    ///
    /// `name` labels the worker thread (`uploader-<name>`) for logs and
    /// debuggers.
    pub fn new(name: &str, worker: W) -> UploadResult<Self> {
        let worker = Arc::new(worker);
        let params = Arc::new(ParamStore::default());
        let alive = Arc::new(AtomicBool::new(true));
        let (tx, rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name(format!("uploader-{name}"))
            .spawn({
                let worker = Arc::clone(&worker);
                let params = Arc::clone(&params);
                let alive = Arc::clone(&alive);
                move || run_worker(worker.as_ref(), &params, &rx, alive)
            })
            .map_err(UploadError::Io)?;

        Ok(Self {
            worker,
            params,
            tx,
            accepting: AtomicBool::new(true),
            alive,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Submit a batch for background processing.
    ///
    /// Runs [`BatchWorker::pre_work`] on the calling thread first; if it
    /// accepts, the batch is enqueued and the worker is woken. Returns `false`
    /// when the batch was not accepted: `pre_work` rejected it, `cleanup` has
    /// already been requested, or the worker is no longer running.
    ///
    /// Batches from a single producer are processed in submission order.
    /// Across racing producers the order is whatever order the sends land in
    /// the channel; no stronger guarantee is made.
    pub fn kick_off(&self, batch: Vec<W::Item>) -> bool {
        if !self.accepting.load(Ordering::Acquire) {
            tracing::warn!("batch rejected: shutdown already requested");
            return false;
        }
        if !self.alive.load(Ordering::Acquire) {
            tracing::warn!("batch rejected: worker is no longer running");
            return false;
        }
        if !self.worker.pre_work(&self.params, &batch) {
            tracing::info!("batch rejected by pre_work");
            return false;
        }
        if self.tx.send(Job::Batch(batch)).is_err() {
            // Worker exited between the alive check and the send.
            tracing::warn!("batch dropped: worker exited before enqueue");
            return false;
        }
        true
    }

    /// Request graceful shutdown.
    ///
    /// Stops accepting new batches and pushes the shutdown marker through the
    /// queue, bypassing `pre_work`. Every batch accepted beforehand is still
    /// processed. Idempotent: later calls are no-ops. Does **not** wait for
    /// the worker to exit; use [`join`] when synchronous shutdown is needed.
    ///
    /// [`join`]: BackgroundProcessor::join
    pub fn cleanup(&self) {
        if self.accepting.swap(false, Ordering::AcqRel) {
            tracing::info!("shutdown requested");
            // Send can only fail if the worker already exited, which is fine.
            let _ = self.tx.send(Job::Shutdown);
        }
    }

    /// Block until the worker thread has exited.
    ///
    /// Call after [`cleanup`], or the wait never ends. Safe to call more than
    /// once; later calls return immediately.
    ///
    /// [`cleanup`]: BackgroundProcessor::cleanup
    pub fn join(&self) {
        let handle = self.lock_handle().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("worker thread panicked");
            }
        }
    }

    /// Whether the worker thread is still draining the queue.
    ///
    /// Turns `false` once the worker has exited, either after processing the
    /// shutdown marker or because a batch panicked.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Set an auxiliary parameter visible to the worker hooks.
    pub fn add_param(&self, name: impl Into<String>, value: impl Into<String>) {
        self.params.set(name, value);
    }

    /// Read back an auxiliary parameter.
    pub fn get_param(&self, name: &str) -> Option<String> {
        self.params.get(name)
    }

    /// Shared parameter store handed to the worker hooks.
    pub fn params(&self) -> &ParamStore {
        &self.params
    }

    fn lock_handle(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.handle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Worker loop: block on the queue, run batches in order, exit on shutdown.
fn run_worker<W: BatchWorker>(
    worker: &W,
    params: &ParamStore,
    rx: &Receiver<Job<W::Item>>,
    alive: Arc<AtomicBool>,
) {
    // Flips the alive flag on every exit path, including panics in process().
    let _guard = AliveGuard(alive);

    while let Ok(job) = rx.recv() {
        match job {
            Job::Shutdown => {
                tracing::info!("worker received shutdown marker, exiting");
                return;
            }
            Job::Batch(batch) => {
                tracing::debug!(items = batch.len(), "processing batch");
                if let Err(err) = worker.process(params, batch) {
                    tracing::error!(error = %err, "batch failed; continuing with next batch");
                }
            }
        }
    }
    // All senders dropped without a shutdown marker: the owning processor is
    // gone, nothing more can arrive.
    tracing::debug!("queue closed, worker exiting");
}

struct AliveGuard(Arc<AtomicBool>);

impl Drop for AliveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

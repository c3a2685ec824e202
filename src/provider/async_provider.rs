//! Asynchronous tile reads over a worker thread pool.
//!
//! [`AsyncTileDataProvider`] decouples the blocking
//! [`TileDataset::read_tile_data`] call from the render thread:
//! requests go down an mpsc work channel to a pool of worker threads,
//! completed [`TileIoResult`]s come back up a completion channel, and
//! the render thread drains them with a non-blocking [`poll`].
//!
//! ```text
//!  render thread                     worker threads
//!  ─────────────                     ──────────────
//!  enqueue(index) ──work channel──▶  read_tile_data (blocking)
//!  poll()         ◀─completions───  TileIoResult
//! ```
//!
//! Request ordering across different indices is NOT guaranteed; the
//! cache layer only cares about final state. Duplicate suppression is
//! provided at two levels: the in-flight index here coalesces
//! concurrent enqueues, and the caching provider's pending set covers
//! the window between worker completion and drain.
//!
//! [`TileDataset::read_tile_data`]: crate::dataset::TileDataset::read_tile_data
//! [`poll`]: AsyncTileDataProvider::poll

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use dashmap::DashMap;

use super::types::ProviderError;
use crate::dataset::{ReadSeverity, TileDataset, TileIoResult};
use crate::geodetic::ChunkIndex;

/// Worker pool turning blocking tile reads into pollable completions.
pub struct AsyncTileDataProvider {
    work_tx: Option<Sender<ChunkIndex>>,
    completion_rx: Receiver<TileIoResult>,
    /// Indices currently being read, with enqueue time. Written by
    /// both the render thread (insert) and workers (remove).
    in_flight: Arc<DashMap<ChunkIndex, Instant>>,
    max_in_flight: usize,
    workers: Vec<JoinHandle<()>>,
}

impl AsyncTileDataProvider {
    /// Spawn a pool of `threads` workers reading from `dataset`.
    ///
    /// The dataset handle is shared read-only across workers. If the
    /// underlying source does not support concurrent reads on one
    /// handle, reads are serialized behind a pool-wide lock;
    /// parallelism then comes from other layers' pools instead.
    pub fn new(dataset: Arc<TileDataset>, threads: usize, max_in_flight: usize) -> Self {
        let threads = threads.max(1);
        let (work_tx, work_rx) = mpsc::channel::<ChunkIndex>();
        let (completion_tx, completion_rx) = mpsc::channel::<TileIoResult>();
        let work_rx = Arc::new(Mutex::new(work_rx));
        let in_flight: Arc<DashMap<ChunkIndex, Instant>> = Arc::new(DashMap::new());

        let read_lock = if dataset.concurrent_reads() {
            None
        } else {
            tracing::info!("raster source requires serialized reads");
            Some(Arc::new(Mutex::new(())))
        };

        tracing::debug!(threads, max_in_flight, "starting tile worker pool");

        let mut workers = Vec::with_capacity(threads);
        for worker_id in 0..threads {
            let work_rx = Arc::clone(&work_rx);
            let completion_tx = completion_tx.clone();
            let dataset = Arc::clone(&dataset);
            let in_flight = Arc::clone(&in_flight);
            let read_lock = read_lock.clone();

            workers.push(
                thread::Builder::new()
                    .name(format!("tile-worker-{worker_id}"))
                    .spawn(move || {
                        loop {
                            // Hold the receiver lock only while taking
                            // an index, never during the read.
                            let index = match work_rx.lock() {
                                Ok(rx) => match rx.recv() {
                                    Ok(index) => index,
                                    Err(_) => break,
                                },
                                Err(_) => break,
                            };

                            let result = {
                                let _serial = read_lock.as_ref().map(|l| l.lock());
                                catch_unwind(AssertUnwindSafe(|| dataset.read_tile_data(index)))
                                    .unwrap_or_else(|_| {
                                        tracing::error!(
                                            index = %index,
                                            "tile decode panicked, reporting fatal read"
                                        );
                                        TileIoResult::failed(index, ReadSeverity::Fatal)
                                    })
                            };

                            in_flight.remove(&index);
                            if completion_tx.send(result).is_err() {
                                break;
                            }
                        }
                        tracing::trace!(worker_id, "tile worker exiting");
                    })
                    .expect("failed to spawn tile worker"),
            );
        }

        Self {
            work_tx: Some(work_tx),
            completion_rx,
            in_flight,
            max_in_flight: max_in_flight.max(1),
            workers,
        }
    }

    /// Submit a read for a chunk. Non-blocking.
    ///
    /// Returns `Ok(true)` if the read was enqueued, `Ok(false)` if a
    /// read for the same index is already in flight (coalesced).
    ///
    /// # Errors
    ///
    /// [`ProviderError::QueueFull`] once the in-flight cap is
    /// reached; the caller retries on a later frame. The cap keeps
    /// the task backlog bounded no matter how fast the traversal
    /// requests tiles.
    pub fn enqueue(&self, index: ChunkIndex) -> Result<bool, ProviderError> {
        if self.in_flight.contains_key(&index) {
            return Ok(false);
        }
        if self.in_flight.len() >= self.max_in_flight {
            return Err(ProviderError::QueueFull);
        }

        let work_tx = self.work_tx.as_ref().ok_or(ProviderError::PoolShutDown)?;
        self.in_flight.insert(index, Instant::now());
        if work_tx.send(index).is_err() {
            self.in_flight.remove(&index);
            return Err(ProviderError::PoolShutDown);
        }
        Ok(true)
    }

    /// Drain all completions that arrived since the last poll.
    /// Never blocks on incomplete reads.
    pub fn poll(&self) -> Vec<TileIoResult> {
        self.completion_rx.try_iter().collect()
    }

    /// Number of reads currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// The configured in-flight cap.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }
}

impl Drop for AsyncTileDataProvider {
    fn drop(&mut self) {
        // Closing the work channel lets blocked workers observe the
        // disconnect and exit.
        self.work_tx = None;
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

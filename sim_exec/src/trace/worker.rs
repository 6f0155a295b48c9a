//! Background worker for trace extraction
//!
//! Extraction cost scales with the raster area, so running it inside the
//! cyclic executive would stall the 30 Hz cycle for large images. The
//! [`TraceMgr`] owns a worker thread which performs extractions and delivers
//! their results back to the main thread, which polls for them once per
//! cycle without blocking.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::{channel, Receiver, Sender},
    Arc,
};
use std::thread::{self, JoinHandle};

use image::GrayImage;
use log::{debug, warn};

use super::{extract_with_cancel, Params, TraceError};
use crate::path::Path;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Manages the trace extraction worker thread.
pub struct TraceMgr {
    signal_sender: Sender<TraceSignal>,

    result_receiver: Receiver<TraceResult>,

    /// Cancel token of the most recent extraction request.
    ///
    /// Each request carries its own token, so cancelling one request can
    /// never affect a later one.
    current_cancel: Option<Arc<AtomicBool>>,

    /// Number of extraction requests sent but not yet answered.
    pending: usize,

    handle: Option<JoinHandle<()>>,
}

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

/// Signals sent from the main thread to the worker.
#[derive(Debug)]
enum TraceSignal {
    /// Extract a path from the given raster, polling the given cancel token.
    Extract(Box<GrayImage>, Arc<AtomicBool>),

    /// The worker should stop its operations.
    Stop,
}

/// The outcome of one extraction request.
#[derive(Debug)]
pub enum TraceResult {
    /// The extraction ran to completion. The contained path is empty if the
    /// raster held no usable curve.
    Complete(Path),

    /// The extraction was cancelled before completing.
    Cancelled,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl TraceMgr {
    /// Spawn the worker thread.
    pub fn new(params: Params) -> Self {
        let (signal_sender, signal_receiver) = channel();
        let (result_sender, result_receiver) = channel();

        let handle = thread::spawn(move || worker_thread(params, result_sender, signal_receiver));

        Self {
            signal_sender,
            result_receiver,
            current_cancel: None,
            pending: 0,
            handle: Some(handle),
        }
    }

    /// Request extraction of the given raster.
    ///
    /// Any extraction already in flight is cancelled, the new raster
    /// supersedes it.
    pub fn request_extract(&mut self, raster: GrayImage) {
        self.cancel();

        let cancel = Arc::new(AtomicBool::new(false));

        match self
            .signal_sender
            .send(TraceSignal::Extract(Box::new(raster), cancel.clone()))
        {
            Ok(_) => {
                self.current_cancel = Some(cancel);
                self.pending += 1;
            }
            Err(_) => warn!("Trace worker is not running, extraction request dropped"),
        }
    }

    /// Cancel the most recently requested extraction, if it hasn't completed.
    pub fn cancel(&self) {
        if let Some(ref cancel) = self.current_cancel {
            cancel.store(true, Ordering::Relaxed);
        }
    }

    /// Poll for a completed extraction without blocking.
    pub fn poll(&mut self) -> Option<TraceResult> {
        match self.result_receiver.try_recv() {
            Ok(result) => {
                self.pending = self.pending.saturating_sub(1);
                Some(result)
            }
            Err(_) => None,
        }
    }

    /// Returns true if an extraction request is still being processed.
    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }

    /// Stop the worker thread, waiting for it to exit.
    pub fn stop(mut self) {
        self.cancel();

        if self.signal_sender.send(TraceSignal::Stop).is_err() {
            warn!("Trace worker already stopped");
        }

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Trace worker thread panicked");
            }
        }
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

fn worker_thread(
    params: Params,
    result_sender: Sender<TraceResult>,
    signal_receiver: Receiver<TraceSignal>,
) {
    // Wait for signals from the main thread
    while let Ok(signal) = signal_receiver.recv() {
        match signal {
            TraceSignal::Stop => break,
            TraceSignal::Extract(raster, cancel) => {
                debug!(
                    "Trace extraction started on a {}x{} raster",
                    raster.width(),
                    raster.height()
                );

                let result = match extract_with_cancel(&raster, &params, &cancel) {
                    Ok(path) => TraceResult::Complete(path),
                    Err(TraceError::Cancelled) => TraceResult::Cancelled,
                };

                // If the main thread is gone there's nobody to report to
                if result_sender.send(result).is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use image::Luma;
    use std::time::{Duration, Instant};

    /// A white raster with a dark horizontal stroke through the middle.
    fn stroke_raster(width: u32, height: u32) -> GrayImage {
        let mut raster = GrayImage::from_pixel(width, height, Luma([255]));

        let mid = height / 2;
        for y in (mid - 2)..=(mid + 2) {
            for x in 5..(width - 5) {
                raster.put_pixel(x, y, Luma([0]));
            }
        }

        raster
    }

    /// Poll the manager until a result arrives, failing after a timeout.
    fn poll_blocking(mgr: &mut TraceMgr) -> TraceResult {
        let deadline = Instant::now() + Duration::from_secs(10);

        loop {
            if let Some(result) = mgr.poll() {
                return result;
            }
            if Instant::now() > deadline {
                panic!("Timed out waiting for the trace worker");
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_background_extraction() {
        let mut mgr = TraceMgr::new(Params::default());

        mgr.request_extract(stroke_raster(60, 60));
        assert!(mgr.is_busy());

        match poll_blocking(&mut mgr) {
            TraceResult::Complete(path) => assert!(path.num_points() >= 2),
            other => panic!("Expected a completed extraction, got {:?}", other),
        }

        assert!(!mgr.is_busy());

        mgr.stop();
    }

    #[test]
    fn test_empty_raster_completes_with_empty_path() {
        let raster = GrayImage::from_pixel(40, 40, Luma([255]));

        let mut mgr = TraceMgr::new(Params::default());
        mgr.request_extract(raster);

        match poll_blocking(&mut mgr) {
            TraceResult::Complete(path) => assert!(path.is_empty()),
            other => panic!("Expected a completed extraction, got {:?}", other),
        }

        mgr.stop();
    }

    #[test]
    fn test_cancel_in_flight_extraction() {
        let mut mgr = TraceMgr::new(Params::default());

        // Large enough that the extraction cannot finish before the cancel
        // token is set
        mgr.request_extract(stroke_raster(1600, 1200));
        mgr.cancel();

        assert!(matches!(poll_blocking(&mut mgr), TraceResult::Cancelled));

        // The manager is free for new requests afterwards
        mgr.request_extract(stroke_raster(60, 60));
        match poll_blocking(&mut mgr) {
            TraceResult::Complete(path) => assert!(path.num_points() >= 2),
            other => panic!("Expected a completed extraction, got {:?}", other),
        }

        mgr.stop();
    }
}

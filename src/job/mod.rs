//! OCR Job Controller
//!
//! Runs at most one cancellable recognition job at a time on a background
//! thread, publishes status and result values, and decides who performs the
//! one-shot release of the engine when disposal races with an active job.
//!
//! The teardown-safety section is a single [`parking_lot::Mutex`] guarding the
//! job/dispose/release flags. Every call that touches the engine outside the
//! worker's recognition path (init, stop forwarding, release) runs inside it.

pub mod error;
pub mod observable;
pub mod status;

use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, info_span, warn};

use crate::engine::{EngineMode, OcrEngine, OcrImage, ProgressMonitor, ProgressValues};

pub use error::JobError;
pub use observable::Observable;
pub use status::OcrStatus;

/// Identifier of an accepted job
pub type JobId = u64;

/// Flags guarded by the teardown-safety section
#[derive(Debug, Default)]
struct Teardown {
    /// A worker is between acceptance and the end of its teardown section
    job_active: bool,
    /// Dispose arrived while a job was active; the worker owns the release
    dispose_requested: bool,
    /// The engine has been released
    released: bool,
}

/// State shared between the controller and its worker thread
struct Shared<E: OcrEngine> {
    engine: E,
    teardown: Mutex<Teardown>,
    initialized: AtomicBool,
    cancel_requested: AtomicBool,
    next_job_id: AtomicU64,
    status: Observable<OcrStatus>,
    result: Observable<String>,
    processing: Observable<bool>,
}

/// Controller for a single OCR engine.
///
/// Dropping the controller disposes it. An active job keeps running until it
/// unwinds and then releases the engine itself.
pub struct JobController<E: OcrEngine> {
    shared: Arc<Shared<E>>,
}

impl<E: OcrEngine> JobController<E> {
    /// Bind a controller to `engine` and publish its version information
    pub fn new(engine: E) -> Self {
        let shared = Arc::new(Shared {
            engine,
            teardown: Mutex::new(Teardown::default()),
            initialized: AtomicBool::new(false),
            cancel_requested: AtomicBool::new(false),
            next_job_id: AtomicU64::new(1),
            status: Observable::new(OcrStatus::Loading),
            result: Observable::new(String::new()),
            processing: Observable::new(false),
        });

        shared.status.publish(OcrStatus::StartUp {
            version: shared.engine.version(),
            flavor: shared.engine.library_flavor(),
        });

        Self { shared }
    }

    /// Initialize the engine with language data.
    ///
    /// A failure leaves the controller uninitialized for good; there is no
    /// automatic retry. Initializing twice is a no-op.
    pub fn initialize(
        &self,
        data_path: &Path,
        language: &str,
        mode: EngineMode,
    ) -> Result<(), JobError> {
        info!(
            data_path = %data_path.display(),
            language,
            engine_mode = mode.as_raw(),
            "Initializing OCR engine"
        );

        let teardown = self.shared.teardown.lock();
        if teardown.released || teardown.dispose_requested {
            warn!("initialize: controller has been disposed");
            return Err(JobError::Disposed);
        }
        if self.shared.initialized.load(Ordering::SeqCst) {
            debug!("initialize: engine already initialized");
            return Ok(());
        }

        match self.shared.engine.init(data_path, language, mode) {
            Ok(()) => {
                self.shared.initialized.store(true, Ordering::SeqCst);
                info!("OCR engine initialized");
                Ok(())
            }
            Err(e) => {
                error!("Cannot initialize OCR engine: {}", e);
                Err(JobError::InitializationFailure(e))
            }
        }
    }

    /// Start recognizing `image` on a background thread.
    ///
    /// Rejections (`NotReady`, `AlreadyRunning`, `Disposed`) are logged and
    /// change no state. If the worker thread cannot be spawned the job is
    /// rolled back to `Stopped` and `SpawnFailed` is returned.
    pub fn start(&self, image: OcrImage) -> Result<JobId, JobError> {
        let shared = &self.shared;

        let job_id = {
            let mut teardown = shared.teardown.lock();
            if teardown.released || teardown.dispose_requested {
                warn!("start: controller has been disposed");
                return Err(JobError::Disposed);
            }
            if !shared.initialized.load(Ordering::SeqCst) {
                warn!("start: OCR engine is not initialized");
                return Err(JobError::NotReady);
            }
            if teardown.job_active {
                warn!("start: processing is in progress");
                return Err(JobError::AlreadyRunning);
            }

            teardown.job_active = true;
            shared.cancel_requested.store(false, Ordering::SeqCst);
            shared.result.publish(String::new());
            shared.processing.publish(true);
            shared.status.publish(OcrStatus::Processing);
            shared.next_job_id.fetch_add(1, Ordering::SeqCst)
        };

        let worker = Arc::clone(shared);
        let spawned = std::thread::Builder::new()
            .name(format!("ocr-job-{}", job_id))
            .spawn(move || run_job(worker, job_id, image));

        if let Err(e) = spawned {
            error!(job_id, "Failed to spawn OCR worker: {}", e);
            shared.abort_job(job_id);
            return Err(JobError::SpawnFailed(e));
        }

        Ok(job_id)
    }

    /// Request cancellation of the active job.
    ///
    /// Returns immediately; the job's `Stopped` publication is what confirms
    /// it has unwound. Repeated calls while stopping do nothing.
    pub fn stop(&self) {
        let teardown = self.shared.teardown.lock();
        if !teardown.job_active || teardown.released {
            return;
        }
        if self.shared.cancel_requested.swap(true, Ordering::SeqCst) {
            debug!("stop: cancellation already requested");
            return;
        }

        self.shared.status.publish(OcrStatus::Stopping);
        self.shared.engine.request_stop();
        info!("Stop requested");
    }

    /// Dispose the controller and release the engine.
    ///
    /// With no active job the engine is released here. Otherwise the job is
    /// asked to stop and its worker releases the engine once it has finished
    /// with it. Safe to call from any thread, any number of times.
    pub fn dispose(&self) {
        let mut teardown = self.shared.teardown.lock();
        if teardown.released || teardown.dispose_requested {
            debug!("dispose: already disposed");
            return;
        }

        if teardown.job_active {
            teardown.dispose_requested = true;
            self.shared.cancel_requested.store(true, Ordering::SeqCst);
            self.shared.engine.request_stop();
            info!("Dispose requested during an active job; release deferred to worker");
        } else {
            self.shared.engine.release();
            teardown.released = true;
            info!("OCR engine released");
        }
    }

    /// Current status
    pub fn status(&self) -> OcrStatus {
        self.shared.status.get()
    }

    /// Text of the last completed or cancelled job
    pub fn result(&self) -> String {
        self.shared.result.get()
    }

    /// Whether a job is processing
    pub fn is_processing(&self) -> bool {
        self.shared.processing.get()
    }

    /// Whether `start` would currently be accepted: initialized, not
    /// disposed, and no job active
    pub fn is_start_enabled(&self) -> bool {
        let teardown = self.shared.teardown.lock();
        self.is_initialized()
            && !teardown.job_active
            && !teardown.released
            && !teardown.dispose_requested
    }

    /// Whether a stop request is meaningful
    pub fn is_stop_enabled(&self) -> bool {
        self.is_processing()
    }

    /// Whether the engine was initialized successfully
    pub fn is_initialized(&self) -> bool {
        self.shared.initialized.load(Ordering::SeqCst)
    }

    /// Whether dispose has been requested or completed
    pub fn is_disposed(&self) -> bool {
        let teardown = self.shared.teardown.lock();
        teardown.released || teardown.dispose_requested
    }

    /// Subscribe to status publications, starting with the current status
    pub fn subscribe_status(&self) -> Receiver<OcrStatus> {
        self.shared.status.subscribe()
    }

    /// Subscribe to status publications, buffering at most `capacity` of them.
    ///
    /// Suited to consumers that poll occasionally: progress updates arriving
    /// while the buffer is full are skipped, and [`JobController::status`]
    /// still reports the latest value.
    pub fn subscribe_status_bounded(&self, capacity: usize) -> Receiver<OcrStatus> {
        self.shared.status.subscribe_bounded(capacity)
    }

    /// Subscribe to result text publications
    pub fn subscribe_result(&self) -> Receiver<String> {
        self.shared.result.subscribe()
    }

    /// Subscribe to processing flag changes
    pub fn subscribe_processing(&self) -> Receiver<bool> {
        self.shared.processing.subscribe()
    }
}

impl<E: OcrEngine> Drop for JobController<E> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<E: OcrEngine> Shared<E> {
    /// Clear `job_active` and perform a deferred release. Caller holds the lock.
    fn end_job(&self, teardown: &mut Teardown, job_id: JobId) {
        teardown.job_active = false;
        if teardown.dispose_requested && !teardown.released {
            self.engine.release();
            teardown.released = true;
            info!(job_id, "OCR engine released after job completion");
        }
    }

    /// Roll back an accepted job whose worker never ran
    fn abort_job(&self, job_id: JobId) {
        let mut teardown = self.teardown.lock();
        self.end_job(&mut teardown, job_id);

        self.processing.publish(false);
        self.status.publish(OcrStatus::Stopped);
    }

    /// Worker side of the teardown-safety section
    fn complete_job(&self, job_id: JobId, text: String, elapsed: Duration) {
        let mut teardown = self.teardown.lock();
        self.end_job(&mut teardown, job_id);

        let status = if self.cancel_requested.load(Ordering::SeqCst) {
            OcrStatus::Stopped
        } else {
            OcrStatus::Finished(elapsed.as_secs_f32())
        };
        info!(job_id, chars = text.chars().count(), "{}", status);

        self.result.publish(text);
        self.processing.publish(false);
        self.status.publish(status);
    }
}

/// Progress observer handed to the engine for one job
struct JobMonitor<'a, E: OcrEngine> {
    shared: &'a Shared<E>,
}

impl<E: OcrEngine> ProgressMonitor for JobMonitor<'_, E> {
    fn on_progress(&self, progress: ProgressValues) {
        debug!(percent = progress.percent, "Recognition progress");
        self.shared.status.publish(OcrStatus::Progress(progress.percent));
    }

    fn is_cancelled(&self) -> bool {
        self.shared.cancel_requested.load(Ordering::SeqCst)
    }
}

fn run_job<E: OcrEngine>(shared: Arc<Shared<E>>, job_id: JobId, image: OcrImage) {
    let span = info_span!("ocr_job", job_id);
    let _enter = span.enter();

    let (width, height) = image.dimensions();
    info!(width, height, "Recognition started");
    let started = Instant::now();

    // The teardown section must run whatever the engine does
    let text = panic::catch_unwind(AssertUnwindSafe(|| recognize_image(&shared, &image)))
        .unwrap_or_else(|_| {
            error!("OCR engine panicked outside recognition");
            String::new()
        });

    shared.complete_job(job_id, text, started.elapsed());
}

fn recognize_image<E: OcrEngine>(shared: &Shared<E>, image: &OcrImage) -> String {
    shared.engine.set_image(image);

    let monitor = JobMonitor { shared };
    let completed = panic::catch_unwind(AssertUnwindSafe(|| shared.engine.recognize(&monitor)))
        .unwrap_or_else(|_| {
            error!("OCR engine panicked during recognition");
            false
        });
    debug!(completed, "Recognition returned");

    // Completed or interrupted, the engine holds whatever text it produced
    let text = shared.engine.utf8_text();
    shared.engine.clear();
    text
}

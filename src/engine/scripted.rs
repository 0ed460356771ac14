//! Scripted OCR engine
//!
//! Recognizes a fixed transcript word by word, reporting progress after each
//! word and honoring stop requests between words. Used by the demo binary and
//! by the controller tests, which rely on its bookkeeping counters.

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use super::{
    validate_init_args, EngineError, EngineMode, OcrEngine, OcrImage, ProgressMonitor,
    ProgressValues,
};

/// Version reported by the scripted engine
pub const SCRIPTED_VERSION: &str = "5.3.4";

/// Flavor reported by the scripted engine
pub const SCRIPTED_FLAVOR: &str = "scripted";

#[derive(Debug, Default)]
struct EngineState {
    data_path: Option<PathBuf>,
    language: Option<String>,
    mode: Option<EngineMode>,
    image: Option<(u32, u32)>,
    text: String,
}

/// Engine that "recognizes" a preconfigured transcript
pub struct ScriptedEngine {
    words: Vec<String>,
    step_delay: Duration,
    state: Mutex<EngineState>,
    stop_requested: AtomicBool,
    released: AtomicBool,
    release_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    use_after_release: AtomicUsize,
    active_recognitions: AtomicUsize,
    max_concurrent_recognitions: AtomicUsize,
    recognitions: AtomicUsize,
}

impl ScriptedEngine {
    /// Create an engine that produces `transcript`, sleeping `step_delay` per word
    pub fn new(transcript: &str, step_delay: Duration) -> Self {
        Self {
            words: transcript.split_whitespace().map(str::to_string).collect(),
            step_delay,
            state: Mutex::new(EngineState::default()),
            stop_requested: AtomicBool::new(false),
            released: AtomicBool::new(false),
            release_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
            use_after_release: AtomicUsize::new(0),
            active_recognitions: AtomicUsize::new(0),
            max_concurrent_recognitions: AtomicUsize::new(0),
            recognitions: AtomicUsize::new(0),
        }
    }

    /// Number of times `release` was called
    pub fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }

    /// Number of times `request_stop` was called
    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    /// Number of calls that touched the engine after `release`
    pub fn use_after_release(&self) -> usize {
        self.use_after_release.load(Ordering::SeqCst)
    }

    /// Highest number of overlapping `recognize` calls observed
    pub fn max_concurrent_recognitions(&self) -> usize {
        self.max_concurrent_recognitions.load(Ordering::SeqCst)
    }

    /// Number of `recognize` calls started
    pub fn recognitions(&self) -> usize {
        self.recognitions.load(Ordering::SeqCst)
    }

    /// Whether resources have been released
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Data path, language and mode passed to the last successful `init`
    pub fn init_args(&self) -> Option<(PathBuf, String, EngineMode)> {
        let state = self.state.lock();
        match (&state.data_path, &state.language, state.mode) {
            (Some(path), Some(language), Some(mode)) => {
                Some((path.clone(), language.clone(), mode))
            }
            _ => None,
        }
    }

    fn check_alive(&self, operation: &str) -> bool {
        if self.released.load(Ordering::SeqCst) {
            self.use_after_release.fetch_add(1, Ordering::SeqCst);
            warn!(operation, "Engine used after release");
            return false;
        }
        true
    }
}

impl OcrEngine for ScriptedEngine {
    fn init(&self, data_path: &Path, language: &str, mode: EngineMode) -> Result<(), EngineError> {
        if !self.check_alive("init") {
            return Err(EngineError::Released);
        }
        validate_init_args(data_path, language)?;

        let mut state = self.state.lock();
        state.data_path = Some(data_path.to_path_buf());
        state.language = Some(language.to_string());
        state.mode = Some(mode);
        Ok(())
    }

    fn version(&self) -> String {
        SCRIPTED_VERSION.to_string()
    }

    fn library_flavor(&self) -> String {
        SCRIPTED_FLAVOR.to_string()
    }

    fn set_image(&self, image: &OcrImage) {
        if !self.check_alive("set_image") {
            return;
        }
        self.stop_requested.store(false, Ordering::SeqCst);
        let mut state = self.state.lock();
        state.image = Some(image.dimensions());
        state.text.clear();
    }

    fn recognize(&self, monitor: &dyn ProgressMonitor) -> bool {
        if !self.check_alive("recognize") {
            return false;
        }

        let active = self.active_recognitions.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent_recognitions.fetch_max(active, Ordering::SeqCst);
        self.recognitions.fetch_add(1, Ordering::SeqCst);

        let has_image = self.state.lock().image.is_some();
        let total = self.words.len();
        let mut completed = true;

        if has_image {
            for (index, word) in self.words.iter().enumerate() {
                if self.stop_requested.load(Ordering::SeqCst) || monitor.is_cancelled() {
                    debug!(words_done = index, "Recognition interrupted");
                    completed = false;
                    break;
                }

                std::thread::sleep(self.step_delay);

                {
                    let mut state = self.state.lock();
                    if !state.text.is_empty() {
                        state.text.push(' ');
                    }
                    state.text.push_str(word);
                }

                let percent = ((index + 1) * 100 / total) as u8;
                monitor.on_progress(ProgressValues {
                    percent,
                    word_bounds: Some((index as u32 * 10, 0, word.len() as u32 * 10, 10)),
                });
            }
        }

        self.active_recognitions.fetch_sub(1, Ordering::SeqCst);
        completed
    }

    fn utf8_text(&self) -> String {
        if !self.check_alive("utf8_text") {
            return String::new();
        }
        self.state.lock().text.clone()
    }

    fn clear(&self) {
        if !self.check_alive("clear") {
            return;
        }
        let mut state = self.state.lock();
        state.image = None;
        state.text.clear();
    }

    fn request_stop(&self) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        if !self.check_alive("request_stop") {
            return;
        }
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    fn release(&self) {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        if self.released.swap(true, Ordering::SeqCst) {
            warn!("Engine released twice");
            self.use_after_release.fetch_add(1, Ordering::SeqCst);
            return;
        }
        *self.state.lock() = EngineState::default();
        debug!("Engine resources released");
    }
}

//! OCR Engine Handle
//!
//! The engine is an external, stateful capability that owns native resources.
//! The job controller drives it through the [`OcrEngine`] trait and never
//! assumes anything about how recognition is implemented.

pub mod frame;
pub mod scripted;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub use frame::OcrImage;
pub use scripted::ScriptedEngine;

/// Subdirectory of the data path that holds `*.traineddata` files
pub const TESSDATA_DIR: &str = "tessdata";

/// Extension of language data files
pub const TRAINEDDATA_EXT: &str = "traineddata";

/// Engine mode, matching the numeric OEM constants of the native library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineMode {
    /// Legacy recognizer only
    TesseractOnly,
    /// Neural net (LSTM) recognizer only
    #[default]
    LstmOnly,
    /// Legacy and LSTM recognizers combined
    TesseractLstmCombined,
    /// Whatever is available in the language data
    Default,
}

impl EngineMode {
    /// Numeric value passed to the native library
    pub fn as_raw(&self) -> i32 {
        match self {
            EngineMode::TesseractOnly => 0,
            EngineMode::LstmOnly => 1,
            EngineMode::TesseractLstmCombined => 2,
            EngineMode::Default => 3,
        }
    }
}

/// Progress report delivered from inside [`OcrEngine::recognize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressValues {
    /// Percentage in 0..=100
    pub percent: u8,
    /// Bounds (x, y, width, height) of the word currently being recognized
    pub word_bounds: Option<(u32, u32, u32, u32)>,
}

/// Observer handed to the engine for the duration of one recognition
pub trait ProgressMonitor: Send + Sync {
    /// Called zero or more times while recognition runs
    fn on_progress(&self, progress: ProgressValues);

    /// Polled by the engine between units of work; `true` unwinds recognition
    fn is_cancelled(&self) -> bool;
}

/// Errors raised by engine initialization
#[derive(Debug, Error)]
pub enum EngineError {
    /// Data path or language string rejected outright
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Language data file not present under the data path
    #[error("language data for '{language}' not found at {path:?}")]
    MissingLanguageData { language: String, path: PathBuf },

    /// Operation attempted on an engine whose resources were already released
    #[error("engine resources already released")]
    Released,
}

/// External OCR capability driven by the job controller.
///
/// All methods take `&self`: `request_stop` is called from a foreground
/// thread while `recognize` blocks on the worker thread, so implementations
/// synchronize internally.
pub trait OcrEngine: Send + Sync + 'static {
    /// Load language data. Fails if the data path or language is invalid.
    fn init(&self, data_path: &Path, language: &str, mode: EngineMode) -> Result<(), EngineError>;

    /// Library version string
    fn version(&self) -> String;

    /// Library build flavor (e.g. "standard", "openmp")
    fn library_flavor(&self) -> String;

    /// Hand the next image to the engine
    fn set_image(&self, image: &OcrImage);

    /// Run recognition on the current image.
    ///
    /// Blocks until recognition completes or unwinds after a stop request.
    /// Returns `true` if it ran to completion.
    fn recognize(&self, monitor: &dyn ProgressMonitor) -> bool;

    /// Text produced by the last recognition, possibly partial
    fn utf8_text(&self) -> String;

    /// Drop recognition results and stored image data
    fn clear(&self);

    /// Ask an in-flight recognition to unwind at its next check
    fn request_stop(&self);

    /// Final, one-shot release of engine resources
    fn release(&self);
}

impl<T: OcrEngine + ?Sized> OcrEngine for Arc<T> {
    fn init(&self, data_path: &Path, language: &str, mode: EngineMode) -> Result<(), EngineError> {
        (**self).init(data_path, language, mode)
    }

    fn version(&self) -> String {
        (**self).version()
    }

    fn library_flavor(&self) -> String {
        (**self).library_flavor()
    }

    fn set_image(&self, image: &OcrImage) {
        (**self).set_image(image)
    }

    fn recognize(&self, monitor: &dyn ProgressMonitor) -> bool {
        (**self).recognize(monitor)
    }

    fn utf8_text(&self) -> String {
        (**self).utf8_text()
    }

    fn clear(&self) {
        (**self).clear()
    }

    fn request_stop(&self) {
        (**self).request_stop()
    }

    fn release(&self) {
        (**self).release()
    }
}

/// Path of the language data file for `language` under `data_path`
pub fn traineddata_path(data_path: &Path, language: &str) -> PathBuf {
    data_path
        .join(TESSDATA_DIR)
        .join(format!("{}.{}", language, TRAINEDDATA_EXT))
}

/// Validate initialization arguments the way the native binding does.
///
/// `language` may join several languages with `+` ("eng+deu").
pub fn validate_init_args(data_path: &Path, language: &str) -> Result<(), EngineError> {
    if !data_path.is_dir() {
        return Err(EngineError::InvalidArgument(format!(
            "data path {:?} must be an existing directory",
            data_path
        )));
    }
    if language.trim().is_empty() {
        return Err(EngineError::InvalidArgument("language must not be empty".to_string()));
    }

    for lang in language.split('+') {
        let valid = !lang.is_empty()
            && lang
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(EngineError::InvalidArgument(format!(
                "malformed language '{}'",
                language
            )));
        }

        let path = traineddata_path(data_path, lang);
        if !path.is_file() {
            return Err(EngineError::MissingLanguageData {
                language: lang.to_string(),
                path,
            });
        }
    }

    Ok(())
}

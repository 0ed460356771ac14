//! Observable OCR status values

use serde::Serialize;
use std::fmt;

/// State of the OCR as seen by observers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrStatus {
    /// Engine is loading
    Loading,
    /// Engine is prepared
    StartUp {
        /// Library version
        version: String,
        /// Library build flavor
        flavor: String,
    },
    /// A job was accepted and is starting
    Processing,
    /// Recognition is running, 0-100 percent done
    Progress(u8),
    /// Job completed, with its duration in seconds
    Finished(f32),
    /// Job was cancelled and has unwound
    Stopped,
    /// Cancellation requested, job still unwinding
    Stopping,
}

impl OcrStatus {
    /// Whether this value ends a job's status sequence
    pub fn is_terminal(&self) -> bool {
        matches!(self, OcrStatus::Finished(_) | OcrStatus::Stopped)
    }
}

impl fmt::Display for OcrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OcrStatus::Loading => write!(f, "Loading..."),
            OcrStatus::StartUp { version, flavor } => write!(f, "Tesseract {} ({})", version, flavor),
            OcrStatus::Processing => write!(f, "Processing..."),
            OcrStatus::Progress(percent) => write!(f, "Progress: {} %", percent),
            OcrStatus::Finished(secs) => write!(f, "Completed in {:.3}s.", secs),
            OcrStatus::Stopped => write!(f, "Stopped."),
            OcrStatus::Stopping => write!(f, "Stopping..."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(OcrStatus::Progress(42).to_string(), "Progress: 42 %");
        assert_eq!(OcrStatus::Finished(1.2345).to_string(), "Completed in 1.234s.");
        assert_eq!(
            OcrStatus::StartUp {
                version: "5.3.4".into(),
                flavor: "standard".into()
            }
            .to_string(),
            "Tesseract 5.3.4 (standard)"
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(OcrStatus::Stopped.is_terminal());
        assert!(OcrStatus::Finished(0.5).is_terminal());
        assert!(!OcrStatus::Stopping.is_terminal());
        assert!(!OcrStatus::Progress(100).is_terminal());
    }

    #[test]
    fn test_json_shape() {
        assert_eq!(serde_json::to_string(&OcrStatus::Stopped).unwrap(), "\"stopped\"");
        assert_eq!(
            serde_json::to_string(&OcrStatus::Progress(10)).unwrap(),
            "{\"progress\":10}"
        );
    }
}

//! ocr-jobctl - cancellable OCR job control
//!
//! Drives a stateful OCR engine from a single background job at a time,
//! streams progress to observers, and guarantees the engine is released
//! exactly once even when disposal races with a running job.

pub mod config;
pub mod engine;
pub mod job;
pub mod storage;

pub use engine::{EngineMode, OcrEngine, OcrImage, ScriptedEngine};
pub use job::{JobController, JobError, JobId, OcrStatus};

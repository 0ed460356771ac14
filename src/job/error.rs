//! Job controller error types

use std::io;
use thiserror::Error;

use crate::engine::EngineError;

/// Conditions reported by the job controller.
///
/// None of these are fatal: the controller logs them and leaves its state
/// untouched.
#[derive(Debug, Error)]
pub enum JobError {
    /// `start` called before the engine was initialized
    #[error("OCR engine is not initialized")]
    NotReady,

    /// `start` called while a job is active
    #[error("OCR processing is already in progress")]
    AlreadyRunning,

    /// Operation called after dispose was requested
    #[error("OCR controller has been disposed")]
    Disposed,

    /// The worker thread could not be spawned; the job was rolled back
    #[error("cannot spawn OCR worker: {0}")]
    SpawnFailed(#[source] io::Error),

    /// Engine initialization failed; the controller stays uninitialized
    #[error("cannot initialize OCR engine: {0}")]
    InitializationFailure(#[source] EngineError),
}

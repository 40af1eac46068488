//! Error types for batchscribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScribeError {
    // Configuration errors
    #[error("Config file {path} is missing required key `{key}`")]
    ConfigMissingKey { key: String, path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Failed to parse {path}: {message}")]
    ConfigParse { path: String, message: String },

    // Audio errors
    #[error("Audio file {path} has sampling rate {actual}, expected {expected}")]
    RateMismatch {
        path: String,
        expected: u32,
        actual: u32,
    },

    #[error("Failed to decode {path}: {message}")]
    AudioDecode { path: String, message: String },

    // Corpus iteration errors
    #[error("Corpus layout error at {path}: {message}")]
    CorpusLayout { path: String, message: String },

    #[error("Unknown audio source `{name}` (available: {available})")]
    UnknownSource { name: String, available: String },

    // Resume errors
    #[error("Resume artifact {path} is not parseable: {message}")]
    ResumeArtifact { path: String, message: String },

    // Transcription errors
    #[error("Transcription model not found at {path}")]
    TranscriptionModelNotFound { path: String },

    #[error("Transcription failed: {message}")]
    Transcription { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, ScribeError>;

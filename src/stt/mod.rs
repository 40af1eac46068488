//! Speech-to-text boundary.

pub mod transcriber;
pub mod whisper;

pub use transcriber::{MockTranscriber, Transcriber, Transcription};
pub use whisper::{WhisperConfig, WhisperTranscriber};

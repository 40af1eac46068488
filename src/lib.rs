//! batchscribe - corpus preparation and resumable batch transcription
//!
//! Normalizes heterogeneous on-disk speech corpora into a uniform, lazy
//! stream of audio records, enforces the 30-second ceiling of Whisper-class
//! recognition engines, and resumes interrupted batch jobs from their own
//! output artifact without re-processing completed utterances.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod corpus;
pub mod defaults;
pub mod driver;
pub mod error;
pub mod stt;
pub mod tsv;

// Core capabilities (source → transcriber → output)
pub use corpus::{
    AudioRecord, AudioRecordSource, GeneratedSamplesSkipper, LibrilightSource, ManifestSource,
    Records, SampleSkipper, VoxpopuliSource, create_source,
};
pub use stt::{MockTranscriber, Transcriber, Transcription};

// Batch driver
pub use driver::{BatchOptions, run_batch};

// Error handling
pub use error::{Result, ScribeError};

// Config
pub use config::ConfigDoc;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }
}

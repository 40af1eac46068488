//! The transcription capability consumed by the batch driver.

use crate::corpus::AudioRecord;
use crate::error::{Result, ScribeError};
use std::sync::Arc;

/// Output for one audio record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcription {
    /// Detected (or forced) language code.
    pub language: String,
    /// Transcribed or translated text.
    pub text: String,
}

/// Trait for batch speech-to-text transcription.
///
/// This trait allows swapping implementations (real Whisper vs mock).
/// How the audio is batched internally is up to the implementation; the
/// contract is one output per input record, in order.
pub trait Transcriber: Send + Sync {
    /// Transcribe a batch of records.
    fn transcribe(&self, batch: &[AudioRecord]) -> Result<Vec<Transcription>>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;
}

/// Implement Transcriber for Arc<T> to allow sharing across drivers.
impl<T: Transcriber> Transcriber for Arc<T> {
    fn transcribe(&self, batch: &[AudioRecord]) -> Result<Vec<Transcription>> {
        (**self).transcribe(batch)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Mock transcriber for testing
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    model_name: String,
    language: String,
    text: String,
    should_fail: bool,
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            language: "en".to_string(),
            text: "mock transcription".to_string(),
            should_fail: false,
        }
    }

    /// Configure the mock to return a specific text
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Configure the mock to report a specific language
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, batch: &[AudioRecord]) -> Result<Vec<Transcription>> {
        if self.should_fail {
            return Err(ScribeError::Transcription {
                message: "mock transcription failure".to_string(),
            });
        }
        Ok(batch
            .iter()
            .map(|_| Transcription {
                language: self.language.clone(),
                text: self.text.clone(),
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

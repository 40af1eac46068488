//! Whisper-based batch transcription.
//!
//! This module provides a Whisper implementation of the Transcriber trait
//! using whisper-rs.
//!
//! # Feature Gate
//!
//! This module requires the `whisper` feature to be enabled and cmake to be
//! installed:
//!
//! ```bash
//! cargo build --features whisper
//! ```

use crate::corpus::AudioRecord;
use crate::error::{Result, ScribeError};
use crate::stt::transcriber::{Transcriber, Transcription};
use std::path::PathBuf;

#[cfg(feature = "whisper")]
use std::sync::{Mutex, Once};
#[cfg(feature = "whisper")]
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, install_logging_hooks,
};

#[cfg(feature = "whisper")]
static LOGGING_HOOKS_INSTALLED: Once = Once::new();

/// Configuration for Whisper transcriber.
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    /// Path to the ggml model file
    pub model_path: PathBuf,
    /// Source language code; None lets the model detect it per segment
    pub language: Option<String>,
    /// Translate to English instead of transcribing
    pub translate: bool,
    /// Beam size for decoding; 1 selects greedy sampling
    pub beam_size: usize,
    /// Number of threads for inference (None = auto-detect)
    pub threads: Option<usize>,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/ggml-base.bin"),
            language: None,
            translate: false,
            beam_size: 1,
            threads: None,
        }
    }
}

/// Whisper-based transcriber implementation.
///
/// The WhisperContext is wrapped in a Mutex to ensure thread safety.
#[cfg(feature = "whisper")]
pub struct WhisperTranscriber {
    context: Mutex<WhisperContext>,
    config: WhisperConfig,
    model_name: String,
}

#[cfg(feature = "whisper")]
impl std::fmt::Debug for WhisperTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperTranscriber")
            .field("config", &self.config)
            .field("model_name", &self.model_name)
            .field("context", &"<WhisperContext>")
            .finish()
    }
}

/// Whisper-based transcriber placeholder (without whisper feature).
///
/// This is a stub implementation that returns errors when used.
/// Enable the `whisper` feature to use real transcription.
#[cfg(not(feature = "whisper"))]
#[derive(Debug)]
pub struct WhisperTranscriber {
    config: WhisperConfig,
    model_name: String,
}

fn model_name_of(config: &WhisperConfig) -> Result<String> {
    if !config.model_path.exists() {
        return Err(ScribeError::TranscriptionModelNotFound {
            path: config.model_path.to_string_lossy().to_string(),
        });
    }
    Ok(config
        .model_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string())
}

#[cfg(feature = "whisper")]
impl WhisperTranscriber {
    /// Load the Whisper model named by `config`.
    ///
    /// # Errors
    /// Returns `ScribeError::TranscriptionModelNotFound` if the model file
    /// doesn't exist, `ScribeError::Transcription` if loading fails.
    pub fn new(config: WhisperConfig) -> Result<Self> {
        // Install logging hooks to suppress whisper.cpp output (only once)
        LOGGING_HOOKS_INSTALLED.call_once(|| {
            install_logging_hooks();
        });

        let model_name = model_name_of(&config)?;
        let context = WhisperContext::new_with_params(
            config
                .model_path
                .to_str()
                .ok_or_else(|| ScribeError::Transcription {
                    message: "Invalid UTF-8 in model path".to_string(),
                })?,
            WhisperContextParameters::default(),
        )
        .map_err(|e| ScribeError::Transcription {
            message: format!("Failed to load Whisper model: {e}"),
        })?;

        Ok(Self {
            context: Mutex::new(context),
            config,
            model_name,
        })
    }

    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }

    fn sampling_strategy(&self) -> SamplingStrategy {
        if self.config.beam_size > 1 {
            SamplingStrategy::BeamSearch {
                beam_size: self.config.beam_size as i32,
                patience: -1.0,
            }
        } else {
            SamplingStrategy::Greedy { best_of: 1 }
        }
    }
}

#[cfg(feature = "whisper")]
impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, batch: &[AudioRecord]) -> Result<Vec<Transcription>> {
        let context = self
            .context
            .lock()
            .map_err(|e| ScribeError::Transcription {
                message: format!("Failed to acquire context lock: {e}"),
            })?;

        let mut outputs = Vec::with_capacity(batch.len());
        for record in batch {
            let mut state = context.create_state().map_err(|e| ScribeError::Transcription {
                message: format!("Failed to create Whisper state: {e}"),
            })?;

            let mut params = FullParams::new(self.sampling_strategy());
            params.set_language(self.config.language.as_deref());
            params.set_translate(self.config.translate);
            if let Some(threads) = self.config.threads {
                params.set_n_threads(threads as i32);
            }
            // Disable printing to stdout/stderr
            params.set_print_special(false);
            params.set_print_progress(false);
            params.set_print_realtime(false);
            params.set_print_timestamps(false);

            state
                .full(params, &record.samples)
                .map_err(|e| ScribeError::Transcription {
                    message: format!("Whisper inference failed on {}: {e}", record.id),
                })?;

            let lang_id = state.full_lang_id_from_state();
            let language = whisper_rs::get_lang_str(lang_id).unwrap_or("").to_string();

            let mut text = String::new();
            for segment in state.as_iter() {
                text.push_str(&segment.to_string());
            }

            outputs.push(Transcription {
                language,
                text: text.trim().to_string(),
            });
        }
        Ok(outputs)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(not(feature = "whisper"))]
impl WhisperTranscriber {
    /// Create a new Whisper transcriber (stub implementation).
    pub fn new(config: WhisperConfig) -> Result<Self> {
        let model_name = model_name_of(&config)?;
        Ok(Self { config, model_name })
    }

    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }
}

#[cfg(not(feature = "whisper"))]
impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, _batch: &[AudioRecord]) -> Result<Vec<Transcription>> {
        Err(ScribeError::Transcription {
            message: concat!(
                "Whisper feature not enabled. This binary was built without speech recognition.\n",
                "To fix: cargo build --features whisper (requires cmake)"
            )
            .to_string(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

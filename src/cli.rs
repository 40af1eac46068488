//! Command-line interface for batchscribe
//!
//! Provides argument parsing using clap derive macros.

use crate::defaults;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Batch transcription of speech corpora
#[derive(Parser, Debug)]
#[command(
    name = "batchscribe",
    version,
    about = "Batch transcription of speech corpora with crash-safe resume"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe a corpus into a TSV artifact, resuming from prior output
    Run {
        /// Corpus source used to read audios (see `batchscribe sources`)
        #[arg(long, value_name = "NAME")]
        source: String,

        /// TOML file with the source-specific configuration
        #[arg(long, short = 'y', value_name = "PATH")]
        source_config: PathBuf,

        /// Output TSV; an existing file is resumed, not overwritten
        #[arg(long, short = 'o', value_name = "PATH")]
        output: PathBuf,

        /// Path to the ggml Whisper model file
        #[arg(long, value_name = "PATH", default_value = "models/ggml-base.bin")]
        model: PathBuf,

        /// Source language; auto-detected per sample when omitted
        #[arg(long, value_name = "LANG")]
        language: Option<String>,

        /// The task to perform
        #[arg(long, value_enum, default_value_t = Task::Transcribe)]
        task: Task,

        /// Sampling rate every corpus file must already be stored at
        #[arg(long, value_name = "HZ", default_value_t = defaults::SAMPLING_RATE)]
        sampling_rate: u32,

        /// Records per inference batch
        #[arg(long, short = 'b', default_value_t = defaults::BATCH_SIZE)]
        batch_size: usize,

        /// Beam size for decoding; 1 selects greedy sampling
        #[arg(long, default_value_t = 1)]
        beam_size: usize,

        /// Threads for inference (auto-detected when omitted)
        #[arg(long)]
        threads: Option<usize>,

        /// Progress-log interval, in processed samples
        #[arg(long, default_value_t = defaults::LOGGING_FREQ)]
        logging_freq: usize,
    },

    /// Walk a corpus source without transcribing and report its records
    Inspect {
        /// Corpus source used to read audios (see `batchscribe sources`)
        #[arg(long, value_name = "NAME")]
        source: String,

        /// TOML file with the source-specific configuration
        #[arg(long, short = 'y', value_name = "PATH")]
        source_config: PathBuf,

        /// Sampling rate every corpus file must already be stored at
        #[arg(long, value_name = "HZ", default_value_t = defaults::SAMPLING_RATE)]
        sampling_rate: u32,

        /// Existing output whose ids are skipped, as a resumed run would
        #[arg(long, value_name = "PATH")]
        skip_from: Option<PathBuf>,
    },

    /// List the registered corpus sources
    Sources,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// What the model should produce.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Transcribe in the source language
    Transcribe,
    /// Translate to English
    Translate,
}

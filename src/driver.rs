//! Batch driver: pull records from a source, transcribe, append TSV rows.
//!
//! The driver owns the resume loop. The output artifact doubles as the
//! resume state: when it already exists, its ids are loaded into a skipper
//! before iteration starts and new rows are appended to it, so an
//! interrupted multi-day job picks up exactly where it stopped.

use crate::corpus::{AudioRecord, AudioRecordSource, GeneratedSamplesSkipper};
use crate::defaults;
use crate::error::{Result, ScribeError};
use crate::stt::Transcriber;
use crate::tsv::{OUTPUT_COLUMNS, TsvWriter, sanitize_field};
use std::fs::OpenOptions;
use std::io::BufWriter;
use std::path::Path;

/// Knobs for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Records per transcriber call.
    pub batch_size: usize,
    /// Progress-log interval, in processed records.
    pub logging_freq: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: defaults::BATCH_SIZE,
            logging_freq: defaults::LOGGING_FREQ,
        }
    }
}

/// Run a source to exhaustion, writing one output row per record.
///
/// Returns the number of records processed in this run (skipped records are
/// not counted). The output file is flushed after every batch so that a
/// crash loses at most one batch of completed work.
pub fn run_batch(
    source: &mut dyn AudioRecordSource,
    transcriber: &dyn Transcriber,
    output: &Path,
    options: &BatchOptions,
) -> Result<usize> {
    let batch_size = options.batch_size.max(1);

    let resuming = output.exists();
    if resuming {
        let skipper = GeneratedSamplesSkipper::from_file(output)?;
        tracing::info!(
            path = %output.display(),
            done = skipper.len(),
            "resuming from existing output"
        );
        source.attach_skipper(Box::new(skipper));
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(output)?;
    let mut writer = TsvWriter::new(BufWriter::new(file));
    if !resuming {
        writer.write_row(&OUTPUT_COLUMNS)?;
    }

    tracing::info!(model = transcriber.model_name(), "starting transcription");
    let mut batch: Vec<AudioRecord> = Vec::with_capacity(batch_size);
    let mut processed = 0;
    let mut last_logged = 0;
    loop {
        let record = source.next_record()?;
        let exhausted = record.is_none();
        if let Some(record) = record {
            batch.push(record);
        }

        if batch.len() >= batch_size || (exhausted && !batch.is_empty()) {
            let outputs = transcriber.transcribe(&batch)?;
            if outputs.len() != batch.len() {
                return Err(ScribeError::Transcription {
                    message: format!(
                        "transcriber returned {} outputs for {} records",
                        outputs.len(),
                        batch.len()
                    ),
                });
            }
            for (record, transcription) in batch.iter().zip(&outputs) {
                let text = sanitize_field(&transcription.text);
                writer.write_row(&[
                    record.id.as_str(),
                    transcription.language.as_str(),
                    text.as_ref(),
                ])?;
            }
            writer.flush()?;
            processed += batch.len();
            batch.clear();

            if processed - last_logged >= options.logging_freq {
                tracing::info!(processed, "transcription progress");
                last_logged = processed;
            }
        }

        if exhausted {
            break;
        }
    }

    tracing::info!(processed, "transcription completed");
    Ok(processed)
}

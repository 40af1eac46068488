//! Corpus sources: uniform, lazy iteration over heterogeneous speech corpora.
//!
//! Every supported dataset layout is an adapter implementing
//! [`AudioRecordSource`]. A source is constructed from a configuration
//! document plus the sampling rate the downstream model expects, and then
//! pulled one [`AudioRecord`] at a time. All work — directory listing,
//! manifest parsing, decoding, chunk slicing — happens synchronously inside
//! [`AudioRecordSource::next_record`], so memory stays bounded to the record
//! being produced.
//!
//! Adding a corpus format means adding a new adapter and registering it in
//! [`AVAILABLE_SOURCES`]; nothing else changes.

pub mod librilight;
pub mod manifest;
pub mod skipper;
pub mod voxpopuli;

pub use librilight::LibrilightSource;
pub use manifest::ManifestSource;
pub use skipper::{GeneratedSamplesSkipper, SampleSkipper};
pub use voxpopuli::VoxpopuliSource;

use crate::error::{Result, ScribeError};
use std::path::Path;

/// One utterance ready for transcription.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioRecord {
    /// Unique within a single pass, derived deterministically from corpus
    /// metadata.
    pub id: String,
    /// Mono f32 PCM, first channel of the source file. Never empty.
    pub samples: Vec<f32>,
    /// Always the rate the source was constructed with.
    pub sampling_rate: u32,
}

impl AudioRecord {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sampling_rate as f64
    }
}

/// A lazy, single-pass producer of audio records.
///
/// Sources are not restartable: once [`AudioRecordSource::next_record`]
/// returns `Ok(None)` the source is exhausted, and a second pass over the
/// same corpus requires constructing a new source.
pub trait AudioRecordSource: std::fmt::Debug {
    /// Replace the skipper consulted during iteration.
    ///
    /// May be called before or between pulls; only the currently attached
    /// skipper is consulted.
    fn attach_skipper(&mut self, skipper: Box<dyn SampleSkipper>);

    /// Whether the attached skipper marks `id` as already produced.
    /// False when no skipper is attached.
    fn should_skip(&self, id: &str) -> bool;

    /// Produce the next record, or `Ok(None)` when the corpus is exhausted.
    fn next_record(&mut self) -> Result<Option<AudioRecord>>;
}

/// Iterator adapter over any [`AudioRecordSource`].
pub struct Records<'a, S: AudioRecordSource + ?Sized> {
    source: &'a mut S,
}

impl<'a, S: AudioRecordSource + ?Sized> Records<'a, S> {
    pub fn new(source: &'a mut S) -> Self {
        Self { source }
    }
}

impl<S: AudioRecordSource + ?Sized> Iterator for Records<'_, S> {
    type Item = Result<AudioRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.source.next_record().transpose()
    }
}

/// Constructor signature shared by all registered sources.
pub type SourceBuilder = fn(&Path, u32) -> Result<Box<dyn AudioRecordSource>>;

/// Static registration table: source name to constructor.
pub const AVAILABLE_SOURCES: &[(&str, SourceBuilder)] = &[
    ("voxpopuli", VoxpopuliSource::boxed),
    ("librilight", LibrilightSource::boxed),
    ("manifest", ManifestSource::boxed),
];

/// Build a registered source by name.
pub fn create_source(
    name: &str,
    config: &Path,
    sampling_rate: u32,
) -> Result<Box<dyn AudioRecordSource>> {
    match AVAILABLE_SOURCES.iter().find(|(n, _)| *n == name) {
        Some((_, build)) => build(config, sampling_rate),
        None => Err(ScribeError::UnknownSource {
            name: name.to_string(),
            available: AVAILABLE_SOURCES
                .iter()
                .map(|(n, _)| *n)
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

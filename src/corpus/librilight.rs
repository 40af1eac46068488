//! Librilight corpus source.
//!
//! Librilight (after VAD cutting) is a three-level directory tree:
//! `{basedir}/{speaker}/{book}/{utterance}.flac`. Utterances can still run
//! well past the 30 second ceiling the recognition engine accepts, so
//! over-long files are deterministically split into bounded chunks, each
//! resumable on its own.

use crate::audio::read_audio;
use crate::config::ConfigDoc;
use crate::corpus::skipper::{SampleSkipper, SkipperSlot};
use crate::corpus::{AudioRecord, AudioRecordSource};
use crate::defaults::MAX_SEGMENT_SECS;
use crate::error::{Result, ScribeError};
use std::collections::VecDeque;
use std::fs::{self, DirEntry};
use std::path::Path;

/// Half-open sample ranges covering `[0, length)` in slices of at most
/// `max_len`, in order. Every chunk but the last has length exactly
/// `max_len`.
pub(crate) fn split_bounds(length: usize, max_len: usize) -> Vec<(usize, usize)> {
    let num_chunks = length.div_ceil(max_len);
    (0..num_chunks)
        .map(|i| (i * max_len, ((i + 1) * max_len).min(length)))
        .collect()
}

#[derive(Debug)]
struct DirCursor {
    /// Id prefix accumulated from the levels above (`speaker` or
    /// `speaker_book`).
    prefix: String,
    entries: fs::ReadDir,
}

#[derive(Debug)]
pub struct LibrilightSource {
    sampling_rate: u32,
    split_long: bool,
    max_segment_len: usize,
    speakers: fs::ReadDir,
    books: Option<DirCursor>,
    files: Option<DirCursor>,
    /// Chunks of the current over-long utterance, drained before the walk
    /// advances.
    pending: VecDeque<AudioRecord>,
    skipper: SkipperSlot,
}

impl LibrilightSource {
    /// Required config keys: `basedir`.
    /// Optional: `split_if_longer_than_30s` (default true).
    pub fn new(config: &Path, sampling_rate: u32) -> Result<Self> {
        let doc = ConfigDoc::load(config)?;
        let basedir = doc.require_path("basedir")?;
        let split_long = doc.bool_or("split_if_longer_than_30s", true)?;

        let speakers = fs::read_dir(&basedir).map_err(|e| ScribeError::CorpusLayout {
            path: basedir.display().to_string(),
            message: format!("cannot list corpus root: {e}"),
        })?;

        Ok(Self {
            sampling_rate,
            split_long,
            max_segment_len: sampling_rate as usize * MAX_SEGMENT_SECS,
            speakers,
            books: None,
            files: None,
            pending: VecDeque::new(),
            skipper: SkipperSlot::default(),
        })
    }

    pub fn boxed(config: &Path, sampling_rate: u32) -> Result<Box<dyn AudioRecordSource>> {
        Ok(Box::new(Self::new(config, sampling_rate)?))
    }

    /// Decode one utterance file and either return it whole or queue its
    /// chunks on `pending`.
    fn read_utterance(&mut self, base_id: String, path: &Path) -> Result<Option<AudioRecord>> {
        let samples = read_audio(path, self.sampling_rate, None)?;
        if !self.split_long || samples.len() <= self.max_segment_len {
            return Ok(Some(AudioRecord {
                id: base_id,
                samples,
                sampling_rate: self.sampling_rate,
            }));
        }

        for (i, (start, end)) in split_bounds(samples.len(), self.max_segment_len)
            .into_iter()
            .enumerate()
        {
            let chunk_id = format!("{base_id}__{i}");
            // Chunk-granular resume: a partially transcribed utterance
            // re-emits only the chunks still missing from the artifact.
            if self.skipper.should_skip(&chunk_id) {
                tracing::debug!(id = %chunk_id, "already transcribed, skipping");
                continue;
            }
            self.pending.push_back(AudioRecord {
                id: chunk_id,
                samples: samples[start..end].to_vec(),
                sampling_rate: self.sampling_rate,
            });
        }
        Ok(None)
    }
}

impl AudioRecordSource for LibrilightSource {
    fn attach_skipper(&mut self, skipper: Box<dyn SampleSkipper>) {
        self.skipper.attach(skipper);
    }

    fn should_skip(&self, id: &str) -> bool {
        self.skipper.should_skip(id)
    }

    fn next_record(&mut self) -> Result<Option<AudioRecord>> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Ok(Some(record));
            }

            if let Some(files) = &mut self.files {
                match files.entries.next() {
                    None => self.files = None,
                    Some(entry) => {
                        let entry = entry?;
                        if !entry.file_type()?.is_file() {
                            continue;
                        }
                        let path = entry.path();
                        let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(|| {
                            ScribeError::CorpusLayout {
                                path: path.display().to_string(),
                                message: "utterance file name is not valid UTF-8".to_string(),
                            }
                        })?;
                        let base_id = format!("{}_{}", files.prefix, stem);
                        if self.skipper.should_skip(&base_id) {
                            tracing::debug!(id = %base_id, "already transcribed, skipping");
                            continue;
                        }
                        if let Some(record) = self.read_utterance(base_id, &path)? {
                            return Ok(Some(record));
                        }
                    }
                }
                continue;
            }

            if let Some(books) = &mut self.books {
                match books.entries.next() {
                    None => self.books = None,
                    Some(entry) => {
                        let entry = entry?;
                        if !entry.file_type()?.is_dir() {
                            continue;
                        }
                        let prefix = format!("{}_{}", books.prefix, entry_name(&entry)?);
                        self.files = Some(DirCursor {
                            prefix,
                            entries: fs::read_dir(entry.path())?,
                        });
                    }
                }
                continue;
            }

            match self.speakers.next() {
                None => return Ok(None),
                Some(entry) => {
                    let entry = entry?;
                    if !entry.file_type()?.is_dir() {
                        continue;
                    }
                    self.books = Some(DirCursor {
                        prefix: entry_name(&entry)?,
                        entries: fs::read_dir(entry.path())?,
                    });
                }
            }
        }
    }
}

fn entry_name(entry: &DirEntry) -> Result<String> {
    entry
        .file_name()
        .into_string()
        .map_err(|name| ScribeError::CorpusLayout {
            path: entry.path().display().to_string(),
            message: format!("directory name is not valid UTF-8: {name:?}"),
        })
}

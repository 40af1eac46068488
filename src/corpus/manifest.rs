//! Generic manifest corpus source.
//!
//! For corpora that keep several named segments inside one recording, a
//! segment-definition document groups segments under a source-file key:
//!
//! ```toml
//! [aa]
//! segments = [
//!     { start = 0.0, end = 11.1 },
//!     { start = 11.1, end = 19.5 },
//! ]
//!
//! [bb]
//! file = "bb_remastered.flac"
//! segments = [{ start = 2.0, end = 8.0 }]
//! ```
//!
//! Each group's audio lives at `{basedir}/{key}.wav` unless `file` overrides
//! the name. The recording is decoded at most once per group, and only when
//! at least one of its segments survives the skip check.

use crate::audio::read_audio;
use crate::config::ConfigDoc;
use crate::corpus::skipper::{SampleSkipper, SkipperSlot};
use crate::corpus::{AudioRecord, AudioRecordSource};
use crate::error::{Result, ScribeError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
struct SegmentDef {
    /// Segment start, in seconds from the beginning of the recording.
    start: f64,
    /// Segment end, in seconds. Clamped to the recording length.
    end: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct GroupDef {
    /// File name under `basedir`; defaults to `{key}.wav`.
    file: Option<String>,
    #[serde(default)]
    segments: Vec<SegmentDef>,
}

#[derive(Debug)]
struct Group {
    key: String,
    path: PathBuf,
    segments: Vec<SegmentDef>,
    /// Decoded lazily, on the first segment that is not skipped.
    samples: Option<Vec<f32>>,
    next_segment: usize,
}

#[derive(Debug)]
pub struct ManifestSource {
    sampling_rate: u32,
    groups: std::vec::IntoIter<Group>,
    current: Option<Group>,
    skipper: SkipperSlot,
}

impl ManifestSource {
    /// Required config keys: `basedir`, `segment_definition`.
    pub fn new(config: &Path, sampling_rate: u32) -> Result<Self> {
        let doc = ConfigDoc::load(config)?;
        let basedir = doc.require_path("basedir")?;
        let definition = doc.require_path("segment_definition")?;

        let contents =
            std::fs::read_to_string(&definition).map_err(|e| ScribeError::ConfigParse {
                path: definition.display().to_string(),
                message: e.to_string(),
            })?;
        // BTreeMap keeps group order deterministic across runs
        let parsed: BTreeMap<String, GroupDef> =
            toml::from_str(&contents).map_err(|e| ScribeError::ConfigParse {
                path: definition.display().to_string(),
                message: e.to_string(),
            })?;

        let mut groups = Vec::with_capacity(parsed.len());
        for (key, def) in parsed {
            validate_segments(&key, &def.segments)?;
            let file = def.file.unwrap_or_else(|| format!("{key}.wav"));
            groups.push(Group {
                path: basedir.join(file),
                key,
                segments: def.segments,
                samples: None,
                next_segment: 0,
            });
        }
        tracing::info!(
            path = %definition.display(),
            groups = groups.len(),
            "parsed segment definition"
        );

        Ok(Self {
            sampling_rate,
            groups: groups.into_iter(),
            current: None,
            skipper: SkipperSlot::default(),
        })
    }

    pub fn boxed(config: &Path, sampling_rate: u32) -> Result<Box<dyn AudioRecordSource>> {
        Ok(Box::new(Self::new(config, sampling_rate)?))
    }
}

fn validate_segments(key: &str, segments: &[SegmentDef]) -> Result<()> {
    for (i, segment) in segments.iter().enumerate() {
        if segment.start < 0.0 || segment.end <= segment.start {
            return Err(ScribeError::ConfigInvalidValue {
                key: format!("{key}.segments[{i}]"),
                message: format!(
                    "segment range {}..{} is not a forward interval",
                    segment.start, segment.end
                ),
            });
        }
    }
    Ok(())
}

impl AudioRecordSource for ManifestSource {
    fn attach_skipper(&mut self, skipper: Box<dyn SampleSkipper>) {
        self.skipper.attach(skipper);
    }

    fn should_skip(&self, id: &str) -> bool {
        self.skipper.should_skip(id)
    }

    fn next_record(&mut self) -> Result<Option<AudioRecord>> {
        loop {
            if let Some(group) = &mut self.current {
                while group.next_segment < group.segments.len() {
                    let index = group.next_segment;
                    group.next_segment += 1;

                    let id = format!("{}_{}", group.key, index);
                    if self.skipper.should_skip(&id) {
                        tracing::debug!(%id, "already transcribed, skipping");
                        continue;
                    }

                    if group.samples.is_none() {
                        group.samples = Some(read_audio(&group.path, self.sampling_rate, None)?);
                    }
                    let samples = group
                        .samples
                        .as_deref()
                        .unwrap_or_default();

                    let segment = &group.segments[index];
                    let start = (segment.start * self.sampling_rate as f64).round() as usize;
                    let end = ((segment.end * self.sampling_rate as f64).round() as usize)
                        .min(samples.len());
                    if start >= end {
                        return Err(ScribeError::CorpusLayout {
                            path: group.path.display().to_string(),
                            message: format!(
                                "segment {id} ({}s..{}s) lies beyond the decoded audio",
                                segment.start, segment.end
                            ),
                        });
                    }

                    return Ok(Some(AudioRecord {
                        id,
                        samples: samples[start..end].to_vec(),
                        sampling_rate: self.sampling_rate,
                    }));
                }
                self.current = None;
            }

            match self.groups.next() {
                Some(group) => self.current = Some(group),
                None => return Ok(None),
            }
        }
    }
}

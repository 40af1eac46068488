//! Voxpopuli corpus source.
//!
//! Voxpopuli ships a tab-separated segment manifest next to a
//! `{lang}/{year}/` tree of ogg files. Each manifest row names a composite
//! `event_id` and a `segment_no`; rows whose language does not match the
//! configured one are filtered out without touching the filesystem.

use crate::audio::read_audio;
use crate::config::ConfigDoc;
use crate::corpus::skipper::{SampleSkipper, SkipperSlot};
use crate::corpus::{AudioRecord, AudioRecordSource};
use crate::defaults::MAX_SEGMENT_SECS;
use crate::error::{Result, ScribeError};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// How the language code is extracted from a composite event id.
///
/// Event ids look like `20200113-0900-PLENARY_it`, but the event part may
/// itself contain underscores, so the two rules disagree on some corpora.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LangRule {
    /// Token after the last underscore. Robust against underscores inside
    /// the event name; the default.
    #[default]
    Rightmost,
    /// Second underscore-separated field, counting from the left.
    SecondField,
}

impl LangRule {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "rightmost" => Some(Self::Rightmost),
            "second-field" => Some(Self::SecondField),
            _ => None,
        }
    }

    pub(crate) fn lang_of<'a>(&self, event_id: &'a str) -> &'a str {
        match self {
            Self::Rightmost => event_id.rsplit('_').next().unwrap_or(event_id).trim(),
            Self::SecondField => event_id.split('_').nth(1).unwrap_or("").trim(),
        }
    }
}

/// The year a Voxpopuli event belongs to: the leading four characters of its
/// event id (`20200113-...` -> `2020`).
fn year_of(event_id: &str) -> &str {
    event_id.get(..4).unwrap_or(event_id)
}

#[derive(Debug)]
pub struct VoxpopuliSource {
    lang: String,
    lang_rule: LangRule,
    basedir: PathBuf,
    manifest: PathBuf,
    sampling_rate: u32,
    /// Read-time cap applied to every file when truncation is enabled.
    max_read_frames: Option<usize>,
    reader: TsvRows,
    event_column: usize,
    segment_column: usize,
    skipper: SkipperSlot,
}

type TsvRows = crate::tsv::TsvReader<BufReader<File>>;

impl VoxpopuliSource {
    /// Required config keys: `lang`, `tsv_segments`.
    /// Optional: `truncate_exceeding_30s` (default true), `lang_rule`
    /// (`rightmost` or `second-field`).
    pub fn new(config: &Path, sampling_rate: u32) -> Result<Self> {
        let doc = ConfigDoc::load(config)?;
        let lang = doc.require_str("lang")?.to_string();
        let tsv_segments = doc.require_path("tsv_segments")?;
        let truncate = doc.bool_or("truncate_exceeding_30s", true)?;
        let lang_rule = match doc.optional_str("lang_rule")? {
            None => LangRule::default(),
            Some(value) => {
                LangRule::parse(value).ok_or_else(|| ScribeError::ConfigInvalidValue {
                    key: "lang_rule".to_string(),
                    message: format!("expected `rightmost` or `second-field`, got `{value}`"),
                })?
            }
        };

        let basedir = tsv_segments
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .to_path_buf();
        let file = File::open(&tsv_segments).map_err(|e| ScribeError::CorpusLayout {
            path: tsv_segments.display().to_string(),
            message: format!("cannot open segment manifest: {e}"),
        })?;
        let reader = TsvRows::new(BufReader::new(file))?;
        let event_column = manifest_column(&reader, &tsv_segments, "event_id")?;
        let segment_column = manifest_column(&reader, &tsv_segments, "segment_no")?;

        // Some Voxpopuli files run a few frames past 30s, which the
        // recognition engine rejects; cap the read rather than the result.
        let max_read_frames = truncate.then_some(sampling_rate as usize * MAX_SEGMENT_SECS);

        Ok(Self {
            lang,
            lang_rule,
            basedir,
            manifest: tsv_segments,
            sampling_rate,
            max_read_frames,
            reader,
            event_column,
            segment_column,
            skipper: SkipperSlot::default(),
        })
    }

    pub fn boxed(config: &Path, sampling_rate: u32) -> Result<Box<dyn AudioRecordSource>> {
        Ok(Box::new(Self::new(config, sampling_rate)?))
    }
}

fn manifest_column(reader: &TsvRows, manifest: &Path, name: &str) -> Result<usize> {
    reader.column(name).ok_or_else(|| ScribeError::CorpusLayout {
        path: manifest.display().to_string(),
        message: format!("segment manifest has no `{name}` column"),
    })
}

impl AudioRecordSource for VoxpopuliSource {
    fn attach_skipper(&mut self, skipper: Box<dyn SampleSkipper>) {
        self.skipper.attach(skipper);
    }

    fn should_skip(&self, id: &str) -> bool {
        self.skipper.should_skip(id)
    }

    fn next_record(&mut self) -> Result<Option<AudioRecord>> {
        while let Some(row) = self.reader.next_row()? {
            let event_id =
                manifest_field(&row, self.event_column, "event_id", &self.manifest)?.trim();
            let row_lang = self.lang_rule.lang_of(event_id);
            if row_lang != self.lang {
                continue;
            }

            let segment_no =
                manifest_field(&row, self.segment_column, "segment_no", &self.manifest)?;
            let id = format!("{event_id}_{segment_no}");
            if self.skipper.should_skip(&id) {
                tracing::debug!(%id, "already transcribed, skipping");
                continue;
            }

            let path = self
                .basedir
                .join(row_lang)
                .join(year_of(event_id))
                .join(format!("{id}.ogg"));
            let samples = read_audio(&path, self.sampling_rate, self.max_read_frames)?;
            return Ok(Some(AudioRecord {
                id,
                samples,
                sampling_rate: self.sampling_rate,
            }));
        }
        Ok(None)
    }
}

fn manifest_field<'a>(
    row: &'a [String],
    column: usize,
    name: &str,
    manifest: &Path,
) -> Result<&'a str> {
    row.get(column)
        .map(String::as_str)
        .ok_or_else(|| ScribeError::CorpusLayout {
            path: manifest.display().to_string(),
            message: format!("manifest row has no `{name}` field"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rightmost_rule_takes_token_after_last_underscore() {
        let rule = LangRule::Rightmost;
        assert_eq!(rule.lang_of("20200113-0900-PLENARY_it"), "it");
        // Event names may contain underscores themselves
        assert_eq!(rule.lang_of("20180308-FOO_BAR_hr"), "hr");
    }

    #[test]
    fn second_field_rule_counts_from_the_left() {
        let rule = LangRule::SecondField;
        assert_eq!(rule.lang_of("20200113-0900-PLENARY_it"), "it");
        // The historical rule misreads underscore-rich event names
        assert_eq!(rule.lang_of("20180308-FOO_BAR_hr"), "BAR");
    }

    #[test]
    fn lang_rule_parses_known_names() {
        assert_eq!(LangRule::parse("rightmost"), Some(LangRule::Rightmost));
        assert_eq!(LangRule::parse("second-field"), Some(LangRule::SecondField));
        assert_eq!(LangRule::parse("leftmost"), None);
    }

    #[test]
    fn year_is_the_leading_four_characters() {
        assert_eq!(year_of("20200113-0900-PLENARY_it"), "2020");
        assert_eq!(year_of("20"), "20");
    }
}

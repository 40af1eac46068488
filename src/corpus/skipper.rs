//! Resume support: deciding which sample ids are already done.
//!
//! A batch job writes one TSV row per transcribed sample. When a run is
//! interrupted and restarted, the ids already present in that artifact must
//! not be produced again. Sources consult a [`SampleSkipper`] for that
//! decision; the file-backed implementation loads the artifact once and
//! answers membership queries from an in-memory set.

use crate::error::{Result, ScribeError};
use crate::tsv::TsvReader;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Decides whether a candidate sample id has already been produced.
pub trait SampleSkipper: Send {
    fn should_skip(&self, id: &str) -> bool;
}

/// Skipper backed by the ids of a previous run's output artifact.
///
/// Construction parses the whole artifact eagerly; an artifact that does not
/// match the expected schema is an error, because treating unreadable state
/// as "nothing done yet" would redo (and duplicate) completed work.
#[derive(Debug)]
pub struct GeneratedSamplesSkipper {
    generated_ids: HashSet<String>,
}

impl GeneratedSamplesSkipper {
    /// Load the `id` column of a TSV output artifact.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| artifact_error(path, e.to_string()))?;
        let mut reader =
            TsvReader::new(BufReader::new(file)).map_err(|e| artifact_error(path, e.to_string()))?;
        let id_column = reader
            .column("id")
            .ok_or_else(|| artifact_error(path, "header has no `id` column".to_string()))?;

        let mut generated_ids = HashSet::new();
        let mut row_no = 1;
        while let Some(row) = reader
            .next_row()
            .map_err(|e| artifact_error(path, e.to_string()))?
        {
            row_no += 1;
            let id = row.get(id_column).ok_or_else(|| {
                artifact_error(path, format!("row {row_no} has no `id` field"))
            })?;
            generated_ids.insert(id.clone());
        }
        tracing::info!(path = %path.display(), ids = generated_ids.len(), "loaded resume artifact");
        Ok(Self { generated_ids })
    }

    /// Number of ids loaded from the artifact.
    pub fn len(&self) -> usize {
        self.generated_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generated_ids.is_empty()
    }
}

impl SampleSkipper for GeneratedSamplesSkipper {
    fn should_skip(&self, id: &str) -> bool {
        self.generated_ids.contains(id)
    }
}

fn artifact_error(path: &Path, message: String) -> ScribeError {
    ScribeError::ResumeArtifact {
        path: path.display().to_string(),
        message,
    }
}

/// Optional skipper held by each source.
///
/// Attaching is idempotent; the last attached skipper wins. With none
/// attached every query answers false.
#[derive(Default)]
pub(crate) struct SkipperSlot {
    skipper: Option<Box<dyn SampleSkipper>>,
}

impl std::fmt::Debug for SkipperSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkipperSlot")
            .field("attached", &self.skipper.is_some())
            .finish()
    }
}

impl SkipperSlot {
    pub fn attach(&mut self, skipper: Box<dyn SampleSkipper>) {
        self.skipper = Some(skipper);
    }

    pub fn should_skip(&self, id: &str) -> bool {
        self.skipper.as_ref().is_some_and(|s| s.should_skip(id))
    }
}

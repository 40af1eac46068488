//! Minimal tab-separated plumbing.
//!
//! Both the corpus manifests and the transcription output use plain TSV with
//! a header row and no quoting, so a tab or newline never appears inside a
//! field. The reader maps header names to column indexes once and then
//! streams rows; the writer produces the `id`/`language`/`text` schema the
//! resume machinery reads back.

use std::borrow::Cow;
use std::io::{self, BufRead, Write};

/// Column order of the transcription output artifact.
pub const OUTPUT_COLUMNS: [&str; 3] = ["id", "language", "text"];

/// Streaming reader for header-addressed TSV files.
#[derive(Debug)]
pub struct TsvReader<R> {
    columns: Vec<String>,
    reader: R,
}

impl<R: BufRead> TsvReader<R> {
    /// Read the header row and build the column index.
    ///
    /// An empty input produces a reader with no columns; callers that require
    /// a specific column detect that through [`TsvReader::column`].
    pub fn new(mut reader: R) -> io::Result<Self> {
        let mut header = String::new();
        reader.read_line(&mut header)?;
        let columns = if header.trim_end_matches(['\r', '\n']).is_empty() {
            Vec::new()
        } else {
            split_fields(&header).map(str::to_string).collect()
        };
        Ok(Self { columns, reader })
    }

    /// Index of a named column, if present in the header.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Next data row, split into fields. Blank lines are skipped.
    pub fn next_row(&mut self) -> io::Result<Option<Vec<String>>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            if line.trim_end_matches(['\r', '\n']).is_empty() {
                continue;
            }
            return Ok(Some(split_fields(&line).map(str::to_string).collect()));
        }
    }
}

fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.trim_end_matches(['\r', '\n']).split('\t')
}

/// Row-oriented TSV writer.
pub struct TsvWriter<W: Write> {
    inner: W,
}

impl<W: Write> TsvWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Write one row, joining the fields with tabs.
    pub fn write_row<S: AsRef<str>>(&mut self, fields: &[S]) -> io::Result<()> {
        let mut first = true;
        for field in fields {
            if !first {
                self.inner.write_all(b"\t")?;
            }
            first = false;
            self.inner.write_all(field.as_ref().as_bytes())?;
        }
        self.inner.write_all(b"\n")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Replace characters that would break the unquoted TSV framing.
pub fn sanitize_field(value: &str) -> Cow<'_, str> {
    if value.contains(['\t', '\n', '\r']) {
        Cow::Owned(value.replace(['\t', '\n', '\r'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

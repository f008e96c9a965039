//! Append-only CSV record sink

use crate::output::traits::{OutputResult, RecordSink};
use crate::record::Record;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const SEPARATOR: char = ',';

/// CSV file opened in append mode, flushed after every row
pub struct CsvSink {
    path: PathBuf,
    file: File,
}

impl CsvSink {
    /// Opens `path` for appending, creating it if needed
    pub fn open(path: &Path) -> OutputResult<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing::debug!("Appending records to {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&mut self, cells: &[&str]) -> OutputResult<()> {
        write_row(&mut self.file, cells)?;
        self.file.flush()?;
        Ok(())
    }
}

impl RecordSink for CsvSink {
    fn has_data(&self) -> OutputResult<bool> {
        Ok(self.file.metadata()?.len() > 0)
    }

    fn write_header(&mut self, header: &[&str]) -> OutputResult<()> {
        self.write_line(header)
    }

    fn append(&mut self, record: &Record) -> OutputResult<()> {
        let cells: Vec<&str> = record.values().iter().map(String::as_str).collect();
        self.write_line(&cells)
    }
}

fn needs_quotes(cell: &str) -> bool {
    cell.contains(SEPARATOR) || cell.contains('"') || cell.contains('\n') || cell.contains('\r')
}

/// Writes one CSV row, quoting cells per RFC 4180
pub fn write_row<W: Write>(mut w: W, cells: &[&str]) -> io::Result<()> {
    let mut first = true;
    for cell in cells {
        if !first {
            write!(w, "{}", SEPARATOR)?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

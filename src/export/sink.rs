use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use csv::{Terminator, WriterBuilder};

use crate::{error::ExportError, types::OutputRow};

/// Destination for exported rows.
///
/// Rows are handed over one at a time as soon as they are produced, so
/// implementations should make each row durable before returning.
pub trait RowSink {
    /// Prepares the output and writes the header row. Called once, before
    /// the first row.
    fn begin(&mut self) -> Result<(), ExportError>;

    fn write_row(&mut self, row: &OutputRow) -> Result<(), ExportError>;

    fn finish(&mut self) -> Result<(), ExportError>;
}

/// Comma separated output over any writer. Records end in a bare `\n`.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(inner: W) -> Self {
        let writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(inner);
        Self { writer }
    }

    /// Flushes pending output and gives back the underlying writer.
    pub fn into_inner(self) -> Result<W, ExportError> {
        self.writer
            .into_inner()
            .map_err(|e| ExportError::Io(e.into_error()))
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn begin(&mut self) -> Result<(), ExportError> {
        self.writer.write_record(OutputRow::header())?;
        self.writer.flush()?;
        Ok(())
    }

    fn write_row(&mut self, row: &OutputRow) -> Result<(), ExportError> {
        self.writer.write_record(row.to_record())?;
        self.writer.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ExportError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// CSV file that is only created when [`RowSink::begin`] is called.
///
/// Whether a failed run leaves an empty file with a header behind thus
/// depends solely on whether the pipeline got as far as calling `begin`.
pub struct CsvFileSink {
    path: PathBuf,
    inner: Option<CsvSink<File>>,
}

impl CsvFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            inner: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` once the file has been created.
    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    fn open(&mut self) -> Result<&mut CsvSink<File>, ExportError> {
        if self.inner.is_none() {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            self.inner = Some(CsvSink::new(File::create(&self.path)?));
        }

        self.inner
            .as_mut()
            .ok_or_else(|| ExportError::Io(std::io::Error::other("output file not open")))
    }
}

impl RowSink for CsvFileSink {
    fn begin(&mut self) -> Result<(), ExportError> {
        self.open()?.begin()
    }

    fn write_row(&mut self, row: &OutputRow) -> Result<(), ExportError> {
        self.open()?.write_row(row)
    }

    fn finish(&mut self) -> Result<(), ExportError> {
        match self.inner.as_mut() {
            Some(sink) => sink.finish(),
            None => Ok(()),
        }
    }
}

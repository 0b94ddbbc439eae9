// ============================================================
// ZIP ARCHIVE ACCESS
// ============================================================
// Open the dataset archive, list entries, stream the CSV entry

use std::fs::File;
use std::io::{ErrorKind, Read, Seek};
use std::path::Path;

use zip::result::ZipError;
use zip::ZipArchive;

use crate::domain::error::{AppError, DiagnosticError};
use crate::infrastructure::csv::RewindableStream;

/// Suffix that marks an entry as CSV
pub const CSV_SUFFIX: &str = ".csv";

/// An open ZIP archive and its entry names in central-directory order
pub struct DatasetArchive<R> {
    archive: ZipArchive<R>,
    names: Vec<String>,
}

impl DatasetArchive<File> {
    /// Open the archive at `path`
    pub fn open(path: &Path) -> Result<Self, DiagnosticError> {
        let file = File::open(path).map_err(|e| DiagnosticError::ArchiveOpen {
            message: e.to_string(),
            trace: DiagnosticError::trace_of(&e),
        })?;
        Self::from_reader(file)
    }
}

impl<R: Read + Seek> DatasetArchive<R> {
    /// Read the central directory from `reader`
    pub fn from_reader(reader: R) -> Result<Self, DiagnosticError> {
        let mut archive = ZipArchive::new(reader).map_err(Self::classify_open_error)?;

        let mut names = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let entry = archive
                .by_index_raw(index)
                .map_err(Self::classify_open_error)?;
            names.push(entry.name().to_string());
        }

        Ok(Self { archive, names })
    }

    /// Entry names in listing order
    pub fn entry_names(&self) -> &[String] {
        &self.names
    }

    /// First entry whose name ends in `.csv`, with its index
    pub fn first_csv(&self) -> Option<(usize, &str)> {
        self.names
            .iter()
            .enumerate()
            .find(|(_, name)| name.ends_with(CSV_SUFFIX))
            .map(|(index, name)| (index, name.as_str()))
    }

    /// Open the entry at `index` as a stream the encoding trial can rewind.
    /// The entry is opened once up front so an unreadable entry is reported
    /// on its own instead of as a decode failure.
    pub fn entry_stream(&mut self, index: usize) -> Result<ZipEntryStream<'_, R>, DiagnosticError> {
        let opened = self.archive.by_index(index).map(|_| ());
        if let Err(e) = opened {
            return Err(DiagnosticError::CsvRead {
                message: e.to_string(),
                trace: DiagnosticError::trace_of(&e),
            });
        }

        Ok(ZipEntryStream {
            archive: &mut self.archive,
            index,
        })
    }

    /// Structural problems are format errors; I/O trouble is generic
    fn classify_open_error(err: ZipError) -> DiagnosticError {
        match &err {
            ZipError::InvalidArchive(_) | ZipError::UnsupportedArchive(_) => {
                DiagnosticError::InvalidArchive(err.to_string())
            }
            ZipError::Io(io) if io.kind() == ErrorKind::UnexpectedEof => {
                DiagnosticError::InvalidArchive(err.to_string())
            }
            _ => DiagnosticError::ArchiveOpen {
                message: err.to_string(),
                trace: DiagnosticError::trace_of(&err),
            },
        }
    }
}

/// A CSV entry inside the archive. Rewinding reopens the entry, since
/// compressed entry readers cannot seek.
pub struct ZipEntryStream<'a, R> {
    archive: &'a mut ZipArchive<R>,
    index: usize,
}

impl<R: Read + Seek> RewindableStream for ZipEntryStream<'_, R> {
    fn rewind_stream(&mut self) -> Result<Box<dyn Read + '_>, AppError> {
        let entry = self.archive.by_index(self.index)?;
        Ok(Box::new(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_lists_entries_in_order() {
        let bytes = build_zip(&[("readme.txt", b"hi"), ("b.csv", b"x\n1\n"), ("a.csv", b"y\n2\n")]);
        let archive = DatasetArchive::from_reader(Cursor::new(bytes)).unwrap();

        assert_eq!(archive.entry_names(), &["readme.txt", "b.csv", "a.csv"]);
        assert_eq!(archive.first_csv(), Some((1, "b.csv")));
    }

    #[test]
    fn test_no_csv_entry() {
        let bytes = build_zip(&[("data.CSV", b"x\n"), ("notes.csv.txt", b"")]);
        let archive = DatasetArchive::from_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.first_csv(), None);
    }

    #[test]
    fn test_garbage_is_invalid_archive() {
        let result = DatasetArchive::from_reader(Cursor::new(b"this is not a zip file".to_vec()));
        assert!(matches!(result, Err(DiagnosticError::InvalidArchive(_))));
    }

    #[test]
    fn test_empty_file_is_invalid_archive() {
        let result = DatasetArchive::from_reader(Cursor::new(Vec::new()));
        assert!(matches!(result, Err(DiagnosticError::InvalidArchive(_))));
    }

    #[test]
    fn test_entry_stream_rewinds() {
        let bytes = build_zip(&[("data.csv", b"a,b\n1,2\n")]);
        let mut archive = DatasetArchive::from_reader(Cursor::new(bytes)).unwrap();
        let mut stream = archive.entry_stream(0).unwrap();

        for _ in 0..2 {
            let mut body = String::new();
            stream
                .rewind_stream()
                .unwrap()
                .read_to_string(&mut body)
                .unwrap();
            assert_eq!(body, "a,b\n1,2\n");
        }
    }
}

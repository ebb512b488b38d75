use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use cleaner_core::{StartError, Table};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::decode::decode_text;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableIoError {
    #[error("cannot read {path}: {reason}")]
    UnreadableInput { path: String, reason: String },
    #[error("{0} is open in another program")]
    WriteLocked(String),
    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: String, reason: String },
}

impl From<TableIoError> for StartError {
    fn from(err: TableIoError) -> Self {
        match err {
            TableIoError::UnreadableInput { .. } => StartError::UnreadableInput(err.to_string()),
            TableIoError::WriteLocked(path) => StartError::WriteLocked(path),
            TableIoError::WriteFailed { .. } => StartError::OutputUnwritable(err.to_string()),
        }
    }
}

/// Durable destination for table checkpoints.
pub trait CheckpointStore: Send + Sync {
    fn persist(&self, table: &Table) -> Result<(), TableIoError>;
    fn location(&self) -> &Path;
}

/// CSV checkpoint file, replaced atomically on every persist.
#[derive(Debug, Clone)]
pub struct CsvTableStore {
    path: PathBuf,
    utf8_bom: bool,
}

impl CsvTableStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            utf8_bom: false,
        }
    }

    /// Prefix the file with a UTF-8 BOM so spreadsheet tools detect the encoding.
    pub fn with_bom(mut self, utf8_bom: bool) -> Self {
        self.utf8_bom = utf8_bom;
        self
    }

    /// Refuse a destination that another program holds open.
    pub fn ensure_unlocked(&self) -> Result<(), TableIoError> {
        if is_locked(&self.path) {
            return Err(TableIoError::WriteLocked(self.path.display().to_string()));
        }
        Ok(())
    }

    /// Checked before a run starts: not locked, and the directory exists (it
    /// is created if missing) and accepts new files.
    pub fn ensure_writable(&self) -> Result<(), TableIoError> {
        self.ensure_unlocked()?;
        let failed = |reason: String| TableIoError::WriteFailed {
            path: self.path.display().to_string(),
            reason,
        };
        let dir = parent_dir(&self.path);
        ensure_dir(&dir).map_err(|e| failed(e.to_string()))?;
        // Writability probe: the temp file is removed on drop.
        NamedTempFile::new_in(&dir).map_err(|e| failed(e.to_string()))?;
        Ok(())
    }
}

impl CheckpointStore for CsvTableStore {
    fn persist(&self, table: &Table) -> Result<(), TableIoError> {
        self.ensure_unlocked()?;
        save_table(table, &self.path, self.utf8_bom)
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

/// Load a CSV table. The first record is the header; short rows are padded.
pub fn load_table(path: &Path) -> Result<Table, TableIoError> {
    let unreadable = |reason: String| TableIoError::UnreadableInput {
        path: path.display().to_string(),
        reason,
    };

    let bytes = fs::read(path).map_err(|e| unreadable(e.to_string()))?;
    let decoded = decode_text(&bytes).map_err(|e| unreadable(e.to_string()))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(decoded.text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| unreadable(e.to_string()))?
        .clone();
    if headers.is_empty() {
        return Err(unreadable("missing header row".into()));
    }
    let columns = headers
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let name = name.trim();
            if name.is_empty() {
                format!("column_{}", i + 1)
            } else {
                name.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| unreadable(e.to_string()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(Table::new(columns, rows))
}

/// Write the whole table to `path` through a temp file and rename.
pub fn save_table(table: &Table, path: &Path, utf8_bom: bool) -> Result<(), TableIoError> {
    let failed = |reason: String| TableIoError::WriteFailed {
        path: path.display().to_string(),
        reason,
    };

    let dir = parent_dir(path);
    ensure_dir(&dir).map_err(|e| failed(e.to_string()))?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| failed(e.to_string()))?;
    if utf8_bom {
        tmp.write_all(UTF8_BOM).map_err(|e| failed(e.to_string()))?;
    }
    {
        let mut writer = csv::WriterBuilder::new().from_writer(tmp.as_file_mut());
        writer
            .write_record(table.headers())
            .map_err(|e| failed(e.to_string()))?;
        for row in table.rows() {
            writer.write_record(row).map_err(|e| failed(e.to_string()))?;
        }
        writer.flush().map_err(|e| failed(e.to_string()))?;
    }
    tmp.as_file_mut()
        .sync_all()
        .map_err(|e| failed(e.to_string()))?;

    tmp.persist(path).map_err(|e| {
        if e.error.kind() == io::ErrorKind::PermissionDenied {
            TableIoError::WriteLocked(path.display().to_string())
        } else {
            failed(e.error.to_string())
        }
    })?;
    Ok(())
}

/// An existing file is locked when it cannot be opened for append, or when an
/// office lock file sits next to it.
pub fn is_locked(path: &Path) -> bool {
    if path.exists() {
        if let Err(err) = OpenOptions::new().append(true).open(path) {
            if err.kind() == io::ErrorKind::PermissionDenied {
                return true;
            }
        }
    }
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let dir = parent_dir(path);
    dir.join(format!("~${name}")).exists() || dir.join(format!(".~lock.{name}#")).exists()
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn ensure_dir(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir)
}

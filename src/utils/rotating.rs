//! Size-bounded, count-bounded append-only log file.
//!
//! Rotation follows the classic numbered-backup scheme: the active file is
//! `events.log`, older generations are `events.log.1` (newest) through
//! `events.log.N` (oldest). When the next record would push the active file
//! to `max_bytes`, generations shift up by one, `events.log.N` is dropped and
//! a fresh active file is started.
//!
//! ```no_run
//! use weka_event_logger::utils::rotating::RotatingFileWriter;
//!
//! let mut log = RotatingFileWriter::open("weka_events.log", 10 * 1024 * 1024, 6).unwrap();
//! log.write_record(r#"{"type":"NodeUp"}"#).unwrap();
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct RotatingFileWriter {
    path: PathBuf,
    max_bytes: u64,
    max_files: usize,
    file: File,
    size: u64,
}

impl RotatingFileWriter {
    /// Open (or create) the active file at `path` for appending.
    ///
    /// A `max_bytes` or `max_files` of zero disables rotation.
    pub fn open(path: impl AsRef<Path>, max_bytes: u64, max_files: usize) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = open_append(&path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            path,
            max_bytes,
            max_files,
            file,
            size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes currently in the active file.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Path of backup generation `n` (1 = newest).
    pub fn backup_path(&self, n: usize) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{n}"));
        PathBuf::from(name)
    }

    fn should_rotate(&self, incoming: u64) -> bool {
        self.max_bytes > 0
            && self.max_files > 0
            && self.size > 0
            && self.size + incoming >= self.max_bytes
    }

    /// Shift every generation up by one and start a new active file.
    pub fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        let oldest = self.backup_path(self.max_files);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for n in (1..self.max_files).rev() {
            let from = self.backup_path(n);
            if from.exists() {
                fs::rename(&from, self.backup_path(n + 1))?;
            }
        }
        if self.path.exists() {
            fs::rename(&self.path, self.backup_path(1))?;
        }

        self.file = open_append(&self.path)?;
        self.size = 0;
        Ok(())
    }

    /// Append one line, rotating first if it would overflow the active file.
    pub fn write_record(&mut self, record: &str) -> io::Result<()> {
        let incoming = record.len() as u64 + 1;
        if self.should_rotate(incoming) {
            self.rotate()?;
        }

        let mut line = String::with_capacity(record.len() + 1);
        line.push_str(record);
        line.push('\n');
        self.file.write_all(line.as_bytes())?;
        self.file.flush()?;
        self.size += incoming;
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

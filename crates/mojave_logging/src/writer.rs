//! Log file writers shared across threads by the `fmt` layers.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Size-based rotation in the log4j style: `app.log` rolls to `app.log.1`,
/// `app.log.1` to `app.log.2`, and so on up to `max_backup_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingPolicy {
    pub max_file_size: u64,
    /// Rotated files kept; 0 truncates the active file instead.
    pub max_backup_index: u32,
}

struct LogFile {
    path: PathBuf,
    rolling: Option<RollingPolicy>,
    file: Option<File>,
    current_size: u64,
}

impl LogFile {
    fn open(path: &Path, rolling: Option<RollingPolicy>) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut log = Self {
            path: path.to_path_buf(),
            rolling,
            file: None,
            current_size: 0,
        };
        log.reopen()?;
        if log.exceeds(0) {
            log.rotate()?;
        }
        Ok(log)
    }

    fn reopen(&mut self) -> io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.current_size = file.metadata()?.len();
        self.file = Some(file);
        Ok(())
    }

    fn exceeds(&self, incoming: usize) -> bool {
        match self.rolling {
            Some(policy) => self.current_size + incoming as u64 > policy.max_file_size,
            None => false,
        }
    }

    fn rotated_path(&self, index: u32) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }

        let max_index = self.rolling.map_or(0, |policy| policy.max_backup_index);
        if max_index == 0 {
            fs::remove_file(&self.path).or_else(ignore_not_found)?;
        } else {
            let oldest = self.rotated_path(max_index);
            fs::remove_file(&oldest).or_else(ignore_not_found)?;

            for idx in (1..max_index).rev() {
                let src = self.rotated_path(idx);
                if src.exists() {
                    fs::rename(&src, self.rotated_path(idx + 1))?;
                }
            }

            if self.path.exists() {
                fs::rename(&self.path, self.rotated_path(1))?;
            }
        }

        self.reopen()
    }
}

fn ignore_not_found(err: io::Error) -> io::Result<()> {
    if err.kind() == io::ErrorKind::NotFound {
        Ok(())
    } else {
        Err(err)
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // A single record larger than the limit still goes into a fresh file.
        if self.current_size > 0 && self.exceeds(buf.len()) {
            self.rotate()?;
        }

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "log file unavailable"))?;
        let bytes = file.write(buf)?;
        self.current_size += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

/// Cloneable handle to one log file, usable as a `MakeWriter`.
#[derive(Clone)]
pub struct SharedFileWriter {
    inner: Arc<Mutex<LogFile>>,
}

impl SharedFileWriter {
    /// Open `path` for appending, creating parent directories as needed.
    pub fn open(path: &Path, rolling: Option<RollingPolicy>) -> io::Result<Self> {
        Ok(Self {
            inner: Arc::new(Mutex::new(LogFile::open(path, rolling)?)),
        })
    }
}

pub struct SharedFileWriterGuard {
    inner: Arc<Mutex<LogFile>>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedFileWriter {
    type Writer = SharedFileWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileWriterGuard {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Write for SharedFileWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        guard.flush()
    }
}

//! Rotating file writer plugged into `tracing_subscriber::fmt`.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

use crate::logger::config::FileConfig;
use crate::logger::error::LoggerError;
use crate::logger::rotation::RotationManager;

/// Shared handle to the active log file.
///
/// When the file can no longer be written, output falls back to stderr for
/// the rest of the process.
#[derive(Clone)]
pub struct RotatingFileWriter {
    path: PathBuf,
    state: Arc<Mutex<WriterState>>,
}

struct WriterState {
    file: BufWriter<File>,
    size: u64,
    rotation: RotationManager,
    fallback: bool,
}

impl RotatingFileWriter {
    pub fn new(config: &FileConfig) -> Result<Self, LoggerError> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = open_log_file(&config.path, config.append)?;
        let size = if config.append {
            std::fs::metadata(&config.path).map(|m| m.len()).unwrap_or(0)
        } else {
            0
        };

        Ok(Self {
            path: config.path.clone(),
            state: Arc::new(Mutex::new(WriterState {
                file,
                size,
                rotation: RotationManager::new(config.rotation.clone()),
                fallback: false,
            })),
        })
    }
}

impl<'a> MakeWriter<'a> for RotatingFileWriter {
    type Writer = RotatingWriterGuard<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        RotatingWriterGuard { writer: self }
    }
}

pub struct RotatingWriterGuard<'a> {
    writer: &'a RotatingFileWriter,
}

impl RotatingWriterGuard<'_> {
    fn rotate(&self, state: &mut WriterState) -> io::Result<()> {
        state.file.flush()?;
        state
            .rotation
            .rotate(&self.writer.path)
            .map_err(|e| io::Error::other(e.to_string()))?;
        state.file = open_log_file(&self.writer.path, false)?;
        state.size = 0;
        Ok(())
    }
}

impl Write for RotatingWriterGuard<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .writer
            .state
            .lock()
            .map_err(|_| io::Error::other("log writer lock poisoned"))?;

        if state.fallback {
            return io::stderr().write(buf);
        }

        let mut result = Ok(());
        if state.rotation.should_rotate(state.size) {
            result = self.rotate(&mut state);
        }
        let result = result.and_then(|()| state.file.write(buf));

        match result {
            Ok(written) => {
                state.size += written as u64;
                Ok(written)
            }
            Err(e) => {
                state.fallback = true;
                eprintln!("[logger] writing {} failed, falling back to stderr: {e}", self.writer.path.display());
                io::stderr().write(buf)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .writer
            .state
            .lock()
            .map_err(|_| io::Error::other("log writer lock poisoned"))?;

        if state.fallback {
            return io::stderr().flush();
        }
        state.file.flush()
    }
}

impl Drop for RotatingWriterGuard<'_> {
    fn drop(&mut self) {
        // One event per guard; flush so lines reach disk promptly.
        if let Ok(mut state) = self.writer.state.lock() {
            let _ = state.file.flush();
        }
    }
}

fn open_log_file(path: &Path, append: bool) -> io::Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;

    Ok(BufWriter::new(file))
}

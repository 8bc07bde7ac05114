//! Log destinations behind the concurrency guard.
//!
//! The guard is a process-wide reentrant mutex: a shim takes it before the
//! entry half of its record and releases it after the exit half, so blocks
//! never interleave. A notification callback that re-enters the proxy on the
//! same thread takes it again instead of deadlocking.
//!
//! Destinations that cannot be opened or written are skipped silently; the
//! failure count is handed back for the metrics.

use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use pkcs11_logger_core::Settings;

#[derive(Debug)]
enum FileTarget {
    Off,
    /// Opened on the first write.
    Pending(PathBuf),
    Open(File),
    /// Reopened, written and closed for every write.
    PerWrite(PathBuf),
    /// Opening failed once; never retried.
    Failed,
}

#[derive(Debug)]
struct Destinations {
    file: FileTarget,
    stdout: bool,
    stderr: bool,
}

/// Process-wide log output.
#[derive(Debug)]
pub struct LogSink {
    inner: ReentrantMutex<RefCell<Destinations>>,
}

/// Held lock on the sink. Dropping it releases the guard.
pub struct SinkGuard<'a> {
    inner: ReentrantMutexGuard<'a, RefCell<Destinations>>,
}

impl LogSink {
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        let flags = settings.flags;
        let file = match (&settings.log_path, flags.file_log_enabled()) {
            (Some(path), true) if flags.force_flush() => FileTarget::PerWrite(path.clone()),
            (Some(path), true) => FileTarget::Pending(path.clone()),
            _ => FileTarget::Off,
        };
        Self {
            inner: ReentrantMutex::new(RefCell::new(Destinations {
                file,
                stdout: flags.stdout_enabled(),
                stderr: flags.stderr_enabled(),
            })),
        }
    }

    /// Acquire the guard. Blocks other threads, never this one.
    pub fn lock(&self) -> SinkGuard<'_> {
        SinkGuard {
            inner: self.inner.lock(),
        }
    }

    /// Close the log file and stop writing anywhere.
    ///
    /// Returns `false` without closing anything if another thread holds the
    /// guard, or this thread is writing.
    pub fn close(&self) -> bool {
        let Some(guard) = self.inner.try_lock() else {
            return false;
        };
        let Ok(mut destinations) = guard.try_borrow_mut() else {
            return false;
        };
        destinations.file = FileTarget::Off;
        destinations.stdout = false;
        destinations.stderr = false;
        true
    }
}

impl SinkGuard<'_> {
    /// Write `text` to every enabled destination and return how many failed.
    pub fn write(&self, text: &str) -> u64 {
        if text.is_empty() {
            return 0;
        }
        // A re-entrant write from inside a write is dropped rather than
        // interleaved.
        let Ok(mut destinations) = self.inner.try_borrow_mut() else {
            return 1;
        };
        destinations.write(text.as_bytes())
    }
}

impl Destinations {
    fn write(&mut self, bytes: &[u8]) -> u64 {
        let mut failures = 0;
        if self.write_file(bytes).is_err() {
            failures += 1;
        }
        if self.stdout && write_stream(&mut io::stdout().lock(), bytes).is_err() {
            failures += 1;
        }
        if self.stderr && write_stream(&mut io::stderr().lock(), bytes).is_err() {
            failures += 1;
        }
        failures
    }

    fn write_file(&mut self, bytes: &[u8]) -> io::Result<()> {
        if let FileTarget::Pending(path) = &self.file {
            self.file = match open_append(path) {
                Ok(file) => FileTarget::Open(file),
                Err(err) => {
                    self.file = FileTarget::Failed;
                    return Err(err);
                }
            };
        }
        match &mut self.file {
            FileTarget::Off | FileTarget::Failed | FileTarget::Pending(_) => Ok(()),
            FileTarget::Open(file) => file.write_all(bytes),
            FileTarget::PerWrite(path) => {
                let mut file = open_append(path)?;
                file.write_all(bytes)?;
                file.flush()
            }
        }
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn write_stream(stream: &mut impl Write, bytes: &[u8]) -> io::Result<()> {
    stream.write_all(bytes)?;
    stream.flush()
}

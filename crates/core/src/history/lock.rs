//! Write serialization for history logs.
//!
//! Every store on the same log shares one in-process mutex, looked up by
//! path. On unix an advisory `flock` on a `<log>.lock` sidecar also keeps
//! other processes out while the log is read, modified and rewritten.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::error::HistoryError;

lazy_static::lazy_static! {
    static ref PATH_LOCKS: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>> = Mutex::new(HashMap::new());
}

/// Absolute form of `path` with its directory resolved, so different
/// spellings of one log share a lock.
fn lock_key(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|dir| dir.join(name))
            .unwrap_or(absolute),
        _ => absolute,
    }
}

/// The process-wide mutex for the log at `path`.
pub(crate) fn path_lock(path: &Path) -> Arc<Mutex<()>> {
    let mut locks = PATH_LOCKS.lock().unwrap_or_else(|e| e.into_inner());
    locks.entry(lock_key(path)).or_default().clone()
}

/// Sidecar lock file next to the log.
pub(crate) fn lock_file_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

/// Exclusive hold on a log. Released on drop.
pub(crate) struct WriteGuard<'a> {
    #[cfg(unix)]
    _file: FileLock,
    _process: MutexGuard<'a, ()>,
}

impl<'a> WriteGuard<'a> {
    /// Block until this process and (on unix) every other one has let go
    /// of the log at `path`.
    pub(crate) fn acquire(lock: &'a Mutex<()>, path: &Path) -> Result<Self, HistoryError> {
        let process = lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(Self {
            #[cfg(unix)]
            _file: FileLock::acquire(&lock_file_path(path))?,
            _process: process,
        })
    }
}

#[cfg(unix)]
struct FileLock {
    file: std::fs::File,
}

#[cfg(unix)]
impl FileLock {
    fn acquire(path: &Path) -> Result<Self, HistoryError> {
        use std::os::unix::io::AsRawFd;

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| HistoryError::io(dir, e))?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .map_err(|e| HistoryError::io(path, e))?;

        // SAFETY: the descriptor is owned by `file` and stays open for the
        // lifetime of the lock.
        let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) };
        if rc != 0 {
            return Err(HistoryError::io(path, std::io::Error::last_os_error()));
        }
        Ok(Self { file })
    }
}

#[cfg(unix)]
impl Drop for FileLock {
    fn drop(&mut self) {
        use std::os::unix::io::AsRawFd;

        // SAFETY: see `acquire`. Closing the file would release it anyway.
        unsafe {
            libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
        }
    }
}

//! File-backed advisory lock manager (C9): locks are named, held as long as
//! their owning process is alive, and survive process crashes by detecting
//! and clearing stale lock files rather than relying on OS-level flocks.
//!
//! Grounded on `llmspell-kernel::daemon::pid::PidFile`: exclusive-creation
//! acquire with a stale-lock retry, and the `kill(pid, SIGCONT)` liveness
//! check (`EPERM` or success means alive, `ESRCH` means dead). Unlike
//! `PidFile` (one fixed path per daemon), this manager keys an arbitrary
//! number of named locks under one directory, so it writes to a sibling
//! temp file and renames rather than using `flock`.

mod record;

pub use record::LockRecord;

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("lock I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("lock is already held by a live process")]
    AlreadyHeld,
    #[error("lock is not owned by the current process")]
    NotOwned,
}

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const LOCK_SUFFIX: &str = ".lock";

/// File-backed advisory locks identified by name, held under one directory.
pub struct LockManager {
    dir: PathBuf,
}

impl LockManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}{LOCK_SUFFIX}"))
    }

    fn now() -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
    }

    fn read_record(&self, name: &str) -> Option<LockRecord> {
        let text = fs::read_to_string(self.path_for(name)).ok()?;
        LockRecord::from_text(&text)
    }

    #[cfg(unix)]
    fn process_alive(pid: u32) -> bool {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;
        match kill(Pid::from_raw(i32::try_from(pid).unwrap_or(i32::MAX)), Signal::SIGCONT) {
            Ok(()) | Err(nix::errno::Errno::EPERM) => true,
            Err(_) => false,
        }
    }

    #[cfg(not(unix))]
    fn process_alive(_pid: u32) -> bool {
        true
    }

    /// Writes `record` atomically: temp file in the same directory, then
    /// `rename` into place. Unconditional — the caller has already decided
    /// this write is safe (no holder, a dead holder, or ownership confirmed).
    fn write_record(&self, record: &LockRecord) -> Result<(), LockError> {
        fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!(".{}{LOCK_SUFFIX}.{}.tmp", record.name, std::process::id()));
        fs::write(&tmp, record.to_text())?;
        fs::rename(&tmp, self.path_for(&record.name)).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            LockError::Io(e)
        })
    }

    fn acquire_inner(&self, name: &str) -> Result<(), LockError> {
        match self.read_record(name) {
            Some(existing) if Self::process_alive(existing.pid) => return Err(LockError::AlreadyHeld),
            Some(_) => {
                fs::remove_file(self.path_for(name))?;
            }
            None => {}
        }
        self.write_record(&LockRecord::new(name, Self::now()))
    }

    /// Non-blocking acquire: fails if the lock is currently held by a live
    /// process. A lock file left behind by a dead process is treated as
    /// free and cleared before the new record is written.
    pub fn try_acquire(&self, name: &str) -> bool {
        self.acquire_inner(name).is_ok()
    }

    /// Polls at [`POLL_INTERVAL`] until `try_acquire` succeeds or `timeout`
    /// elapses.
    pub fn acquire(&self, name: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.try_acquire(name) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now())));
        }
    }

    fn release_inner(&self, name: &str) -> Result<(), LockError> {
        match self.read_record(name) {
            Some(record) if record.is_owned_by_current_process() => {
                fs::remove_file(self.path_for(name))?;
                Ok(())
            }
            Some(_) => Err(LockError::NotOwned),
            None => Err(LockError::NotOwned),
        }
    }

    /// Removes the lock file only if the current process owns it.
    pub fn release(&self, name: &str) -> bool {
        self.release_inner(name).is_ok()
    }

    /// Removes the lock file unconditionally. Idempotent: a lock that is
    /// already gone counts as released.
    pub fn force_release(&self, name: &str) -> bool {
        match fs::remove_file(self.path_for(name)) {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(_) => false,
        }
    }

    /// Overwrites the timestamp on a lock owned by the current process.
    pub fn refresh(&self, name: &str) -> bool {
        match self.read_record(name) {
            Some(mut record) if record.is_owned_by_current_process() => {
                record.timestamp = Self::now();
                self.write_record(&record).is_ok()
            }
            _ => false,
        }
    }

    /// Blocks until `name` is not held (does not acquire it). Returns
    /// `false` only if `timeout` elapses first.
    pub fn wait(&self, name: &str, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|d| Instant::now() + d);
        loop {
            if !self.is_locked(name) {
                return true;
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return false;
                }
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    pub fn is_locked(&self, name: &str) -> bool {
        self.read_record(name).is_some_and(|record| Self::process_alive(record.pid))
    }

    pub fn is_stale(&self, name: &str, max_age: Duration) -> bool {
        match self.read_record(name) {
            Some(record) if Self::process_alive(record.pid) => {
                Self::now().saturating_sub(record.timestamp) > max_age.as_secs()
            }
            _ => false,
        }
    }

    pub fn get_lock_info(&self, name: &str) -> Option<LockRecord> {
        self.read_record(name)
    }

    /// Every currently-readable lock record under the lock directory, in
    /// directory-iteration order (not sorted).
    pub fn list_locks(&self) -> Vec<LockRecord> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(LOCK_SUFFIX))
            .filter_map(|entry| LockRecord::from_text(&fs::read_to_string(entry.path()).ok()?))
            .collect()
    }

    /// Removes every lock that is either held by a dead process or held
    /// live but older than `max_age`. Returns how many were removed.
    pub fn clear_stale(&self, max_age: Duration) -> usize {
        let mut cleared = 0;
        for record in self.list_locks() {
            let dead = !Self::process_alive(record.pid);
            if dead || self.is_stale(&record.name, max_age) {
                if fs::remove_file(self.path_for(&record.name)).is_ok() {
                    cleared += 1;
                }
            }
        }
        cleared
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn try_acquire_then_try_acquire_again_fails_while_held() {
        let dir = tempdir().unwrap();
        let manager = LockManager::new(dir.path());
        assert!(manager.try_acquire("build"));
        assert!(!manager.try_acquire("build"));
    }

    #[test]
    fn release_unlocks_and_allows_reacquire() {
        let dir = tempdir().unwrap();
        let manager = LockManager::new(dir.path());
        assert!(manager.try_acquire("build"));
        assert!(manager.release("build"));
        assert!(manager.try_acquire("build"));
    }

    #[test]
    fn release_of_unheld_lock_fails() {
        let dir = tempdir().unwrap();
        let manager = LockManager::new(dir.path());
        assert!(!manager.release("build"));
    }

    #[test]
    fn force_release_is_idempotent() {
        let dir = tempdir().unwrap();
        let manager = LockManager::new(dir.path());
        assert!(manager.force_release("build"));
        manager.try_acquire("build");
        assert!(manager.force_release("build"));
        assert!(!manager.is_locked("build"));
    }

    #[test]
    fn a_lock_file_from_a_dead_process_is_not_held() {
        let dir = tempdir().unwrap();
        let manager = LockManager::new(dir.path());
        let record = LockRecord { pid: 999_999, host: "x".to_string(), timestamp: LockManager::now(), name: "build".to_string() };
        fs::write(manager.path_for("build"), record.to_text()).unwrap();
        assert!(!manager.is_locked("build"));
        assert!(manager.try_acquire("build"));
    }

    #[test]
    fn refresh_updates_timestamp_for_owned_lock() {
        let dir = tempdir().unwrap();
        let manager = LockManager::new(dir.path());
        manager.try_acquire("build");
        let before = manager.get_lock_info("build").unwrap().timestamp;
        std::thread::sleep(Duration::from_millis(1100));
        assert!(manager.refresh("build"));
        let after = manager.get_lock_info("build").unwrap().timestamp;
        assert!(after >= before);
    }

    #[test]
    fn is_stale_requires_held_and_past_max_age() {
        let dir = tempdir().unwrap();
        let manager = LockManager::new(dir.path());
        let record = LockRecord::new("build", LockManager::now() - 1000);
        fs::write(manager.path_for("build"), record.to_text()).unwrap();
        assert!(manager.is_stale("build", Duration::from_secs(10)));
        assert!(!manager.is_stale("build", Duration::from_secs(10_000)));
    }

    #[test]
    fn list_locks_reports_every_held_lock() {
        let dir = tempdir().unwrap();
        let manager = LockManager::new(dir.path());
        manager.try_acquire("a");
        manager.try_acquire("b");
        let mut names: Vec<_> = manager.list_locks().into_iter().map(|r| r.name).collect();
        names.sort();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn clear_stale_removes_dead_process_locks_regardless_of_age() {
        let dir = tempdir().unwrap();
        let manager = LockManager::new(dir.path());
        let record = LockRecord { pid: 999_999, host: "x".to_string(), timestamp: LockManager::now(), name: "build".to_string() };
        fs::write(manager.path_for("build"), record.to_text()).unwrap();
        assert_eq!(manager.clear_stale(Duration::from_secs(10_000)), 1);
        assert!(manager.list_locks().is_empty());
    }

    #[test]
    fn wait_returns_immediately_when_not_locked() {
        let dir = tempdir().unwrap();
        let manager = LockManager::new(dir.path());
        assert!(manager.wait("build", Some(Duration::from_millis(10))));
    }

    #[test]
    fn wait_times_out_while_held() {
        let dir = tempdir().unwrap();
        let manager = LockManager::new(dir.path());
        manager.try_acquire("build");
        assert!(!manager.wait("build", Some(Duration::from_millis(30))));
    }

    #[test]
    fn acquire_polls_until_timeout_when_never_freed() {
        let dir = tempdir().unwrap();
        let manager = LockManager::new(dir.path());
        manager.try_acquire("build");
        assert!(!manager.acquire("build", Duration::from_millis(60)));
    }
}

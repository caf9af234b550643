//! The persisted shape of a held lock (§3 "Lock file record", §6 "Lock file
//! layout"): a minimal `key=value` text document, not JSON — the grounding
//! repository's own `PidFile` is a bare-text single-value file, and this
//! format keeps a lock record readable with `cat`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRecord {
    pub pid: u32,
    pub host: String,
    pub timestamp: u64,
    pub name: String,
}

impl LockRecord {
    pub fn new(name: &str, timestamp: u64) -> Self {
        Self { pid: std::process::id(), host: current_host(), timestamp, name: name.to_string() }
    }

    pub fn is_owned_by_current_process(&self) -> bool {
        self.pid == std::process::id()
    }

    pub fn to_text(&self) -> String {
        format!("pid={}\nhost={}\ntimestamp={}\nname={}\n", self.pid, self.host, self.timestamp, self.name)
    }

    pub fn from_text(text: &str) -> Option<Self> {
        let mut pid = None;
        let mut host = None;
        let mut timestamp = None;
        let mut name = None;
        for line in text.lines() {
            let (key, value) = line.split_once('=')?;
            match key {
                "pid" => pid = value.parse().ok(),
                "host" => host = Some(value.to_string()),
                "timestamp" => timestamp = value.parse().ok(),
                "name" => name = Some(value.to_string()),
                _ => {}
            }
        }
        Some(Self { pid: pid?, host: host?, timestamp: timestamp?, name: name? })
    }
}

#[cfg(unix)]
fn current_host() -> String {
    nix::unistd::gethostname().map(|name| name.to_string_lossy().into_owned()).unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(not(unix))]
fn current_host() -> String {
    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_owned_by_the_current_process() {
        let record = LockRecord::new("build", 1);
        assert!(record.is_owned_by_current_process());
        assert_eq!(record.name, "build");
    }

    #[test]
    fn record_round_trips_through_text() {
        let record = LockRecord::new("build", 42);
        let back = LockRecord::from_text(&record.to_text()).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn from_text_rejects_a_record_missing_a_field() {
        assert!(LockRecord::from_text("pid=1\nhost=x\ntimestamp=2\n").is_none());
    }
}

//! Logging capability handed to the matcher.
//!
//! The matcher never calls a global logger directly. Callers pass a
//! [`MatchLog`] implementation: [`GlobalLog`] forwards to the `log` facade
//! (so `env_logger` or any other backend picks it up), [`MemoryLog`] keeps
//! records in memory so tests can assert on warnings.
use log::Level;
use std::cell::RefCell;

pub trait MatchLog {
    fn log(&self, level: Level, msg: &str);

    fn debug(&self, msg: &str) {
        self.log(Level::Debug, msg);
    }

    fn info(&self, msg: &str) {
        self.log(Level::Info, msg);
    }

    fn warn(&self, msg: &str) {
        self.log(Level::Warn, msg);
    }

    fn error(&self, msg: &str) {
        self.log(Level::Error, msg);
    }
}

/// Forwards every record to `log::log!` under the `eegmontage` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobalLog;

impl MatchLog for GlobalLog {
    fn log(&self, level: Level, msg: &str) {
        log::log!(target: "eegmontage", level, "{msg}");
    }
}

/// Collects records in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    records: RefCell<Vec<(Level, String)>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far.
    pub fn records(&self) -> Vec<(Level, String)> {
        self.records.borrow().clone()
    }

    /// Number of records whose message contains `needle`.
    pub fn count_containing(&self, needle: &str) -> usize {
        self.records
            .borrow()
            .iter()
            .filter(|(_, m)| m.contains(needle))
            .count()
    }
}

impl MatchLog for MemoryLog {
    fn log(&self, level: Level, msg: &str) {
        self.records.borrow_mut().push((level, msg.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_log_keeps_level_and_message() {
        let log = MemoryLog::new();
        log.info("NaN coordinate at Fp1");
        log.warn("tie");
        let recs = log.records();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0], (Level::Info, "NaN coordinate at Fp1".to_string()));
        assert_eq!(recs[1].0, Level::Warn);
        assert_eq!(log.count_containing("NaN"), 1);
    }
}

use std::collections::HashMap;

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

/// Display names longer than this are cut off.
pub const NAME_LIMIT: usize = 40;

#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub pid: Pid,
    pub name: String,
}

/// Background jobs still running, keyed by pid. Insert and remove are
/// O(1); nothing here depends on iteration order.
#[derive(Default)]
pub struct JobTable {
    jobs: HashMap<Pid, JobRecord>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pid: Pid, name: &str) {
        let name = match name.char_indices().nth(NAME_LIMIT) {
            Some((cut, _)) => name[..cut].to_string(),
            None => name.to_string(),
        };
        self.jobs.insert(pid, JobRecord { pid, name });
    }

    /// Collect every child that has already terminated, without blocking,
    /// and remove the matching records. A reported pid with no record is
    /// normal, not an error: foreground children and interior pipeline
    /// stages are never entered into the table, yet they surface through
    /// the same wait call. Those are skipped silently.
    pub fn reap_finished(&mut self) -> Vec<JobRecord> {
        let mut finished = Vec::new();
        loop {
            match waitpid(None, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) => break,
                Ok(status) => {
                    let Some(pid) = status.pid() else { break };
                    if let Some(record) = self.jobs.remove(&pid) {
                        finished.push(record);
                    }
                }
                // no children at all
                Err(Errno::ECHILD) => break,
                Err(_) => break,
            }
        }
        finished
    }

    /// Jobs sorted by pid, for stable listings.
    pub fn list(&self) -> Vec<&JobRecord> {
        let mut jobs: Vec<&JobRecord> = self.jobs.values().collect();
        jobs.sort_by_key(|job| job.pid.as_raw());
        jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.jobs.contains_key(&pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn insert_and_list() {
        let mut table = JobTable::new();
        table.insert(Pid::from_raw(42), "sleep");
        table.insert(Pid::from_raw(7), "find");

        let listed = table.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].pid, Pid::from_raw(7));
        assert_eq!(listed[0].name, "find");
        assert_eq!(listed[1].pid, Pid::from_raw(42));
    }

    #[test]
    fn names_are_truncated_to_the_display_bound() {
        let mut table = JobTable::new();
        let long = "x".repeat(NAME_LIMIT + 20);
        table.insert(Pid::from_raw(1), &long);
        assert_eq!(table.list()[0].name.chars().count(), NAME_LIMIT);
    }

    #[test]
    fn empty_table_lists_nothing() {
        let table = JobTable::new();
        assert!(table.is_empty());
        assert!(table.list().is_empty());
    }

    #[test]
    fn reap_removes_exactly_the_finished_job() {
        let mut table = JobTable::new();

        // a real child that exits immediately; never waited on by std
        let tracked = Command::new("true").spawn().expect("spawn true");
        let tracked_pid = Pid::from_raw(tracked.id() as i32);
        table.insert(tracked_pid, "true");

        // an untracked sibling: reap must skip it without complaint
        let _untracked = Command::new("true").spawn().expect("spawn true");

        let mut reaped = Vec::new();
        for _ in 0..50 {
            reaped.extend(table.reap_finished());
            if reaped.iter().any(|r| r.pid == tracked_pid) {
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }

        assert_eq!(reaped.len(), 1);
        assert_eq!(reaped[0].name, "true");
        assert!(!table.contains(tracked_pid));

        // nothing left to report, and the table is untouched
        assert!(table.reap_finished().is_empty());
        assert!(table.is_empty());
    }
}

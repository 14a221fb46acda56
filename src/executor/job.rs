use std::process::Child;
use tracing::{debug, warn};
use crate::ast::Pipeline;

/// What the driver needs to announce a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobNotice {
    pub pid: u32,
    pub label: String,
}

/// A detached pipeline. Its public id is the pid of the final stage.
#[derive(Debug)]
pub struct Job {
    pub id: u32,
    pub pgid: u32,
    pub pids: Vec<u32>,
    pub label: String,
    children: Vec<Child>,
}

impl Job {
    pub fn notice(&self) -> JobNotice {
        JobNotice {
            pid: self.id,
            label: self.label.clone(),
        }
    }

    pub fn running(&self) -> usize {
        self.children.len()
    }

    // Returns true once every stage has been collected.
    fn poll(&mut self) -> bool {
        let id = self.id;
        self.children.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                debug!(job = id, pid = child.id(), %status, "background stage finished");
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!(job = id, pid = child.id(), error = %e, "failed to poll background stage");
                false
            }
        });
        self.children.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct JobTable {
    jobs: Vec<Job>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the spawned stages of a background pipeline. Returns `None`
    /// when no stage could be started.
    pub fn register(&mut self, pipeline: &Pipeline, children: Vec<Child>) -> Option<JobNotice> {
        let pids: Vec<u32> = children.iter().map(Child::id).collect();
        let (&pgid, &id) = (pids.first()?, pids.last()?);
        let job = Job {
            id,
            pgid,
            pids,
            label: pipeline.label().to_string(),
            children,
        };
        debug!(job = job.id, pgid = job.pgid, pids = ?job.pids, label = %job.label, "registered background job");
        let notice = job.notice();
        self.jobs.push(job);
        Some(notice)
    }

    /// Non-blocking: removes and returns the jobs whose stages have all exited.
    pub fn reap(&mut self) -> Vec<JobNotice> {
        let mut finished = Vec::new();
        self.jobs.retain_mut(|job| {
            if job.poll() {
                finished.push(job.notice());
                false
            } else {
                true
            }
        });
        finished
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use std::time::{Duration, Instant};
    use crate::ast::Command as ShellCommand;

    fn reap_until_done(table: &mut JobTable) -> Vec<JobNotice> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let done = table.reap();
            if !done.is_empty() || Instant::now() > deadline {
                return done;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
    }

    #[test]
    fn test_register_uses_last_pid_as_id() {
        let pipeline = Pipeline::new(vec![ShellCommand::new(["true"]), ShellCommand::new(["sleep", "0"])]);
        let first = Command::new("true").spawn().unwrap();
        let last = Command::new("sleep").arg("0").spawn().unwrap();
        let (first_pid, last_pid) = (first.id(), last.id());

        let mut table = JobTable::new();
        let notice = table.register(&pipeline, vec![first, last]).unwrap();

        assert_eq!(notice, JobNotice { pid: last_pid, label: "sleep".into() });
        assert_eq!(table.jobs()[0].pgid, first_pid);
        assert_eq!(table.jobs()[0].pids, vec![first_pid, last_pid]);

        let done = reap_until_done(&mut table);
        assert_eq!(done, vec![notice]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_register_without_children() {
        let pipeline = Pipeline::new(vec![ShellCommand::new(["nosuch"])]);
        let mut table = JobTable::new();
        assert_eq!(table.register(&pipeline, Vec::new()), None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_reap_leaves_running_jobs() {
        let pipeline = Pipeline::new(vec![ShellCommand::new(["sleep", "5"])]);
        let child = Command::new("sleep").arg("5").spawn().unwrap();
        let mut table = JobTable::new();
        table.register(&pipeline, vec![child]).unwrap();

        assert!(table.reap().is_empty());
        assert_eq!(table.len(), 1);
        assert_eq!(table.jobs()[0].running(), 1);

        // Clean up so no stray sleep outlives the test.
        for job in &mut table.jobs {
            for child in &mut job.children {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
    }
}

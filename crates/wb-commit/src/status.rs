//! Observable autosave state

use chrono::{DateTime, Utc};

/// Snapshot of a debouncer's bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitStatus {
    /// A value is waiting for its timer
    pub pending: bool,
    /// A taken value is being committed or waits for the previous commit
    pub committing: bool,
    /// Commits completed so far
    pub commit_count: u64,
    /// Values replaced before they could be committed
    pub superseded_count: u64,
    /// Wall-clock time the last commit finished
    pub last_committed_at: Option<DateTime<Utc>>,
}

impl CommitStatus {
    /// Nothing pending and nothing running
    #[inline]
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.pending && !self.committing
    }

    /// At least one commit has completed
    #[inline]
    #[must_use]
    pub fn has_committed(&self) -> bool {
        self.commit_count > 0
    }

    pub(crate) fn record_commit(&mut self, at: DateTime<Utc>) {
        self.committing = false;
        self.commit_count += 1;
        self.last_committed_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_idle() {
        let status = CommitStatus::default();
        assert!(status.is_idle());
        assert!(!status.has_committed());
        assert!(status.last_committed_at.is_none());
    }

    #[test]
    fn record_commit_updates_counters() {
        let mut status = CommitStatus {
            committing: true,
            ..CommitStatus::default()
        };
        let now = Utc::now();
        status.record_commit(now);

        assert!(status.is_idle());
        assert_eq!(status.commit_count, 1);
        assert_eq!(status.last_committed_at, Some(now));
    }
}

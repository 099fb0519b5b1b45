use crate::types::{LogIndex, Term};

/// Position of the last entry of the replicated log, as seen by the election.
///
/// Log replication lives outside of this crate; a node only needs to know where its
/// log ends in order to advertise it to voters and to judge other candidates.
pub trait Log: Send + Sync + 'static {
    fn last_index(&self) -> LogIndex;
    fn last_term(&self) -> Term;

    /// Returns true if a candidate whose log ends at `(last_log_term, last_log_index)`
    /// is at least as up to date as this log.
    fn is_up_to_date(&self, last_log_term: Term, last_log_index: LogIndex) -> bool {
        (last_log_term, last_log_index) >= (self.last_term(), self.last_index())
    }
}

/// Stands in for a node without a log. Every candidate is up to date.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLog;

impl Log for NoLog {
    fn last_index(&self) -> LogIndex {
        0
    }

    fn last_term(&self) -> Term {
        Term::default()
    }

    fn is_up_to_date(&self, _last_log_term: Term, _last_log_index: LogIndex) -> bool {
        true
    }
}

/// A fixed log position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogPosition {
    pub last_index: LogIndex,
    pub last_term: Term,
}

impl LogPosition {
    pub fn new(last_term: Term, last_index: LogIndex) -> Self {
        Self {
            last_index,
            last_term,
        }
    }
}

impl Log for LogPosition {
    fn last_index(&self) -> LogIndex {
        self.last_index
    }

    fn last_term(&self) -> Term {
        self.last_term
    }
}

//! Display of operation outcomes: batch decisions, queue status and drains.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::models::{BatchResult, DrainReport, SyncQueueStatus};

impl fmt::Display for BatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} succeeded, {} failed",
            self.successful.len(),
            self.failed.len()
        )?;
        for id in &self.successful {
            writeln!(f, "- ✓ {id}")?;
        }
        for failure in &self.failed {
            writeln!(f, "- ✗ {}: {}", failure.id, failure.error)?;
        }
        Ok(())
    }
}

impl fmt::Display for SyncQueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} pending, {} dead-lettered",
            self.pending_count, self.dead_letter_count
        )?;
        for item in &self.items {
            write!(
                f,
                "- {} {} of plan {} (queued {}",
                item.id,
                item.operation,
                item.plan_id,
                LocalDateTime(item.enqueued_at)
            )?;
            if item.retry_count > 0 {
                write!(f, ", {} failed attempt(s)", item.retry_count)?;
            }
            if let Some(at) = item.next_attempt_at {
                write!(f, ", next try {}", LocalDateTime(at))?;
            }
            if item.dead_lettered {
                write!(f, ", dead-lettered")?;
            }
            writeln!(f, ")")?;
            if let Some(error) = &item.last_error {
                writeln!(f, "  last error: {error}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for DrainReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Replayed {} queued mutation(s)", self.replayed.len())?;
        if !self.dead_lettered.is_empty() {
            write!(f, ", dead-lettered {}", self.dead_lettered.len())?;
        }
        if let Some(failed) = &self.failed {
            write!(f, "; stopped at {failed}")?;
        }
        if self.deferred > 0 {
            write!(f, "; {} waiting for backoff", self.deferred)?;
        }
        writeln!(f)
    }
}

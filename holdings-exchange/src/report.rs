//! Run report
//!
//! Shared by every pipeline stage through an `Arc`. Counters are plain
//! atomics; the coverage profile (only kept when enabled) sits behind a
//! short-lived mutex. Read with [`ExchangeReport::snapshot`] once the
//! output stream has completed.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::DropReason;

/// Coverage engine timings
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CoverageProfile {
    pub iterations: usize,
    pub total: Duration,
    pub shortest: Option<Duration>,
    pub longest: Option<Duration>,
}

impl CoverageProfile {
    fn record(&mut self, elapsed: Duration) {
        self.iterations += 1;
        self.total += elapsed;
        self.shortest = Some(self.shortest.map_or(elapsed, |s| s.min(elapsed)));
        self.longest = Some(self.longest.map_or(elapsed, |l| l.max(elapsed)));
    }

    pub fn average(&self) -> Option<Duration> {
        u32::try_from(self.iterations)
            .ok()
            .filter(|n| *n > 0)
            .map(|n| self.total / n)
    }
}

#[derive(Debug)]
pub struct ExchangeReport {
    started_at: DateTime<Utc>,
    finished_at: Mutex<Option<DateTime<Utc>>>,
    records_seen: AtomicUsize,
    records_emitted: AtomicUsize,
    dropped_malformed: AtomicUsize,
    dropped_query_failed: AtomicUsize,
    dropped_no_results: AtomicUsize,
    dropped_total_mismatch: AtomicUsize,
    dropped_ambiguous_monograph: AtomicUsize,
    coverage_runs: AtomicUsize,
    profile: Option<Mutex<CoverageProfile>>,
}

impl ExchangeReport {
    pub fn new(profile: bool) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: Mutex::new(None),
            records_seen: AtomicUsize::new(0),
            records_emitted: AtomicUsize::new(0),
            dropped_malformed: AtomicUsize::new(0),
            dropped_query_failed: AtomicUsize::new(0),
            dropped_no_results: AtomicUsize::new(0),
            dropped_total_mismatch: AtomicUsize::new(0),
            dropped_ambiguous_monograph: AtomicUsize::new(0),
            coverage_runs: AtomicUsize::new(0),
            profile: profile.then(|| Mutex::new(CoverageProfile::default())),
        }
    }

    pub fn record_seen(&self) {
        self.records_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_emitted(&self) {
        self.records_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed(&self) {
        self.dropped_malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self, reason: &DropReason) {
        let counter = match reason {
            DropReason::QueryFailed(_) => &self.dropped_query_failed,
            DropReason::NoResults => &self.dropped_no_results,
            DropReason::TotalMismatch { .. } => &self.dropped_total_mismatch,
            DropReason::AmbiguousMonograph { .. } => &self.dropped_ambiguous_monograph,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one engine run, timing it when profiling is enabled
    pub fn record_coverage_run(&self, elapsed: Duration) {
        self.coverage_runs.fetch_add(1, Ordering::Relaxed);
        if let Some(profile) = &self.profile {
            if let Ok(mut profile) = profile.lock() {
                profile.record(elapsed);
            }
        }
    }

    pub fn finish(&self) {
        if let Ok(mut finished_at) = self.finished_at.lock() {
            finished_at.get_or_insert_with(Utc::now);
        }
    }

    pub fn snapshot(&self) -> ReportSnapshot {
        ReportSnapshot {
            started_at: self.started_at,
            finished_at: self.finished_at.lock().ok().and_then(|f| *f),
            records_seen: self.records_seen.load(Ordering::Relaxed),
            records_emitted: self.records_emitted.load(Ordering::Relaxed),
            dropped_malformed: self.dropped_malformed.load(Ordering::Relaxed),
            dropped_query_failed: self.dropped_query_failed.load(Ordering::Relaxed),
            dropped_no_results: self.dropped_no_results.load(Ordering::Relaxed),
            dropped_total_mismatch: self.dropped_total_mismatch.load(Ordering::Relaxed),
            dropped_ambiguous_monograph: self.dropped_ambiguous_monograph.load(Ordering::Relaxed),
            coverage_runs: self.coverage_runs.load(Ordering::Relaxed),
            profile: self
                .profile
                .as_ref()
                .and_then(|p| p.lock().ok().map(|p| *p)),
        }
    }
}

impl Default for ExchangeReport {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Plain copy of the report counters
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSnapshot {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub records_seen: usize,
    pub records_emitted: usize,
    pub dropped_malformed: usize,
    pub dropped_query_failed: usize,
    pub dropped_no_results: usize,
    pub dropped_total_mismatch: usize,
    pub dropped_ambiguous_monograph: usize,
    pub coverage_runs: usize,
    pub profile: Option<CoverageProfile>,
}

impl ReportSnapshot {
    pub fn dropped(&self) -> usize {
        self.dropped_malformed
            + self.dropped_query_failed
            + self.dropped_no_results
            + self.dropped_total_mismatch
            + self.dropped_ambiguous_monograph
    }
}

impl fmt::Display for ReportSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Generated exchange records: {}/{}",
            self.records_emitted, self.records_seen
        )?;
        writeln!(
            f,
            "Dropped: {} (malformed {}, query failed {}, no results {}, total mismatch {}, ambiguous monograph {})",
            self.dropped(),
            self.dropped_malformed,
            self.dropped_query_failed,
            self.dropped_no_results,
            self.dropped_total_mismatch,
            self.dropped_ambiguous_monograph
        )?;
        writeln!(f, "Coverage runs: {}", self.coverage_runs)?;

        if let Some(profile) = &self.profile {
            writeln!(
                f,
                "Coverage profile: {} iterations, total {:?}, shortest {:?}, longest {:?}, average {:?}",
                profile.iterations,
                profile.total,
                profile.shortest.unwrap_or_default(),
                profile.longest.unwrap_or_default(),
                profile.average().unwrap_or_default()
            )?;
        }

        write!(f, "Start date: {}", self.started_at.to_rfc3339())?;
        if let Some(finished_at) = self.finished_at {
            write!(f, "\nEnd date: {}", finished_at.to_rfc3339())?;
        }
        Ok(())
    }
}

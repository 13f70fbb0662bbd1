// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Hooks a caller can hang on a running render: a progress observer,
//! and a flag to stop the render between rows.  Neither one changes
//! what a finished render computes.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Receives the share of rows finished so far, in whole percent.
/// Reports only ever go up, and each value is reported at most once.
pub trait Progress: Sync {
    /// Called with a percentage in `1..=100`.
    fn report(&self, percent: u32);
}

impl<F> Progress for F
where
    F: Fn(u32) + Sync,
{
    fn report(&self, percent: u32) {
        self(percent)
    }
}

/// Writes progress to the log at debug level.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogProgress;

impl Progress for LogProgress {
    fn report(&self, percent: u32) {
        tracing::debug!(percent, "render progress");
    }
}

/// A shared stop flag.  Clones all see the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A flag that has not been raised.
    pub fn new() -> Self {
        CancelFlag::default()
    }

    /// Ask every render watching this flag to stop at its next row.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What a caller hands to a render besides its configuration.
#[derive(Clone, Default)]
pub struct RenderControls<'a> {
    /// Where progress goes, if anywhere.
    pub progress: Option<&'a dyn Progress>,
    /// Checked before each row.
    pub cancel: Option<CancelFlag>,
}

impl<'a> RenderControls<'a> {
    /// Report progress to `progress`.
    pub fn with_progress(mut self, progress: &'a dyn Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Stop when `cancel` is raised.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub(crate) fn cancelled(&self) -> bool {
        self.cancel.as_ref().map_or(false, CancelFlag::is_cancelled)
    }
}

// Counts finished rows across workers and throttles reports to whole
// percent steps.
pub(crate) struct RowTracker<'a> {
    observer: Option<&'a dyn Progress>,
    rows: usize,
    done: AtomicUsize,
    last: Mutex<u32>,
}

impl<'a> RowTracker<'a> {
    pub(crate) fn new(observer: Option<&'a dyn Progress>, rows: usize) -> Self {
        RowTracker {
            observer,
            rows,
            done: AtomicUsize::new(0),
            last: Mutex::new(0),
        }
    }

    pub(crate) fn row_done(&self) {
        let observer = match self.observer {
            Some(observer) => observer,
            None => return,
        };
        let done = self.done.fetch_add(1, Ordering::SeqCst) + 1;
        let percent = (done * 100 / self.rows.max(1)) as u32;
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if percent > *last {
            *last = percent;
            observer.report(percent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn controls_see_the_flag() {
        let flag = CancelFlag::new();
        let controls = RenderControls::default().with_cancel(flag.clone());
        assert!(!controls.cancelled());
        flag.cancel();
        assert!(controls.cancelled());
        assert!(!RenderControls::default().cancelled());
    }

    #[test]
    fn tracker_reports_each_percent_once() {
        let seen = Mutex::new(Vec::new());
        {
            let observer = |percent: u32| seen.lock().unwrap().push(percent);
            let tracker = RowTracker::new(Some(&observer), 400);
            for _ in 0..400 {
                tracker.row_done();
            }
        }
        let seen = seen.into_inner().unwrap();
        assert_eq!(seen, (1..=100).collect::<Vec<u32>>());
    }

    #[test]
    fn tracker_skips_percents_on_short_renders() {
        let seen = Mutex::new(Vec::new());
        {
            let observer = |percent: u32| seen.lock().unwrap().push(percent);
            let tracker = RowTracker::new(Some(&observer), 3);
            for _ in 0..3 {
                tracker.row_done();
            }
        }
        assert_eq!(seen.into_inner().unwrap(), vec![33, 66, 100]);
    }
}

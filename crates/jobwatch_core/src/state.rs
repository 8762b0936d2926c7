use std::collections::VecDeque;

use crate::render::render;
use crate::view_model::{DisplayLogEntry, PollView};
use crate::{format_timestamp, DisplayZone, HistoryEntry, JobCategory, JobHandle, ProgressSnapshot};

/// Most recent item-log lines kept for display.
pub const LOG_CAPACITY: usize = 50;
/// Consecutive not-found responses that end a poll.
pub const NOT_FOUND_LIMIT: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// The timer is running.
    #[default]
    Polling,
    /// Terminal status seen; the timer is stopped and the view awaits dismissal.
    Finished,
    /// Dismissed or swept; nothing more happens.
    Closed,
}

/// Per-poll state. Owned by exactly one poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerState {
    handle: JobHandle,
    category: JobCategory,
    zone: DisplayZone,
    lifecycle: Lifecycle,
    snapshot: Option<ProgressSnapshot>,
    transient_error: Option<String>,
    history_cursor: usize,
    log: VecDeque<DisplayLogEntry>,
    not_found_streak: u32,
    issued_seq: u64,
    applied_seq: u64,
    dirty: bool,
}

impl PollerState {
    pub fn new(handle: JobHandle, zone: DisplayZone) -> Self {
        Self {
            category: handle.category(),
            handle,
            zone,
            lifecycle: Lifecycle::Polling,
            snapshot: None,
            transient_error: None,
            history_cursor: 0,
            log: VecDeque::with_capacity(LOG_CAPACITY),
            not_found_streak: 0,
            issued_seq: 0,
            applied_seq: 0,
            dirty: true,
        }
    }

    pub fn handle(&self) -> &JobHandle {
        &self.handle
    }

    pub fn category(&self) -> JobCategory {
        self.category
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn snapshot(&self) -> Option<&ProgressSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn transient_error(&self) -> Option<&str> {
        self.transient_error.as_deref()
    }

    pub fn history_cursor(&self) -> usize {
        self.history_cursor
    }

    pub fn not_found_streak(&self) -> u32 {
        self.not_found_streak
    }

    pub fn log(&self) -> impl Iterator<Item = &DisplayLogEntry> {
        self.log.iter()
    }

    pub fn view(&self) -> PollView {
        PollView {
            handle: self.handle.clone(),
            category: self.category,
            lifecycle: self.lifecycle,
            progress: render(self.category, self.snapshot.as_ref()),
            log: self.log.iter().cloned().collect(),
            transient_error: self.transient_error.clone(),
        }
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn issue_seq(&mut self) -> u64 {
        self.issued_seq += 1;
        self.issued_seq
    }

    /// Results are applied in issue order; older ones and ones for another handle are stale.
    pub(crate) fn accepts(&self, handle: &JobHandle, seq: u64) -> bool {
        self.lifecycle == Lifecycle::Polling && *handle == self.handle && seq > self.applied_seq
    }

    pub(crate) fn mark_applied(&mut self, seq: u64) {
        self.applied_seq = seq;
    }

    pub(crate) fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        if self.lifecycle != lifecycle {
            self.lifecycle = lifecycle;
            self.dirty = true;
        }
    }

    /// Drops everything learned about the previous handle. Sequence numbers
    /// keep counting so late results for the old handle stay stale.
    pub(crate) fn reset_for(&mut self, handle: JobHandle) {
        self.category = handle.category();
        self.handle = handle;
        self.lifecycle = Lifecycle::Polling;
        self.snapshot = None;
        self.transient_error = None;
        self.history_cursor = 0;
        self.log.clear();
        self.not_found_streak = 0;
        self.applied_seq = self.issued_seq;
        self.dirty = true;
    }

    pub(crate) fn set_transient_error(&mut self, message: String) {
        if self.transient_error.as_deref() != Some(message.as_str()) {
            self.transient_error = Some(message);
            self.dirty = true;
        }
    }

    /// Returns the streak after counting this response.
    pub(crate) fn record_not_found(&mut self) -> u32 {
        self.not_found_streak += 1;
        self.not_found_streak
    }

    /// Stores a fresh snapshot and appends log lines for history entries not seen yet.
    ///
    /// Returns the number of new log lines.
    pub(crate) fn apply_snapshot(&mut self, snapshot: ProgressSnapshot) -> usize {
        self.not_found_streak = 0;
        self.transient_error = None;

        let history = &snapshot.items_history;
        let fresh = history.get(self.history_cursor..).unwrap_or_default();
        let added = fresh.len();
        for entry in fresh {
            if self.log.len() == LOG_CAPACITY {
                self.log.pop_front();
            }
            self.log.push_back(log_entry(entry, self.zone));
        }
        self.history_cursor = self.history_cursor.max(history.len());

        self.snapshot = Some(snapshot);
        self.dirty = true;
        added
    }
}

fn log_entry(entry: &HistoryEntry, zone: DisplayZone) -> DisplayLogEntry {
    let raw = entry.timestamp.as_deref().unwrap_or_default();
    DisplayLogEntry {
        id: format!("{}-{}", entry.index, raw),
        time: format_timestamp(raw, zone),
        success: entry.success,
        item: entry.item.clone(),
    }
}

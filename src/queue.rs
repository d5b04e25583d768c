//! Bounded FIFO buffer for records awaiting a connection.
//!
//! The queue never reorders: arrivals beyond capacity are rejected while the
//! records already queued keep their positions.

use std::collections::VecDeque;

use thiserror::Error;

use crate::log_record::LogRecord;

/// Returned by [`OutboundQueue::enqueue`] when the queue is at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("outbound queue is full ({capacity} records)")]
pub struct QueueFull {
    pub capacity: usize,
}

#[derive(Debug, Default)]
pub struct OutboundQueue {
    records: VecDeque<LogRecord>,
    capacity: Option<usize>,
    dropped: u64,
}

impl OutboundQueue {
    /// Create a queue holding at most `capacity` records, or any number when
    /// `capacity` is `None`.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity.unwrap_or_default().min(1024)),
            capacity,
            dropped: 0,
        }
    }

    pub fn bounded(capacity: usize) -> Self {
        Self::new(Some(capacity))
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Append `record`, or drop it when the queue is full.
    pub fn enqueue(&mut self, record: LogRecord) -> Result<(), QueueFull> {
        if let Some(capacity) = self.capacity
            && self.records.len() >= capacity
        {
            self.dropped += 1;
            return Err(QueueFull { capacity });
        }
        self.records.push_back(record);
        Ok(())
    }

    /// Yield queued records oldest first.
    ///
    /// Records are removed one at a time as the iterator advances. Dropping
    /// the iterator early leaves the remaining records queued in order.
    pub fn drain(&mut self) -> Drain<'_> {
        Drain {
            records: &mut self.records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Number of records rejected because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Iterator returned by [`OutboundQueue::drain`].
#[derive(Debug)]
pub struct Drain<'a> {
    records: &'a mut VecDeque<LogRecord>,
}

impl Iterator for Drain<'_> {
    type Item = LogRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.records.len(), Some(self.records.len()))
    }
}

// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{sequence::SequenceNumber, time::Timestamp};

/// Delivery information copied into a segment when it is first transmitted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Snapshot {
    /// The time the segment was transmitted
    pub sent_time: Timestamp,
    /// [`DeliveryState::delivered_bytes`](super::DeliveryState::delivered_bytes) at the time
    /// the segment was sent
    pub delivered_bytes: u64,
    /// [`DeliveryState::delivered_time`](super::DeliveryState::delivered_time) at the time
    /// the segment was sent
    pub delivered_time: Timestamp,
    /// [`DeliveryState::first_sent_time`](super::DeliveryState::first_sent_time) at the time
    /// the segment was sent
    pub first_sent_time: Timestamp,
    /// Whether the sender was application-limited at the time the segment was sent
    pub is_app_limited: bool,
    /// The volume of data that was estimated to be in flight at the time the segment was sent
    pub bytes_in_flight: u32,
}

impl Snapshot {
    /// Returns true if `self` was sent after `other`
    ///
    /// Segments sent later observe at least as many delivered bytes, so the delivered count
    /// orders them. Segments sent without any delivery in between fall back to the send time.
    #[inline]
    pub fn is_newer_than(&self, other: &Self) -> bool {
        (self.delivered_bytes, self.sent_time) > (other.delivered_bytes, other.sent_time)
    }
}

/// A transmitted range of the byte stream
///
/// Segments are owned by the retransmission queue; the rate estimator only annotates them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    start: SequenceNumber,
    len: u32,
    snapshot: Option<Snapshot>,
    is_delivered: bool,
}

impl Segment {
    #[inline]
    pub fn new(start: SequenceNumber, len: u32) -> Self {
        Self {
            start,
            len,
            snapshot: None,
            is_delivered: false,
        }
    }

    #[inline]
    pub fn start(&self) -> SequenceNumber {
        self.start
    }

    /// The sequence number following the last byte of the segment
    #[inline]
    pub fn end(&self) -> SequenceNumber {
        self.start + self.len
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The delivery information captured on the first transmission of this segment
    #[inline]
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Returns true once the segment has been (s)acked and counted
    #[inline]
    pub fn is_delivered(&self) -> bool {
        self.is_delivered
    }

    /// Stores the snapshot unless one was already recorded
    ///
    /// Returns `false` for retransmissions, which keep the original snapshot.
    #[inline]
    pub(crate) fn record(&mut self, snapshot: Snapshot) -> bool {
        if self.snapshot.is_some() {
            return false;
        }
        self.snapshot = Some(snapshot);
        true
    }

    /// Marks the segment as counted, returning its snapshot the first time only
    #[inline]
    pub(crate) fn mark_delivered(&mut self) -> Option<Snapshot> {
        if self.is_delivered {
            return None;
        }
        let snapshot = self.snapshot?;
        self.is_delivered = true;
        Some(snapshot)
    }
}

// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{rate::segment::Snapshot, time::Timestamp};

/// Per-connection delivery accounting
///
/// See [Delivery Rate Estimation](https://datatracker.ietf.org/doc/draft-cheng-iccrg-delivery-rate-estimation/).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeliveryState {
    /// The total amount of data in bytes delivered so far over the lifetime of the connection
    delivered_bytes: u64,
    /// The time `delivered_bytes` was last updated, or if the connection was recently idle,
    /// the send time of the first segment sent after resuming from idle.
    delivered_time: Option<Timestamp>,
    /// The send time of the segment most recently marked as delivered, or if the connection
    /// was recently idle, the send time of the first segment sent after resuming from idle.
    first_sent_time: Option<Timestamp>,
    /// The delivered count at which the current application-limited period ends
    app_limited: Option<u64>,
    /// Bytes (s)acked during the current ACK-processing pass
    acked_sacked_bytes: u64,
    /// `Snapshot::delivered_bytes` of the segment most recently marked as delivered
    last_delivered_at_send: u64,
}

impl DeliveryState {
    /// The total amount of data in bytes delivered so far over the lifetime of the connection
    #[inline]
    pub fn delivered_bytes(&self) -> u64 {
        self.delivered_bytes
    }

    #[inline]
    pub fn delivered_time(&self) -> Option<Timestamp> {
        self.delivered_time
    }

    #[inline]
    pub fn first_sent_time(&self) -> Option<Timestamp> {
        self.first_sent_time
    }

    /// The delivered byte count beyond which the sender is network-limited again, if the
    /// sender is currently application-limited
    #[inline]
    pub fn app_limited(&self) -> Option<u64> {
        self.app_limited
    }

    #[inline]
    pub fn is_app_limited(&self) -> bool {
        self.app_limited.is_some()
    }

    #[inline]
    pub fn acked_sacked_bytes(&self) -> u64 {
        self.acked_sacked_bytes
    }

    #[inline]
    pub fn last_delivered_at_send(&self) -> u64 {
        self.last_delivered_at_send
    }

    /// Opens a new sampling window if nothing is in flight
    ///
    /// Returns `true` if the window was restarted.
    #[inline]
    pub(crate) fn on_transmission(&mut self, is_start_of_transmission: bool, now: Timestamp) -> bool {
        //= https://tools.ietf.org/id/draft-cheng-iccrg-delivery-rate-estimation-02#3.2
        //# If there are no packets in flight yet, then we can start the delivery rate interval
        //# at the current time, since we know that any ACKs after now indicate that the network
        //# was able to deliver those packets completely in the sampling interval between now
        //# and the next ACK.
        if is_start_of_transmission || self.first_sent_time.is_none() || self.delivered_time.is_none()
        {
            self.first_sent_time = Some(now);
            self.delivered_time = Some(now);
            return true;
        }

        false
    }

    /// Captures the state for a segment sent at `now`
    #[inline]
    pub(crate) fn snapshot(&self, bytes_in_flight: u32, now: Timestamp) -> Snapshot {
        debug_assert!(
            self.delivered_time.is_some() && self.first_sent_time.is_some(),
            "on_transmission must be called first"
        );

        Snapshot {
            sent_time: now,
            delivered_bytes: self.delivered_bytes,
            delivered_time: self.delivered_time.unwrap_or(now),
            first_sent_time: self.first_sent_time.unwrap_or(now),
            is_app_limited: self.is_app_limited(),
            bytes_in_flight,
        }
    }

    /// Accounts for `bytes` of a segment that was just (s)acked
    #[inline]
    pub(crate) fn on_delivered(&mut self, bytes: u64, snapshot: &Snapshot, now: Timestamp) {
        self.delivered_bytes = self.delivered_bytes.saturating_add(bytes);
        self.delivered_time = Some(now);
        self.acked_sacked_bytes = self.acked_sacked_bytes.saturating_add(bytes);
        self.last_delivered_at_send = snapshot.delivered_bytes;

        // Everything outstanding when the application ran dry has now been delivered
        if self
            .app_limited
            .is_some_and(|end| self.delivered_bytes > end)
        {
            self.app_limited = None;
        }
    }

    /// Moves the start of the send interval to the newest delivered segment
    #[inline]
    pub(crate) fn on_reference_updated(&mut self, snapshot: &Snapshot) {
        self.first_sent_time = Some(snapshot.sent_time);
    }

    /// Marks the sender as application-limited until everything currently in flight is delivered
    #[inline]
    pub(crate) fn on_app_limited(&mut self, bytes_in_flight: u32) {
        self.app_limited = Some(self.delivered_bytes.saturating_add(bytes_in_flight as u64));
    }

    /// Returns the bytes (s)acked in the pass that just ended and starts a new one
    #[inline]
    pub(crate) fn take_acked_sacked(&mut self) -> u64 {
        core::mem::take(&mut self.acked_sacked_bytes)
    }
}

// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::sequence::SequenceNumber;
#[cfg(any(test, feature = "generator"))]
use bolero_generator::*;

/// The sender's view of its transmission budget at the time it ran out of work
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "generator"), derive(TypeGenerator))]
pub struct SendWindow {
    /// The congestion window, in bytes
    pub congestion_window: u32,
    /// Bytes sent but not yet acknowledged
    pub bytes_in_flight: u32,
    /// The size of a full segment, in bytes
    pub segment_size: u32,
    /// The sequence number following the last byte the application has queued
    pub tail_sequence: SequenceNumber,
    /// The sequence number of the next byte to transmit
    pub next_tx_sequence: SequenceNumber,
    /// Segments declared lost
    pub lost_out: u32,
    /// Lost segments that have since been retransmitted
    pub retrans_out: u32,
}

impl SendWindow {
    pub fn new(
        congestion_window: u32,
        bytes_in_flight: u32,
        segment_size: u32,
        tail_sequence: SequenceNumber,
        next_tx_sequence: SequenceNumber,
    ) -> Self {
        Self {
            congestion_window,
            bytes_in_flight,
            segment_size,
            tail_sequence,
            next_tx_sequence,
            lost_out: 0,
            retrans_out: 0,
        }
    }

    /// Sets the loss recovery counters
    pub fn with_retransmissions(mut self, lost_out: u32, retrans_out: u32) -> Self {
        self.lost_out = lost_out;
        self.retrans_out = retrans_out;
        self
    }

    /// Bytes queued by the application but not yet transmitted
    #[inline]
    pub fn unsent_bytes(&self) -> u32 {
        (self.tail_sequence - self.next_tx_sequence).max(0) as u32
    }

    /// Returns `true` if the sender is limited by the application rather than the network
    ///
    /// The sender is network-limited while any of the following hold:
    /// * the congestion window is fully used
    /// * at least a full segment of data is waiting to be sent
    /// * lost segments are still waiting to be retransmitted
    #[inline]
    pub fn is_app_limited(&self) -> bool {
        let cwnd_limited = self.bytes_in_flight >= self.congestion_window;
        let data_queued = self.unsent_bytes() >= self.segment_size;
        let retransmission_pending = self.lost_out > self.retrans_out;

        !(cwnd_limited || data_queued || retransmission_pending)
    }
}

// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{
    rate::{bandwidth::Bandwidth, segment::Snapshot},
    time::Timestamp,
};
use core::time::Duration;

/// The reason a [`RateSample`] should not be trusted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Invalid {
    /// The receiver reneged on previously selectively acknowledged data
    Reneged,
    /// The sampling interval was shorter than the minimum round-trip time
    SubRtt,
    /// No segment has been delivered on the connection yet
    Uninitialized,
    /// Earlier segments were delivered, but none in this ACK-processing pass
    NoDelivery,
    /// The sampling interval was zero
    ZeroInterval,
}

/// A delivery rate measurement with associated metadata
///
/// Consumers must check [`RateSample::is_valid`] before using the delivery rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RateSample {
    /// The delivery rate over the sampling interval
    pub delivery_rate: Bandwidth,
    /// [`Snapshot::is_app_limited`] from the most recently sent delivered segment
    pub is_app_limited: bool,
    /// The length of the sampling interval
    pub interval: Duration,
    /// The amount of data in bytes marked as delivered over the sampling interval
    pub delivered_bytes: u64,
    /// The amount of data in bytes (s)acked in this ACK-processing pass
    pub acked_sacked_bytes: u64,
    /// [`Snapshot::delivered_bytes`] from the most recently sent delivered segment
    pub prior_delivered_bytes: u64,
    /// [`Snapshot::delivered_time`] from the most recently sent delivered segment
    pub prior_time: Option<Timestamp>,
    /// The time between the start of the send window and the reference segment's transmission
    pub send_elapsed: Duration,
    /// The time between the reference segment's delivered time and the ACK
    pub ack_elapsed: Duration,
    /// The number of segments newly marked lost in this ACK-processing pass
    pub packet_loss: u32,
    /// [`Snapshot::bytes_in_flight`] from the most recently sent delivered segment
    pub prior_bytes_in_flight: u32,
    invalid: Option<Invalid>,
}

impl RateSample {
    /// Returns an invalid sample carrying only the per-pass counters
    #[inline]
    pub(crate) fn invalid(reason: Invalid, acked_sacked_bytes: u64, packet_loss: u32) -> Self {
        Self {
            acked_sacked_bytes,
            packet_loss,
            invalid: Some(reason),
            ..Default::default()
        }
    }

    /// Populates the fields that come directly from the reference segment
    #[inline]
    pub(crate) fn from_reference(
        reference: &Snapshot,
        delivered_bytes_now: u64,
        acked_sacked_bytes: u64,
        packet_loss: u32,
        now: Timestamp,
    ) -> Self {
        debug_assert!(delivered_bytes_now >= reference.delivered_bytes);

        let send_elapsed = reference.sent_time - reference.first_sent_time;
        let ack_elapsed = now - reference.delivered_time;

        //= https://tools.ietf.org/id/draft-cheng-iccrg-delivery-rate-estimation-02#2.2.4
        //# Since it is physically impossible to have data delivered faster than it is sent
        //# in a sustained fashion, when the estimator notices that the ack_rate for a flight
        //# is faster than the send rate for the flight, it filters out the implausible ack_rate
        //# by capping the delivery rate sample to be no higher than the send rate.
        let interval = send_elapsed.max(ack_elapsed);

        Self {
            delivery_rate: Bandwidth::ZERO,
            is_app_limited: reference.is_app_limited,
            interval,
            delivered_bytes: delivered_bytes_now.saturating_sub(reference.delivered_bytes),
            acked_sacked_bytes,
            prior_delivered_bytes: reference.delivered_bytes,
            prior_time: Some(reference.delivered_time),
            send_elapsed,
            ack_elapsed,
            packet_loss,
            prior_bytes_in_flight: reference.bytes_in_flight,
            invalid: None,
        }
    }

    /// Clears the fields that make the sample valid, keeping the rest for diagnostics
    #[inline]
    pub(crate) fn invalidate(&mut self, reason: Invalid) {
        self.delivery_rate = Bandwidth::ZERO;
        self.interval = Duration::ZERO;
        self.prior_time = None;
        self.invalid = Some(reason);
    }

    /// Computes the delivery rate, invalidating the sample for an empty interval
    #[inline]
    pub(crate) fn finish(&mut self) {
        if self.interval.is_zero() {
            self.invalidate(Invalid::ZeroInterval);
            return;
        }

        self.delivery_rate = Bandwidth::new(self.delivered_bytes, self.interval);
    }

    /// Returns true if the sample measured a real interval
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.prior_time.is_some() || !self.interval.is_zero()
    }

    /// Returns why the sample is invalid, if it is
    #[inline]
    pub fn invalid_reason(&self) -> Option<Invalid> {
        if self.is_valid() {
            None
        } else {
            Some(self.invalid.unwrap_or(Invalid::Uninitialized))
        }
    }

    /// Returns the delivery rate if the sample is valid
    #[inline]
    pub fn delivery_rate(&self) -> Option<Bandwidth> {
        self.is_valid().then_some(self.delivery_rate)
    }
}

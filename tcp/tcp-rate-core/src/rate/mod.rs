// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Delivery rate sampling
//!
//! On every transmission the sender snapshots its delivery accounting into the outgoing
//! [`Segment`]. When segments are (s)acked the newest snapshot among them becomes the
//! reference for the [`RateSample`] generated at the end of the ACK-processing pass.

use crate::{event, time::Timestamp};
use core::time::Duration;

pub mod app_limited;
pub mod bandwidth;
pub mod delivery;
pub mod estimator;
pub mod sample;
pub mod segment;

#[cfg(test)]
mod simulation;

pub use app_limited::SendWindow;
pub use bandwidth::Bandwidth;
pub use delivery::DeliveryState;
pub use estimator::Estimator;
pub use sample::{Invalid, RateSample};
pub use segment::{Segment, Snapshot};

/// Builds the rate estimator for each new connection
pub trait Endpoint: 'static {
    type RateOps: RateOps;

    fn new_rate_ops(&mut self, info: ConnectionInfo) -> Self::RateOps;
}

#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct ConnectionInfo {
    /// An identifier for the connection, unique within the host
    pub id: u64,
}

impl ConnectionInfo {
    pub fn new(id: u64) -> Self {
        Self { id }
    }
}

/// Delivery rate accounting for a single connection
///
/// All methods must be called in the order the sender observes the corresponding events.
pub trait RateOps: 'static + Send {
    /// The connection's delivery accounting
    fn delivery_state(&self) -> &DeliveryState;

    /// The sample produced by the most recent call to [`RateOps::generate_sample`]
    fn rate_sample(&self) -> RateSample;

    /// Called when a segment is transmitted
    ///
    /// `is_start_of_transmission` is true when nothing was in flight before this segment.
    /// Only the first transmission of a segment records a snapshot; retransmissions keep it.
    fn on_segment_sent<Sub: event::Subscriber>(
        &mut self,
        segment: &mut Segment,
        is_start_of_transmission: bool,
        bytes_in_flight: u32,
        now: Timestamp,
        subscriber: &mut Sub,
    );

    /// Called when the sender has run out of data to send
    fn calculate_app_limited<Sub: event::Subscriber>(
        &mut self,
        window: &SendWindow,
        subscriber: &mut Sub,
    );

    /// Called for each segment newly (s)acked in the current ACK-processing pass
    fn on_segment_delivered<Sub: event::Subscriber>(
        &mut self,
        segment: &mut Segment,
        bytes: usize,
        now: Timestamp,
        subscriber: &mut Sub,
    );

    /// Called once at the end of an ACK-processing pass
    ///
    /// `delivered_bytes` is the number of bytes the caller (s)acked in this pass and
    /// `packet_loss` the number of segments it newly marked lost.
    fn generate_sample<Sub: event::Subscriber>(
        &mut self,
        delivered_bytes: u64,
        packet_loss: u32,
        is_sack_reneg: bool,
        min_rtt: Duration,
        now: Timestamp,
        subscriber: &mut Sub,
    ) -> RateSample;
}

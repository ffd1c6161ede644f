// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Notifications emitted by the rate estimator
//!
//! Every notification is delivered synchronously, exactly once and in order, before the
//! originating call returns.

use crate::{
    rate::{DeliveryState, RateSample, Segment},
    sequence::SequenceNumber,
};

#[cfg(feature = "alloc")]
mod registry;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
#[cfg(feature = "event-tracing")]
pub mod tracing;

#[cfg(feature = "alloc")]
pub use registry::Registry;

/// All event types which can be emitted from this library.
pub trait Event {
    const NAME: &'static str;
}

/// A segment was handed to the estimator for transmission
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct SegmentSent<'a> {
    pub segment: &'a Segment,
    /// The segment already carried a snapshot, which was left as-is
    pub is_retransmission: bool,
    pub is_start_of_transmission: bool,
}

impl Event for SegmentSent<'_> {
    const NAME: &'static str = "rate:segment_sent";
}

/// What caused a [`DeliveryStateUpdated`] event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeliveryStateCause {
    /// A new sampling window was opened on transmission
    TransmissionStart,
    /// The sender was found to be application-limited
    AppLimited,
    /// A segment was (s)acked
    Delivered,
}

/// The per-connection delivery accounting changed
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct DeliveryStateUpdated<'a> {
    pub state: &'a DeliveryState,
    pub cause: DeliveryStateCause,
}

impl Event for DeliveryStateUpdated<'_> {
    const NAME: &'static str = "rate:delivery_state_updated";
}

/// A rate sample was produced at the end of an ACK-processing pass
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct RateSampleGenerated {
    pub sample: RateSample,
}

impl Event for RateSampleGenerated {
    const NAME: &'static str = "rate:rate_sample_generated";
}

/// The caller broke the estimator's contract
///
/// Anomalies never abort the operation; the estimator keeps its own accounting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Anomaly {
    /// The delivered count reported for an ACK-processing pass did not match the bytes
    /// accounted for by segment deliveries
    DeliveredCountMismatch { reported: u64, computed: u64 },
    /// A segment was reported as delivered more than once
    DuplicateDelivery { start: SequenceNumber },
    /// A segment was reported as delivered without having been sent
    UnsentSegmentDelivered { start: SequenceNumber },
}

impl Event for Anomaly {
    const NAME: &'static str = "rate:anomaly";
}

/// Observes the rate estimator
///
/// All methods have empty default implementations so subscribers only need to implement
/// the notifications they care about.
pub trait Subscriber {
    #[inline]
    fn on_segment_sent(&mut self, event: &SegmentSent) {
        let _ = event;
    }

    #[inline]
    fn on_delivery_state_updated(&mut self, event: &DeliveryStateUpdated) {
        let _ = event;
    }

    #[inline]
    fn on_rate_sample_generated(&mut self, event: &RateSampleGenerated) {
        let _ = event;
    }

    #[inline]
    fn on_anomaly(&mut self, event: &Anomaly) {
        let _ = event;
    }
}

impl Subscriber for () {}

impl<T: Subscriber + ?Sized> Subscriber for &mut T {
    #[inline]
    fn on_segment_sent(&mut self, event: &SegmentSent) {
        (**self).on_segment_sent(event)
    }

    #[inline]
    fn on_delivery_state_updated(&mut self, event: &DeliveryStateUpdated) {
        (**self).on_delivery_state_updated(event)
    }

    #[inline]
    fn on_rate_sample_generated(&mut self, event: &RateSampleGenerated) {
        (**self).on_rate_sample_generated(event)
    }

    #[inline]
    fn on_anomaly(&mut self, event: &Anomaly) {
        (**self).on_anomaly(event)
    }
}

impl<T: Subscriber> Subscriber for Option<T> {
    #[inline]
    fn on_segment_sent(&mut self, event: &SegmentSent) {
        if let Some(subscriber) = self {
            subscriber.on_segment_sent(event)
        }
    }

    #[inline]
    fn on_delivery_state_updated(&mut self, event: &DeliveryStateUpdated) {
        if let Some(subscriber) = self {
            subscriber.on_delivery_state_updated(event)
        }
    }

    #[inline]
    fn on_rate_sample_generated(&mut self, event: &RateSampleGenerated) {
        if let Some(subscriber) = self {
            subscriber.on_rate_sample_generated(event)
        }
    }

    #[inline]
    fn on_anomaly(&mut self, event: &Anomaly) {
        if let Some(subscriber) = self {
            subscriber.on_anomaly(event)
        }
    }
}

/// Notifies `A` and then `B`
impl<A, B> Subscriber for (A, B)
where
    A: Subscriber,
    B: Subscriber,
{
    #[inline]
    fn on_segment_sent(&mut self, event: &SegmentSent) {
        self.0.on_segment_sent(event);
        self.1.on_segment_sent(event);
    }

    #[inline]
    fn on_delivery_state_updated(&mut self, event: &DeliveryStateUpdated) {
        self.0.on_delivery_state_updated(event);
        self.1.on_delivery_state_updated(event);
    }

    #[inline]
    fn on_rate_sample_generated(&mut self, event: &RateSampleGenerated) {
        self.0.on_rate_sample_generated(event);
        self.1.on_rate_sample_generated(event);
    }

    #[inline]
    fn on_anomaly(&mut self, event: &Anomaly) {
        self.0.on_anomaly(event);
        self.1.on_anomaly(event);
    }
}

#[cfg(feature = "alloc")]
impl<T: Subscriber + ?Sized> Subscriber for alloc::boxed::Box<T> {
    #[inline]
    fn on_segment_sent(&mut self, event: &SegmentSent) {
        (**self).on_segment_sent(event)
    }

    #[inline]
    fn on_delivery_state_updated(&mut self, event: &DeliveryStateUpdated) {
        (**self).on_delivery_state_updated(event)
    }

    #[inline]
    fn on_rate_sample_generated(&mut self, event: &RateSampleGenerated) {
        (**self).on_rate_sample_generated(event)
    }

    #[inline]
    fn on_anomaly(&mut self, event: &Anomaly) {
        (**self).on_anomaly(event)
    }
}

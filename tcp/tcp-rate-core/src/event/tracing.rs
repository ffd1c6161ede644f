// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Emits every notification as a `tracing` event under a per-connection span

use super::*;

#[derive(Clone, Debug)]
pub struct Subscriber {
    span: ::tracing::Span,
}

impl Default for Subscriber {
    fn default() -> Self {
        let span = ::tracing::span!(target: "tcp_rate", ::tracing::Level::DEBUG, "tcp_rate");
        Self { span }
    }
}

impl Subscriber {
    /// Creates a subscriber with a span for the given connection
    pub fn new(connection_id: u64) -> Self {
        let root = ::tracing::span!(target: "tcp_rate", ::tracing::Level::DEBUG, "tcp_rate");
        let span = ::tracing::span!(target: "tcp_rate", parent: root.id(), ::tracing::Level::DEBUG, "conn", id = connection_id);
        Self { span }
    }
}

impl super::Subscriber for Subscriber {
    #[inline]
    fn on_segment_sent(&mut self, event: &SegmentSent) {
        let id = self.span.id();
        let SegmentSent {
            segment,
            is_retransmission,
            is_start_of_transmission,
        } = event;
        ::tracing::event!(
            target: "rate:segment_sent",
            parent: id,
            ::tracing::Level::DEBUG,
            start = segment.start().as_u32(),
            len = segment.len(),
            delivered_at_send = segment.snapshot().map(|s| s.delivered_bytes),
            is_app_limited = segment.snapshot().map(|s| s.is_app_limited),
            is_retransmission,
            is_start_of_transmission
        );
    }

    #[inline]
    fn on_delivery_state_updated(&mut self, event: &DeliveryStateUpdated) {
        let id = self.span.id();
        let DeliveryStateUpdated { state, cause } = event;
        ::tracing::event!(
            target: "rate:delivery_state_updated",
            parent: id,
            ::tracing::Level::DEBUG,
            cause = ::tracing::field::debug(cause),
            delivered_bytes = state.delivered_bytes(),
            delivered_time = ::tracing::field::debug(state.delivered_time()),
            first_sent_time = ::tracing::field::debug(state.first_sent_time()),
            app_limited = state.app_limited()
        );
    }

    #[inline]
    fn on_rate_sample_generated(&mut self, event: &RateSampleGenerated) {
        let id = self.span.id();
        let sample = &event.sample;
        ::tracing::event!(
            target: "rate:rate_sample_generated",
            parent: id,
            ::tracing::Level::DEBUG,
            is_valid = sample.is_valid(),
            invalid_reason = ::tracing::field::debug(sample.invalid_reason()),
            delivery_rate = sample.delivery_rate.as_bits_per_second(),
            interval = ::tracing::field::debug(sample.interval),
            delivered_bytes = sample.delivered_bytes,
            prior_delivered_bytes = sample.prior_delivered_bytes,
            is_app_limited = sample.is_app_limited,
            packet_loss = sample.packet_loss
        );
    }

    #[inline]
    fn on_anomaly(&mut self, event: &Anomaly) {
        let id = self.span.id();
        ::tracing::event!(
            target: "rate:anomaly",
            parent: id,
            ::tracing::Level::WARN,
            anomaly = ::tracing::field::debug(event)
        );
    }
}

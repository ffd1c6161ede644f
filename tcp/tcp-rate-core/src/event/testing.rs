// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::*;
use std::vec::Vec;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sent {
    pub segment: Segment,
    pub is_retransmission: bool,
    pub is_start_of_transmission: bool,
}

/// Records every notification for later inspection
#[derive(Clone, Debug, Default)]
pub struct Subscriber {
    pub sent: Vec<Sent>,
    pub delivery_states: Vec<(DeliveryState, DeliveryStateCause)>,
    pub samples: Vec<RateSample>,
    pub anomalies: Vec<Anomaly>,
}

impl Subscriber {
    /// The most recently generated sample
    pub fn last_sample(&self) -> Option<&RateSample> {
        self.samples.last()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl super::Subscriber for Subscriber {
    fn on_segment_sent(&mut self, event: &SegmentSent) {
        self.sent.push(Sent {
            segment: event.segment.clone(),
            is_retransmission: event.is_retransmission,
            is_start_of_transmission: event.is_start_of_transmission,
        });
    }

    fn on_delivery_state_updated(&mut self, event: &DeliveryStateUpdated) {
        self.delivery_states
            .push((event.state.clone(), event.cause));
    }

    fn on_rate_sample_generated(&mut self, event: &RateSampleGenerated) {
        self.samples.push(event.sample);
    }

    fn on_anomaly(&mut self, event: &Anomaly) {
        self.anomalies.push(*event);
    }
}

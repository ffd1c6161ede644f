// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{
    event::{self, Anomaly, DeliveryStateCause, DeliveryStateUpdated, RateSampleGenerated, SegmentSent},
    rate::{
        self, ConnectionInfo, DeliveryState, Invalid, RateOps, RateSample, Segment, SendWindow,
        Snapshot,
    },
    time::Timestamp,
};
use core::time::Duration;

/// Delivery rate estimator as defined in [Delivery Rate Estimation](https://datatracker.ietf.org/doc/draft-cheng-iccrg-delivery-rate-estimation/)
/// and implemented by Linux in `net/ipv4/tcp_rate.c`.
#[derive(Clone, Debug)]
pub struct Estimator {
    state: DeliveryState,
    /// The newest snapshot delivered in the current ACK-processing pass
    reference: Option<Snapshot>,
    rate_sample: RateSample,
    min_rtt_filter: bool,
}

impl Default for Estimator {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimator {
    pub fn new() -> Self {
        Self {
            state: DeliveryState::default(),
            reference: None,
            rate_sample: RateSample::default(),
            min_rtt_filter: true,
        }
    }

    /// The snapshot that will be used as the basis of the next sample, if any segment has been
    /// delivered in the current ACK-processing pass
    #[inline]
    pub fn reference(&self) -> Option<&Snapshot> {
        self.reference.as_ref()
    }

    #[inline]
    fn publish_state<Sub: event::Subscriber>(&self, cause: DeliveryStateCause, subscriber: &mut Sub) {
        subscriber.on_delivery_state_updated(&DeliveryStateUpdated {
            state: &self.state,
            cause,
        });
    }
}

impl RateOps for Estimator {
    #[inline]
    fn delivery_state(&self) -> &DeliveryState {
        &self.state
    }

    #[inline]
    fn rate_sample(&self) -> RateSample {
        self.rate_sample
    }

    fn on_segment_sent<Sub: event::Subscriber>(
        &mut self,
        segment: &mut Segment,
        is_start_of_transmission: bool,
        bytes_in_flight: u32,
        now: Timestamp,
        subscriber: &mut Sub,
    ) {
        if self.state.on_transmission(is_start_of_transmission, now) {
            self.publish_state(DeliveryStateCause::TransmissionStart, subscriber);
        }

        let is_retransmission = !segment.record(self.state.snapshot(bytes_in_flight, now));

        subscriber.on_segment_sent(&SegmentSent {
            segment: &*segment,
            is_retransmission,
            is_start_of_transmission,
        });
    }

    fn calculate_app_limited<Sub: event::Subscriber>(
        &mut self,
        window: &SendWindow,
        subscriber: &mut Sub,
    ) {
        // The marker is cleared by delivery once the limited window has been delivered
        if window.is_app_limited() {
            self.state.on_app_limited(window.bytes_in_flight);
            self.publish_state(DeliveryStateCause::AppLimited, subscriber);
        }
    }

    //= https://tools.ietf.org/id/draft-cheng-iccrg-delivery-rate-estimation-02#3.3
    //# For each packet that was newly SACKed or ACKed, UpdateRateSample() updates the
    //# rate sample based on a snapshot of connection delivery information from the time
    //# at which the packet was last transmitted.
    fn on_segment_delivered<Sub: event::Subscriber>(
        &mut self,
        segment: &mut Segment,
        bytes: usize,
        now: Timestamp,
        subscriber: &mut Sub,
    ) {
        let Some(snapshot) = segment.mark_delivered() else {
            let start = segment.start();
            let anomaly = if segment.is_delivered() {
                Anomaly::DuplicateDelivery { start }
            } else {
                Anomaly::UnsentSegmentDelivered { start }
            };
            subscriber.on_anomaly(&anomaly);
            return;
        };

        self.state.on_delivered(bytes as u64, &snapshot, now);

        //= https://tools.ietf.org/id/draft-cheng-iccrg-delivery-rate-estimation-02#3.3
        //# UpdateRateSample() is invoked multiple times when a stretched ACK acknowledges
        //# multiple data packets. In this case we use the information from the most recently
        //# sent packet, i.e., the packet with the highest "P.delivered" value.
        if self
            .reference
            .as_ref()
            .is_none_or(|reference| snapshot.is_newer_than(reference))
        {
            self.state.on_reference_updated(&snapshot);
            self.reference = Some(snapshot);
        }

        self.publish_state(DeliveryStateCause::Delivered, subscriber);
    }

    fn generate_sample<Sub: event::Subscriber>(
        &mut self,
        delivered_bytes: u64,
        packet_loss: u32,
        is_sack_reneg: bool,
        min_rtt: Duration,
        now: Timestamp,
        subscriber: &mut Sub,
    ) -> RateSample {
        // Each pass starts with a fresh reference and counter
        let acked_sacked_bytes = self.state.take_acked_sacked();
        let reference = self.reference.take();

        if delivered_bytes != acked_sacked_bytes {
            subscriber.on_anomaly(&Anomaly::DeliveredCountMismatch {
                reported: delivered_bytes,
                computed: acked_sacked_bytes,
            });
        }

        let sample = match reference {
            // SACKed data can no longer be trusted after a renege
            _ if is_sack_reneg => {
                RateSample::invalid(Invalid::Reneged, acked_sacked_bytes, packet_loss)
            }
            None if self.state.delivered_bytes() == 0 => {
                RateSample::invalid(Invalid::Uninitialized, acked_sacked_bytes, packet_loss)
            }
            None => RateSample::invalid(Invalid::NoDelivery, acked_sacked_bytes, packet_loss),
            Some(reference) => {
                let mut sample = RateSample::from_reference(
                    &reference,
                    self.state.delivered_bytes(),
                    acked_sacked_bytes,
                    packet_loss,
                    now,
                );

                // Samples shorter than a round trip are dominated by ACK noise
                if self.min_rtt_filter && sample.interval < min_rtt {
                    sample.invalidate(Invalid::SubRtt);
                } else {
                    sample.finish();
                }

                sample
            }
        };

        self.rate_sample = sample;
        subscriber.on_rate_sample_generated(&RateSampleGenerated { sample });

        sample
    }
}

/// Creates an [`Estimator`] for each connection
#[derive(Clone, Copy, Debug)]
pub struct Endpoint {
    min_rtt_filter: bool,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            min_rtt_filter: true,
        }
    }
}

impl Endpoint {
    pub fn builder() -> builder::Builder {
        builder::Builder::default()
    }
}

impl rate::Endpoint for Endpoint {
    type RateOps = Estimator;

    fn new_rate_ops(&mut self, _info: ConnectionInfo) -> Self::RateOps {
        Estimator {
            min_rtt_filter: self.min_rtt_filter,
            ..Estimator::new()
        }
    }
}

pub mod builder {
    use super::Endpoint;

    /// Build an [`Endpoint`] with application provided overrides
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Builder {
        min_rtt_filter: Option<bool>,
    }

    impl Builder {
        /// Enables or disables discarding samples shorter than the minimum RTT (enabled by default)
        pub fn with_min_rtt_filter(mut self, enabled: bool) -> Self {
            self.min_rtt_filter = Some(enabled);
            self
        }

        pub fn build(self) -> Endpoint {
            let defaults = Endpoint::default();
            Endpoint {
                min_rtt_filter: self.min_rtt_filter.unwrap_or(defaults.min_rtt_filter),
            }
        }
    }
}

// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Drives the estimator with a single flow over a fixed-rate bottleneck

use crate::{
    event::testing,
    rate::{Bandwidth, Estimator, RateOps, RateSample, Segment, SendWindow},
    sequence::SequenceNumber,
    time::{Clock, Duration, NoopClock, Timestamp},
};
use std::{collections::VecDeque, fmt::Write as _};

const MSS: u32 = 1000;
const MIN_RTT: Duration = Duration::from_millis(40);

/// A FIFO bottleneck that serializes one segment at a time
struct Link {
    serialization: Duration,
    rtt: Duration,
    free_at: Timestamp,
}

impl Link {
    /// Returns the time the segment sent at `now` will be acknowledged
    fn transmit(&mut self, now: Timestamp) -> Timestamp {
        let departure = self.free_at.max(now) + self.serialization;
        self.free_at = departure;
        departure + self.rtt
    }

    fn bandwidth(&self) -> Bandwidth {
        Bandwidth::new(MSS as u64, self.serialization)
    }
}

struct Flow {
    estimator: Estimator,
    events: testing::Subscriber,
    link: Link,
    congestion_window: u32,
    in_flight: VecDeque<(Segment, Timestamp)>,
    next_sequence: SequenceNumber,
    app_queue: u32,
    start: Timestamp,
    log: String,
}

impl Flow {
    fn new(congestion_window: u32) -> Self {
        let start = NoopClock.get_time();
        Self {
            estimator: Estimator::default(),
            events: testing::Subscriber::default(),
            link: Link {
                serialization: Duration::from_millis(10),
                rtt: MIN_RTT,
                free_at: start,
            },
            congestion_window,
            in_flight: VecDeque::new(),
            next_sequence: SequenceNumber::default(),
            app_queue: 0,
            start,
            log: String::new(),
        }
    }

    fn bytes_in_flight(&self) -> u32 {
        self.in_flight.iter().map(|(segment, _)| segment.len()).sum()
    }

    /// Runs the flow until every write has been sent and acknowledged
    fn run(&mut self, writes: &[(u64, u32)]) {
        let mut writes: VecDeque<_> = writes
            .iter()
            .map(|(millis, segments)| (self.start + Duration::from_millis(*millis), *segments))
            .collect();

        loop {
            let next_ack = self.in_flight.front().map(|(_, ack_time)| *ack_time);
            let next_write = writes.front().map(|(time, _)| *time);

            match (next_ack, next_write) {
                (Some(ack), Some(write)) if write < ack => {
                    let (_, segments) = writes.pop_front().unwrap();
                    self.on_write(segments, write);
                }
                (Some(ack), _) => self.on_ack(ack),
                (None, Some(write)) => {
                    let (_, segments) = writes.pop_front().unwrap();
                    self.on_write(segments, write);
                }
                (None, None) => break,
            }
        }
    }

    fn on_write(&mut self, segments: u32, now: Timestamp) {
        self.app_queue += segments * MSS;
        self.try_send(now);
    }

    fn on_ack(&mut self, now: Timestamp) {
        let (mut segment, _) = self.in_flight.pop_front().unwrap();
        let len = segment.len();
        self.estimator
            .on_segment_delivered(&mut segment, len as usize, now, &mut self.events);
        let sample =
            self.estimator
                .generate_sample(len as u64, 0, false, MIN_RTT, now, &mut self.events);

        self.try_send(now);
        self.record(&segment, &sample, now);
    }

    fn try_send(&mut self, now: Timestamp) {
        while self.app_queue >= MSS && self.bytes_in_flight() < self.congestion_window {
            let bytes_in_flight = self.bytes_in_flight();
            let mut segment = Segment::new(self.next_sequence, MSS);
            self.estimator.on_segment_sent(
                &mut segment,
                bytes_in_flight == 0,
                bytes_in_flight,
                now,
                &mut self.events,
            );
            self.next_sequence = segment.end();
            self.app_queue -= MSS;
            let ack_time = self.link.transmit(now);
            self.in_flight.push_back((segment, ack_time));
        }

        if self.app_queue == 0 {
            let window = SendWindow::new(
                self.congestion_window,
                self.bytes_in_flight(),
                MSS,
                self.next_sequence,
                self.next_sequence,
            );
            self.estimator
                .calculate_app_limited(&window, &mut self.events);
        }
    }

    fn record(&mut self, segment: &Segment, sample: &RateSample, now: Timestamp) {
        let _ = writeln!(
            self.log,
            "t={}ms seq={} prior_delivered={} delivered={} interval={}ms rate={} app_limited={} valid={} marker={:?}",
            (now - self.start).as_millis(),
            segment.start().as_u32(),
            sample.prior_delivered_bytes,
            sample.delivered_bytes,
            sample.interval.as_millis(),
            sample.delivery_rate,
            sample.is_app_limited,
            sample.is_valid(),
            self.estimator.delivery_state().app_limited(),
        );
    }
}

// Simulations are too slow for Miri
#[test]
#[cfg_attr(miri, ignore)]
fn bottleneck_flow() {
    let mut flow = Flow::new(4 * MSS);
    flow.run(&[(0, 8), (200, 2), (300, 4)]);

    let bottleneck = flow.link.bandwidth();
    assert_eq!(14, flow.events.samples.len());
    for sample in &flow.events.samples {
        // delivery can never outpace the bottleneck
        if let Some(rate) = sample.delivery_rate() {
            assert!(rate <= bottleneck, "{rate} > {bottleneck}");
        }
    }
    assert!(flow.events.anomalies.is_empty());
    assert_eq!(14 * MSS as u64, flow.estimator.delivery_state().delivered_bytes());

    insta::assert_snapshot!(flow.log.trim_end(), @r"
    t=50ms seq=0 prior_delivered=0 delivered=1000 interval=50ms rate=160.00Kbps app_limited=false valid=true marker=None
    t=60ms seq=1000 prior_delivered=0 delivered=2000 interval=60ms rate=266.66Kbps app_limited=false valid=true marker=None
    t=70ms seq=2000 prior_delivered=0 delivered=3000 interval=70ms rate=342.85Kbps app_limited=false valid=true marker=None
    t=80ms seq=3000 prior_delivered=0 delivered=4000 interval=80ms rate=400.00Kbps app_limited=false valid=true marker=None
    t=100ms seq=4000 prior_delivered=1000 delivered=4000 interval=50ms rate=640.00Kbps app_limited=false valid=true marker=Some(8000)
    t=110ms seq=5000 prior_delivered=2000 delivered=4000 interval=60ms rate=533.33Kbps app_limited=false valid=true marker=Some(8000)
    t=120ms seq=6000 prior_delivered=3000 delivered=4000 interval=70ms rate=457.14Kbps app_limited=false valid=true marker=Some(8000)
    t=130ms seq=7000 prior_delivered=4000 delivered=4000 interval=80ms rate=400.00Kbps app_limited=false valid=true marker=Some(8000)
    t=250ms seq=8000 prior_delivered=8000 delivered=1000 interval=50ms rate=160.00Kbps app_limited=true valid=true marker=Some(10000)
    t=260ms seq=9000 prior_delivered=8000 delivered=2000 interval=60ms rate=266.66Kbps app_limited=true valid=true marker=Some(10000)
    t=350ms seq=10000 prior_delivered=10000 delivered=1000 interval=50ms rate=160.00Kbps app_limited=true valid=true marker=Some(14000)
    t=360ms seq=11000 prior_delivered=10000 delivered=2000 interval=60ms rate=266.66Kbps app_limited=true valid=true marker=Some(14000)
    t=370ms seq=12000 prior_delivered=10000 delivered=3000 interval=70ms rate=342.85Kbps app_limited=true valid=true marker=Some(14000)
    t=380ms seq=13000 prior_delivered=10000 delivered=4000 interval=80ms rate=400.00Kbps app_limited=true valid=true marker=Some(14000)
    ");
}

// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::*;
use alloc::{boxed::Box, vec::Vec};

/// An ordered list of subscribers
///
/// Subscribers are notified in registration order. When the `std` feature is enabled, a
/// subscriber that panics is isolated from the estimator and from the other subscribers:
/// the panic is caught, counted and the remaining subscribers are still notified.
#[derive(Default)]
pub struct Registry {
    subscribers: Vec<Box<dyn Subscriber + Send>>,
    failures: u64,
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("subscribers", &self.subscribers.len())
            .field("failures", &self.failures)
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a subscriber to the end of the notification order
    pub fn register<S: Subscriber + Send + 'static>(&mut self, subscriber: S) -> &mut Self {
        self.subscribers.push(Box::new(subscriber));
        self
    }

    pub fn with<S: Subscriber + Send + 'static>(mut self, subscriber: S) -> Self {
        self.register(subscriber);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// The number of notifications that panicked
    #[inline]
    pub fn failures(&self) -> u64 {
        self.failures
    }

    #[inline]
    fn notify<F: FnMut(&mut (dyn Subscriber + Send))>(&mut self, name: &'static str, mut f: F) {
        for subscriber in self.subscribers.iter_mut() {
            if !isolate(|| f(subscriber.as_mut())) {
                self.failures += 1;
                on_failure(name);
            }
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "std")] {
        /// Returns `false` if `f` panicked
        #[inline]
        fn isolate<F: FnOnce()>(f: F) -> bool {
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)).is_ok()
        }
    } else {
        #[inline]
        fn isolate<F: FnOnce()>(f: F) -> bool {
            f();
            true
        }
    }
}

#[inline]
fn on_failure(name: &'static str) {
    #[cfg(feature = "event-tracing")]
    ::tracing::warn!(event = name, "rate event subscriber panicked");
    let _ = name;
}

impl Subscriber for Registry {
    #[inline]
    fn on_segment_sent(&mut self, event: &SegmentSent) {
        self.notify(SegmentSent::NAME, |s| s.on_segment_sent(event));
    }

    #[inline]
    fn on_delivery_state_updated(&mut self, event: &DeliveryStateUpdated) {
        self.notify(DeliveryStateUpdated::NAME, |s| s.on_delivery_state_updated(event));
    }

    #[inline]
    fn on_rate_sample_generated(&mut self, event: &RateSampleGenerated) {
        self.notify(RateSampleGenerated::NAME, |s| s.on_rate_sample_generated(event));
    }

    #[inline]
    fn on_anomaly(&mut self, event: &Anomaly) {
        self.notify(Anomaly::NAME, |s| s.on_anomaly(event));
    }
}

// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use core::{fmt, time::Duration};

/// A data rate, stored in bits per second
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bandwidth {
    bits_per_second: u64,
}

impl Bandwidth {
    pub const ZERO: Bandwidth = Bandwidth { bits_per_second: 0 };

    pub const MAX: Bandwidth = Bandwidth {
        bits_per_second: u64::MAX,
    };

    /// Constructs a new `Bandwidth` from the `bytes` delivered over the given `interval`
    ///
    /// A zero `interval` yields [`Bandwidth::ZERO`].
    pub fn new(bytes: u64, interval: Duration) -> Self {
        const MICRO_BITS_PER_BYTE: u128 = 8 * 1_000_000;

        let micros = interval.as_micros();
        if micros == 0 {
            return Bandwidth::ZERO;
        }

        let bits_per_second = bytes as u128 * MICRO_BITS_PER_BYTE / micros;
        Self {
            bits_per_second: bits_per_second.try_into().unwrap_or(u64::MAX),
        }
    }

    #[inline]
    pub const fn from_bits_per_second(bits_per_second: u64) -> Self {
        Self { bits_per_second }
    }

    #[inline]
    pub const fn as_bits_per_second(self) -> u64 {
        self.bits_per_second
    }

    #[inline]
    pub const fn as_bytes_per_second(self) -> u64 {
        self.bits_per_second / 8
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.bits_per_second == 0
    }
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const UNITS: [(&str, u64); 3] = [("Gbps", 1_000_000_000), ("Mbps", 1_000_000), ("Kbps", 1_000)];

        for (unit, scale) in UNITS {
            if self.bits_per_second >= scale {
                let whole = self.bits_per_second / scale;
                let frac = self.bits_per_second % scale * 100 / scale;
                return write!(f, "{whole}.{frac:02}{unit}");
            }
        }

        write!(f, "{}bps", self.bits_per_second)
    }
}

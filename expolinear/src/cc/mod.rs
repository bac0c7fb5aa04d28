// Copyright (C) 2025, Cloudflare, Inc.
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are
// met:
//
//     * Redistributions of source code must retain the above copyright notice,
//       this list of conditions and the following disclaimer.
//
//     * Redistributions in binary form must reproduce the above copyright
//       notice, this list of conditions and the following disclaimer in the
//       documentation and/or other materials provided with the distribution.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS
// IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO,
// THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR
// PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR
// CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL,
// EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO,
// PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
// PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF
// LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING
// NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE OF THIS
// SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use std::str::FromStr;

// Congestion window constants, in segments.
pub const INITIAL_WINDOW_PACKETS: u64 = 10;

/// Host default slow-start threshold before the first loss.
pub const INFINITE_SSTHRESH: u64 = u64::MAX;

/// Floor applied to every window computed on the ack path.
pub const MINIMUM_WINDOW: u64 = 1;

/// Floor applied when the host undoes a window reduction.
pub const MINIMUM_UNDO_WINDOW: u64 = 2;

/// Smallest increment applied per ack batch in slow start.
pub const MINIMUM_SLOW_START_INCREMENT: u64 = 2;

/// Period, in milliseconds, over which exponential recovery halves the
/// remaining distance to the pre-loss window.
pub const EXPONENTIAL_RECOVERY_PERIOD_MS: u64 = 4;

/// Available congestion control algorithms.
///
/// Both algorithms share the slow start and congestion avoidance laws and
/// differ only in how hard they back off on loss and how they climb back
/// during fast recovery.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Algorithm {
    /// 20% backoff with exponential convergence during recovery (default).
    /// `expolinear` in a string form.
    Expolinear = 0,
    /// 10% backoff with linear growth during recovery. `linear` in a string
    /// form.
    Linear = 1,
}

impl Algorithm {
    /// Returns the registration name of the algorithm.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Expolinear => "expolinear",
            Algorithm::Linear => "linear",
        }
    }
}

impl FromStr for Algorithm {
    type Err = crate::Error;

    /// Converts a string to `Algorithm`.
    ///
    /// If `name` is not valid, `Error::CongestionControl` is returned.
    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        match name {
            "expolinear" => Ok(Algorithm::Expolinear),
            "linear" => Ok(Algorithm::Linear),

            _ => Err(crate::Error::CongestionControl),
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A fraction below 1 used to size the window reduction on loss, so a
/// reduced window always keeps at least one segment.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Fraction {
    numerator: u64,
    denominator: u64,
}

impl Fraction {
    /// Creates a new fraction. Returns `None` unless
    /// `numerator < denominator`.
    pub const fn new(numerator: u64, denominator: u64) -> Option<Self> {
        if numerator >= denominator {
            return None;
        }

        Some(Fraction {
            numerator,
            denominator,
        })
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    /// Returns `value * numerator / denominator`, truncated. Never exceeds
    /// `value`.
    pub fn of(&self, value: u64) -> u64 {
        (u128::from(value) * u128::from(self.numerator) /
            u128::from(self.denominator)) as u64
    }
}

/// How the window climbs back toward its pre-loss value during fast
/// recovery.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RecoveryGrowth {
    /// `baseline + exp_adjust(t, k, decrement) + 1`: recovers half of the
    /// remaining reduction every `k` milliseconds.
    Exponential { k: u64 },

    /// `baseline + t`: one segment per millisecond.
    Linear,
}

/// The parameters distinguishing one algorithm from another.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Share of the pre-loss window removed on entering recovery.
    pub backoff: Fraction,

    /// Recovery growth law.
    pub growth: RecoveryGrowth,
}

impl Variant {
    pub const EXPOLINEAR: Variant = Variant {
        backoff: Fraction {
            numerator: 2,
            denominator: 10,
        },
        growth: RecoveryGrowth::Exponential {
            k: EXPONENTIAL_RECOVERY_PERIOD_MS,
        },
    };

    pub const LINEAR: Variant = Variant {
        backoff: Fraction {
            numerator: 1,
            denominator: 10,
        },
        growth: RecoveryGrowth::Linear,
    };
}

impl From<Algorithm> for Variant {
    fn from(algo: Algorithm) -> Self {
        match algo {
            Algorithm::Expolinear => Variant::EXPOLINEAR,
            Algorithm::Linear => Variant::LINEAR,
        }
    }
}

/// What the host observed while processing an incoming acknowledgment.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Segments newly acknowledged or selectively acknowledged.
    pub acked_sacked: u64,

    /// Segments newly marked lost.
    pub losses: u64,
}

/// A congestion signal delivered by the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Event {
    /// The host detected loss of `count` segments.
    Loss { count: u64 },

    /// The host processed an acknowledgment.
    Ack(Sample),
}

pub use exp::exp_adjust;
pub use phase::Phase;

pub(crate) mod controller;
pub(crate) mod exp;
pub(crate) mod phase;

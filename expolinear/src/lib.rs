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

//! Time-driven congestion window control for reliable byte streams.
//!
//! expolinear computes the congestion window (cwnd) and slow-start threshold
//! (ssthresh) of a connection from two kinds of events, loss and
//! acknowledgment, and the time elapsed since the last phase change. It does
//! not send, schedule or retransmit anything: the host transport feeds it
//! already-processed events and reads the resulting window back.
//!
//! Two algorithms are provided:
//!
//! * `expolinear`: cuts the window by 20% on loss and converges back to the
//!   pre-loss window exponentially, halving the gap every 4ms.
//!
//! * `linear`: cuts the window by 10% on loss and climbs back by one segment
//!   per millisecond.
//!
//! Both grow the window by `2 * t^3` segments per ack batch in slow start,
//! and follow `pre_loss_cwnd + 2 * t` in congestion avoidance.
//!
//! ## Setup
//!
//! A configuration object is shared among connections:
//!
//! ```
//! let mut config = expolinear::Config::new();
//! config.set_cc_algorithm_name("linear")?;
//! config.set_initial_congestion_window_packets(4)?;
//! # Ok::<(), expolinear::Error>(())
//! ```
//!
//! Each connection then owns its own [`Congestion`] instance:
//!
//! ```
//! # let config = expolinear::Config::new();
//! let now = std::time::Instant::now();
//! let mut cc = expolinear::Congestion::new(&config, "conn-1", now);
//!
//! assert_eq!(cc.cwnd(), 10);
//! ```
//!
//! ## Feeding events
//!
//! The host passes the current time and its next sequence number to send with
//! every event. The sequence number lets the controller tell losses that
//! belong to the recovery episode in progress from new ones:
//!
//! ```
//! # let config = expolinear::Config::new();
//! # let now = std::time::Instant::now();
//! # let mut cc = expolinear::Congestion::new(&config, "conn-1", now);
//! let snd_nxt = 10;
//!
//! let sample = expolinear::Sample {
//!     acked_sacked: 2,
//!     losses: 0,
//! };
//! cc.on_ack(&sample, snd_nxt, now);
//! assert_eq!(cc.cwnd(), 12);
//!
//! let ssthresh = cc.on_loss(1, snd_nxt, now);
//! assert_eq!(ssthresh, 6);
//! assert!(cc.in_recovery());
//!
//! // Still the same flight of data: ignored.
//! cc.on_loss(1, snd_nxt, now);
//! assert_eq!(cc.ssthresh(), 6);
//! ```
//!
//! When the host concludes a reduction was spurious it asks for the window to
//! restore with [`Congestion::undo_cwnd()`], which is never below 2.

#[macro_use]
extern crate log;

use std::str::FromStr;

pub use crate::cc::exp_adjust;
pub use crate::cc::Algorithm;
pub use crate::cc::Event;
pub use crate::cc::Fraction;
pub use crate::cc::Phase;
pub use crate::cc::RecoveryGrowth;
pub use crate::cc::Sample;
pub use crate::cc::Variant;
pub use crate::cc::INFINITE_SSTHRESH;
pub use crate::cc::INITIAL_WINDOW_PACKETS;
pub use crate::congestion::Congestion;
pub use crate::congestion::Stats;
pub use crate::error::Error;
pub use crate::error::Result;
pub use crate::time::Epoch;

/// Stores configuration shared between multiple connections.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    cc_algorithm: Algorithm,

    variant: Variant,

    initial_congestion_window_packets: u64,

    initial_ssthresh: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cc_algorithm: Algorithm::Expolinear,
            variant: Variant::EXPOLINEAR,
            initial_congestion_window_packets: INITIAL_WINDOW_PACKETS,
            initial_ssthresh: INFINITE_SSTHRESH,
        }
    }
}

impl Config {
    /// Creates a config object with default values.
    pub fn new() -> Config {
        Config::default()
    }

    /// Sets the congestion control algorithm used by string.
    ///
    /// The default value is `expolinear`. On error `Error::CongestionControl`
    /// will be returned.
    ///
    /// ## Examples:
    ///
    /// ```
    /// let mut config = expolinear::Config::new();
    /// config.set_cc_algorithm_name("linear")?;
    /// # Ok::<(), expolinear::Error>(())
    /// ```
    pub fn set_cc_algorithm_name(&mut self, name: &str) -> Result<()> {
        self.set_cc_algorithm(Algorithm::from_str(name)?);

        Ok(())
    }

    /// Sets the congestion control algorithm used, along with its backoff and
    /// recovery parameters.
    ///
    /// The default value is `Algorithm::Expolinear`.
    pub fn set_cc_algorithm(&mut self, algo: Algorithm) {
        self.cc_algorithm = algo;
        self.variant = Variant::from(algo);
    }

    /// Overrides the backoff and recovery parameters of the configured
    /// algorithm.
    ///
    /// The algorithm name is left as is: [`Congestion::algorithm()`] keeps
    /// reporting the preset the variant was derived from, while
    /// [`Congestion::variant()`] returns the parameters actually in use. A
    /// later call to `set_cc_algorithm()` replaces the variant with the
    /// preset again.
    ///
    /// An exponential growth law with a zero period is rejected with
    /// `Error::InvalidConfig`.
    pub fn set_variant(&mut self, variant: Variant) -> Result<()> {
        if let RecoveryGrowth::Exponential { k: 0 } = variant.growth {
            return Err(Error::InvalidConfig);
        }

        self.variant = variant;

        Ok(())
    }

    /// Sets the initial congestion window size in segments.
    ///
    /// The default value is 10. Zero is rejected with `Error::InvalidConfig`.
    pub fn set_initial_congestion_window_packets(
        &mut self, packets: u64,
    ) -> Result<()> {
        if packets == 0 {
            return Err(Error::InvalidConfig);
        }

        self.initial_congestion_window_packets = packets;

        Ok(())
    }

    /// Sets the slow-start threshold used until the first loss.
    ///
    /// The default value is [`INFINITE_SSTHRESH`].
    pub fn set_initial_ssthresh(&mut self, ssthresh: u64) {
        self.initial_ssthresh = ssthresh;
    }

    pub fn cc_algorithm(&self) -> Algorithm {
        self.cc_algorithm
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn initial_congestion_window_packets(&self) -> u64 {
        self.initial_congestion_window_packets
    }
}

mod cc;
mod congestion;
mod error;
mod time;

#[cfg(test)]
mod test_utils;

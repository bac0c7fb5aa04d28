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

use std::cmp;
use std::time::Instant;

use crate::cc::controller::WindowController;
use crate::cc::Algorithm;
use crate::cc::Event;
use crate::cc::Phase;
use crate::cc::Sample;
use crate::cc::Variant;
use crate::cc::MINIMUM_UNDO_WINDOW;
use crate::Config;

/// Congestion statistics of a single connection.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// The current congestion window, in segments.
    pub cwnd: u64,

    /// The current slow-start threshold, in segments.
    pub ssthresh: u64,

    /// The number of segments reported lost.
    pub lost: u64,

    /// The number of fast recovery episodes entered.
    pub recoveries: u64,
}

impl std::fmt::Debug for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "cwnd={} ssthresh={} lost={} recoveries={}",
            self.cwnd, self.ssthresh, self.lost, self.recoveries,
        )
    }
}

/// The congestion controller of a single connection.
///
/// Each connection owns its own instance; nothing is shared between
/// connections. The host serializes calls for one connection and passes the
/// current time and its next sequence number to send with every event.
pub struct Congestion {
    pub(crate) controller: WindowController,

    algorithm: Algorithm,

    initial_congestion_window: u64,

    initial_ssthresh: u64,

    lost_count: u64,

    recovery_count: u64,

    trace_id: String,
}

impl Congestion {
    /// Creates a controller in its initial state.
    pub fn new(config: &Config, trace_id: &str, now: Instant) -> Self {
        let initial_congestion_window = config.initial_congestion_window_packets;
        let initial_ssthresh = config.initial_ssthresh;

        debug!(
            "{} {} congestion control initialized: {:?}",
            trace_id, config.cc_algorithm, config.variant
        );

        Congestion {
            controller: WindowController::new(
                config.variant,
                initial_congestion_window,
                initial_ssthresh,
                now,
            ),

            algorithm: config.cc_algorithm,

            initial_congestion_window,

            initial_ssthresh,

            lost_count: 0,

            recovery_count: 0,

            trace_id: trace_id.to_string(),
        }
    }

    /// Resets the window state to the initial window, an unbounded
    /// slow-start threshold and a fresh epoch.
    pub fn init(&mut self, now: Instant) {
        self.controller.reset(
            self.initial_congestion_window,
            self.initial_ssthresh,
            now,
        );

        trace!("{} init {:?}", self.trace_id, self);
    }

    /// Handles a loss notification and returns the slow-start threshold the
    /// host should record.
    ///
    /// A loss of segments sent before the current recovery episode began is
    /// ignored, as is a zero `count`; the current threshold is returned
    /// unchanged in both cases.
    pub fn on_loss(&mut self, count: u64, snd_nxt: u64, now: Instant) -> u64 {
        if count > 0 {
            self.lost_count = self.lost_count.saturating_add(count);

            if self.controller.on_loss(snd_nxt, now, &self.trace_id) {
                self.recovery_count += 1;
            }

            trace!("{} loss {:?}", self.trace_id, self);
        }

        self.controller.state.ssthresh
    }

    /// Handles an ack batch. Losses reported in the batch take precedence
    /// over acknowledged data; a batch that reports neither leaves the state
    /// untouched.
    pub fn on_ack(&mut self, sample: &Sample, snd_nxt: u64, now: Instant) {
        if sample.losses > 0 {
            self.on_loss(sample.losses, snd_nxt, now);
            return;
        }

        if sample.acked_sacked == 0 {
            return;
        }

        self.controller.on_ack(now, &self.trace_id);

        trace!("{} ack {:?}", self.trace_id, self);
    }

    /// Dispatches a queued event.
    pub fn on_event(&mut self, event: Event, snd_nxt: u64, now: Instant) {
        match event {
            Event::Loss { count } => {
                self.on_loss(count, snd_nxt, now);
            },

            Event::Ack(sample) => self.on_ack(&sample, snd_nxt, now),
        }
    }

    /// Returns the window to restore when the host decides a previous
    /// reduction was spurious.
    pub fn undo_cwnd(&self) -> u64 {
        cmp::max(self.controller.state.cwnd, MINIMUM_UNDO_WINDOW)
    }

    pub fn cwnd(&self) -> u64 {
        self.controller.state.cwnd
    }

    pub fn ssthresh(&self) -> u64 {
        self.controller.state.ssthresh
    }

    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    pub fn in_recovery(&self) -> bool {
        self.controller.state.recovery_active
    }

    /// Returns the configured algorithm name. With a custom variant this is
    /// the preset it overrides; see [`Congestion::variant()`].
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn variant(&self) -> Variant {
        self.controller.variant()
    }

    pub fn stats(&self) -> Stats {
        Stats {
            cwnd: self.cwnd(),
            ssthresh: self.ssthresh(),
            lost: self.lost_count,
            recoveries: self.recovery_count,
        }
    }
}

impl std::fmt::Debug for Congestion {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "algorithm={} {:?}", self.algorithm, self.controller)?;

        if self.variant() != Variant::from(self.algorithm) {
            write!(f, " variant={:?}", self.variant())?;
        }

        write!(f, " lost={}", self.lost_count)?;

        Ok(())
    }
}

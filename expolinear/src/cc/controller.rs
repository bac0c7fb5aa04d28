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

//! Time-driven window controller.
//!
//! Slow start grows the window by `2 * t^3` segments per ack batch,
//! congestion avoidance pins it to a line through the pre-loss window, and
//! fast recovery rebuilds it from the reduced window according to the
//! variant's growth law. `t` is always measured in milliseconds since the
//! current epoch.

use std::cmp;
use std::time::Instant;

use super::exp::exp_adjust;
use super::phase::Phase;
use super::phase::PhaseState;
use super::RecoveryGrowth;
use super::Variant;
use super::MINIMUM_SLOW_START_INCREMENT;
use super::MINIMUM_WINDOW;

pub(crate) struct WindowController {
    variant: Variant,

    pub(crate) state: PhaseState,
}

impl WindowController {
    pub(crate) fn new(
        variant: Variant, initial_cwnd: u64, initial_ssthresh: u64, now: Instant,
    ) -> Self {
        WindowController {
            variant,
            state: PhaseState::new(initial_cwnd, initial_ssthresh, now),
        }
    }

    pub(crate) fn reset(
        &mut self, initial_cwnd: u64, initial_ssthresh: u64, now: Instant,
    ) {
        self.state = PhaseState::new(initial_cwnd, initial_ssthresh, now);
    }

    pub(crate) fn variant(&self) -> Variant {
        self.variant
    }

    pub(crate) fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Reacts to a loss signal. Returns `false` when the loss belongs to the
    /// recovery episode already in progress and was ignored.
    pub(crate) fn on_loss(
        &mut self, snd_nxt: u64, now: Instant, trace_id: &str,
    ) -> bool {
        let s = &mut self.state;

        // Losses among segments sent before recovery started are part of the
        // same episode.
        if s.recovery_active && snd_nxt <= s.recovery_marker {
            trace!(
                "{} loss ignored, snd_nxt={} recovery_marker={}",
                trace_id,
                snd_nxt,
                s.recovery_marker
            );

            return false;
        }

        let prior_cwnd = s.cwnd;
        let decrement = self.variant.backoff.of(prior_cwnd);

        s.recovery_active = true;
        s.recovery_marker = snd_nxt;
        s.secondary_threshold = prior_cwnd;
        s.ssthresh = prior_cwnd / 2;
        s.cwnd = cmp::max(prior_cwnd - decrement, MINIMUM_WINDOW);
        s.baseline_window = s.cwnd;
        s.epoch.reset(now);

        if let RecoveryGrowth::Exponential { .. } = self.variant.growth {
            s.recovery_decrement = decrement;
        }

        debug!(
            "{} entering fast recovery: cwnd {} -> {} ssthresh={} target={}",
            trace_id, prior_cwnd, s.cwnd, s.ssthresh, s.secondary_threshold
        );

        true
    }

    /// Grows the window after an ack batch that acknowledged new data.
    pub(crate) fn on_ack(&mut self, now: Instant, trace_id: &str) {
        let prior_phase = self.phase();
        let t = self.state.epoch.elapsed_ms(now);

        match prior_phase {
            Phase::FastRecovery => {
                let s = &mut self.state;

                let target = recovery_window(
                    self.variant.growth,
                    s.baseline_window,
                    s.recovery_decrement,
                    t,
                );

                s.cwnd = cmp::max(target, MINIMUM_WINDOW);

                // The next ack batch picks slow start or congestion
                // avoidance from cwnd and ssthresh.
                if s.cwnd >= s.secondary_threshold {
                    s.recovery_active = false;
                }
            },

            Phase::SlowStart => {
                let s = &mut self.state;

                s.cwnd = s.cwnd.saturating_add(cmp::max(
                    slow_start_increment(t),
                    MINIMUM_SLOW_START_INCREMENT,
                ));
            },

            Phase::CongestionAvoidance => {
                let s = &mut self.state;

                // The window follows a line anchored at the pre-loss window
                // rather than accumulating.
                let target =
                    s.secondary_threshold.saturating_add(t.saturating_mul(2));

                s.cwnd = cmp::max(target, MINIMUM_WINDOW);
            },
        }

        let phase = self.phase();

        if phase != prior_phase {
            debug!(
                "{} {:?} -> {:?} at t={}ms cwnd={}",
                trace_id, prior_phase, phase, t, self.state.cwnd
            );
        }
    }
}

/// Slow start increment `2 * t^3`, saturating at `u64::MAX`.
///
/// With 64-bit arithmetic the term stops being exact past
/// `t = 2_097_151` ms (about 35 minutes without a loss).
fn slow_start_increment(t: u64) -> u64 {
    t.saturating_mul(t).saturating_mul(t).saturating_mul(2)
}

fn recovery_window(
    growth: RecoveryGrowth, baseline: u64, decrement: u64, t: u64,
) -> u64 {
    match growth {
        RecoveryGrowth::Exponential { k } => baseline
            .saturating_add(exp_adjust(t, k, decrement))
            .saturating_add(1),

        RecoveryGrowth::Linear => baseline.saturating_add(t),
    }
}

impl std::fmt::Debug for WindowController {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = &self.state;

        write!(
            f,
            "phase={:?} cwnd={} ssthresh={} secondary_threshold={} \
             baseline={} recovery_marker={}",
            s.phase(),
            s.cwnd,
            s.ssthresh,
            s.secondary_threshold,
            s.baseline_window,
            s.recovery_marker,
        )
    }
}

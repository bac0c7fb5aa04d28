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

use std::time::Instant;

use crate::time::Epoch;

// Values carried by a fresh connection before its first loss.
const INITIAL_SECONDARY_THRESHOLD: u64 = 200;
const INITIAL_BASELINE_WINDOW: u64 = 1;
const INITIAL_RECOVERY_DECREMENT: u64 = 1;

/// The regime the window controller is in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    SlowStart,
    CongestionAvoidance,
    FastRecovery,
}

/// Per-connection congestion state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PhaseState {
    pub(crate) cwnd: u64,

    pub(crate) ssthresh: u64,

    // Window that ends fast recovery. Also the base of the congestion
    // avoidance line.
    pub(crate) secondary_threshold: u64,

    pub(crate) recovery_active: bool,

    // Next sequence number to send when recovery began.
    pub(crate) recovery_marker: u64,

    // Window right after the loss reduction.
    pub(crate) baseline_window: u64,

    pub(crate) epoch: Epoch,

    // Size of the last loss reduction.
    pub(crate) recovery_decrement: u64,
}

impl PhaseState {
    pub(crate) fn new(
        initial_cwnd: u64, initial_ssthresh: u64, now: Instant,
    ) -> Self {
        PhaseState {
            cwnd: initial_cwnd,
            ssthresh: initial_ssthresh,
            secondary_threshold: INITIAL_SECONDARY_THRESHOLD,
            recovery_active: false,
            recovery_marker: 0,
            baseline_window: INITIAL_BASELINE_WINDOW,
            epoch: Epoch::new(now),
            recovery_decrement: INITIAL_RECOVERY_DECREMENT,
        }
    }

    pub(crate) fn phase(&self) -> Phase {
        if self.recovery_active {
            Phase::FastRecovery
        } else if self.cwnd < self.ssthresh {
            Phase::SlowStart
        } else {
            Phase::CongestionAvoidance
        }
    }
}

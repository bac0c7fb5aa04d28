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

use std::ops::Deref;
use std::ops::DerefMut;
use std::time::Duration;
use std::time::Instant;

use crate::Algorithm;
use crate::Config;
use crate::Congestion;
use crate::Sample;

/// Drives a `Congestion` the way a host transport would, with a simulated
/// clock and send sequence.
pub(crate) struct TestSender {
    cc: Congestion,
    pub(crate) snd_nxt: u64,
    pub(crate) time: Instant,
}

impl TestSender {
    pub(crate) fn new(algo: Algorithm) -> Self {
        let mut cfg = Config::new();
        cfg.set_cc_algorithm(algo);

        Self::with_config(&cfg)
    }

    pub(crate) fn with_config(cfg: &Config) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let now = Instant::now();

        TestSender {
            cc: Congestion::new(cfg, "test_id", now),
            snd_nxt: 0,
            time: now,
        }
    }

    pub(crate) fn send_segments(&mut self, n: u64) {
        self.snd_nxt += n;
    }

    pub(crate) fn ack(&mut self, acked_sacked: u64) {
        let sample = Sample {
            acked_sacked,
            losses: 0,
        };

        self.cc.on_ack(&sample, self.snd_nxt, self.time);
    }

    /// Reports `n` lost segments inside an ack batch.
    pub(crate) fn ack_with_losses(&mut self, acked_sacked: u64, n: u64) {
        let sample = Sample {
            acked_sacked,
            losses: n,
        };

        self.cc.on_ack(&sample, self.snd_nxt, self.time);
    }

    /// Reports `n` lost segments through the host's threshold hook.
    pub(crate) fn lose(&mut self, n: u64) -> u64 {
        self.cc.on_loss(n, self.snd_nxt, self.time)
    }

    pub(crate) fn init(&mut self) {
        self.cc.init(self.time);
    }

    pub(crate) fn advance_time(&mut self, period: Duration) {
        self.time += period;
    }

    pub(crate) fn advance_ms(&mut self, ms: u64) {
        self.advance_time(Duration::from_millis(ms));
    }
}

impl Deref for TestSender {
    type Target = Congestion;

    fn deref(&self) -> &Self::Target {
        &self.cc
    }
}

impl DerefMut for TestSender {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.cc
    }
}

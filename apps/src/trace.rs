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

//! Replays a parsed script against a congestion controller.

use std::io::Write;
use std::time::Duration;
use std::time::Instant;

use expolinear::Config;
use expolinear::Congestion;
use expolinear::Sample;
use expolinear::INFINITE_SSTHRESH;

use crate::script::Action;
use crate::script::Step;

/// Window state after a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Record {
    pub time_ms: u64,

    pub action: Action,

    pub cwnd: u64,

    pub ssthresh: u64,

    pub phase: expolinear::Phase,

    /// The window returned to the host, for `undo` steps.
    pub undo_cwnd: Option<u64>,
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{:>8} {:<5} cwnd={} ssthresh=",
            self.time_ms,
            self.action.name(),
            self.cwnd
        )?;

        if self.ssthresh == INFINITE_SSTHRESH {
            write!(f, "inf")?;
        } else {
            write!(f, "{}", self.ssthresh)?;
        }

        write!(f, " phase={:?}", self.phase)?;

        if let Some(v) = self.undo_cwnd {
            write!(f, " undo={v}")?;
        }

        Ok(())
    }
}

/// Runs every step against a fresh controller and returns the window state
/// after each one.
pub fn replay(config: &Config, steps: &[Step]) -> Vec<Record> {
    let start = Instant::now();
    let mut cc = Congestion::new(config, "trace", start);
    let mut snd_nxt: u64 = 0;

    let mut records = Vec::with_capacity(steps.len());

    for step in steps {
        let now = start + Duration::from_millis(step.time_ms);
        let mut undo_cwnd = None;

        match step.action {
            Action::Init => cc.init(now),

            Action::Ack {
                acked_sacked,
                losses,
            } => {
                let sample = Sample {
                    acked_sacked,
                    losses,
                };

                cc.on_ack(&sample, snd_nxt, now);
            },

            Action::Loss { count } => {
                cc.on_loss(count, snd_nxt, now);
            },

            Action::Send { segments } => {
                snd_nxt = snd_nxt.saturating_add(segments);
            },

            Action::Undo => undo_cwnd = Some(cc.undo_cwnd()),
        }

        records.push(Record {
            time_ms: step.time_ms,
            action: step.action,
            cwnd: cc.cwnd(),
            ssthresh: cc.ssthresh(),
            phase: cc.phase(),
            undo_cwnd,
        });
    }

    info!("trace done: {:?}", cc.stats());

    records
}

/// Writes one line per record.
pub fn write_records<W: Write>(
    out: &mut W, records: &[Record],
) -> std::io::Result<()> {
    for r in records {
        writeln!(out, "{r}")?;
    }

    Ok(())
}

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

//! Parser for congestion event scripts.
//!
//! A script holds one event per line, prefixed by the time in milliseconds
//! since the start of the trace:
//!
//! ```text
//! # ms  event  arguments
//! 0     send   10
//! 3     ack    2
//! 5     ack    4 1
//! 9     loss   1
//! 12    undo
//! ```
//!
//! Blank lines and everything after a `#` are ignored. Times must not
//! decrease.

/// What happens at a point in the trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Re-initialize the connection's congestion state.
    Init,

    /// An ack batch, optionally reporting losses.
    Ack { acked_sacked: u64, losses: u64 },

    /// A loss notification through the host's threshold hook.
    Loss { count: u64 },

    /// New segments handed to the network, advancing the next sequence
    /// number.
    Send { segments: u64 },

    /// The host undoes the last window reduction.
    Undo,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Init => "init",
            Action::Ack { .. } => "ack",
            Action::Loss { .. } => "loss",
            Action::Send { .. } => "send",
            Action::Undo => "undo",
        }
    }
}

/// A timestamped action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    /// 1-based line number in the script.
    pub line: usize,

    pub time_ms: u64,

    pub action: Action,
}

/// A script parsing error. Each variant carries the offending line number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The timestamp is not a non-negative integer.
    InvalidTime(usize),

    /// The timestamp is earlier than the previous one.
    TimeWentBackward(usize),

    /// The event name is not known.
    UnknownEvent(usize),

    /// A required argument is missing.
    MissingArgument(usize),

    /// An argument is not a non-negative integer.
    InvalidArgument(usize),

    /// The line has more arguments than the event takes.
    TrailingArgument(usize),
}

impl ParseError {
    pub fn line(&self) -> usize {
        match *self {
            ParseError::InvalidTime(line) |
            ParseError::TimeWentBackward(line) |
            ParseError::UnknownEvent(line) |
            ParseError::MissingArgument(line) |
            ParseError::InvalidArgument(line) |
            ParseError::TrailingArgument(line) => line,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let msg = match self {
            ParseError::InvalidTime(_) => "invalid time",
            ParseError::TimeWentBackward(_) => "time went backward",
            ParseError::UnknownEvent(_) => "unknown event",
            ParseError::MissingArgument(_) => "missing argument",
            ParseError::InvalidArgument(_) => "invalid argument",
            ParseError::TrailingArgument(_) => "unexpected argument",
        };

        write!(f, "line {}: {}", self.line(), msg)
    }
}

impl std::error::Error for ParseError {}

/// Parses a whole script.
pub fn parse(input: &str) -> Result<Vec<Step>, ParseError> {
    let mut steps = Vec::new();
    let mut last_ms = 0;

    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;

        let content = raw.split('#').next().unwrap_or("");
        let mut tokens = content.split_whitespace();

        let time = match tokens.next() {
            Some(v) => v,

            None => continue,
        };

        let time_ms =
            time.parse::<u64>().map_err(|_| ParseError::InvalidTime(line))?;

        if time_ms < last_ms {
            return Err(ParseError::TimeWentBackward(line));
        }

        last_ms = time_ms;

        let action = match tokens.next() {
            Some("init") => Action::Init,

            Some("ack") => Action::Ack {
                acked_sacked: required(tokens.next(), line)?,
                losses: optional(tokens.next(), line)?.unwrap_or(0),
            },

            Some("loss") => Action::Loss {
                count: required(tokens.next(), line)?,
            },

            Some("send") => Action::Send {
                segments: required(tokens.next(), line)?,
            },

            Some("undo") => Action::Undo,

            Some(_) => return Err(ParseError::UnknownEvent(line)),

            None => return Err(ParseError::MissingArgument(line)),
        };

        if tokens.next().is_some() {
            return Err(ParseError::TrailingArgument(line));
        }

        steps.push(Step {
            line,
            time_ms,
            action,
        });
    }

    Ok(steps)
}

fn required(token: Option<&str>, line: usize) -> Result<u64, ParseError> {
    optional(token, line)?.ok_or(ParseError::MissingArgument(line))
}

fn optional(token: Option<&str>, line: usize) -> Result<Option<u64>, ParseError> {
    token
        .map(|v| v.parse::<u64>().map_err(|_| ParseError::InvalidArgument(line)))
        .transpose()
}

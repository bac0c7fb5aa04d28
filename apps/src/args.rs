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

pub trait Args {
    fn with_docopt(docopt: &docopt::Docopt) -> Self;
}

/// Arguments of the `cwnd-trace` tool.
pub struct TraceArgs {
    pub cc_algorithm: String,
    pub initial_cwnd: u64,
    pub script: Option<String>,
}

/// Creates a new `TraceArgs` structure using the provided [`Docopt`].
///
/// The `Docopt` usage String needs to include the following:
///
/// --cc-algorithm NAME      Congestion control algorithm.
/// --initial-cwnd PACKETS   Initial congestion window.
///
/// and an optional `SCRIPT` positional argument.
///
/// [`Docopt`]: https://docs.rs/docopt/1.1.0/docopt/
impl Args for TraceArgs {
    fn with_docopt(docopt: &docopt::Docopt) -> Self {
        let args = docopt.parse().unwrap_or_else(|e| e.exit());

        let cc_algorithm = args.get_str("--cc-algorithm").to_string();

        let initial_cwnd = args.get_str("--initial-cwnd");
        let initial_cwnd = initial_cwnd.parse::<u64>().unwrap_or_else(|_| {
            eprintln!("invalid --initial-cwnd: {initial_cwnd}");
            std::process::exit(1);
        });

        let script = match args.get_str("SCRIPT") {
            "" | "-" => None,

            v => Some(v.to_string()),
        };

        TraceArgs {
            cc_algorithm,
            initial_cwnd,
            script,
        }
    }
}

impl Default for TraceArgs {
    fn default() -> Self {
        TraceArgs {
            cc_algorithm: "expolinear".to_string(),
            initial_cwnd: expolinear::INITIAL_WINDOW_PACKETS,
            script: None,
        }
    }
}

impl TraceArgs {
    /// Builds the controller configuration.
    pub fn config(&self) -> expolinear::Result<expolinear::Config> {
        let mut config = expolinear::Config::new();

        config.set_cc_algorithm_name(&self.cc_algorithm)?;
        config.set_initial_congestion_window_packets(self.initial_cwnd)?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USAGE: &str = "Usage:
  cwnd-trace [options] [SCRIPT]

Options:
  --cc-algorithm NAME      Congestion control algorithm [default: expolinear].
  --initial-cwnd PACKETS   Initial congestion window [default: 10].
";

    fn parse(argv: &[&str]) -> TraceArgs {
        let docopt = docopt::Docopt::new(USAGE)
            .unwrap()
            .argv(argv.iter().copied());

        TraceArgs::with_docopt(&docopt)
    }

    #[test]
    fn defaults() {
        let args = parse(&["cwnd-trace"]);

        assert_eq!(args.cc_algorithm, "expolinear");
        assert_eq!(args.initial_cwnd, 10);
        assert_eq!(args.script, None);
    }

    #[test]
    fn explicit() {
        let args = parse(&[
            "cwnd-trace",
            "--cc-algorithm",
            "linear",
            "--initial-cwnd",
            "4",
            "events.txt",
        ]);

        assert_eq!(args.script.as_deref(), Some("events.txt"));

        let config = args.config().unwrap();
        assert_eq!(config.cc_algorithm(), expolinear::Algorithm::Linear);
        assert_eq!(config.initial_congestion_window_packets(), 4);
    }

    #[test]
    fn bad_algorithm() {
        let args = TraceArgs {
            cc_algorithm: "bbr".to_string(),
            ..Default::default()
        };

        assert_eq!(
            args.config().err(),
            Some(expolinear::Error::CongestionControl)
        );
    }
}

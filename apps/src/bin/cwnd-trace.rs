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

#[macro_use]
extern crate log;

use std::io::Read;

use expolinear_apps::args::*;
use expolinear_apps::script;
use expolinear_apps::trace;

const USAGE: &str = "Usage:
  cwnd-trace [options] [SCRIPT]
  cwnd-trace -h | --help

Replays a congestion event script and prints the window after each event.
Reads the script from stdin when SCRIPT is missing or `-`.

Options:
  --cc-algorithm NAME      Congestion control algorithm to use [default: expolinear].
  --initial-cwnd PACKETS   Initial congestion window in segments [default: 10].
  -h --help                Show this screen.
";

fn main() {
    env_logger::builder().format_timestamp_nanos().init();

    // Parse CLI parameters.
    let docopt = docopt::Docopt::new(USAGE).unwrap();
    let args = TraceArgs::with_docopt(&docopt);

    let config = match args.config() {
        Ok(v) => v,

        Err(e) => {
            error!("invalid configuration: {:?}", e);
            std::process::exit(1);
        },
    };

    let input = match read_script(args.script.as_deref()) {
        Ok(v) => v,

        Err(e) => {
            error!("failed to read script: {}", e);
            std::process::exit(1);
        },
    };

    let steps = match script::parse(&input) {
        Ok(v) => v,

        Err(e) => {
            error!("failed to parse script: {}", e);
            std::process::exit(1);
        },
    };

    let records = trace::replay(&config, &steps);

    let stdout = std::io::stdout();
    if let Err(e) = trace::write_records(&mut stdout.lock(), &records) {
        error!("failed to write trace: {}", e);
        std::process::exit(1);
    }
}

fn read_script(path: Option<&str>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),

        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;

            Ok(input)
        },
    }
}

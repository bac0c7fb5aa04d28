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

//! Elapsed-time bookkeeping for the growth laws.
//!
//! The controller never reads a clock on its own. The host passes the
//! current [`Instant`] with every event, which keeps the controller a pure
//! function of its state, the event and the time.

use std::time::Instant;

/// A resettable reference point. All window growth is a function of the time
/// elapsed since the current epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Epoch {
    start: Instant,
}

impl Epoch {
    pub fn new(now: Instant) -> Self {
        Epoch { start: now }
    }

    /// Restarts the epoch at `now`.
    pub fn reset(&mut self, now: Instant) {
        self.start = now;
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    /// Returns the whole milliseconds elapsed since the epoch, truncating
    /// toward zero.
    ///
    /// A `now` that precedes the epoch yields 0, so the result never goes
    /// backward even if the host hands in a stale timestamp.
    pub fn elapsed_ms(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.start);

        u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    #[test]
    fn elapsed_truncates() {
        let now = Instant::now();
        let epoch = Epoch::new(now);

        assert_eq!(epoch.elapsed_ms(now), 0);
        assert_eq!(epoch.elapsed_ms(now + Duration::from_micros(999)), 0);
        assert_eq!(epoch.elapsed_ms(now + Duration::from_nanos(1_999_999)), 1);
        assert_eq!(epoch.elapsed_ms(now + Duration::from_secs(3)), 3000);
    }

    #[test]
    fn stale_timestamp() {
        let now = Instant::now();
        let epoch = Epoch::new(now + Duration::from_millis(10));

        assert_eq!(epoch.elapsed_ms(now), 0);
    }

    #[test]
    fn reset() {
        let now = Instant::now();
        let mut epoch = Epoch::new(now);

        let later = now + Duration::from_millis(25);
        assert_eq!(epoch.elapsed_ms(later), 25);

        epoch.reset(later);
        assert_eq!(epoch.start(), later);
        assert_eq!(epoch.elapsed_ms(later + Duration::from_millis(4)), 4);
    }
}

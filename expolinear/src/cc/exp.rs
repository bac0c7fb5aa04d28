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

//! Fixed-point approximation of exponential convergence.

const FIXED_POINT_SHIFT: u32 = 16;

/// Scale of the fixed-point representation, i.e. `1.0 == 65536`.
pub const FIXED_POINT_SCALE: u64 = 1 << FIXED_POINT_SHIFT;

/// Approximates `l * (1 - 2^(-t/k))` with integer arithmetic.
///
/// The exponent is truncated to whole multiples of `k`, so the result is a
/// non-decreasing step function of `t` that jumps at every multiple of `k`
/// and converges to `l`. Once `t / k` reaches 17 the fixed-point term is
/// fully decayed and the result is exactly `l`.
///
/// A zero `k` is degenerate and yields 0.
pub fn exp_adjust(t: u64, k: u64, l: u64) -> u64 {
    if k == 0 {
        return 0;
    }

    let scaled_time = t / k;

    // 2^(-scaled_time) in fixed point. Shifts at or beyond the integer width
    // saturate to 0 instead of wrapping.
    let scaled_exponent = u32::try_from(scaled_time)
        .ok()
        .and_then(|shift| FIXED_POINT_SCALE.checked_shr(shift))
        .unwrap_or(0);

    let adjustment = FIXED_POINT_SCALE - scaled_exponent;

    // adjustment <= FIXED_POINT_SCALE, so the result never exceeds `l`.
    ((u128::from(l) * u128::from(adjustment)) >> FIXED_POINT_SHIFT) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[test]
    fn zero_k() {
        assert_eq!(exp_adjust(0, 0, 200), 0);
        assert_eq!(exp_adjust(1000, 0, 200), 0);
        assert_eq!(exp_adjust(u64::MAX, 0, u64::MAX), 0);
    }

    #[test]
    fn zero_time() {
        assert_eq!(exp_adjust(0, 4, 200), 0);
        assert_eq!(exp_adjust(3, 4, 200), 0);
    }

    #[test]
    fn half_way() {
        // One full period decays half of the distance.
        assert_eq!(exp_adjust(4, 4, 200), 100);
        assert_eq!(exp_adjust(7, 4, 200), 100);
        assert_eq!(exp_adjust(8, 4, 200), 150);
        assert_eq!(exp_adjust(12, 4, 200), 175);
    }

    #[test]
    fn saturation() {
        // 65536 >> 16 still leaves one fixed-point unit.
        assert_eq!(exp_adjust(16 * 4, 4, 200), 199);
        assert_eq!(exp_adjust(17 * 4, 4, 200), 200);
        assert_eq!(exp_adjust(64 * 4, 4, 200), 200);
        assert_eq!(exp_adjust(u64::MAX, 4, 200), 200);
        assert_eq!(exp_adjust(u64::MAX, 1, 200), 200);
    }

    #[test]
    fn large_limit() {
        assert_eq!(exp_adjust(u64::MAX, 1, u64::MAX), u64::MAX);
        assert_eq!(exp_adjust(1, 1, u64::MAX), u64::MAX / 2);
    }

    #[rstest]
    fn non_decreasing(
        #[values(1, 2, 4, 10)] k: u64, #[values(1, 200, 65536, 1_000_000)] l: u64,
    ) {
        let mut prev = 0;

        for t in 0..(20 * k) {
            let v = exp_adjust(t, k, l);

            assert!(v >= prev, "t={t} k={k} l={l}: {v} < {prev}");
            assert!(v <= l);

            prev = v;
        }

        assert_eq!(prev, l);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Final PCM formatting: rounding and clamping floating-point synthesis
//! output to `i16`, then interleaving multi-channel samples.

/// Round-half-away-from-zero and clamp one sample to the `i16` range.
/// Values at or beyond `32766.5` saturate to `i16::MAX`; values at or below
/// `-32767.5` saturate to `i16::MIN`.
pub fn clamp_to_i16(sample: f32) -> i16 {
    let rounded = if sample >= 0.0 { (sample + 0.5).floor() } else { (sample - 0.5).ceil() };
    if rounded >= i16::MAX as f32 {
        i16::MAX
    } else if rounded <= i16::MIN as f32 {
        i16::MIN
    } else {
        rounded as i16
    }
}

/// Interleave per-channel PCM sample slices into a single `[L0, R0, L1, R1,
/// ...]` buffer. `channels` must all have equal length.
pub fn interleave(channels: &[Vec<i16>]) -> Vec<i16> {
    if channels.is_empty() {
        return Vec::new();
    }
    let n = channels[0].len();
    let mut out = Vec::with_capacity(n * channels.len());
    for i in 0..n {
        for ch in channels {
            out.push(ch[i]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_nearest() {
        assert_eq!(clamp_to_i16(0.4), 0);
        assert_eq!(clamp_to_i16(0.5), 1);
        assert_eq!(clamp_to_i16(-0.5), -1);
        assert_eq!(clamp_to_i16(-0.4), 0);
    }

    #[test]
    fn saturates_at_boundaries() {
        assert_eq!(clamp_to_i16(32766.5), i16::MAX);
        assert_eq!(clamp_to_i16(32767.4), i16::MAX);
        assert_eq!(clamp_to_i16(100000.0), i16::MAX);
        assert_eq!(clamp_to_i16(-32767.5), i16::MIN);
        assert_eq!(clamp_to_i16(-100000.0), i16::MIN);
    }

    #[test]
    fn interleaves_stereo_channels() {
        let left = vec![1i16, 2, 3];
        let right = vec![10i16, 20, 30];
        let out = interleave(&[left, right]);
        assert_eq!(out, vec![1, 10, 2, 20, 3, 30]);
    }

    #[test]
    fn empty_channel_list_yields_empty_output() {
        let out = interleave(&[]);
        assert!(out.is_empty());
    }
}

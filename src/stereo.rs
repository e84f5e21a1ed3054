// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mid/Side and Intensity joint-stereo processing, applied between
//! requantization and anti-alias/reorder.

use crate::common::{BlockType, ChannelMode};
use crate::scalefactors::ChannelScaleFactors;
use crate::side_info::GranuleChannel;
use crate::tables::{INTENSITY_INV_POS_MPEG1, INTENSITY_STEREO_RATIOS_MPEG1};

const INV_SQRT2: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Apply joint-stereo processing in place to channel 0 and channel 1's
/// requantized coefficients. A no-op unless `channel_mode` is joint-stereo
/// with at least one of the mid/side or intensity bits set.
pub fn process_stereo(
    xr0: &mut [f32; 576],
    xr1: &mut [f32; 576],
    channel_mode: &ChannelMode,
    gc1: &GranuleChannel,
    sf1: &ChannelScaleFactors,
    long_bands: &[usize; 23],
    short_bands: &[usize; 13],
) {
    let (mid_side, intensity) = match channel_mode {
        ChannelMode::JointStereo(mode) => (mode.mid_side, mode.intensity),
        _ => return,
    };

    if !mid_side && !intensity {
        return;
    }

    let mut intensity_applied = [false; 576];
    if intensity {
        apply_intensity(xr0, xr1, gc1, sf1, long_bands, short_bands, &mut intensity_applied);
    }

    if mid_side {
        for i in 0..576 {
            if intensity_applied[i] {
                continue;
            }
            let m = xr0[i];
            let s = xr1[i];
            xr0[i] = (m + s) * INV_SQRT2;
            xr1[i] = (m - s) * INV_SQRT2;
        }
    }
}

fn is_zero_band(xr1: &[f32; 576], start: usize, end: usize) -> bool {
    xr1[start..end].iter().all(|&v| v == 0.0)
}

fn apply_intensity_band(
    xr0: &mut [f32; 576],
    xr1: &mut [f32; 576],
    start: usize,
    end: usize,
    is_pos: u8,
    applied: &mut [bool; 576],
) {
    if is_pos == INTENSITY_INV_POS_MPEG1 || !is_zero_band(xr1, start, end) {
        return;
    }
    let (ratio_l, ratio_r) = INTENSITY_STEREO_RATIOS_MPEG1[is_pos as usize];
    for i in start..end {
        let l = xr0[i];
        xr0[i] = l * ratio_l;
        xr1[i] = l * ratio_r;
        applied[i] = true;
    }
}

fn apply_intensity(
    xr0: &mut [f32; 576],
    xr1: &mut [f32; 576],
    gc1: &GranuleChannel,
    sf1: &ChannelScaleFactors,
    long_bands: &[usize; 23],
    short_bands: &[usize; 13],
    applied: &mut [bool; 576],
) {
    match gc1.block_type() {
        BlockType::Short { is_mixed: false } => {
            apply_intensity_short(xr0, xr1, sf1, short_bands, 0, 0, applied);
        }
        BlockType::Short { is_mixed: true } => {
            for sfb in 0..8 {
                apply_intensity_band(
                    xr0,
                    xr1,
                    long_bands[sfb],
                    long_bands[sfb + 1],
                    sf1.long[sfb],
                    applied,
                );
            }
            apply_intensity_short(xr0, xr1, sf1, short_bands, 3, 36, applied);
        }
        BlockType::Long | BlockType::Start | BlockType::End => {
            for sfb in 0..22 {
                apply_intensity_band(
                    xr0,
                    xr1,
                    long_bands[sfb],
                    long_bands[sfb + 1],
                    sf1.long[sfb],
                    applied,
                );
            }
        }
    }
}

fn apply_intensity_short(
    xr0: &mut [f32; 576],
    xr1: &mut [f32; 576],
    sf1: &ChannelScaleFactors,
    short_bands: &[usize; 13],
    sfb_start: usize,
    global_start: usize,
    applied: &mut [bool; 576],
) {
    let mut sample = global_start;
    for sfb in sfb_start..12 {
        let width = short_bands[sfb + 1] - short_bands[sfb];
        for window in 0..3 {
            let start = sample;
            let end = sample + width;
            apply_intensity_band(xr0, xr1, start, end, sf1.short[window][sfb], applied);
            sample = end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Layer3Mode;
    use crate::side_info::BlockTypeBits;
    use crate::tables::{SFB_LONG_BANDS, SFB_SHORT_BANDS};

    #[test]
    fn mid_side_recovers_left_right_from_mid_side() {
        let mut xr0 = [0f32; 576]; // mid
        let mut xr1 = [0f32; 576]; // side
        xr0[10] = 3.0;
        xr1[10] = 1.0;
        let mode = ChannelMode::JointStereo(Layer3Mode { mid_side: true, intensity: false });
        let gc1 = GranuleChannel { block_type: BlockTypeBits(0), ..Default::default() };
        let sf1 = ChannelScaleFactors::default();
        process_stereo(&mut xr0, &mut xr1, &mode, &gc1, &sf1, &SFB_LONG_BANDS[0], &SFB_SHORT_BANDS[0]);
        let expected_l = (3.0 + 1.0) * INV_SQRT2;
        let expected_r = (3.0 - 1.0) * INV_SQRT2;
        assert!((xr0[10] - expected_l).abs() < 1e-5);
        assert!((xr1[10] - expected_r).abs() < 1e-5);
    }

    #[test]
    fn non_joint_stereo_is_untouched() {
        let mut xr0 = [1f32; 576];
        let mut xr1 = [2f32; 576];
        let gc1 = GranuleChannel { block_type: BlockTypeBits(0), ..Default::default() };
        let sf1 = ChannelScaleFactors::default();
        process_stereo(
            &mut xr0,
            &mut xr1,
            &ChannelMode::Stereo,
            &gc1,
            &sf1,
            &SFB_LONG_BANDS[0],
            &SFB_SHORT_BANDS[0],
        );
        assert_eq!(xr0, [1f32; 576]);
        assert_eq!(xr1, [2f32; 576]);
    }

    #[test]
    fn intensity_pass_through_position_leaves_channels_alone() {
        let mut xr0 = [2f32; 576];
        let mut xr1 = [0f32; 576]; // fully zero-coded channel 1
        let mode = ChannelMode::JointStereo(Layer3Mode { mid_side: false, intensity: true });
        let mut sf1 = ChannelScaleFactors::default();
        // is_pos = 7 (pass-through) for every long band.
        sf1.long = [INTENSITY_INV_POS_MPEG1; 22];
        let gc1 = GranuleChannel { block_type: BlockTypeBits(0), ..Default::default() };
        process_stereo(&mut xr0, &mut xr1, &mode, &gc1, &sf1, &SFB_LONG_BANDS[0], &SFB_SHORT_BANDS[0]);
        assert_eq!(xr0, [2f32; 576]);
        assert_eq!(xr1, [0f32; 576]);
    }
}

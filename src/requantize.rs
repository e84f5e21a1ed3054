// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Requantization: turns the 576 integer coefficients decoded per
//! granule/channel into floating point `xr` values using `global_gain`,
//! `subblock_gain`, scale factors, and `preflag`.

use crate::common::BlockType;
use crate::scalefactors::ChannelScaleFactors;
use crate::side_info::GranuleChannel;
use crate::tables::PRETAB;

#[inline]
fn dequantize(value: i32, a: i32, b: f32) -> f32 {
    if value == 0 {
        return 0.0;
    }
    let sign = if value < 0 { -1.0 } else { 1.0 };
    let magnitude = (value.unsigned_abs() as f32).powf(4.0 / 3.0);
    sign * magnitude * 2f32.powf(a as f32 / 4.0) * 2f32.powf(-b)
}

/// Requantize all 576 coefficients of one granule/channel.
pub fn requantize(
    is: &[i32; 576],
    gc: &GranuleChannel,
    sf: &ChannelScaleFactors,
    long_bands: &[usize; 23],
    short_bands: &[usize; 13],
) -> [f32; 576] {
    let mult = if gc.scalefac_scale { 1.0 } else { 0.5 };
    let mut xr = [0f32; 576];

    match gc.block_type() {
        BlockType::Short { is_mixed: false } => {
            requantize_short_region(&mut xr, is, gc, sf, short_bands, 0, 0, 576, mult);
        }
        BlockType::Short { is_mixed: true } => {
            requantize_long_region(&mut xr, is, gc, sf, long_bands, 0, 8, mult);
            requantize_short_region(&mut xr, is, gc, sf, short_bands, 3, 36, 576, mult);
        }
        BlockType::Long | BlockType::Start | BlockType::End => {
            requantize_long_region(&mut xr, is, gc, sf, long_bands, 0, 22, mult);
        }
    }

    xr
}

fn requantize_long_region(
    xr: &mut [f32; 576],
    is: &[i32; 576],
    gc: &GranuleChannel,
    sf: &ChannelScaleFactors,
    long_bands: &[usize; 23],
    sfb_start: usize,
    sfb_end: usize,
    mult: f32,
) {
    let a = gc.global_gain as i32 - 210;
    for sfb in sfb_start..sfb_end {
        let pretab_bias = if gc.preflag { PRETAB[sfb] as f32 } else { 0.0 };
        let b = mult * (sf.long[sfb] as f32 + pretab_bias);
        for sample in long_bands[sfb]..long_bands[sfb + 1] {
            xr[sample] = dequantize(is[sample], a, b);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn requantize_short_region(
    xr: &mut [f32; 576],
    is: &[i32; 576],
    gc: &GranuleChannel,
    sf: &ChannelScaleFactors,
    short_bands: &[usize; 13],
    sfb_start: usize,
    global_start: usize,
    global_end: usize,
    mult: f32,
) {
    let mut sample = global_start;
    for sfb in sfb_start..12 {
        let width = short_bands[sfb + 1] - short_bands[sfb];
        for window in 0..3 {
            let a = gc.global_gain as i32 - 210 - 8 * gc.subblock_gain[window] as i32;
            let b = mult * sf.short[window][sfb] as f32;
            for _ in 0..width {
                if sample >= global_end {
                    return;
                }
                xr[sample] = dequantize(is[sample], a, b);
                sample += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::side_info::BlockTypeBits;
    use crate::tables::{SFB_LONG_BANDS, SFB_SHORT_BANDS};

    #[test]
    fn zero_coefficients_stay_zero_regardless_of_gain() {
        let is = [0i32; 576];
        let gc = GranuleChannel {
            global_gain: 210,
            block_type: BlockTypeBits(0),
            ..Default::default()
        };
        let sf = ChannelScaleFactors::default();
        let xr = requantize(&is, &gc, &sf, &SFB_LONG_BANDS[0], &SFB_SHORT_BANDS[0]);
        assert_eq!(xr, [0f32; 576]);
    }

    #[test]
    fn requantization_obeys_the_four_thirds_power_law() {
        let mut is = [0i32; 576];
        is[0] = 8;
        let gc = GranuleChannel {
            global_gain: 210, // A = 0
            block_type: BlockTypeBits(0),
            ..Default::default()
        };
        let sf = ChannelScaleFactors::default(); // B = 0
        let xr = requantize(&is, &gc, &sf, &SFB_LONG_BANDS[0], &SFB_SHORT_BANDS[0]);
        // xr = 8^(4/3) = 16^... = 8^(4/3) = (8^4)^(1/3) = 4096^(1/3) = 16.
        assert!((xr[0] - 16.0).abs() < 1e-3);
    }

    #[test]
    fn negative_coefficients_preserve_sign() {
        let mut is = [0i32; 576];
        is[0] = -8;
        let gc = GranuleChannel { global_gain: 210, block_type: BlockTypeBits(0), ..Default::default() };
        let sf = ChannelScaleFactors::default();
        let xr = requantize(&is, &gc, &sf, &SFB_LONG_BANDS[0], &SFB_SHORT_BANDS[0]);
        assert!(xr[0] < 0.0);
        assert!((xr[0] + 16.0).abs() < 1e-3);
    }
}

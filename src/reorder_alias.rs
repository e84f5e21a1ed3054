// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Anti-alias butterflies and short-block reordering, applied to the
//! requantized (and joint-stereo-processed) `xr` coefficients before IMDCT.

use crate::common::BlockType;
use crate::tables::ANTIALIAS_CS_CA;

/// Number of leading 18-sample subbands that carry long-block coefficients
/// for a given block type: all 32 for a pure long block, 2 for a mixed
/// block's long prefix, none for a pure short block.
fn long_subband_count(block_type: BlockType) -> usize {
    match block_type {
        BlockType::Short { is_mixed: false } => 0,
        BlockType::Short { is_mixed: true } => 2,
        BlockType::Long | BlockType::Start | BlockType::End => 32,
    }
}

/// Apply the anti-alias butterfly across adjacent 18-sample subband
/// boundaries, in place. A no-op for pure short blocks.
pub fn anti_alias(xr: &mut [f32; 576], block_type: BlockType) {
    let n_subbands = long_subband_count(block_type);
    if n_subbands < 2 {
        return;
    }
    let (cs, ca) = &*ANTIALIAS_CS_CA;
    for sb in 0..n_subbands - 1 {
        for i in 0..8 {
            let lo = sb * 18 + (17 - i);
            let hi = (sb + 1) * 18 + i;
            let lower = xr[lo];
            let upper = xr[hi];
            xr[lo] = lower * cs[i] - upper * ca[i];
            xr[hi] = upper * cs[i] + lower * ca[i];
        }
    }
}

/// Reorder a pure or mixed short block's coefficients from the band-major,
/// window-minor layout used by [`crate::requantize`] into three separate
/// 192-sample, frequency-ordered windows ready for per-window 12-point
/// IMDCT. The mixed block's 36-sample long prefix is left out; callers
/// IMDCT it separately as a long block.
pub fn reorder_short(xr: &[f32; 576], short_bands: &[usize; 13], is_mixed: bool) -> [[f32; 192]; 3] {
    let mut out = [[0f32; 192]; 3];
    let mut sample = if is_mixed { 36 } else { 0 };
    let mut next = [0usize; 3];

    let sfb_start = if is_mixed { 3 } else { 0 };
    for sfb in sfb_start..12 {
        let width = short_bands[sfb + 1] - short_bands[sfb];
        for window in 0..3 {
            for _ in 0..width {
                out[window][next[window]] = xr[sample];
                next[window] += 1;
                sample += 1;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::SFB_SHORT_BANDS;

    #[test]
    fn anti_alias_is_noop_for_pure_short_blocks() {
        let mut xr = [1f32; 576];
        let before = xr;
        anti_alias(&mut xr, BlockType::Short { is_mixed: false });
        assert_eq!(xr, before);
    }

    #[test]
    fn anti_alias_preserves_energy_on_zero_input() {
        let mut xr = [0f32; 576];
        anti_alias(&mut xr, BlockType::Long);
        assert_eq!(xr, [0f32; 576]);
    }

    #[test]
    fn anti_alias_touches_only_subband_boundary_samples_for_long_blocks() {
        let mut xr = [0f32; 576];
        xr[17] = 1.0; // last sample of subband 0
        xr[18] = 2.0; // first sample of subband 1
        anti_alias(&mut xr, BlockType::Long);
        assert!(xr[17] != 1.0 || xr[18] != 2.0);
        // Untouched elsewhere.
        assert_eq!(xr[0], 0.0);
        assert_eq!(xr[575], 0.0);
    }

    #[test]
    fn reorder_short_regroups_into_per_window_frequency_order() {
        let mut xr = [0f32; 576];
        // Pure short block: band-major layout starting at sample 0.
        // sfb 0 has width 4 in every table; fill its 3 windows with
        // distinguishable markers.
        xr[0..4].copy_from_slice(&[1.0, 1.0, 1.0, 1.0]); // window 0
        xr[4..8].copy_from_slice(&[2.0, 2.0, 2.0, 2.0]); // window 1
        xr[8..12].copy_from_slice(&[3.0, 3.0, 3.0, 3.0]); // window 2
        let out = reorder_short(&xr, &SFB_SHORT_BANDS[0], false);
        assert_eq!(&out[0][0..4], &[1.0, 1.0, 1.0, 1.0]);
        assert_eq!(&out[1][0..4], &[2.0, 2.0, 2.0, 2.0]);
        assert_eq!(&out[2][0..4], &[3.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn reorder_short_skips_the_mixed_long_prefix() {
        let mut xr = [0f32; 576];
        xr[36..40].copy_from_slice(&[9.0, 9.0, 9.0, 9.0]);
        let out = reorder_short(&xr, &SFB_SHORT_BANDS[0], true);
        assert_eq!(&out[0][0..4], &[9.0, 9.0, 9.0, 9.0]);
    }
}

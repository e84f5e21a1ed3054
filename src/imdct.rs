// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inverse MDCT (36-point long, 12-point short) with block-shaped windowing
//! and overlap-add, turning per-subband frequency-domain `xr` into
//! time-domain hybrid-synthesis samples.
//!
//! Unlike the fast recursive IMDCT algorithms typically used for speed,
//! every transform here is computed as a direct sum. This trades throughput
//! for a transform whose correctness follows straight from its defining
//! formula, which matters more for a reference-style decoder than raw
//! speed.

use crate::common::BlockType;
use lazy_static::lazy_static;
use std::f32::consts::PI;

const N_SUBBANDS: usize = 32;

lazy_static! {
    static ref WINDOW_LONG: [f32; 36] = {
        let mut w = [0f32; 36];
        for (i, slot) in w.iter_mut().enumerate() {
            *slot = (PI / 36.0 * (i as f32 + 0.5)).sin();
        }
        w
    };
    static ref WINDOW_START: [f32; 36] = {
        let mut w = [0f32; 36];
        for i in 0..18 {
            w[i] = (PI / 36.0 * (i as f32 + 0.5)).sin();
        }
        for i in 18..24 {
            w[i] = 1.0;
        }
        for i in 24..30 {
            w[i] = (PI / 12.0 * ((i - 18) as f32 + 0.5)).sin();
        }
        // w[30..36] stays 0.
        w
    };
    static ref WINDOW_STOP: [f32; 36] = {
        let mut w = [0f32; 36];
        // w[0..6] stays 0.
        for i in 6..12 {
            w[i] = (PI / 12.0 * ((i - 6) as f32 + 0.5)).sin();
        }
        for i in 12..18 {
            w[i] = 1.0;
        }
        for i in 18..36 {
            w[i] = (PI / 36.0 * (i as f32 + 0.5)).sin();
        }
        w
    };
    static ref WINDOW_SHORT: [f32; 12] = {
        let mut w = [0f32; 12];
        for (i, slot) in w.iter_mut().enumerate() {
            *slot = (PI / 12.0 * (i as f32 + 0.5)).sin();
        }
        w
    };
}

/// Per-channel overlap-add state: the trailing 18 samples of each of the 32
/// subbands' previous-granule hybrid output, added into the next granule's
/// leading 18 samples.
#[derive(Clone)]
pub struct OverlapState {
    subbands: [[f32; 18]; N_SUBBANDS],
}

impl Default for OverlapState {
    fn default() -> Self {
        OverlapState { subbands: [[0f32; 18]; N_SUBBANDS] }
    }
}

fn window_for(block_type: BlockType) -> &'static [f32; 36] {
    match block_type {
        BlockType::Long => &WINDOW_LONG,
        BlockType::Start => &WINDOW_START,
        BlockType::End => &WINDOW_STOP,
        BlockType::Short { .. } => &WINDOW_LONG,
    }
}

/// Direct-sum 36-point IMDCT of 18 frequency-domain inputs, windowed.
fn imdct36(x: &[f32; 18], window: &[f32; 36]) -> [f32; 36] {
    let mut z = [0f32; 36];
    for (i, slot) in z.iter_mut().enumerate() {
        let mut sum = 0f32;
        for (k, &xk) in x.iter().enumerate() {
            let angle = (PI / 72.0) * (2.0 * i as f32 + 1.0 + 18.0) * (2.0 * k as f32 + 1.0);
            sum += xk * angle.cos();
        }
        *slot = sum * window[i];
    }
    z
}

/// Direct-sum 12-point IMDCT of 6 frequency-domain inputs, windowed.
fn imdct12(x: &[f32; 6]) -> [f32; 12] {
    let mut z = [0f32; 12];
    for (i, slot) in z.iter_mut().enumerate() {
        let mut sum = 0f32;
        for (k, &xk) in x.iter().enumerate() {
            let angle = (PI / 24.0) * (2.0 * i as f32 + 1.0 + 6.0) * (2.0 * k as f32 + 1.0);
            sum += xk * angle.cos();
        }
        *slot = sum * WINDOW_SHORT[i];
    }
    z
}

/// Combine the three windowed 12-point short IMDCT outputs for one subband
/// into a 36-sample buffer, staggered by 6 samples each, per the standard
/// short-block hybrid-synthesis layout.
fn combine_short_windows(y0: &[f32; 12], y1: &[f32; 12], y2: &[f32; 12]) -> [f32; 36] {
    let mut out = [0f32; 36];
    for i in 0..12 {
        out[6 + i] += y0[i];
        out[12 + i] += y1[i];
        out[18 + i] += y2[i];
    }
    out
}

/// Run IMDCT and overlap-add on one granule/channel's 576 `xr` coefficients,
/// producing 576 hybrid-synthesis time-domain samples (still in subband
/// order, ready for frequency inversion and the synthesis filterbank).
///
/// `short_windows` is `Some` for short or mixed blocks and holds the
/// per-window, per-subband reordered coefficients from
/// [`crate::reorder_alias::reorder_short`]; it is ignored for pure long
/// blocks.
pub fn imdct_and_overlap(
    xr: &[f32; 576],
    block_type: BlockType,
    short_windows: Option<&[[f32; 192]; 3]>,
    overlap: &mut OverlapState,
) -> [f32; 576] {
    let mut out = [0f32; 576];

    let long_subbands = match block_type {
        BlockType::Short { is_mixed: false } => 0,
        BlockType::Short { is_mixed: true } => 2,
        BlockType::Long | BlockType::Start | BlockType::End => N_SUBBANDS,
    };
    let window = window_for(block_type);

    for sb in 0..long_subbands {
        let mut x = [0f32; 18];
        x.copy_from_slice(&xr[sb * 18..sb * 18 + 18]);
        let z = imdct36(&x, window);
        write_subband(&mut out, &mut overlap.subbands[sb], sb, &z);
    }

    if long_subbands < N_SUBBANDS {
        let windows = short_windows.expect("short/mixed block requires reordered short windows");
        for sb in long_subbands..N_SUBBANDS {
            let rel = (sb - long_subbands) * 6;
            let mut x0 = [0f32; 6];
            let mut x1 = [0f32; 6];
            let mut x2 = [0f32; 6];
            x0.copy_from_slice(&windows[0][rel..rel + 6]);
            x1.copy_from_slice(&windows[1][rel..rel + 6]);
            x2.copy_from_slice(&windows[2][rel..rel + 6]);
            let y0 = imdct12(&x0);
            let y1 = imdct12(&x1);
            let y2 = imdct12(&x2);
            let z = combine_short_windows(&y0, &y1, &y2);
            write_subband(&mut out, &mut overlap.subbands[sb], sb, &z);
        }
    }

    out
}

fn write_subband(out: &mut [f32; 576], overlap: &mut [f32; 18], sb: usize, z: &[f32; 36]) {
    for i in 0..18 {
        out[sb * 18 + i] = z[i] + overlap[i];
    }
    overlap.copy_from_slice(&z[18..36]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_input_yields_zero_output_and_overlap() {
        let xr = [0f32; 576];
        let mut overlap = OverlapState::default();
        let out = imdct_and_overlap(&xr, BlockType::Long, None, &mut overlap);
        assert_eq!(out, [0f32; 576]);
        for sb in &overlap.subbands {
            assert_eq!(*sb, [0f32; 18]);
        }
    }

    #[test]
    fn long_window_is_symmetric() {
        for i in 0..18 {
            assert!((WINDOW_LONG[i] - WINDOW_LONG[35 - i]).abs() < 1e-5);
        }
    }

    #[test]
    fn start_window_has_unity_plateau() {
        for i in 18..24 {
            assert!((WINDOW_START[i] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn overlap_from_previous_granule_carries_into_next() {
        let mut overlap = OverlapState::default();
        overlap.subbands[0] = [5.0; 18];
        let xr = [0f32; 576];
        let out = imdct_and_overlap(&xr, BlockType::Long, None, &mut overlap);
        assert_eq!(out[0], 5.0);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scale-factor unpacking for one granule/channel, including SCFSI reuse of
//! granule 0's long-block scale factors by granule 1.

use crate::bitreader::BitReader;
use crate::error::Result;
use crate::side_info::GranuleChannel;
use crate::tables::SLEN_TABLE;

/// Long-block scale factors, `scalefac_l[0..=20]` plus a zero sentinel at
/// index 21.
pub type ScaleFacLong = [u8; 22];

/// Short-block scale factors, `scalefac_s[window][0..=11]` plus a zero
/// sentinel at index 12, for each of the 3 windows.
pub type ScaleFacShort = [[u8; 13]; 3];

#[derive(Clone, Default)]
pub struct ChannelScaleFactors {
    pub long: ScaleFacLong,
    pub short: ScaleFacShort,
}

/// The four SCFSI band groups over long-block scale-factor indices.
const SCFSI_GROUPS: [(usize, usize); 4] = [(0, 6), (6, 11), (11, 16), (16, 21)];

/// Read scale factors for one granule/channel. `prev_granule0` must be
/// `Some` (and only consulted) when decoding granule 1 of a long block, to
/// serve SCFSI reuse.
pub fn read_scale_factors(
    reader: &mut BitReader,
    gc: &GranuleChannel,
    scfsi: &[bool; 4],
    is_granule_one: bool,
    prev_granule0: Option<&ChannelScaleFactors>,
) -> Result<ChannelScaleFactors> {
    let (slen1, slen2) = SLEN_TABLE[gc.scalefac_compress as usize];
    let mut out = ChannelScaleFactors::default();

    let is_short = gc.window_switching && gc.block_type.0 == 2;

    if is_short {
        if gc.mixed_block_flag {
            for sfb in 0..8 {
                out.long[sfb] = reader.read(slen1)? as u8;
            }
            for window in 0..3 {
                for sfb in 3..6 {
                    out.short[window][sfb] = reader.read(slen1)? as u8;
                }
            }
        } else {
            for window in 0..3 {
                for sfb in 0..6 {
                    out.short[window][sfb] = reader.read(slen1)? as u8;
                }
            }
        }
        for window in 0..3 {
            for sfb in 6..12 {
                out.short[window][sfb] = reader.read(slen2)? as u8;
            }
            out.short[window][12] = 0;
        }
    } else if !is_granule_one {
        for sfb in 0..11 {
            out.long[sfb] = reader.read(slen1)? as u8;
        }
        for sfb in 11..21 {
            out.long[sfb] = reader.read(slen2)? as u8;
        }
        out.long[21] = 0;
    } else {
        let prev = prev_granule0.expect("granule 1 SCFSI reuse requires granule 0's scale factors");
        for (group, &(start, end)) in SCFSI_GROUPS.iter().enumerate() {
            if scfsi[group] {
                out.long[start..end].copy_from_slice(&prev.long[start..end]);
            } else {
                let slen = if group < 2 { slen1 } else { slen2 };
                for sfb in start..end {
                    out.long[sfb] = reader.read(slen)? as u8;
                }
            }
        }
        out.long[21] = 0;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::side_info::BlockTypeBits;

    fn long_block_gc(scalefac_compress: u32) -> GranuleChannel {
        GranuleChannel {
            scalefac_compress,
            window_switching: false,
            block_type: BlockTypeBits(0),
            ..Default::default()
        }
    }

    #[test]
    fn zero_slen_yields_all_zero_long_scale_factors() {
        let buf = [0u8; 8];
        let mut reader = BitReader::new(&buf);
        let gc = long_block_gc(0);
        let sf = read_scale_factors(&mut reader, &gc, &[false; 4], false, None).unwrap();
        assert_eq!(sf.long, [0u8; 22]);
    }

    #[test]
    fn granule_one_reuses_scfsi_groups() {
        let buf = [0xFFu8; 8];
        let mut reader = BitReader::new(&buf);
        let gc = long_block_gc(0); // slen1=0, slen2=0: nothing read for ungrouped bits.
        let mut granule0 = ChannelScaleFactors::default();
        granule0.long[0] = 7;
        granule0.long[6] = 9;

        let scfsi = [true, true, true, true];
        let sf = read_scale_factors(&mut reader, &gc, &scfsi, true, Some(&granule0)).unwrap();
        assert_eq!(sf.long[0], 7);
        assert_eq!(sf.long[6], 9);
        assert_eq!(sf.long[21], 0);
    }

    #[test]
    fn short_block_mixed_reads_long_prefix_then_short_bands() {
        let buf = [0u8; 16];
        let mut reader = BitReader::new(&buf);
        let gc = GranuleChannel {
            scalefac_compress: 0,
            window_switching: true,
            block_type: BlockTypeBits(2),
            mixed_block_flag: true,
            ..Default::default()
        };
        let sf = read_scale_factors(&mut reader, &gc, &[false; 4], false, None).unwrap();
        assert_eq!(sf.long[0..8], [0u8; 8]);
        for window in &sf.short {
            assert_eq!(window[12], 0);
        }
    }
}

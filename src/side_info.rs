// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Side-information parsing: the 17- or 32-byte block immediately following
//! the frame header (and CRC, if present) that precedes the main-data
//! region.

use crate::bitreader::BitReader;
use crate::common::{BlockType, FrameHeader};
use crate::error::Result;

/// Per-granule, per-channel side information.
#[derive(Clone, Debug, Default)]
pub struct GranuleChannel {
    pub part2_3_length: u32,
    pub big_values: u32,
    pub global_gain: u8,
    pub scalefac_compress: u32,
    pub window_switching: bool,
    pub block_type: BlockTypeBits,
    pub mixed_block_flag: bool,
    pub table_select: [u8; 3],
    pub subblock_gain: [u8; 3],
    pub region0_count: u32,
    pub region1_count: u32,
    pub preflag: bool,
    pub scalefac_scale: bool,
    pub count1table_select: bool,
}

/// The raw 2-bit `block_type` field, kept distinct from [`BlockType`] so
/// default-construction doesn't need to invent a `mixed_block_flag`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockTypeBits(pub u32);

impl GranuleChannel {
    pub fn block_type(&self) -> BlockType {
        BlockType::from_bits(self.block_type.0, self.mixed_block_flag)
    }

    /// Region boundaries (in sample indices, 0..576) for the big-value
    /// region split, per the §4.6 rule.
    pub fn region_boundaries(&self, long_bands: &[usize; 23]) -> (usize, usize) {
        if self.window_switching && self.block_type.0 == 2 {
            (36, 576)
        } else {
            let r0 = long_bands[(self.region0_count + 1) as usize];
            let r1 = long_bands[(self.region0_count + self.region1_count + 2) as usize];
            (r0, r1)
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Granule {
    pub channels: [GranuleChannel; 2],
}

#[derive(Clone, Debug, Default)]
pub struct SideInfo {
    pub main_data_begin: u32,
    /// `scfsi[channel][group]`, four groups per channel.
    pub scfsi: [[bool; 4]; 2],
    pub granules: [Granule; 2],
}

/// Parse side information for `n_channels` channels (1 or 2) from `buf`,
/// which must be exactly 17 (mono) or 32 (stereo) bytes long.
pub fn read_side_info(buf: &[u8], n_channels: usize) -> Result<SideInfo> {
    let mut reader = BitReader::new(buf);
    let mut side_info = SideInfo { main_data_begin: reader.read(9)?, ..Default::default() };

    let _private_bits = reader.read(if n_channels == 1 { 5 } else { 3 })?;

    for ch in 0..n_channels {
        for band in 0..4 {
            side_info.scfsi[ch][band] = reader.read(1)? != 0;
        }
    }

    for granule in 0..2 {
        for ch in 0..n_channels {
            let mut gc = GranuleChannel {
                part2_3_length: reader.read(12)?,
                big_values: reader.read(9)?,
                global_gain: reader.read(8)? as u8,
                scalefac_compress: reader.read(4)?,
                window_switching: reader.read(1)? != 0,
                ..Default::default()
            };

            if gc.window_switching {
                let block_type = reader.read(2)?;
                gc.block_type = BlockTypeBits(block_type);
                gc.mixed_block_flag = reader.read(1)? != 0;

                for i in 0..2 {
                    gc.table_select[i] = reader.read(5)? as u8;
                }
                for i in 0..3 {
                    gc.subblock_gain[i] = reader.read(3)? as u8;
                }

                gc.region0_count = if block_type == 2 { 8 } else { 7 };
                gc.region1_count = 20 - gc.region0_count;
            } else {
                gc.block_type = BlockTypeBits(0);
                for i in 0..3 {
                    gc.table_select[i] = reader.read(5)? as u8;
                }
                gc.region0_count = reader.read(4)?;
                gc.region1_count = reader.read(3)?;
            }

            gc.preflag = reader.read(1)? != 0;
            gc.scalefac_scale = reader.read(1)? != 0;
            gc.count1table_select = reader.read(1)? != 0;

            side_info.granules[granule].channels[ch] = gc;
        }
    }

    Ok(side_info)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono_long_block_fixture() -> Vec<u8> {
        // Hand-assembled 17-byte mono side info with window_switching=0 for
        // both granules, all other fields zero.
        let mut bits: Vec<u8> = Vec::new();
        let mut push = |value: u32, n: u32| {
            for i in (0..n).rev() {
                bits.push(((value >> i) & 1) as u8);
            }
        };
        push(0, 9); // main_data_begin
        push(0, 5); // private bits (mono)
        for _ in 0..4 {
            push(0, 1); // scfsi
        }
        for _granule in 0..2 {
            push(100, 12); // part2_3_length
            push(10, 9); // big_values
            push(20, 8); // global_gain
            push(0, 4); // scalefac_compress
            push(0, 1); // window_switching = 0
            push(0, 5); // table_select[0]
            push(0, 5); // table_select[1]
            push(0, 5); // table_select[2]
            push(0, 4); // region0_count
            push(0, 3); // region1_count
            push(0, 1); // preflag
            push(0, 1); // scalefac_scale
            push(0, 1); // count1table_select
        }
        while bits.len() % 8 != 0 {
            bits.push(0);
        }
        bits.chunks(8)
            .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b))
            .collect()
    }

    #[test]
    fn parses_mono_long_block_fixture() {
        let buf = mono_long_block_fixture();
        assert_eq!(buf.len(), 17);
        let side_info = read_side_info(&buf, 1).unwrap();
        assert_eq!(side_info.main_data_begin, 0);
        for granule in &side_info.granules {
            let ch = &granule.channels[0];
            assert_eq!(ch.part2_3_length, 100);
            assert_eq!(ch.big_values, 10);
            assert_eq!(ch.global_gain, 20);
            assert!(!ch.window_switching);
            assert_eq!(ch.block_type(), BlockType::Long);
        }
    }

    #[test]
    fn window_switching_short_block_sets_region_counts() {
        let mut bits: Vec<u8> = Vec::new();
        let mut push = |value: u32, n: u32| {
            for i in (0..n).rev() {
                bits.push(((value >> i) & 1) as u8);
            }
        };
        push(0, 9);
        push(0, 5);
        for _ in 0..4 {
            push(0, 1);
        }
        // Granule 0: window switching, block_type=2 (short), mixed=0.
        push(0, 12);
        push(0, 9);
        push(0, 8);
        push(0, 4);
        push(1, 1); // window_switching
        push(2, 2); // block_type
        push(0, 1); // mixed_block_flag
        push(0, 5);
        push(0, 5);
        push(0, 3);
        push(0, 3);
        push(0, 3);
        push(0, 1);
        push(0, 1);
        push(0, 1);
        // Granule 1: long block, all zero.
        for _ in 0..(12 + 9 + 8 + 4 + 1 + 5 * 3 + 4 + 3 + 1 + 1 + 1) {
            bits.push(0);
        }
        while bits.len() % 8 != 0 {
            bits.push(0);
        }
        let buf: Vec<u8> = bits
            .chunks(8)
            .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b))
            .collect();

        let side_info = read_side_info(&buf, 1).unwrap();
        let gc = &side_info.granules[0].channels[0];
        assert!(gc.window_switching);
        assert_eq!(gc.block_type.0, 2);
        assert_eq!(gc.region0_count, 8);
        assert_eq!(gc.region1_count, 12);
    }
}

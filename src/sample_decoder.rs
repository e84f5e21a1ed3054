// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decodes the 576 quantized integer coefficients of one granule/channel
//! from the big-values, count-1, and zero (rzero) regions.

use crate::bitreader::BitReader;
use crate::error::Result;
use crate::huffman::{big_value_tree, decode_count1_quad};
use crate::side_info::GranuleChannel;

/// Decode 576 quantized integer coefficients for one granule/channel.
/// `granule_start_bit` is the bit position at which this granule/channel's
/// side-data (scale factors plus Huffman-coded samples) began; together with
/// `gc.part2_3_length` it bounds how many bits this call may consume.
pub fn decode_granule_channel(
    reader: &mut BitReader,
    gc: &GranuleChannel,
    long_bands: &[usize; 23],
    granule_start_bit: usize,
) -> Result<[i32; 576]> {
    let mut is = [0i32; 576];
    let max_bit = granule_start_bit + gc.part2_3_length as usize;

    let (region0, region1) = gc.region_boundaries(long_bands);

    let mut sample = 0usize;
    while sample < 2 * gc.big_values as usize {
        let region = if sample < region0 {
            0
        } else if sample < region1 {
            1
        } else {
            2
        };
        let table_select = gc.table_select[region];

        let (mut x, mut y) = match big_value_tree(table_select) {
            Some((tree, info)) => {
                let mut pos = reader.position();
                let (x, y) = tree.decode(reader_buf(reader), &mut pos)?;
                reader.skip((pos - reader.position()) as u32);
                (extend_with_linbits(reader, x, info.width, info.linbits)?,
                 extend_with_linbits(reader, y, info.width, info.linbits)?)
            }
            None => (0i32, 0i32),
        };

        if x != 0 && reader.read(1)? != 0 {
            x = -x;
        }
        if y != 0 && reader.read(1)? != 0 {
            y = -y;
        }

        is[sample] = x;
        is[sample + 1] = y;
        sample += 2;
    }

    let table_a = gc.count1table_select;
    while reader.position() < max_bit && sample + 4 <= 576 {
        let mut pos = reader.position();
        let (v, w, x, y) = decode_count1_quad(reader_buf(reader), &mut pos, table_a)?;
        reader.skip((pos - reader.position()) as u32);

        let mut v = v as i32;
        let mut w = w as i32;
        let mut x = x as i32;
        let mut y = y as i32;

        if v != 0 && reader.read(1)? != 0 {
            v = -v;
        }
        if w != 0 && reader.read(1)? != 0 {
            w = -w;
        }
        if x != 0 && reader.read(1)? != 0 {
            x = -x;
        }
        if y != 0 && reader.read(1)? != 0 {
            y = -y;
        }

        is[sample] = v;
        is[sample + 1] = w;
        is[sample + 2] = x;
        is[sample + 3] = y;
        sample += 4;
    }

    // Zero (rzero) region: remaining samples are already zero-initialized.
    // Skip any unused bits up to the declared granule length (stuffing), or
    // stop early if this granule overran its budget.
    if max_bit > reader.position() {
        reader.skip((max_bit - reader.position()) as u32);
    }

    Ok(is)
}

/// If the decoded magnitude hit the table's escape value, read `linbits`
/// more bits and add them to extend the magnitude.
fn extend_with_linbits(reader: &mut BitReader, value: u32, width: u32, linbits: u32) -> Result<i32> {
    let escape = width - 1;
    if linbits > 0 && value == escape {
        let extra = reader.read(linbits)?;
        Ok((escape + extra) as i32)
    } else {
        Ok(value as i32)
    }
}

/// Exposes the underlying byte buffer of a [`BitReader`] for direct
/// `(cursor, tree)`-style Huffman decoding. `BitReader` doesn't otherwise
/// hand out its buffer to keep random access centralized in `bitreader`.
fn reader_buf<'a>(reader: &'a BitReader<'a>) -> &'a [u8] {
    reader.buf_for_huffman()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::side_info::BlockTypeBits;

    #[test]
    fn zero_length_granule_decodes_to_all_zero_coefficients() {
        // big_values = 0 and part2_3_length = 0: both the big-values loop
        // and the count1 loop are empty (the latter because
        // `reader.position() < max_bit` is false from the start), so this
        // is purely a zero-region test.
        let buf = [0xFFu8; 8];
        let mut reader = BitReader::new(&buf);
        let gc = GranuleChannel {
            big_values: 0,
            part2_3_length: 0,
            count1table_select: true,
            block_type: BlockTypeBits(0),
            ..Default::default()
        };
        let long_bands = crate::tables::SFB_LONG_BANDS[0];
        let is = decode_granule_channel(&mut reader, &gc, &long_bands, 0).unwrap();
        assert_eq!(is, [0i32; 576]);
    }
}

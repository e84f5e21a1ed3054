// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Frame header synchronization and parsing.

use crate::common::*;
use crate::error::{format_error, Result};
use crate::tables::{
    BIT_RATES_MPEG1_L1, BIT_RATES_MPEG1_L2, BIT_RATES_MPEG1_L3, BIT_RATES_MPEG2_L1,
    BIT_RATES_MPEG2_L23,
};

/// The length in bytes of a MPEG frame header word.
pub const MPEG_HEADER_LEN: usize = 4;

/// The maximum length in bytes of a MPEG audio frame including the header.
pub const MAX_MPEG_FRAME_SIZE: usize = 2881;

/// Quickly check if a header sync word may be valid: version, layer,
/// bitrate, and sample-rate fields must not be a reserved value.
#[inline]
pub fn check_header(header: u32) -> bool {
    if (header >> 19) & 0x3 == 0x1 {
        return false;
    }
    if (header >> 17) & 0x3 == 0x0 {
        return false;
    }
    if (header >> 12) & 0xf == 0xf {
        return false;
    }
    if (header >> 10) & 0x3 == 0x3 {
        return false;
    }
    true
}

/// Returns true if the top 11 bits of `sync` are the frame sync pattern.
#[inline(always)]
pub fn is_frame_header_word_synced(sync: u32) -> bool {
    (sync & 0xffe0_0000) == 0xffe0_0000
}

/// Scan `buf` for the next byte-aligned, plausible frame sync word, starting
/// at `buf[0]`. Returns the 4-byte header word and the number of bytes
/// skipped to reach it.
pub fn sync_frame(buf: &[u8]) -> Result<(u32, usize)> {
    let mut pos = 0usize;
    let mut sync = 0u32;

    loop {
        while !is_frame_header_word_synced(sync) {
            if pos >= buf.len() {
                return format_error("no frame sync found before end of buffer");
            }
            sync = (sync << 8) | u32::from(buf[pos]);
            pos += 1;
        }

        if check_header(sync) {
            break;
        }

        if pos >= buf.len() {
            return format_error("no frame sync found before end of buffer");
        }
        sync = (sync << 8) | u32::from(buf[pos]);
        pos += 1;
    }

    Ok((sync, pos - MPEG_HEADER_LEN))
}

/// Parse a 32-bit header word, previously synchronized, into a
/// [`FrameHeader`].
pub fn parse_frame_header(header: u32) -> Result<FrameHeader> {
    // 0b1111_1111 0b111v_vlly 0brrrr_hhpx 0bmmmm_coee
    // vv = version, ll = layer, y = crc, rrrr = bitrate, hh = sample rate,
    // p = padding, x = private, mmmm = mode, c = copyright, o = original,
    // ee = emphasis.
    let version = match (header & 0x18_0000) >> 19 {
        0b00 => MpegVersion::Mpeg2p5,
        0b10 => MpegVersion::Mpeg2,
        0b11 => MpegVersion::Mpeg1,
        _ => return format_error("invalid MPEG version"),
    };

    let layer = match (header & 0x6_0000) >> 17 {
        0b01 => MpegLayer::Layer3,
        0b10 => MpegLayer::Layer2,
        0b11 => MpegLayer::Layer1,
        _ => return format_error("invalid MPEG layer"),
    };

    let bitrate = match ((header & 0xf000) >> 12, version, layer) {
        (0b0000, _, _) => return format_error("free bit-rate is not supported"),
        (0b1111, _, _) => return format_error("invalid bit-rate index"),
        (i, MpegVersion::Mpeg1, MpegLayer::Layer1) => BIT_RATES_MPEG1_L1[i as usize],
        (i, MpegVersion::Mpeg1, MpegLayer::Layer2) => BIT_RATES_MPEG1_L2[i as usize],
        (i, MpegVersion::Mpeg1, MpegLayer::Layer3) => BIT_RATES_MPEG1_L3[i as usize],
        (i, _, MpegLayer::Layer1) => BIT_RATES_MPEG2_L1[i as usize],
        (i, _, _) => BIT_RATES_MPEG2_L23[i as usize],
    };

    let (sample_rate, sample_rate_idx) = match ((header & 0xc00) >> 10, version) {
        (0b00, MpegVersion::Mpeg1) => (44_100, 0),
        (0b01, MpegVersion::Mpeg1) => (48_000, 1),
        (0b10, MpegVersion::Mpeg1) => (32_000, 2),
        (0b00, MpegVersion::Mpeg2) => (22_050, 3),
        (0b01, MpegVersion::Mpeg2) => (24_000, 4),
        (0b10, MpegVersion::Mpeg2) => (16_000, 5),
        (0b00, MpegVersion::Mpeg2p5) => (11_025, 6),
        (0b01, MpegVersion::Mpeg2p5) => (12_000, 7),
        (0b10, MpegVersion::Mpeg2p5) => (8_000, 8),
        _ => return format_error("invalid sample rate index"),
    };

    let channel_mode = match (header & 0xc0) >> 6 {
        0b00 => ChannelMode::Stereo,
        0b10 => ChannelMode::DualMono,
        0b11 => ChannelMode::Mono,
        0b01 => ChannelMode::JointStereo(Layer3Mode {
            mid_side: header & 0x20 != 0x0,
            intensity: header & 0x10 != 0x0,
        }),
        _ => unreachable!("channel mode is a 2-bit field"),
    };

    let emphasis = match header & 0x3 {
        0b01 => Emphasis::Fifty15,
        0b11 => Emphasis::CcitJ17,
        _ => Emphasis::None,
    };

    let is_copyrighted = header & 0x8 != 0x0;
    let is_original = header & 0x4 != 0x0;
    let has_padding = header & 0x200 != 0;
    let has_crc = header & 0x1_0000 == 0;

    let factor: u32 = match layer {
        MpegLayer::Layer1 => 12,
        MpegLayer::Layer2 => 144,
        MpegLayer::Layer3 if version == MpegVersion::Mpeg1 => 144,
        MpegLayer::Layer3 => 72,
    };

    let slot_size: usize = match layer {
        MpegLayer::Layer1 => 4,
        _ => 1,
    };

    let frame_size_slots = (factor * bitrate / sample_rate) as usize + usize::from(has_padding);
    let frame_length = frame_size_slots * slot_size;

    if frame_length < MPEG_HEADER_LEN {
        return format_error("computed frame length shorter than the header itself");
    }

    Ok(FrameHeader {
        version,
        layer,
        bitrate_bps: bitrate,
        sample_rate_hz: sample_rate,
        sample_rate_idx,
        channel_mode,
        emphasis,
        is_copyrighted,
        is_original,
        has_padding,
        has_crc,
        frame_length,
    })
}

/// Synchronize to, and parse, the next frame header in `buf`. Returns the
/// header and the number of bytes that were skipped before the header
/// began.
pub fn read_frame_header(buf: &[u8]) -> Result<(FrameHeader, usize)> {
    let (word, skipped) = sync_frame(buf)?;
    let header = parse_frame_header(word)?;
    Ok((header, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scenario_one() {
        let word = u32::from_be_bytes([0xFF, 0xFB, 0x90, 0x44]);
        let header = parse_frame_header(word).unwrap();
        assert_eq!(header.version, MpegVersion::Mpeg1);
        assert_eq!(header.layer, MpegLayer::Layer3);
        assert!(!header.has_crc);
        assert_eq!(header.bitrate_bps, 128_000);
        assert_eq!(header.sample_rate_hz, 44_100);
        assert!(!header.has_padding);
        assert_eq!(header.frame_length, 417);
        assert_eq!(header.channels(), 2);
        assert!(matches!(header.channel_mode, ChannelMode::JointStereo(_)));
    }

    #[test]
    fn parses_scenario_two_with_padding() {
        let word = u32::from_be_bytes([0xFF, 0xFB, 0x92, 0x64]);
        let header = parse_frame_header(word).unwrap();
        assert_eq!(header.bitrate_bps, 128_000);
        assert_eq!(header.sample_rate_hz, 44_100);
        assert!(header.has_padding);
        assert_eq!(header.frame_length, 418);
    }

    #[test]
    fn rejects_bad_sync() {
        let buf = [0x00, 0x00, 0x00, 0x00];
        assert!(sync_frame(&buf).is_err());
    }

    #[test]
    fn sync_frame_skips_garbage_prefix() {
        let mut buf = vec![0x00, 0x11, 0x22];
        buf.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x44]);
        let (word, skipped) = sync_frame(&buf).unwrap();
        assert_eq!(skipped, 3);
        assert_eq!(word, u32::from_be_bytes([0xFF, 0xFB, 0x90, 0x44]));
    }

    #[test]
    fn mono_side_info_length_is_17() {
        let word = u32::from_be_bytes([0xFF, 0xFB, 0xD0, 0x44]);
        let header = parse_frame_header(word).unwrap();
        assert_eq!(header.channels(), 1);
        assert_eq!(header.side_info_len(), 17);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared enumerations and the [`FrameHeader`] type produced by [`crate::header`].

/// The MPEG version announced by a frame header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MpegVersion {
    /// MPEG Version 1.
    Mpeg1,
    /// MPEG Version 2.
    Mpeg2,
    /// MPEG Version 2.5.
    Mpeg2p5,
}

/// The MPEG audio layer announced by a frame header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MpegLayer {
    Layer1,
    Layer2,
    Layer3,
}

/// Joint-stereo coding mode for Layer III, carried in the mode-extension
/// bits of the frame header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Layer3Mode {
    pub mid_side: bool,
    pub intensity: bool,
}

/// The channel mode announced by a frame header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChannelMode {
    Stereo,
    JointStereo(Layer3Mode),
    DualMono,
    Mono,
}

impl ChannelMode {
    /// Number of audio channels carried by this mode: 1 for mono, else 2.
    pub fn channels(&self) -> usize {
        match self {
            ChannelMode::Mono => 1,
            _ => 2,
        }
    }

    pub fn is_mid_side(&self) -> bool {
        matches!(self, ChannelMode::JointStereo(Layer3Mode { mid_side: true, .. }))
    }

    pub fn is_intensity(&self) -> bool {
        matches!(self, ChannelMode::JointStereo(Layer3Mode { intensity: true, .. }))
    }
}

/// De-emphasis curve announced by a frame header. The decoder itself never
/// applies de-emphasis; it is surfaced for a downstream player to act on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Emphasis {
    None,
    Fifty15,
    CcitJ17,
}

/// A fully parsed MPEG frame header.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameHeader {
    pub version: MpegVersion,
    pub layer: MpegLayer,
    pub bitrate_bps: u32,
    pub sample_rate_hz: u32,
    pub sample_rate_idx: usize,
    pub channel_mode: ChannelMode,
    pub emphasis: Emphasis,
    pub is_copyrighted: bool,
    pub is_original: bool,
    pub has_padding: bool,
    pub has_crc: bool,
    /// Total frame length in bytes, including the 4-byte header.
    pub frame_length: usize,
}

impl FrameHeader {
    pub fn is_mpeg1(&self) -> bool {
        self.version == MpegVersion::Mpeg1
    }

    /// Number of audio channels: 1 for mono, else 2.
    pub fn channels(&self) -> usize {
        self.channel_mode.channels()
    }

    /// Length, in bytes, of the side information block that follows the
    /// header (and the 2-byte CRC, if present): 17 bytes for mono, 32 bytes
    /// otherwise. Defined only for MPEG-1; callers must check
    /// [`FrameHeader::is_mpeg1`] first.
    pub fn side_info_len(&self) -> usize {
        if self.channels() == 1 {
            17
        } else {
            32
        }
    }
}

/// The block type of a granule/channel, as carried by side info.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlockType {
    /// Normal long block (type 0).
    Long,
    /// Start long-to-short transition block (type 1).
    Start,
    /// Three short blocks (type 2).
    Short { is_mixed: bool },
    /// End short-to-long transition block (type 3).
    End,
}

impl BlockType {
    pub fn from_bits(block_type: u32, mixed_block_flag: bool) -> BlockType {
        match block_type {
            0 => BlockType::Long,
            1 => BlockType::Start,
            2 => BlockType::Short { is_mixed: mixed_block_flag },
            3 => BlockType::End,
            _ => unreachable!("block_type is a 2-bit field"),
        }
    }

    pub fn is_short_family(&self) -> bool {
        matches!(self, BlockType::Short { .. })
    }
}

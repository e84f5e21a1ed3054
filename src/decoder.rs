// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The top-level frame decoder: wires header parsing, the bit reservoir,
//! side info, scale factors, Huffman decoding, requantization, joint
//! stereo, anti-alias/reorder, IMDCT, frequency inversion, and synthesis
//! into a single `decode_frame` call.

use log::warn;

use crate::bitreader::BitReader;
use crate::common::{BlockType, FrameHeader};
use crate::error::{format_error, truncated_error, Error, Result};
use crate::header::{read_frame_header, MPEG_HEADER_LEN};
use crate::imdct::{imdct_and_overlap, OverlapState};
use crate::pcm::{clamp_to_i16, interleave};
use crate::reorder_alias::{anti_alias, reorder_short};
use crate::requantize::requantize;
use crate::reservoir::Reservoir;
use crate::sample_decoder::decode_granule_channel;
use crate::scalefactors::{read_scale_factors, ChannelScaleFactors};
use crate::side_info::{read_side_info, GranuleChannel};
use crate::stereo::process_stereo;
use crate::synthesis::{frequency_invert, synthesize_granule, SynthesisFifo};
use crate::tables::{SFB_LONG_BANDS, SFB_SHORT_BANDS};

/// Decoder-wide tunables. `max_reservoir_bytes` bounds how much trailing
/// main-data history the bit reservoir keeps for `main_data_begin`
/// back-references; 2048 bytes comfortably covers the largest MPEG-1 Layer
/// III frame (`MAX_MPEG_FRAME_SIZE`) plus slack.
#[derive(Clone, Debug)]
pub struct Config {
    pub max_reservoir_bytes: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config { max_reservoir_bytes: 2048 }
    }
}

/// Coarse decoder state, surfaced mainly for diagnostics: a frame decodes
/// successfully and moves the decoder to `Decoding`, or a reservoir
/// underflow (typical only for the first few frames after a seek or at
/// stream start) moves it to `AwaitResync` while decoding continues
/// best-effort.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoderState {
    Idle,
    Decoding,
    AwaitResync,
}

/// One decoded frame's output.
pub struct DecodeResult {
    pub header: FrameHeader,
    /// Interleaved PCM samples, `i16`, at `header.sample_rate_hz`.
    pub pcm: Vec<i16>,
    /// Total bytes consumed from the input buffer, including any garbage
    /// skipped before the frame's sync word.
    pub consumed: usize,
}

pub struct FrameDecoder {
    config: Config,
    state: DecoderState,
    reservoir: Reservoir,
    overlap: [OverlapState; 2],
    synth_fifo: [SynthesisFifo; 2],
    prev_granule0_sf: [Option<ChannelScaleFactors>; 2],
}

impl FrameDecoder {
    pub fn new(config: Config) -> FrameDecoder {
        let max_bytes = config.max_reservoir_bytes;
        FrameDecoder {
            config,
            state: DecoderState::Idle,
            reservoir: Reservoir::new(max_bytes),
            overlap: [OverlapState::default(), OverlapState::default()],
            synth_fifo: [SynthesisFifo::new(), SynthesisFifo::new()],
            prev_granule0_sf: [None, None],
        }
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Reset all cross-frame state: the reservoir, overlap-add history, and
    /// synthesis filterbank FIFOs. Call this after a seek.
    pub fn reset(&mut self) {
        self.state = DecoderState::Idle;
        self.reservoir.reset();
        self.overlap = [OverlapState::default(), OverlapState::default()];
        self.synth_fifo = [SynthesisFifo::new(), SynthesisFifo::new()];
        self.prev_granule0_sf = [None, None];
    }

    /// Decode one frame starting anywhere in `buf`, returning the header,
    /// PCM samples, and total bytes consumed (including any skipped
    /// garbage before the sync word).
    pub fn decode_frame(&mut self, buf: &[u8]) -> Result<DecodeResult> {
        let (header, skipped) = read_frame_header(buf)?;

        if !header.is_mpeg1() {
            return format_error("only MPEG-1 streams are supported by this decoder");
        }

        let frame_end = skipped + header.frame_length;
        if buf.len() < frame_end {
            return truncated_error("input buffer ends before the declared frame length");
        }
        let frame = &buf[skipped..frame_end];

        let crc_len = if header.has_crc { 2 } else { 0 };
        let side_info_start = MPEG_HEADER_LEN + crc_len;
        let side_info_len = header.side_info_len();
        if frame.len() < side_info_start + side_info_len {
            return truncated_error("frame too short to contain its side info");
        }
        let side_info_bytes = &frame[side_info_start..side_info_start + side_info_len];
        let main_data_bytes = &frame[side_info_start + side_info_len..];

        let n_channels = header.channels();
        let side_info = read_side_info(side_info_bytes, n_channels)?;

        let assembled = match self.reservoir.assemble(side_info.main_data_begin as usize, main_data_bytes) {
            Ok(data) => {
                self.state = DecoderState::Decoding;
                data
            }
            Err(_) => {
                warn!("reservoir underflow: decoding this frame without back-referenced history");
                self.state = DecoderState::AwaitResync;
                main_data_bytes.to_vec()
            }
        };

        let long_bands = &SFB_LONG_BANDS[header.sample_rate_idx];
        let short_bands = &SFB_SHORT_BANDS[header.sample_rate_idx];

        let mut reader = BitReader::new(&assembled);
        let mut pcm_channels: Vec<Vec<i16>> = vec![Vec::with_capacity(1152); n_channels];

        for granule in 0..2 {
            let mut xr = [[0f32; 576]; 2];
            let mut gcs: [GranuleChannel; 2] = Default::default();
            let mut current_sf1: Option<ChannelScaleFactors> = None;

            for ch in 0..n_channels {
                let gc = side_info.granules[granule].channels[ch].clone();
                let start_bit = reader.position();

                let sf = read_scale_factors(
                    &mut reader,
                    &gc,
                    &side_info.scfsi[ch],
                    granule == 1,
                    self.prev_granule0_sf[ch].as_ref(),
                )?;
                if granule == 0 {
                    self.prev_granule0_sf[ch] = Some(sf.clone());
                }
                if ch == 1 {
                    current_sf1 = Some(sf.clone());
                }

                let max_bit = start_bit + gc.part2_3_length as usize;
                let is = match decode_granule_channel(&mut reader, &gc, long_bands, start_bit) {
                    Ok(is) => is,
                    Err(Error::HuffmanError(desc)) => {
                        warn!("huffman decode error in granule {} channel {}: {}", granule, ch, desc);
                        let resync_to = max_bit.min(reader.total_bits());
                        if resync_to > reader.position() {
                            reader.skip((resync_to - reader.position()) as u32);
                        }
                        [0i32; 576]
                    }
                    Err(e) => return Err(e),
                };

                xr[ch] = requantize(&is, &gc, &sf, long_bands, short_bands);
                gcs[ch] = gc;
            }

            if n_channels == 2 {
                let (left, right) = xr.split_at_mut(1);
                let sf1 = current_sf1.unwrap_or_default();
                process_stereo(
                    &mut left[0],
                    &mut right[0],
                    &header.channel_mode,
                    &gcs[1],
                    &sf1,
                    long_bands,
                    short_bands,
                );
            }

            for ch in 0..n_channels {
                let block_type = gcs[ch].block_type();
                let mut xr_ch = xr[ch];
                anti_alias(&mut xr_ch, block_type);

                let short_windows = if block_type.is_short_family() {
                    let is_mixed = matches!(block_type, BlockType::Short { is_mixed: true });
                    Some(reorder_short(&xr_ch, short_bands, is_mixed))
                } else {
                    None
                };

                let mut hybrid =
                    imdct_and_overlap(&xr_ch, block_type, short_windows.as_ref(), &mut self.overlap[ch]);
                frequency_invert(&mut hybrid);
                let pcm576 = synthesize_granule(&hybrid, &mut self.synth_fifo[ch]);
                pcm_channels[ch].extend(pcm576.iter().map(|&s| clamp_to_i16(s)));
            }
        }

        Ok(DecodeResult { header, pcm: interleave(&pcm_channels), consumed: frame_end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_decoder_starts_idle() {
        let decoder = FrameDecoder::new(Config::default());
        assert_eq!(decoder.state(), DecoderState::Idle);
    }

    #[test]
    fn rejects_input_with_no_frame_sync() {
        let mut decoder = FrameDecoder::new(Config::default());
        let buf = [0u8; 32];
        assert!(decoder.decode_frame(&buf).is_err());
    }

    #[test]
    fn reset_restores_idle_state() {
        let mut decoder = FrameDecoder::new(Config::default());
        decoder.state = DecoderState::AwaitResync;
        decoder.reset();
        assert_eq!(decoder.state(), DecoderState::Idle);
        assert_eq!(decoder.reservoir.available(), 0);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A pure Rust MPEG-1 Audio Layer III (MP3) frame decoder.
//!
//! [`FrameDecoder`] turns a stream of MP3 frames into PCM: feed it bytes
//! starting anywhere at or before a frame sync word via
//! [`FrameDecoder::decode_frame`], get back interleaved `i16` samples.
//! Logging is emitted through the `log` crate; callers wanting diagnostics
//! should install a logger (`env_logger`, `simplelog`, ...).

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::excessive_precision)]

mod bitreader;
mod common;
mod decoder;
mod error;
mod header;
mod huffman;
mod imdct;
mod pcm;
mod reorder_alias;
mod requantize;
mod reservoir;
mod sample_decoder;
mod scalefactors;
mod side_info;
mod stereo;
mod synthesis;
mod tables;

pub use common::{BlockType, ChannelMode, Emphasis, FrameHeader, Layer3Mode, MpegLayer, MpegVersion};
pub use decoder::{Config, DecodeResult, DecoderState, FrameDecoder};
pub use error::{Error, Result};
pub use header::{read_frame_header, MAX_MPEG_FRAME_SIZE, MPEG_HEADER_LEN};

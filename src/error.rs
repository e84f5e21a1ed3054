// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;

/// Errors produced while decoding a MPEG-1 Layer III frame.
#[derive(Debug)]
pub enum Error {
    /// The frame sync pattern, layer, or a reserved field did not match.
    FormatError(&'static str),
    /// The input buffer ended before a header, side info block, or main-data
    /// region could be fully read.
    TruncatedInput(&'static str),
    /// `main_data_begin` referenced more history than the reservoir has
    /// accumulated.
    ReservoirUnderflow(&'static str),
    /// No entry in a Huffman table matched the next 32 bits of the stream.
    HuffmanError(&'static str),
    /// The decoder was asked to do something invalid for its current state.
    StateError(&'static str),
}

/// A specialized `Result` type for MP3 frame decoding.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The stable integer error code for this error, per the external
    /// interface's error taxonomy.
    pub fn code(&self) -> u32 {
        match self {
            Error::FormatError(_) => 2,
            Error::TruncatedInput(_) => 4,
            Error::ReservoirUnderflow(_) => 5,
            Error::HuffmanError(_) => 6,
            Error::StateError(_) => 1,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::FormatError(desc) => write!(f, "format error: {}", desc),
            Error::TruncatedInput(desc) => write!(f, "truncated input: {}", desc),
            Error::ReservoirUnderflow(desc) => write!(f, "reservoir underflow: {}", desc),
            Error::HuffmanError(desc) => write!(f, "huffman decode error: {}", desc),
            Error::StateError(desc) => write!(f, "invalid decoder state: {}", desc),
        }
    }
}

impl std::error::Error for Error {}

/// Convenience constructor for a [`Error::FormatError`] wrapped in `Err`.
pub fn format_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::FormatError(desc))
}

/// Convenience constructor for a [`Error::TruncatedInput`] wrapped in `Err`.
pub fn truncated_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::TruncatedInput(desc))
}

/// Convenience constructor for a [`Error::ReservoirUnderflow`] wrapped in `Err`.
pub fn reservoir_underflow<T>(desc: &'static str) -> Result<T> {
    Err(Error::ReservoirUnderflow(desc))
}

/// Convenience constructor for a [`Error::HuffmanError`] wrapped in `Err`.
pub fn huffman_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::HuffmanError(desc))
}

/// Convenience constructor for a [`Error::StateError`] wrapped in `Err`.
pub fn state_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::StateError(desc))
}

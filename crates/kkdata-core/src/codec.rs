//! Wire payload codec.
//!
//! Query results travel as `hex(lz4_frame(arrow_ipc(table)))`. The Arrow IPC
//! file format is self-describing: column names, column types (string,
//! integer, float, date) and nulls are carried in the payload itself, so the
//! client needs no schema up front.

use std::io::{Cursor, Read, Write};
use std::time::Instant;

use lz4_flex::frame::{FrameDecoder, FrameEncoder, FrameInfo};
use polars::prelude::*;
use tracing::{debug, instrument};

use crate::error::{KkDataError, Result};

/// Decode a hex-encoded wire payload into a [`DataFrame`].
///
/// Hex is validated before any decompression is attempted, so an odd-length
/// or non-hex payload, including one with surrounding whitespace, always
/// fails with [`KkDataError::Decode`].
#[instrument(skip(payload), fields(hex_len = payload.len()))]
pub fn decode(payload: &str) -> Result<DataFrame> {
    let started = Instant::now();
    let compressed = hex::decode(payload)?;
    debug!(
        compressed_bytes = compressed.len(),
        elapsed = ?started.elapsed(),
        "hex decoded"
    );

    let started = Instant::now();
    let serialized = decompress(&compressed)?;
    debug!(
        serialized_bytes = serialized.len(),
        elapsed = ?started.elapsed(),
        "lz4 frame decompressed"
    );

    let started = Instant::now();
    let df = deserialize(serialized)?;
    debug!(
        rows = df.height(),
        columns = df.width(),
        elapsed = ?started.elapsed(),
        "table deserialized"
    );

    Ok(df)
}

/// Encode a [`DataFrame`] into a hex-encoded wire payload.
///
/// The inverse of [`decode`]. The LZ4 frame is written with a content
/// checksum.
pub fn encode(df: &DataFrame) -> Result<String> {
    let serialized = serialize(df)?;
    let compressed = compress(&serialized)?;
    Ok(hex::encode(compressed))
}

fn decompress(compressed: &[u8]) -> Result<Vec<u8>> {
    if compressed.is_empty() {
        return Err(KkDataError::Decompress("empty frame".to_string()));
    }

    let mut decoder = FrameDecoder::new(compressed);
    let mut out = Vec::with_capacity(compressed.len() * 4);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| KkDataError::Decompress(e.to_string()))?;
    // A frame cut inside its header decodes to nothing without an error.
    if out.is_empty() {
        return Err(KkDataError::Decompress("truncated frame".to_string()));
    }
    Ok(out)
}

fn compress(bytes: &[u8]) -> Result<Vec<u8>> {
    let info = FrameInfo::new().content_checksum(true);
    let mut encoder = FrameEncoder::with_frame_info(info, Vec::new());
    encoder
        .write_all(bytes)
        .map_err(|e| KkDataError::Serialize(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| KkDataError::Serialize(e.to_string()))
}

fn deserialize(bytes: Vec<u8>) -> Result<DataFrame> {
    IpcReader::new(Cursor::new(bytes))
        .finish()
        .map_err(|e| KkDataError::Deserialize(e.to_string()))
}

fn serialize(df: &DataFrame) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    // IpcWriter needs a mutable frame to rechunk before writing.
    let mut df = df.clone();
    IpcWriter::new(&mut buf)
        .finish(&mut df)
        .map_err(|e| KkDataError::Serialize(e.to_string()))?;
    Ok(buf)
}

use std::io::Read;

use flate2::read::{GzDecoder, ZlibDecoder};

use crate::error::{Error, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Inflate a gzip or zlib stream, picked by the gzip magic bytes.
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let read = if bytes.starts_with(&GZIP_MAGIC) {
        GzDecoder::new(bytes).read_to_end(&mut out)
    } else {
        ZlibDecoder::new(bytes).read_to_end(&mut out)
    };
    read.map_err(|err| Error::Corrupted {
        reason: format!("invalid gzip data: {err}"),
    })?;
    tracing::debug!(compressed = bytes.len(), inflated = out.len(), "decompressed archive");
    Ok(out)
}

//! FlateDecode (zlib/deflate) support.

use flate2::read::ZlibDecoder;
use std::io::Read;

use crate::error::{Error, Result};

/// Inflate zlib-wrapped data.
///
/// Falls back to raw deflate when the zlib header is missing, which some
/// generators omit despite the spec.
pub fn decode(input: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    let mut decoder = ZlibDecoder::new(input);
    match decoder.read_to_end(&mut output) {
        Ok(_) => Ok(output),
        Err(_) => {
            output.clear();
            let mut raw = flate2::read::DeflateDecoder::new(input);
            raw.read_to_end(&mut output)
                .map_err(|e| Error::Decode(format!("FlateDecode failed: {}", e)))?;
            Ok(output)
        },
    }
}

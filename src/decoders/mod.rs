//! Stream filter decoding.
//!
//! The S0050/S0051 template family only uses `FlateDecode` (for content,
//! cross-reference and object streams) and the occasional `ASCIIHexDecode`.
//! Anything else is reported as unsupported; the engine never needs to
//! decode image filters.

mod ascii_hex;
mod flate;
mod predictor;

pub use predictor::{decode_predictor, DecodeParams};

use crate::error::{Error, Result};

/// Apply a filter chain to stream data, in order.
///
/// `params` only applies to the final predictor-capable filter, which is how
/// the templates in scope use DecodeParms.
pub fn decode_stream(
    data: &[u8],
    filters: &[String],
    params: Option<&DecodeParams>,
) -> Result<Vec<u8>> {
    let mut current = data.to_vec();
    for filter in filters {
        current = match filter.as_str() {
            "FlateDecode" | "Fl" => {
                let inflated = flate::decode(&current)?;
                match params {
                    Some(p) if p.predictor > 1 => decode_predictor(&inflated, p)?,
                    _ => inflated,
                }
            },
            "ASCIIHexDecode" | "AHx" => ascii_hex::decode(&current)?,
            other => return Err(Error::UnsupportedFilter(other.to_string())),
        };
    }
    Ok(current)
}

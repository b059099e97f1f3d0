//! Predictor post-processing for FlateDecode.
//!
//! Cross-reference streams in the wild almost always use PNG Up prediction;
//! the full PNG filter set is handled anyway.

use crate::error::{Error, Result};
use crate::object::Object;

/// DecodeParms relevant to prediction.
#[derive(Debug, Clone)]
pub struct DecodeParams {
    /// Predictor algorithm (1 = none, 2 = TIFF, >= 10 = PNG)
    pub predictor: i64,
    /// Samples per row
    pub columns: usize,
    /// Color components per sample
    pub colors: usize,
    /// Bits per component
    pub bits_per_component: usize,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            predictor: 1,
            columns: 1,
            colors: 1,
            bits_per_component: 8,
        }
    }
}

impl DecodeParams {
    /// Read prediction parameters from a DecodeParms entry (dictionary or
    /// array of dictionaries).
    pub fn from_object(obj: Option<&Object>) -> Option<Self> {
        let dict = match obj? {
            Object::Dictionary(d) => d,
            Object::Array(arr) => arr.iter().find_map(|o| o.as_dict())?,
            _ => return None,
        };
        Some(Self {
            predictor: dict.get("Predictor").and_then(|o| o.as_integer()).unwrap_or(1),
            columns: dict.get("Columns").and_then(|o| o.as_integer()).unwrap_or(1) as usize,
            colors: dict.get("Colors").and_then(|o| o.as_integer()).unwrap_or(1) as usize,
            bits_per_component: dict
                .get("BitsPerComponent")
                .and_then(|o| o.as_integer())
                .unwrap_or(8) as usize,
        })
    }

    fn bytes_per_row(&self) -> usize {
        (self.columns * self.colors * self.bits_per_component).div_ceil(8)
    }

    fn bytes_per_pixel(&self) -> usize {
        (self.colors * self.bits_per_component).div_ceil(8).max(1)
    }
}

/// Undo the predictor transformation on inflated data.
pub fn decode_predictor(data: &[u8], params: &DecodeParams) -> Result<Vec<u8>> {
    match params.predictor {
        1 => Ok(data.to_vec()),
        2 => decode_tiff(data, params),
        10..=15 => decode_png(data, params),
        p => Err(Error::Decode(format!("unsupported predictor {}", p))),
    }
}

fn decode_tiff(data: &[u8], params: &DecodeParams) -> Result<Vec<u8>> {
    if params.bits_per_component != 8 {
        return Err(Error::Decode("TIFF predictor requires 8-bit components".to_string()));
    }
    let row_len = params.bytes_per_row();
    let bpp = params.bytes_per_pixel();
    let mut out = data.to_vec();
    for row in out.chunks_mut(row_len) {
        for i in bpp..row.len() {
            row[i] = row[i].wrapping_add(row[i - bpp]);
        }
    }
    Ok(out)
}

fn decode_png(data: &[u8], params: &DecodeParams) -> Result<Vec<u8>> {
    let row_len = params.bytes_per_row();
    let bpp = params.bytes_per_pixel();
    let stride = row_len + 1; // one filter-type byte per row
    if row_len == 0 || data.len() % stride != 0 {
        return Err(Error::Decode(format!(
            "PNG predictor: data length {} does not fit rows of {}",
            data.len(),
            stride
        )));
    }

    let rows = data.len() / stride;
    let mut out = vec![0u8; rows * row_len];

    for r in 0..rows {
        let filter = data[r * stride];
        let src = &data[r * stride + 1..(r + 1) * stride];
        let (done, current) = out.split_at_mut(r * row_len);
        let prior = if r == 0 {
            &[] as &[u8]
        } else {
            &done[(r - 1) * row_len..]
        };
        let current = &mut current[..row_len];

        for i in 0..row_len {
            let raw = src[i];
            let left = if i >= bpp { current[i - bpp] } else { 0 };
            let up = if r > 0 { prior[i] } else { 0 };
            let up_left = if r > 0 && i >= bpp { prior[i - bpp] } else { 0 };
            current[i] = match filter {
                0 => raw,
                1 => raw.wrapping_add(left),
                2 => raw.wrapping_add(up),
                3 => raw.wrapping_add(((left as u16 + up as u16) / 2) as u8),
                4 => raw.wrapping_add(paeth(left, up, up_left)),
                f => return Err(Error::Decode(format!("unknown PNG filter {}", f))),
            };
        }
    }

    Ok(out)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let pa = (p - a as i16).abs();
    let pb = (p - b as i16).abs();
    let pc = (p - c as i16).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_predictor_passthrough() {
        let params = DecodeParams::default();
        assert_eq!(decode_predictor(&[1, 2, 3], &params).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_png_up() {
        // Two rows of 4 bytes with Up filtering (type 2).
        let params = DecodeParams {
            predictor: 12,
            columns: 4,
            ..Default::default()
        };
        let data = vec![
            2, 10, 20, 30, 40, // row 0: up from zeros
            2, 1, 1, 1, 1, // row 1: deltas against row 0
        ];
        let out = decode_predictor(&data, &params).unwrap();
        assert_eq!(out, vec![10, 20, 30, 40, 11, 21, 31, 41]);
    }

    #[test]
    fn test_png_sub() {
        let params = DecodeParams {
            predictor: 11,
            columns: 3,
            ..Default::default()
        };
        let data = vec![1, 5, 5, 5];
        assert_eq!(decode_predictor(&data, &params).unwrap(), vec![5, 10, 15]);
    }

    #[test]
    fn test_bad_length() {
        let params = DecodeParams {
            predictor: 12,
            columns: 4,
            ..Default::default()
        };
        assert!(decode_predictor(&[2, 1], &params).is_err());
    }
}

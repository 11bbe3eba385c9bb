//! Packing of interleaved PCM samples to and from `data` chunk bytes.
//!
//! Each sample occupies `bits_per_sample / 8` bytes, least significant byte first, and is
//! held unsigned in a `u64`.

use crate::error::{Result, RiffError};

/// Bytes per sample for `bits_per_sample`, rejecting depths that are not whole bytes or
/// do not fit a `u64`.
pub fn group_size(bits_per_sample: u16) -> Result<usize> {
    if bits_per_sample == 0 || bits_per_sample % 8 != 0 || bits_per_sample > 64 {
        return Err(RiffError::MalformedSampleData(format!(
            "unsupported bits per sample: {bits_per_sample}"
        )));
    }
    Ok(usize::from(bits_per_sample / 8))
}

pub fn decode(bytes: &[u8], bits_per_sample: u16) -> Result<Vec<u64>> {
    let width = group_size(bits_per_sample)?;
    if bytes.len() % width != 0 {
        return Err(RiffError::MalformedSampleData(format!(
            "{} data bytes is not a multiple of the {width}-byte sample size",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(width)
        .map(|group| {
            group
                .iter()
                .rev()
                .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
        })
        .collect())
}

/// Inverse of [`decode`]. Bits above the sample width are dropped.
pub fn encode(samples: &[u64], bits_per_sample: u16) -> Result<Vec<u8>> {
    let width = group_size(bits_per_sample)?;
    let mut out = Vec::with_capacity(samples.len() * width);
    for &s in samples {
        out.extend_from_slice(&s.to_le_bytes()[..width]);
    }
    Ok(out)
}

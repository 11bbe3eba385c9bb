use std::fmt;

use serde::Serialize;

use crate::error::{Result, RiffError};
use crate::riff::describe::hex_into;

/// Size of the fixed part of a `fmt ` payload.
pub const FMT_BASE_LEN: usize = 16;

pub const WAVE_FORMAT_PCM: u16 = 0x0001;

/// Header of a WAVE file, as carried by its `fmt ` chunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WavFormat {
    pub audio_format: u16,
    pub num_channels: u16,
    pub sample_rate: u32,
    /// Derived: `sample_rate * num_channels * bytes per sample`.
    pub byte_rate: u32,
    /// Derived: `num_channels * bytes per sample`.
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Format extension bytes following the `extra_params_size` field; usually empty.
    pub extra_params: Vec<u8>,
}

impl Default for WavFormat {
    fn default() -> Self {
        let mut f = Self {
            audio_format: WAVE_FORMAT_PCM,
            num_channels: 2,
            sample_rate: 44_100,
            byte_rate: 0,
            block_align: 0,
            bits_per_sample: 16,
            extra_params: Vec::new(),
        };
        f.refresh_derived();
        f
    }
}

#[inline]
fn le16(b: &[u8]) -> u16 {
    u16::from_le_bytes([b[0], b[1]])
}

#[inline]
fn le32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

impl WavFormat {
    /// Decode a `fmt ` payload. The first 16 bytes are positional; if more follow, the
    /// next two give the length of the extension bytes after them.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() < FMT_BASE_LEN {
            return Err(RiffError::Malformed(format!(
                "fmt chunk is {} bytes, need at least {FMT_BASE_LEN}",
                payload.len()
            )));
        }
        let b = payload;
        let mut format = Self {
            audio_format: le16(&b[0..2]),
            num_channels: le16(&b[2..4]),
            sample_rate: le32(&b[4..8]),
            byte_rate: le32(&b[8..12]),
            block_align: le16(&b[12..14]),
            bits_per_sample: le16(&b[14..16]),
            extra_params: Vec::new(),
        };

        if payload.len() > FMT_BASE_LEN {
            let rest = &payload[FMT_BASE_LEN..];
            if rest.len() < 2 {
                return Err(RiffError::Malformed(
                    "fmt chunk has a partial extra_params_size field".into(),
                ));
            }
            let extra_len = usize::from(le16(&rest[..2]));
            let extra = rest.get(2..2 + extra_len).ok_or_else(|| {
                RiffError::Malformed(format!(
                    "fmt chunk declares {extra_len} extra bytes, has {}",
                    rest.len() - 2
                ))
            })?;
            format.extra_params = extra.to_vec();
        }
        Ok(format)
    }

    /// Encode as a `fmt ` payload: 16 bytes, or 16 + 2 + N when extension bytes exist.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let extra_len = self.extra_params_size()?;
        let mut out = Vec::with_capacity(FMT_BASE_LEN + 2 + self.extra_params.len());
        out.extend_from_slice(&self.encode_base());
        if extra_len > 0 {
            out.extend_from_slice(&extra_len.to_le_bytes());
            out.extend_from_slice(&self.extra_params);
        }
        Ok(out)
    }

    /// The positional 16-byte part of the payload, without extension bytes.
    pub fn encode_base(&self) -> [u8; FMT_BASE_LEN] {
        let mut out = [0u8; FMT_BASE_LEN];
        out[0..2].copy_from_slice(&self.audio_format.to_le_bytes());
        out[2..4].copy_from_slice(&self.num_channels.to_le_bytes());
        out[4..8].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[8..12].copy_from_slice(&self.byte_rate.to_le_bytes());
        out[12..14].copy_from_slice(&self.block_align.to_le_bytes());
        out[14..16].copy_from_slice(&self.bits_per_sample.to_le_bytes());
        out
    }

    pub fn extra_params_size(&self) -> Result<u16> {
        u16::try_from(self.extra_params.len()).map_err(|_| {
            RiffError::Malformed(format!(
                "{} extra format bytes do not fit a 16-bit size",
                self.extra_params.len()
            ))
        })
    }

    /// Bytes used by one sample of one channel.
    pub fn sample_size(&self) -> usize {
        usize::from(self.bits_per_sample / 8)
    }

    pub fn calculate_byte_rate(&mut self) -> u32 {
        self.byte_rate = self
            .sample_rate
            .wrapping_mul(u32::from(self.num_channels))
            .wrapping_mul(self.sample_size() as u32);
        self.byte_rate
    }

    pub fn calculate_block_align(&mut self) -> u16 {
        self.block_align = self
            .num_channels
            .wrapping_mul(self.sample_size() as u16);
        self.block_align
    }

    /// Recompute both derived fields from channels, rate and bit depth.
    pub fn refresh_derived(&mut self) {
        self.calculate_byte_rate();
        self.calculate_block_align();
    }
}

impl fmt::Display for WavFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "audio format: {}", self.audio_format)?;
        writeln!(f, "num channels: {}", self.num_channels)?;
        writeln!(f, "sample rate: {}", self.sample_rate)?;
        writeln!(f, "byte rate: {}", self.byte_rate)?;
        writeln!(f, "block align: {}", self.block_align)?;
        writeln!(f, "bits per sample: {}", self.bits_per_sample)?;
        if !self.extra_params.is_empty() {
            let mut hex = String::new();
            hex_into(&mut hex, &self.extra_params);
            writeln!(f, "extra params ({} bytes): {hex}", self.extra_params.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm_stereo_16() -> Vec<u8> {
        let mut b = Vec::new();
        b.extend_from_slice(&1u16.to_le_bytes());
        b.extend_from_slice(&2u16.to_le_bytes());
        b.extend_from_slice(&48_000u32.to_le_bytes());
        b.extend_from_slice(&192_000u32.to_le_bytes());
        b.extend_from_slice(&4u16.to_le_bytes());
        b.extend_from_slice(&16u16.to_le_bytes());
        b
    }

    #[test]
    fn decodes_positional_fields() {
        let f = WavFormat::decode(&pcm_stereo_16()).unwrap();
        assert_eq!(f.audio_format, WAVE_FORMAT_PCM);
        assert_eq!(f.num_channels, 2);
        assert_eq!(f.sample_rate, 48_000);
        assert_eq!(f.byte_rate, 192_000);
        assert_eq!(f.block_align, 4);
        assert_eq!(f.bits_per_sample, 16);
        assert!(f.extra_params.is_empty());
        assert_eq!(f.sample_size(), 2);
    }

    #[test]
    fn sixteen_byte_header_round_trips_without_extension() {
        let raw = pcm_stereo_16();
        let f = WavFormat::decode(&raw).unwrap();
        assert_eq!(f.extra_params_size().unwrap(), 0);
        assert_eq!(f.encode().unwrap(), raw);
    }

    #[test]
    fn extension_bytes_are_read_and_written() {
        let mut raw = pcm_stereo_16();
        raw.extend_from_slice(&3u16.to_le_bytes());
        raw.extend_from_slice(&[0xde, 0xad, 0xbe]);
        let f = WavFormat::decode(&raw).unwrap();
        assert_eq!(f.extra_params, vec![0xde, 0xad, 0xbe]);
        assert_eq!(f.encode().unwrap(), raw);
    }

    #[test]
    fn zero_length_extension_is_dropped_on_encode() {
        let mut raw = pcm_stereo_16();
        raw.extend_from_slice(&0u16.to_le_bytes());
        let f = WavFormat::decode(&raw).unwrap();
        assert_eq!(f.encode().unwrap().len(), FMT_BASE_LEN);
    }

    #[test]
    fn short_or_inconsistent_payloads_are_malformed() {
        assert!(matches!(
            WavFormat::decode(&[0; 15]),
            Err(RiffError::Malformed(_))
        ));
        let mut partial = pcm_stereo_16();
        partial.push(0);
        assert!(WavFormat::decode(&partial).is_err());
        let mut overlong = pcm_stereo_16();
        overlong.extend_from_slice(&10u16.to_le_bytes());
        overlong.extend_from_slice(&[1, 2]);
        assert!(WavFormat::decode(&overlong).is_err());
    }

    #[test]
    fn derived_fields_follow_channels_and_depth() {
        let mut f = WavFormat {
            num_channels: 6,
            sample_rate: 96_000,
            bits_per_sample: 24,
            ..WavFormat::default()
        };
        f.refresh_derived();
        assert_eq!(f.block_align, 18);
        assert_eq!(f.byte_rate, 96_000 * 18);
    }

    #[test]
    fn display_lists_fields() {
        let text = WavFormat::default().to_string();
        assert!(text.contains("num channels: 2\n"));
        assert!(text.contains("byte rate: 176400\n"));
        assert!(!text.contains("extra params"));
    }
}

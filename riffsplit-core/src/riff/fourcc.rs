use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{Result, RiffError};

/// A four byte chunk identifier or form type, e.g. `RIFF`, `fmt `, `adtl`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FourCc([u8; 4]);

pub const RIFF: FourCc = FourCc::new(*b"RIFF");
pub const LIST: FourCc = FourCc::new(*b"LIST");
pub const NULL: FourCc = FourCc::new(*b"NULL");
pub const WAVE: FourCc = FourCc::new(*b"WAVE");
pub const FMT: FourCc = FourCc::new(*b"fmt ");
pub const DATA: FourCc = FourCc::new(*b"data");
pub const CUE: FourCc = FourCc::new(*b"cue ");
pub const ADTL: FourCc = FourCc::new(*b"adtl");
pub const LABL: FourCc = FourCc::new(*b"labl");
pub const NOTE: FourCc = FourCc::new(*b"note");

impl FourCc {
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Build an identifier from a string, which must be exactly four ASCII characters.
    pub fn parse(s: &str) -> Result<Self> {
        if !s.is_ascii() {
            return Err(RiffError::InvalidIdentifier(s.to_string()));
        }
        Self::from_slice(s.as_bytes()).map_err(|_| RiffError::InvalidIdentifier(s.to_string()))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; 4] = bytes
            .try_into()
            .map_err(|_| RiffError::InvalidIdentifier(String::from_utf8_lossy(bytes).into_owned()))?;
        Ok(Self(arr))
    }

    /// Reinterpret a little-endian packed integer (as stored in cue records).
    pub const fn from_u32_le(v: u32) -> Self {
        Self(v.to_le_bytes())
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    pub const fn to_u32_le(self) -> u32 {
        u32::from_le_bytes(self.0)
    }

    /// True for the two identifiers whose payload starts with a form type.
    pub fn is_list(&self) -> bool {
        *self == RIFF || *self == LIST
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCc(\"{self}\")")
    }
}

impl TryFrom<&str> for FourCc {
    type Error = RiffError;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<[u8; 4]> for FourCc {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl Serialize for FourCc {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

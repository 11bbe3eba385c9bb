use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, RiffError};
use crate::riff::document::RiffDocument;
use crate::riff::fourcc::{ADTL, CUE, FourCc, LABL, NOTE};

pub const CUE_RECORD_LEN: usize = 24;

/// One record of a `cue ` chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CuePoint {
    /// Marker id chosen by the authoring tool; keys into the label map.
    pub identifier: u32,
    pub position: u32,
    /// Four-character code packed little-endian, normally `data`.
    pub data_chunk_id: u32,
    pub chunk_start: u32,
    pub block_start: u32,
    /// Frame offset into the sample data.
    pub sample_start: u32,
}

impl CuePoint {
    fn from_record(r: &[u8]) -> Self {
        let f = |i: usize| u32::from_le_bytes([r[i], r[i + 1], r[i + 2], r[i + 3]]);
        Self {
            identifier: f(0),
            position: f(4),
            data_chunk_id: f(8),
            chunk_start: f(12),
            block_start: f(16),
            sample_start: f(20),
        }
    }

    pub fn to_record(&self) -> [u8; CUE_RECORD_LEN] {
        let mut out = [0u8; CUE_RECORD_LEN];
        let fields = [
            self.identifier,
            self.position,
            self.data_chunk_id,
            self.chunk_start,
            self.block_start,
            self.sample_start,
        ];
        for (slot, v) in out.chunks_exact_mut(4).zip(fields) {
            slot.copy_from_slice(&v.to_le_bytes());
        }
        out
    }

    pub fn data_chunk_fourcc(&self) -> FourCc {
        FourCc::from_u32_le(self.data_chunk_id)
    }
}

/// Cue points in cue-chunk order, plus the labels attached to them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CueMetadata {
    pub labels: BTreeMap<u32, String>,
    pub cues: Vec<CuePoint>,
}

impl CueMetadata {
    pub fn label_for(&self, cue: &CuePoint) -> Option<&str> {
        self.labels.get(&cue.identifier).map(String::as_str)
    }
}

pub fn extract(doc: &RiffDocument) -> Result<CueMetadata> {
    let labels = extract_labels(doc);
    let cues = extract_cues(doc)?;
    debug!(labels = labels.len(), cues = cues.len(), "extracted cue metadata");
    Ok(CueMetadata { labels, cues })
}

/// Labels from every `labl`/`note` chunk of each top-level `adtl` list. Later entries for
/// the same cue id replace earlier ones.
pub fn extract_labels(doc: &RiffDocument) -> BTreeMap<u32, String> {
    let mut labels = BTreeMap::new();
    let adtl_lists = doc
        .root()
        .children()
        .iter()
        .filter_map(|c| c.as_list())
        .filter(|l| l.form_type() == ADTL);
    for list in adtl_lists {
        for chunk in list.children().iter().filter_map(|c| c.as_data()) {
            if chunk.id() != LABL && chunk.id() != NOTE {
                continue;
            }
            let payload = chunk.payload();
            let Some((id_bytes, text)) = payload.split_first_chunk::<4>() else {
                warn!(id = %chunk.id(), len = payload.len(), "label chunk too short, skipped");
                continue;
            };
            let text = text.split(|&b| b == 0).next().unwrap_or_default();
            labels.insert(
                u32::from_le_bytes(*id_bytes),
                String::from_utf8_lossy(text).into_owned(),
            );
        }
    }
    labels
}

/// Cue points of the first `cue ` chunk, or none when the file has no such chunk.
pub fn extract_cues(doc: &RiffDocument) -> Result<Vec<CuePoint>> {
    let Some(chunk) = doc.find_first(CUE).and_then(|c| c.as_data()) else {
        return Ok(Vec::new());
    };
    let payload = chunk.payload();
    let Some((count, records)) = payload.split_first_chunk::<4>() else {
        return Err(RiffError::MalformedCueChunk {
            declared: 0,
            available: payload.len(),
        });
    };
    let declared = u32::from_le_bytes(*count);
    let needed = u64::from(declared) * CUE_RECORD_LEN as u64;
    if (records.len() as u64) < needed {
        return Err(RiffError::MalformedCueChunk {
            declared,
            available: records.len(),
        });
    }
    Ok(records
        .chunks_exact(CUE_RECORD_LEN)
        .take(declared as usize)
        .map(CuePoint::from_record)
        .collect())
}

/// Encode cue points as a `cue ` chunk payload.
pub fn encode_cues(cues: &[CuePoint]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + cues.len() * CUE_RECORD_LEN);
    out.extend_from_slice(&(cues.len() as u32).to_le_bytes());
    for cue in cues {
        out.extend_from_slice(&cue.to_record());
    }
    out
}

/// Encode a `labl`/`note` payload: cue id followed by zero-terminated text.
pub fn encode_label(identifier: u32, text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(5 + text.len());
    out.extend_from_slice(&identifier.to_le_bytes());
    out.extend_from_slice(text.as_bytes());
    out.push(0);
    out
}

// riffsplit_core/src/domain.rs
use serde::Serialize;

use crate::split::cue::{CueMetadata, CuePoint};
use crate::split::planner::SplitSegment;

#[derive(Clone, Debug, Serialize)]
pub struct SegmentRow {
    pub name: String,
    pub cue_id: u32,
    pub sample_start: u32,
    pub byte_offset: usize,
    pub byte_length: usize,
    pub frames: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct CueRow {
    pub identifier: u32,
    pub label: Option<String>,
    pub data_chunk: String,
    pub position: u32,
    pub sample_start: u32,
}

impl From<&SplitSegment> for SegmentRow {
    fn from(s: &SplitSegment) -> Self {
        Self {
            name: s.name.clone(),
            cue_id: s.cue.identifier,
            sample_start: s.cue.sample_start,
            byte_offset: s.byte_offset,
            byte_length: s.byte_length,
            frames: s.view.frame_count(),
        }
    }
}

impl CueRow {
    pub fn new(cue: &CuePoint, meta: &CueMetadata) -> Self {
        Self {
            identifier: cue.identifier,
            label: meta.label_for(cue).map(str::to_owned),
            data_chunk: cue.data_chunk_fourcc().to_string(),
            position: cue.position,
            sample_start: cue.sample_start,
        }
    }
}

pub fn cue_rows(meta: &CueMetadata) -> Vec<CueRow> {
    meta.cues.iter().map(|c| CueRow::new(c, meta)).collect()
}

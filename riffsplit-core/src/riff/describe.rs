//! Human-readable rendering of chunk trees. Pure: returns text, never prints.

use std::fmt::Write;

use super::chunk::{Chunk, DataChunk, ListChunk};

const PREVIEW_BYTES: usize = 8;
const INDENT: &str = "  ";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Detail {
    /// Identifiers, sizes and the first few payload bytes.
    #[default]
    Summary,
    /// Every payload byte, eight per line.
    Full,
}

pub fn describe(chunk: &Chunk, detail: Detail) -> String {
    let mut out = String::new();
    describe_into(&mut out, chunk, detail, 0);
    out
}

pub fn describe_list(list: &ListChunk, detail: Detail) -> String {
    let mut out = String::new();
    list_into(&mut out, list, detail, 0);
    out
}

fn describe_into(out: &mut String, chunk: &Chunk, detail: Detail, depth: usize) {
    match chunk {
        Chunk::Data(d) => data_into(out, d, detail, depth),
        Chunk::List(l) => list_into(out, l, detail, depth),
    }
}

fn list_into(out: &mut String, list: &ListChunk, detail: Detail, depth: usize) {
    let pad = INDENT.repeat(depth);
    let _ = writeln!(
        out,
        "{pad}{} form={} ({} chunks, {} bytes)",
        list.id(),
        list.form_type(),
        list.children().len(),
        list.size()
    );
    for child in list.children() {
        describe_into(out, child, detail, depth + 1);
    }
}

fn data_into(out: &mut String, chunk: &DataChunk, detail: Detail, depth: usize) {
    let pad = INDENT.repeat(depth);
    let payload = chunk.payload();
    let _ = writeln!(out, "{pad}{} ({} bytes)", chunk.id(), payload.len());
    match detail {
        Detail::Summary => {
            if payload.is_empty() {
                return;
            }
            let _ = write!(out, "{pad}{INDENT}");
            hex_into(out, &payload[..payload.len().min(PREVIEW_BYTES)]);
            if payload.len() > PREVIEW_BYTES {
                out.push_str(" ...");
            }
            out.push('\n');
        }
        Detail::Full => {
            for line in payload.chunks(PREVIEW_BYTES) {
                let _ = write!(out, "{pad}{INDENT}");
                hex_into(out, line);
                out.push('\n');
            }
        }
    }
}

pub(crate) fn hex_into(out: &mut String, bytes: &[u8]) {
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{b:02x}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::riff::fourcc::{ADTL, DATA, FMT, LABL, RIFF, WAVE};

    fn tree() -> Chunk {
        Chunk::from(
            ListChunk::with_id(RIFF, WAVE)
                .with_child(DataChunk::new(FMT, vec![1, 0, 2, 0]))
                .with_child(DataChunk::new(DATA, (0u8..10).collect())),
        )
    }

    #[test]
    fn summary_truncates_payload_preview() {
        let text = describe(&tree(), Detail::Summary);
        let expected = "RIFF form=WAVE (2 chunks, 30 bytes)\n\
                        \x20 fmt  (4 bytes)\n\
                        \x20   01 00 02 00\n\
                        \x20 data (10 bytes)\n\
                        \x20   00 01 02 03 04 05 06 07 ...\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn nested_list_header_and_indent() {
        let tree = Chunk::from(
            ListChunk::with_id(RIFF, WAVE).with_child(
                ListChunk::new(ADTL).with_child(DataChunk::new(LABL, vec![1, 0, 0, 0, b'a', 0])),
            ),
        );
        let text = describe(&tree, Detail::Summary);
        let expected = "RIFF form=WAVE (1 chunks, 26 bytes)\n\
                        \x20 LIST form=adtl (1 chunks, 14 bytes)\n\
                        \x20   labl (6 bytes)\n\
                        \x20     01 00 00 00 61 00\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn full_dumps_every_byte() {
        let text = describe(&tree(), Detail::Full);
        assert!(text.contains("    00 01 02 03 04 05 06 07\n    08 09\n"));
        assert!(!text.contains("..."));
    }
}

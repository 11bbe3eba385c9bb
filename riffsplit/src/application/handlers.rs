use std::path::{Path, PathBuf};

use riffsplit_core::domain::{SegmentRow, cue_rows};
use riffsplit_core::error::{Result, RiffError};
use riffsplit_core::riff::describe::describe_list;
use riffsplit_core::riff::fourcc::WAVE;
use riffsplit_core::{Detail, RiffDocument, WavView, extract, plan};
use serde::Serialize;
use tracing::{debug, info};

use super::layout::OutputLayout;

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| RiffError::Io(e.into()))?;
    println!("{text}");
    Ok(())
}

/// Plan the split of `input` and, unless `dry_run`, write one file per segment.
///
/// Every output path is resolved before the first write, so an unsafe or colliding
/// segment name aborts the split with nothing on disk.
pub fn split_file(input: &Path, layout: &OutputLayout, dry_run: bool) -> Result<Vec<SegmentRow>> {
    let source = WavView::open(input)?;
    let meta = extract(source.document())?;
    let mut segments = plan(&source, &meta)?;
    let paths = layout.paths_for(segments.iter().map(|s| s.name.as_str()))?;

    if !dry_run && !segments.is_empty() {
        layout.ensure_directory()?;
        for (segment, path) in segments.iter_mut().zip(paths) {
            segment.view.set_path(&path);
            let written = segment.view.write()?;
            debug!(path = %path.display(), written, "wrote segment");
        }
        info!(
            count = segments.len(),
            directory = %layout.directory.display(),
            "split complete"
        );
    }

    Ok(segments.iter().map(SegmentRow::from).collect())
}

pub fn handle_split(
    input: PathBuf,
    out_dir: Option<PathBuf>,
    prefix: String,
    suffix: String,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let mut layout = OutputLayout {
        prefix,
        suffix,
        ..OutputLayout::for_input(&input)
    };
    if let Some(dir) = out_dir {
        layout.directory = dir;
    }

    let rows = split_file(&input, &layout, dry_run)?;
    if json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        eprintln!("split: {} has no cue points", input.display());
    }
    for r in &rows {
        println!(
            "{}:\tbyte offset: {},\tbyte length: {},\tframes: {}",
            r.name, r.byte_offset, r.byte_length, r.frames
        );
    }
    Ok(())
}

pub fn handle_inspect(input: PathBuf, full: bool) -> Result<()> {
    let doc = RiffDocument::open(&input)?;
    let detail = if full { Detail::Full } else { Detail::Summary };
    print!("{}", describe_list(doc.root(), detail));

    if doc.form_type() == WAVE {
        let view = WavView::from_document(doc)?;
        println!();
        print!("{}", view.format());
        println!("frames: {}", view.frame_count());
    }
    Ok(())
}

pub fn handle_cues(input: PathBuf, json: bool) -> Result<()> {
    let doc = RiffDocument::open(&input)?;
    let meta = extract(&doc)?;
    let rows = cue_rows(&meta);
    if json {
        return print_json(&rows);
    }
    for r in &rows {
        println!(
            "#{:<5} sample={:<10} chunk={} label={}",
            r.identifier,
            r.sample_start,
            r.data_chunk,
            r.label.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub fn handle_rewrite(input: PathBuf, output: PathBuf) -> Result<()> {
    let mut view = WavView::open(&input)?;
    view.set_path(&output);
    let written = view.write()?;
    eprintln!("rewrite: {written} bytes to {}", output.display());
    Ok(())
}

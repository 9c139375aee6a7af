//! Export, import and inspect against the framestore.

use std::path::Path;

use anyhow::{Context, Result};
use framestore_core::capture::mirror_file;
use framestore_core::codec::{export::plan_table, scan_tree, CodecConfig, FramestoreCodec};
use framestore_core::constants::geometry;
use framestore_core::diagnostics::TracingDiagnostics;
use framestore_core::store::DebugfsStore;

use super::print_report;

fn open_store(store: &Path) -> Result<DebugfsStore> {
    DebugfsStore::open(store)
        .with_context(|| format!("Failed to open framestore: {}", store.display()))
}

/// Run the export command.
pub fn export(store: &Path, dir: &Path, capacity: Option<u64>, dry_run: bool, json: bool) -> Result<()> {
    tracing::info!(dir = %dir.display(), dry_run, "Exporting");

    if dry_run {
        let segments = scan_tree(dir).with_context(|| format!("Failed to scan {}", dir.display()))?;
        let table = plan_table(&segments)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&table.grouped()?)?);
        } else {
            print!("{}", table.summary());
            println!("arena bytes required: {}", table.required_arena_bytes()?);
        }
        return Ok(());
    }

    let config = CodecConfig::new(capacity, false);
    let mut codec = FramestoreCodec::with_config(open_store(store)?, TracingDiagnostics, config);
    let report = codec
        .export_to_device(dir)
        .with_context(|| format!("Export of {} failed", dir.display()))?;
    print_report(&report, json)
}

/// Run the import command.
pub fn import(store: &Path, dir: &Path, strict: bool, mirror: bool, json: bool) -> Result<()> {
    tracing::info!(dir = %dir.display(), strict, mirror, "Importing");

    let config = CodecConfig::new(None, strict);
    let mut codec = FramestoreCodec::with_config(open_store(store)?, TracingDiagnostics, config);
    if mirror {
        let (width, height) = (geometry::YUYV.0 as usize, geometry::YUYV.1 as usize);
        codec = codec.with_raw_post(move |p: &Path| Ok(mirror_file(p, width, height)?));
    }
    let report = codec
        .import_from_device(dir)
        .with_context(|| format!("Import into {} failed", dir.display()))?;
    print_report(&report, json)
}

/// Run the inspect command.
pub fn inspect(store: &Path, json: bool) -> Result<()> {
    let mut codec = FramestoreCodec::with_tracing(open_store(store)?);
    let table = codec.read_table().context("Failed to read framestore metadata")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&table.grouped()?)?);
        return Ok(());
    }

    println!("Framestore {}", store.display());
    println!("segments: {}", table.segment_count);
    print!("{}", table.summary());
    match table.validate() {
        Ok(()) => println!("offsets:  consistent"),
        Err(e) => println!("offsets:  {}", e),
    }
    if !table.padding_is_zero() {
        println!("padding:  non-zero slots past the segment count");
    }
    Ok(())
}

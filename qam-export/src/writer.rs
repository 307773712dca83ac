//! Model container writer
//!
//! Packs a validated model into its tag tree and writes the
//! gzip-compressed container, optionally with an uncompressed
//! pretty-printed companion file for inspection.

use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use qam_common::Model;
use qam_nbt::{encode_file, ByteOrder, Tag};

use crate::config::ExportConfig;

/// Validate and encode a model to the raw (uncompressed) tag stream.
pub fn pack_model(model: &Model) -> Result<Vec<u8>> {
    model.validate()?;
    let bytes = encode_file(&model.to_tag(), ByteOrder::Big)?;
    Ok(bytes)
}

/// Write the gzip-compressed container for `model` to `output`.
///
/// With `text_output` set, the pretty-printed tree lands beside it as
/// `<output>.txt`.
pub fn write_model(model: &Model, config: &ExportConfig, output: &Path) -> Result<()> {
    let bytes = pack_model(model)?;

    let file =
        File::create(output).with_context(|| format!("Failed to create output: {:?}", output))?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    encoder
        .write_all(&bytes)
        .with_context(|| format!("Failed to write container: {:?}", output))?;
    encoder
        .finish()
        .with_context(|| format!("Failed to finish container: {:?}", output))?;

    tracing::info!(
        "Exported model: {} meshes, {} materials, {} nodes, {} animations ({} bytes raw)",
        model.meshes.len(),
        model.materials.len(),
        model.nodes.len(),
        model.animations.len(),
        bytes.len()
    );

    if config.text_output {
        let text_path = text_companion_path(output);
        std::fs::write(&text_path, Tag::Compound(model.to_tag()).pretty())
            .with_context(|| format!("Failed to write text dump: {:?}", text_path))?;
        tracing::info!("Wrote text dump: {:?}", text_path);
    }

    Ok(())
}

fn text_companion_path(output: &Path) -> PathBuf {
    let mut os = output.as_os_str().to_os_string();
    os.push(".txt");
    PathBuf::from(os)
}

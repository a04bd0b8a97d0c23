//! Packaging the presentation into a zip archive

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::paths;

/// What ended up in an archive
#[derive(Debug, Clone)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub entries: Vec<String>,
}

/// Write every file matched by `patterns` (relative to `root`) into `output`.
///
/// `output` is resolved against `root`; it is never added to itself.
pub fn zip(root: &Path, patterns: &[String], output: &Path) -> Result<ArchiveSummary> {
    let output_rel = output.strip_prefix(root).unwrap_or(output).to_path_buf();
    let files: Vec<PathBuf> = paths::expand_all(root, patterns)?
        .into_iter()
        .filter(|f| *f != output_rel)
        .collect();

    let target = root.join(&output_rel);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = ZipWriter::new(BufWriter::new(File::create(&target)?));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    let mut entries = Vec::with_capacity(files.len());
    for file in &files {
        let name = paths::to_slash(file);
        writer.start_file(name.as_str(), options)?;
        let mut source = File::open(root.join(file))?;
        io::copy(&mut source, &mut writer)?;
        entries.push(name);
    }
    writer.finish()?;

    info!("Packaged {} file(s) into {}", entries.len(), target.display());
    Ok(ArchiveSummary {
        path: target,
        entries,
    })
}

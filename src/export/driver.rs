use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use super::formats::{export_file_name, ExportFormat};
use crate::errors::OpsError;
use crate::provision::find_folder_id;
use crate::scanner::ScannerApi;

/// Make sure `outdir` is a usable directory, creating it when missing.
pub async fn prepare_outdir(outdir: &Path) -> Result<(), OpsError> {
    match tokio::fs::metadata(outdir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(OpsError::Export(format!(
            "Cannot use '{}' to store scans: not a directory",
            outdir.display()
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tokio::fs::create_dir_all(outdir).await?;
            debug!(outdir = %outdir.display(), "Created export directory");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Export every completed or imported scan (restricted to `folder` when
/// given) in each requested format. Returns the files written.
pub async fn export_all(
    api: &dyn ScannerApi,
    outdir: &Path,
    folder: Option<&str>,
    formats: &[ExportFormat],
) -> Result<Vec<PathBuf>, OpsError> {
    prepare_outdir(outdir).await?;

    let mut wanted: Vec<ExportFormat> = Vec::new();
    for format in formats {
        if !wanted.contains(format) {
            wanted.push(*format);
        }
    }

    let folder_id = match folder {
        Some(name) => Some(find_folder_id(api, name).await?),
        None => None,
    };

    let scans: Vec<_> = api
        .list_scans(folder_id)
        .await?
        .scans
        .into_iter()
        .filter(|scan| scan.is_exportable())
        .collect();

    let variants: Vec<_> = wanted.iter().flat_map(|f| f.variants()).collect();
    let progress = ProgressBar::new((scans.len() * variants.len()) as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:30.cyan/dark_gray} {pos}/{len} exports | {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );

    let mut written = Vec::new();
    for scan in &scans {
        for variant in &variants {
            let path = outdir.join(export_file_name(&scan.name, variant.suffix));
            progress.set_message(path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default());

            let contents = api.export_scan(scan.id, &variant.request).await?;
            tokio::fs::write(&path, &contents).await?;
            debug!(scan = %scan.name, path = %path.display(), bytes = contents.len(), "Export written");

            written.push(path);
            progress.inc(1);
        }
    }
    progress.finish_and_clear();

    info!(scans = scans.len(), files = written.len(), outdir = %outdir.display(), "Export finished");
    Ok(written)
}

//! Writing the compressed guide to disk

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::info;

use crate::config::OutputConfig;
use crate::errors::AppResult;

/// Files produced by one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifact {
    pub gzip_path: PathBuf,
    pub gzip_bytes: u64,
    pub plain_path: Option<PathBuf>,
}

/// Gzip `xml` into `<dir>/<file_name>`, replacing any previous artifact
///
/// With `write_plain_xml` the uncompressed document is also written next to
/// it, named after the artifact without its `.gz` suffix.
pub fn write_artifact(xml: &str, output: &OutputConfig) -> AppResult<WrittenArtifact> {
    fs::create_dir_all(&output.dir)?;

    let gzip_path = output.dir.join(&output.file_name);
    let compressed = gzip(xml.as_bytes())?;
    replace_file(&gzip_path, &compressed)?;
    info!(
        "Wrote {} ({} bytes compressed, {} bytes raw)",
        gzip_path.display(),
        compressed.len(),
        xml.len()
    );

    let plain_path = if output.write_plain_xml {
        let path = plain_path_for(&gzip_path);
        replace_file(&path, xml.as_bytes())?;
        info!("Wrote {}", path.display());
        Some(path)
    } else {
        None
    };

    Ok(WrittenArtifact {
        gzip_path,
        gzip_bytes: compressed.len() as u64,
        plain_path,
    })
}

fn gzip(data: &[u8]) -> AppResult<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Write through a sibling temp file so readers never see a partial artifact
fn replace_file(path: &Path, contents: &[u8]) -> AppResult<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn plain_path_for(gzip_path: &Path) -> PathBuf {
    match gzip_path.extension() {
        Some(ext) if ext == "gz" => gzip_path.with_extension(""),
        _ => {
            let mut name = gzip_path.as_os_str().to_owned();
            name.push(".xml");
            PathBuf::from(name)
        }
    }
}

//! Payload sources: discovering index files on disk, reading and decoding them.

use crate::error::{DecodeError, Result};
use crate::format::{self, PayloadFormat};
use crate::schema::LibraryIndex;
use anyhow::Context;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::Xxh3;

/// Extension of binary snapshots written by `compile`.
pub const SNAPSHOT_EXTENSION: &str = "rdsidx";

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    path.to_path_buf()
}

/// Whether a file found while walking a directory is a payload candidate.
pub fn is_payload_file(path: &Path) -> bool {
    let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    let extension = path.extension().and_then(|ext| ext.to_str());
    match extension {
        Some("js") => file_name.starts_with("search-index"),
        Some("json") => true,
        Some(ext) => ext == SNAPSHOT_EXTENSION,
        None => false,
    }
}

/// Resolve configured sources to a sorted, deduplicated list of payload files.
///
/// Files named explicitly are taken as-is; directories are walked recursively
/// without gitignore filtering, since doc output usually lives under `target/`.
/// Hidden files and directories (`.rustc_info.json`, `.fingerprint/`) are skipped.
pub fn discover_payload_files(sources: &[PathBuf]) -> Result<Vec<PathBuf>> {
    Ok(discover(sources)?.into_iter().map(|file| file.path).collect())
}

fn discover(sources: &[PathBuf]) -> Result<Vec<Candidate>> {
    let mut files = Vec::new();
    for source in sources {
        let source = expand_tilde(source);
        let metadata = std::fs::metadata(&source)
            .with_context(|| format!("Failed to access source {}", source.display()))?;

        if metadata.is_file() {
            files.push(Candidate {
                path: source,
                explicit: true,
            });
            continue;
        }

        for entry in WalkBuilder::new(&source).standard_filters(false).hidden(true).build() {
            let entry = entry.with_context(|| format!("Failed to walk {}", source.display()))?;
            if entry.file_type().is_some_and(|ft| ft.is_file()) && is_payload_file(entry.path()) {
                files.push(Candidate {
                    path: entry.into_path(),
                    explicit: false,
                });
            }
        }
    }

    // Explicit sorts first within a path, so it survives the dedup.
    files.sort_by(|a, b| a.path.cmp(&b.path).then(b.explicit.cmp(&a.explicit)));
    files.dedup_by(|later, first| later.path == first.path);
    Ok(files)
}

#[derive(Debug, Clone)]
struct Candidate {
    path: PathBuf,
    /// Named directly by a source rather than found by walking a directory.
    explicit: bool,
}

/// Raw payload bytes read from disk, not yet decoded.
#[derive(Debug, Clone)]
pub struct RawSources {
    files: Vec<RawFile>,
}

#[derive(Debug, Clone)]
struct RawFile {
    path: PathBuf,
    bytes: Vec<u8>,
    explicit: bool,
}

impl RawSources {
    /// Content fingerprint over file paths and bytes, in path order.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Xxh3::new();
        for file in &self.files {
            hasher.update(file.path.as_os_str().as_encoded_bytes());
            hasher.update(&(file.bytes.len() as u64).to_le_bytes());
            hasher.update(&file.bytes);
        }
        hasher.digest()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Decode every file. Fails on the first file that cannot be decoded.
    ///
    /// A file found by walking a directory whose content is not a recognized
    /// payload is skipped with a warning; a file named explicitly must decode.
    pub fn decode(self) -> Result<LoadedSources> {
        let fingerprint = self.fingerprint();
        let mut libraries = Vec::new();
        let mut files = Vec::with_capacity(self.files.len());

        for RawFile { path, bytes, explicit } in self.files {
            if !explicit && matches!(format::detect(&bytes), Err(DecodeError::UnknownFormat)) {
                tracing::warn!("Skipping {}: not a recognized index payload", path.display());
                continue;
            }
            let (format, decoded) =
                format::decode(&bytes).with_context(|| format!("Failed to decode {}", path.display()))?;
            tracing::debug!(
                "Decoded {} as {} ({} libraries)",
                path.display(),
                format,
                decoded.len()
            );
            files.push(SourceFile {
                path,
                format,
                libraries: decoded.iter().map(|library| library.name.clone()).collect(),
            });
            libraries.extend(decoded);
        }

        Ok(LoadedSources {
            libraries,
            files,
            fingerprint,
        })
    }
}

/// One decoded payload file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub format: PayloadFormat,
    pub libraries: Vec<String>,
}

/// Libraries decoded from a set of sources, ready for `SearchEngine::reload`.
#[derive(Debug, Clone)]
pub struct LoadedSources {
    pub libraries: Vec<LibraryIndex>,
    pub files: Vec<SourceFile>,
    pub fingerprint: u64,
}

/// Discover and read all payload files concurrently.
pub async fn read_sources(sources: &[PathBuf]) -> Result<RawSources> {
    let candidates = discover(sources)?;
    let reads = candidates.into_iter().map(|Candidate { path, explicit }| async move {
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok::<_, anyhow::Error>(RawFile { path, bytes, explicit })
    });
    let files = futures::future::try_join_all(reads).await?;
    Ok(RawSources { files })
}

/// Discover, read and decode all payload files.
pub async fn load_sources(sources: &[PathBuf]) -> Result<LoadedSources> {
    let raw = read_sources(sources).await?;
    let loaded = raw.decode()?;
    tracing::info!(
        "Loaded {} libraries from {} files",
        loaded.libraries.len(),
        loaded.files.len()
    );
    Ok(loaded)
}

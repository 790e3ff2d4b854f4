use crate::source;
use crate::state::SearchEngine;
use anyhow::{Result, bail};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Re-read every configured source and publish the result as a new generation.
///
/// On any read, decode or load failure the current corpus keeps serving.
pub async fn handle_reload(engine: &SearchEngine, sources: &[PathBuf]) -> Result<String> {
    if sources.is_empty() {
        bail!("No sources configured. Add paths to `server.sources` or pass --source.");
    }

    let loaded = source::load_sources(sources).await?;
    let files = loaded.files;
    let summary = engine.reload(loaded.libraries)?;

    let mut output = format!(
        "Reloaded generation {}: {} libraries, {} items from {} files\n",
        summary.generation,
        summary.libraries,
        summary.items,
        files.len()
    );
    for file in &files {
        let _ = writeln!(
            output,
            "  • {} ({}): {}",
            file.path.display(),
            file.format,
            file.libraries.join(", ")
        );
    }
    Ok(output)
}

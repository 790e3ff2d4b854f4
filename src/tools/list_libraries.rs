use crate::state::SearchEngine;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;

/// Parameters for list_libraries tool
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListLibrariesRequest {
    /// Only list libraries whose name contains this text (case-insensitive)
    #[serde(default)]
    pub filter: Option<String>,
}

/// List the libraries in the published corpus with their item counts.
pub fn handle_list_libraries(engine: &SearchEngine, request: &ListLibrariesRequest) -> String {
    let corpus = engine.corpus();
    let filter = request.filter.as_deref().map(str::to_lowercase);
    let libraries: Vec<_> = corpus
        .libraries()
        .filter(|library| {
            filter
                .as_deref()
                .is_none_or(|filter| library.name.to_lowercase().contains(filter))
        })
        .collect();

    if libraries.is_empty() {
        return match request.filter.as_deref() {
            Some(filter) => format!("No libraries match '{}'.\n", filter),
            None => "No libraries are loaded.\n".to_string(),
        };
    }

    let mut output = format!(
        "Libraries ({}, generation {}, {} items in total):\n",
        libraries.len(),
        corpus.generation(),
        corpus.item_count()
    );
    for library in libraries {
        let _ = write!(output, "  • {} ({} items, {} paths)", library.name, library.items, library.paths);
        if !library.doc.is_empty() {
            let _ = write!(output, ": {}", library.doc);
        }
        output.push('\n');
    }
    output
}

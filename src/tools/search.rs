//! Ranked item search over the published corpus.

use crate::schema::{LibraryIndex, Signature};
use crate::search::{Corpus, SearchResults};
use crate::state::SearchEngine;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Query: `[kind:] [path::]name [(param types)] [-> return type]`, e.g. `fn:thread_rng`, `-> ThreadRng`
    pub query: String,
    /// Maximum number of results to return (default from configuration)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Execute a search and render the results as text.
pub fn handle_search(engine: &SearchEngine, request: &SearchRequest) -> Result<String, String> {
    let limit = request.limit.unwrap_or_else(|| engine.default_limit());
    let (corpus, results) = engine
        .search_pinned(&request.query, limit)
        .map_err(|e| e.to_string())?;

    if results.is_empty() {
        return Ok(format_no_results(&request.query, &results, corpus.is_empty()));
    }
    Ok(format_search_results(&request.query, &corpus, &results))
}

fn format_no_results(query: &str, results: &SearchResults, corpus_empty: bool) -> String {
    if corpus_empty {
        return "No libraries are loaded. Configure `server.sources` and use the reload tool.\n".to_string();
    }

    let mut msg = format!("No results found for '{}'.\n\n", query);
    msg.push_str("Search tips:\n");
    msg.push_str("• Names match exactly, by prefix, by substring or with a few typos\n");
    msg.push_str("• Restrict the kind with a prefix: `fn:`, `struct:`, `trait:`, `macro:`\n");
    msg.push_str("• Search by signature: `(u32) -> SFMT` or `-> String`\n");
    if results.truncated {
        msg.push_str("• The scan budget was reached before the end of the corpus\n");
    }
    msg
}

/// Format search results into a readable string output.
pub fn format_search_results(query: &str, corpus: &Corpus, results: &SearchResults) -> String {
    let mut output = format!(
        "Search results for '{}' ({} of {} matches, generation {}):\n\n",
        query,
        results.len(),
        results.total_matches,
        results.generation
    );

    for (idx, result) in results.results.iter().enumerate() {
        let tier = result
            .name_tier
            .or(result.type_tier)
            .map_or("any", |tier| tier.as_str());
        let _ = writeln!(
            output,
            "{}. `{}` ({}) - score: {} [{}]",
            idx + 1,
            result.path,
            result.item.kind,
            result.score,
            tier
        );

        if let Some(signature) = &result.item.signature
            && let Some(library) = corpus.library(&result.library)
        {
            let _ = writeln!(output, "   fn{}", render_signature(library, signature));
        }
        if !result.item.doc.is_empty() {
            let _ = writeln!(output, "   {}", result.item.doc);
        }
        output.push('\n');
    }

    if results.truncated {
        output.push_str("(scan budget reached; later items were not considered)\n");
    }
    output
}

/// Render `(a: A, B) -> C` with type names resolved through the library's path table.
pub fn render_signature(library: &LibraryIndex, signature: &Signature) -> String {
    let inputs: Vec<String> = signature
        .inputs
        .iter()
        .map(|param| {
            let ty = library.type_name(&param.ty).unwrap_or("?");
            match &param.name {
                Some(name) => format!("{}: {}", name, ty),
                None => ty.to_string(),
            }
        })
        .collect();

    let mut rendered = format!("({})", inputs.join(", "));
    if let Some(output) = &signature.output {
        rendered.push_str(" -> ");
        rendered.push_str(library.type_name(output).unwrap_or("?"));
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Item, ItemKind, Param, PathEntry, TypeRef};
    use assert2::check;

    fn engine() -> SearchEngine {
        let mut sfmt = LibraryIndex::new("sfmt");
        sfmt.paths.push(PathEntry::new(ItemKind::Struct, "SFMT"));
        sfmt.items.push(Item::new(ItemKind::Struct, "SFMT").with_path("sfmt").with_doc("Generator state."));
        sfmt.items.push(
            Item::new(ItemKind::Method, "new")
                .with_path("sfmt")
                .with_parent(0)
                .with_signature(Signature::new(
                    vec![Param::named("seed", TypeRef::named("u32"))],
                    Some(TypeRef::Path(0)),
                )),
        );
        SearchEngine::with_libraries(&crate::config::Config::default(), vec![sfmt]).unwrap()
    }

    #[test]
    fn test_results_include_path_signature_and_doc() {
        let engine = engine();
        let request = SearchRequest {
            query: "new".to_string(),
            limit: None,
        };
        let output = handle_search(&engine, &request).unwrap();
        check!(output.contains("1. `sfmt::SFMT::new` (method)"));
        check!(output.contains("fn(seed: u32) -> SFMT"));
        check!(output.contains("[exact]"));

        let output = handle_search(&engine, &SearchRequest { query: "sfmt".to_string(), limit: Some(1) }).unwrap();
        check!(output.contains("Generator state."));
    }

    #[test]
    fn test_no_results_and_invalid_limit() {
        let engine = engine();
        let output = handle_search(&engine, &SearchRequest { query: "zzzzzz".to_string(), limit: None }).unwrap();
        check!(output.starts_with("No results found for 'zzzzzz'"));

        let err = handle_search(&engine, &SearchRequest { query: "new".to_string(), limit: Some(0) }).unwrap_err();
        check!(err.contains("limit"));
    }

    #[test]
    fn test_empty_corpus_hint() {
        let engine = SearchEngine::default();
        let output = handle_search(&engine, &SearchRequest { query: "new".to_string(), limit: None }).unwrap();
        check!(output.contains("No libraries are loaded"));
    }
}

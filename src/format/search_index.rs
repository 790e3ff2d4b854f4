//! Legacy rustdoc `search-index.js` payloads.
//!
//! The script assigns one JSON object per library:
//!
//! ```text
//! searchIndex["sfmt"] = {"doc":"...","items":[[3,"SFMT","sfmt","State",null,null], ...],"paths":[[3,"SFMT"]]};
//! ```
//!
//! Items are positional tuples `[kind, name, module path, doc, parent, signature]`.
//! An empty module path repeats the previous item's path. Signature types are
//! lower-cased names; they are resolved back to path-table entries where a path
//! with the same folded name exists, and `self` resolves to the item's parent.

use crate::error::DecodeError;
use crate::schema::{Item, ItemKind, LibraryIndex, Param, PathEntry, Signature, TypeRef};
use ahash::AHashMap;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*searchIndex\["((?:[^"\\]|\\.)+)"\]\s*=\s*(\{.*\});?\s*$"#)
        .expect("search index pattern is valid")
});

#[derive(Debug, Deserialize)]
struct RawLibrary {
    #[serde(default)]
    doc: String,
    #[serde(default)]
    items: Vec<RawItem>,
    #[serde(default)]
    paths: Vec<(u8, String)>,
}

#[derive(Debug, Deserialize)]
struct RawItem(u8, String, String, String, Option<usize>, Option<RawSignature>);

#[derive(Debug, Deserialize)]
struct RawSignature {
    #[serde(default)]
    inputs: Vec<RawType>,
    #[serde(default)]
    output: Option<RawType>,
}

#[derive(Debug, Deserialize)]
struct RawType {
    #[serde(default)]
    name: Option<String>,
}

/// Whether `text` looks like a `search-index.js` script.
pub fn is_search_index(text: &str) -> bool {
    ASSIGNMENT.is_match(text)
}

/// Decode every `searchIndex[...] = {...}` assignment in the script.
pub fn decode(text: &str) -> Result<Vec<LibraryIndex>, DecodeError> {
    let libraries = ASSIGNMENT
        .captures_iter(text)
        .map(|captures| {
            let name = captures[1].replace("\\\"", "\"");
            let raw: RawLibrary = serde_json::from_str(&captures[2])?;
            convert(name, raw)
        })
        .collect::<Result<Vec<_>, _>>()?;

    if libraries.is_empty() {
        return Err(DecodeError::EmptyScript);
    }
    Ok(libraries)
}

fn convert(name: String, raw: RawLibrary) -> Result<LibraryIndex, DecodeError> {
    let unknown_kind = |code: u8| DecodeError::UnknownKind {
        library: name.clone(),
        code,
    };

    let paths = raw
        .paths
        .into_iter()
        .map(|(code, path)| Ok(PathEntry::new(ItemKind::from_code(code).ok_or_else(|| unknown_kind(code))?, path)))
        .collect::<Result<Vec<_>, DecodeError>>()?;

    // First path entry wins for a folded name, matching generation order.
    let mut by_folded_name: AHashMap<String, usize> = AHashMap::with_capacity(paths.len());
    for (index, entry) in paths.iter().enumerate() {
        by_folded_name.entry(entry.name.to_lowercase()).or_insert(index);
    }

    let mut module = String::new();
    let mut items = Vec::with_capacity(raw.items.len());
    for RawItem(code, item_name, path, doc, parent, signature) in raw.items {
        let kind = ItemKind::from_code(code).ok_or_else(|| unknown_kind(code))?;
        if !path.is_empty() {
            module = path;
        }

        let resolve = |ty: RawType| {
            let type_name = ty.name.unwrap_or_default();
            if type_name == "self"
                && let Some(parent) = parent
            {
                return TypeRef::Path(parent);
            }
            match by_folded_name.get(&type_name.to_lowercase()) {
                Some(&index) => TypeRef::Path(index),
                None => TypeRef::Named(type_name),
            }
        };

        let signature = signature.map(|sig| {
            Signature::new(
                sig.inputs
                    .into_iter()
                    .map(|ty| Param::positional(resolve(ty)))
                    .collect(),
                sig.output.map(resolve),
            )
        });

        items.push(Item {
            kind,
            name: item_name,
            path: module.clone(),
            parent,
            doc,
            signature,
        });
    }

    tracing::debug!(
        "Decoded search-index library '{}': {} items, {} paths",
        name,
        items.len(),
        paths.len()
    );

    Ok(LibraryIndex {
        name,
        doc: raw.doc,
        items,
        paths,
    })
}

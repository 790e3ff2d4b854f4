//! Logical schema JSON: a mapping from library name to its item and path tables.
//!
//! ```json
//! { "sfmt": { "doc": "...", "items": [{ "kind": "struct", "name": "SFMT" }], "paths": [] } }
//! ```

use crate::error::DecodeError;
use crate::schema::{Item, LibraryIndex, PathEntry};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Serialize, Deserialize)]
struct LibraryBody {
    #[serde(default)]
    doc: String,
    #[serde(default)]
    items: Vec<Item>,
    #[serde(default)]
    paths: Vec<PathEntry>,
}

/// Top-level entries in document order. A repeated library name is kept, not
/// overwritten, so the loader can reject it.
struct Document(Vec<(String, LibraryBody)>);

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DocumentVisitor;

        impl<'de> Visitor<'de> for DocumentVisitor {
            type Value = Document;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map from library name to library body")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Document, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, LibraryBody>()? {
                    entries.push(entry);
                }
                Ok(Document(entries))
            }
        }

        deserializer.deserialize_map(DocumentVisitor)
    }
}

/// Decode a schema document. Libraries come back sorted by name; repeats stay adjacent.
pub fn decode(text: &str) -> Result<Vec<LibraryIndex>, DecodeError> {
    let Document(mut bodies) = serde_json::from_str(text)?;
    bodies.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(bodies
        .into_iter()
        .map(|(name, body)| LibraryIndex {
            name,
            doc: body.doc,
            items: body.items,
            paths: body.paths,
        })
        .collect())
}

/// Encode libraries as a pretty-printed schema document.
pub fn encode(libraries: &[LibraryIndex]) -> Result<String, DecodeError> {
    let bodies: BTreeMap<&str, LibraryBody> = libraries
        .iter()
        .map(|library| {
            (
                library.name.as_str(),
                LibraryBody {
                    doc: library.doc.clone(),
                    items: library.items.clone(),
                    paths: library.paths.clone(),
                },
            )
        })
        .collect();
    Ok(serde_json::to_string_pretty(&bodies)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::schema::{ItemKind, Signature, TypeRef};
    use assert2::{check, let_assert};

    #[test]
    fn test_decode_minimal_document() {
        let text = r#"{
            "sfmt": {
                "doc": "SIMD-oriented Fast Mersenne Twister",
                "items": [
                    { "kind": "struct", "name": "ThreadRng", "path": "sfmt" },
                    { "kind": "function", "name": "thread_rng",
                      "signature": { "inputs": [], "output": { "path": 0 } } }
                ],
                "paths": [{ "kind": "struct", "name": "ThreadRng" }]
            },
            "empty": {}
        }"#;

        let libraries = decode(text).unwrap();
        check!(libraries.len() == 2);
        check!(libraries[0].name == "empty");
        check!(libraries[0].items.is_empty());

        let sfmt = &libraries[1];
        check!(sfmt.items[0].kind == ItemKind::Struct);
        check!(sfmt.items[1].parent.is_none());
        check!(sfmt.items[1].signature == Some(Signature::new(vec![], Some(TypeRef::Path(0)))));
    }

    #[test]
    fn test_repeated_library_is_kept() {
        let text = r#"{
            "demo": { "items": [{ "kind": "function", "name": "first" }] },
            "demo": { "items": [{ "kind": "function", "name": "second" }] }
        }"#;

        let libraries = decode(text).unwrap();
        check!(libraries.len() == 2);
        check!(libraries[0].items[0].name == "first");
        check!(libraries[1].items[0].name == "second");

        let_assert!(Err(LoadError::DuplicateLibrary { name }) = crate::search::Corpus::load(libraries));
        check!(name == "demo");
    }

    #[test]
    fn test_non_object_document_is_rejected() {
        let_assert!(Err(DecodeError::Json(_)) = decode("[1, 2]"));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let text = r#"{ "x": { "items": [{ "kind": "gadget", "name": "g" }] } }"#;
        let_assert!(Err(DecodeError::Json(_)) = decode(text));
    }

    #[test]
    fn test_encoded_document_decodes() {
        let mut library = LibraryIndex::new("demo");
        library.items.push(Item::new(ItemKind::Macro, "demo_macro").with_doc("Expands."));

        let text = encode(std::slice::from_ref(&library)).unwrap();
        check!(text.contains("\"demo_macro\""));
        check!(decode(&text).unwrap() == vec![library]);
    }
}

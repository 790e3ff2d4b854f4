//! Payload adapters: everything that turns bytes on disk into [`LibraryIndex`] values.
//!
//! The engine itself never sees a payload format. Each adapter only decodes; schema
//! integrity is checked once, by the corpus loader.

pub mod json;
pub mod rustdoc;
pub mod search_index;
pub mod snapshot;

use crate::error::DecodeError;
use crate::schema::LibraryIndex;
use serde::Serialize;

/// A recognized payload format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFormat {
    /// Legacy `search-index.js` script, possibly holding several libraries.
    SearchIndexJs,
    /// Schema JSON document keyed by library name.
    Json,
    /// Rustdoc JSON output for a single crate.
    RustdocJson,
    /// Binary snapshot written by `compile`.
    Snapshot,
}

impl PayloadFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SearchIndexJs => "search-index.js",
            Self::Json => "json",
            Self::RustdocJson => "rustdoc-json",
            Self::Snapshot => "snapshot",
        }
    }
}

impl std::fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn as_text(bytes: &[u8]) -> Result<&str, DecodeError> {
    let text = std::str::from_utf8(bytes)?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

/// Identify a payload by its content.
pub fn detect(bytes: &[u8]) -> Result<PayloadFormat, DecodeError> {
    if snapshot::is_snapshot(bytes) {
        return Ok(PayloadFormat::Snapshot);
    }
    let text = as_text(bytes)?;
    if search_index::is_search_index(text) {
        Ok(PayloadFormat::SearchIndexJs)
    } else if rustdoc::is_rustdoc_json(text) {
        Ok(PayloadFormat::RustdocJson)
    } else if text.trim_start().starts_with('{') {
        Ok(PayloadFormat::Json)
    } else {
        Err(DecodeError::UnknownFormat)
    }
}

/// Decode a payload of any supported format.
pub fn decode(bytes: &[u8]) -> Result<(PayloadFormat, Vec<LibraryIndex>), DecodeError> {
    let format = detect(bytes)?;
    let libraries = match format {
        PayloadFormat::Snapshot => snapshot::decode(bytes)?,
        PayloadFormat::SearchIndexJs => search_index::decode(as_text(bytes)?)?,
        PayloadFormat::RustdocJson => vec![rustdoc::decode(as_text(bytes)?)?],
        PayloadFormat::Json => json::decode(as_text(bytes)?)?,
    };
    Ok((format, libraries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Item, ItemKind};
    use assert2::{check, let_assert};
    use rstest::rstest;

    #[rstest]
    #[case(b"searchIndex[\"a\"] = {\"doc\":\"\",\"items\":[],\"paths\":[]};".as_slice(), PayloadFormat::SearchIndexJs)]
    #[case(b"{\"a\": {}}".as_slice(), PayloadFormat::Json)]
    #[case(b"\xef\xbb\xbf  {\"a\": {}}".as_slice(), PayloadFormat::Json)]
    #[case(b"{\"root\": 1, \"format_version\": 56}".as_slice(), PayloadFormat::RustdocJson)]
    #[case(b"RDSIDX\x01\x00".as_slice(), PayloadFormat::Snapshot)]
    fn test_detect(#[case] bytes: &[u8], #[case] expected: PayloadFormat) {
        check!(detect(bytes).unwrap() == expected);
    }

    #[test]
    fn test_detect_rejects_other_content() {
        let_assert!(Err(DecodeError::UnknownFormat) = detect(b"# not an index"));
        let_assert!(Err(DecodeError::Utf8(_)) = detect(&[0xff, 0xfe, 0x00]));
    }

    #[test]
    fn test_decode_dispatches_by_content() {
        let mut library = LibraryIndex::new("demo");
        library.items.push(Item::new(ItemKind::Function, "run"));
        let libraries = vec![library];

        let bytes = snapshot::encode(&libraries).unwrap();
        let (format, decoded) = decode(&bytes).unwrap();
        check!(format == PayloadFormat::Snapshot);
        check!(decoded == libraries);

        let text = json::encode(&libraries).unwrap();
        let (format, decoded) = decode(text.as_bytes()).unwrap();
        check!(format == PayloadFormat::Json);
        check!(decoded == libraries);
    }
}

//! Binary snapshots: a magic header followed by the postcard encoding of the libraries.
//!
//! Snapshots are written by `rustdoc-search compile` and load much faster than the
//! text formats. They are tied to this crate's schema, hence the version byte.

use crate::error::DecodeError;
use crate::schema::LibraryIndex;

/// File magic; the byte after it is the schema version.
pub const MAGIC: &[u8; 6] = b"RDSIDX";
pub const VERSION: u8 = 1;

/// Whether `bytes` starts with the snapshot magic.
pub fn is_snapshot(bytes: &[u8]) -> bool {
    bytes.starts_with(MAGIC)
}

pub fn encode(libraries: &[LibraryIndex]) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::with_capacity(MAGIC.len() + 1);
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    postcard::to_io(&libraries, &mut out)?;
    Ok(out)
}

pub fn decode(bytes: &[u8]) -> Result<Vec<LibraryIndex>, DecodeError> {
    let Some(rest) = bytes.strip_prefix(MAGIC.as_slice()) else {
        return Err(DecodeError::UnknownFormat);
    };
    let (&version, payload) = rest.split_first().ok_or(DecodeError::SnapshotVersion {
        found: 0,
        expected: VERSION,
    })?;
    if version != VERSION {
        return Err(DecodeError::SnapshotVersion {
            found: version,
            expected: VERSION,
        });
    }
    Ok(postcard::from_bytes(payload)?)
}

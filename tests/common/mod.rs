//! Shared test fixtures and utilities for integration tests.
//!
//! # Available Fixtures
//!
//! - `sfmt`: the `sfmt` library (two RNG types and their methods) built in memory
//! - `sfmt_engine`: a [`SearchEngine`] serving only `sfmt`, at generation 1
//! - [`TempWorkspace`]: a temp directory for tests that read payload files from disk

use rstest::fixture;
use rustdoc_search::config::Config;
use rustdoc_search::schema::{Item, ItemKind, LibraryIndex, Param, PathEntry, Signature, TypeRef};
use rustdoc_search::state::SearchEngine;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Returns the project root directory (where Cargo.toml lives).
#[allow(dead_code)]
pub fn project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Path of a file under `tests/fixtures/`.
#[allow(dead_code)]
pub fn fixture_path(name: &str) -> PathBuf {
    project_root().join("tests").join("fixtures").join(name)
}

fn method(name: &str, parent: usize, inputs: Vec<TypeRef>, output: TypeRef) -> Item {
    Item::new(ItemKind::Method, name)
        .with_path("sfmt")
        .with_parent(parent)
        .with_signature(Signature::new(
            inputs.into_iter().map(Param::positional).collect(),
            Some(output),
        ))
}

/// The `sfmt` library, item for item as its `search-index.js` describes it.
#[fixture]
pub fn sfmt() -> LibraryIndex {
    const THREAD_RNG: usize = 0;
    const SFMT: usize = 1;

    let mut library = LibraryIndex::new("sfmt");
    library.doc = "Rust implementation of [SIMD-oriented Fast Mersenne Twister (SFMT)] using [stable SIMD]".to_string();
    library.paths = vec![
        PathEntry::new(ItemKind::Struct, "ThreadRng"),
        PathEntry::new(ItemKind::Struct, "SFMT"),
    ];

    let this = |parent| TypeRef::Path(parent);
    let u32_ty = || TypeRef::named("u32");
    let u64_ty = || TypeRef::named("u64");

    library.items = vec![
        Item::new(ItemKind::Struct, "ThreadRng")
            .with_path("sfmt")
            .with_doc("Thread-local RNG based on SFMT."),
        Item::new(ItemKind::Struct, "SFMT").with_path("sfmt").with_doc("State of SFMT"),
        Item::new(ItemKind::Function, "thread_rng")
            .with_path("sfmt")
            .with_doc("Create a thread local RNG.")
            .with_signature(Signature::new(vec![], Some(this(THREAD_RNG)))),
        method("clone", THREAD_RNG, vec![this(THREAD_RNG)], this(THREAD_RNG)),
        method("next_u32", THREAD_RNG, vec![this(THREAD_RNG)], u32_ty()),
        method("next_u64", THREAD_RNG, vec![this(THREAD_RNG)], u64_ty()),
        method("clone", SFMT, vec![this(SFMT)], this(SFMT)),
        method("new", SFMT, vec![u32_ty()], this(SFMT)).with_doc("Create a new state from a seed."),
        method("next_u32", SFMT, vec![this(SFMT)], u32_ty()),
        method("next_u64", SFMT, vec![this(SFMT)], u64_ty()),
    ];
    library
}

/// An engine serving only `sfmt`.
#[fixture]
pub fn sfmt_engine(sfmt: LibraryIndex) -> SearchEngine {
    SearchEngine::with_libraries(&Config::default(), vec![sfmt]).expect("sfmt loads")
}

/// A small library whose functions are named after `names`.
#[allow(dead_code)]
pub fn library_of(name: &str, names: &[&str]) -> LibraryIndex {
    let mut library = LibraryIndex::new(name);
    library.items = names
        .iter()
        .map(|item| Item::new(ItemKind::Function, *item).with_path(name))
        .collect();
    library
}

/// A temporary directory for test isolation.
///
/// Automatically cleaned up when dropped.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempWorkspace {
    /// Creates a new empty temporary workspace.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    /// Returns the root path of this workspace.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates a file with the given content within this workspace.
    ///
    /// Parent directories are created automatically if they don't exist.
    ///
    /// # Panics
    /// Panics if file creation fails.
    pub fn create_file(&self, path: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
        full_path
    }

    /// Copies a fixture file into this workspace.
    ///
    /// # Panics
    /// Panics if copying fails.
    pub fn copy_fixture(&self, name: &str, dest_relative: &str) -> PathBuf {
        let dest = self.root.join(dest_relative);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", dest_relative, e)
            });
        }
        std::fs::copy(fixture_path(name), &dest)
            .unwrap_or_else(|e| panic!("Failed to copy fixture '{}' to '{}': {}", name, dest_relative, e));
        dest
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

//! In-memory corpus: validated, merged library indexes ready for querying.

use crate::error::{IntegrityViolation, LoadError, TypePosition};
use crate::schema::{Item, LibraryIndex, TypeRef};
use ahash::AHashMap;

/// A flattened, precomputed view of one item.
///
/// Type names are resolved through the owning library's path table at load time,
/// so queries never touch raw path indices.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) library: usize,
    pub(crate) item: usize,
    pub(crate) name: String,
    pub(crate) qualified_path: String,
    /// Case-folded ancestors of the item (qualified path minus its own name).
    pub(crate) parents: Vec<String>,
    pub(crate) signature: Option<EntrySignature>,
}

#[derive(Debug, Clone)]
pub(crate) struct EntrySignature {
    pub(crate) inputs: Vec<String>,
    pub(crate) output: Option<String>,
}

/// The queryable union of one or more library indexes.
///
/// Immutable after [`Corpus::load`]; shared between concurrent searches behind an `Arc`.
#[derive(Debug, Default)]
pub struct Corpus {
    libraries: Vec<LibraryIndex>,
    by_name: AHashMap<String, usize>,
    /// Per library: qualified path → item positions.
    by_path: Vec<AHashMap<String, Vec<usize>>>,
    entries: Vec<Entry>,
    generation: u64,
}

/// A library in the corpus with its item count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarySummary<'a> {
    pub name: &'a str,
    pub doc: &'a str,
    pub items: usize,
    pub paths: usize,
}

impl Corpus {
    /// An empty corpus at generation 0.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validate and merge library indexes.
    ///
    /// Every library is checked before anything is built, so a failure leaves no
    /// partial state behind.
    pub fn load(libraries: Vec<LibraryIndex>) -> Result<Self, LoadError> {
        Self::load_generation(libraries, 0)
    }

    /// Like [`Corpus::load`], tagging the corpus with a generation number.
    pub fn load_generation(libraries: Vec<LibraryIndex>, generation: u64) -> Result<Self, LoadError> {
        let start = std::time::Instant::now();

        let mut by_name = AHashMap::with_capacity(libraries.len());
        for (position, library) in libraries.iter().enumerate() {
            validate(library).map_err(|violation| LoadError::MalformedIndex {
                library: library.name.clone(),
                violation,
            })?;
            if by_name.insert(library.name.clone(), position).is_some() {
                return Err(LoadError::DuplicateLibrary {
                    name: library.name.clone(),
                });
            }
        }

        let item_total = libraries.iter().map(|library| library.items.len()).sum();
        let mut entries = Vec::with_capacity(item_total);
        let mut by_path = Vec::with_capacity(libraries.len());

        for (library_pos, library) in libraries.iter().enumerate() {
            let mut paths: AHashMap<String, Vec<usize>> = AHashMap::with_capacity(library.items.len());
            for (item_pos, item) in library.items.iter().enumerate() {
                let entry = build_entry(library, library_pos, item_pos, item);
                paths
                    .entry(entry.qualified_path.clone())
                    .or_default()
                    .push(item_pos);
                entries.push(entry);
            }
            by_path.push(paths);
        }

        tracing::info!(
            "Loaded corpus generation {}: {} libraries, {} items in {:?}",
            generation,
            libraries.len(),
            entries.len(),
            start.elapsed()
        );

        Ok(Self {
            libraries,
            by_name,
            by_path,
            entries,
            generation,
        })
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn item_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn library(&self, name: &str) -> Option<&LibraryIndex> {
        self.by_name.get(name).map(|&pos| &self.libraries[pos])
    }

    /// Libraries in load order.
    pub fn libraries(&self) -> impl Iterator<Item = LibrarySummary<'_>> {
        self.libraries.iter().map(|library| LibrarySummary {
            name: &library.name,
            doc: &library.doc,
            items: library.items.len(),
            paths: library.paths.len(),
        })
    }

    /// Resolve items by (library name, qualified path).
    ///
    /// This is the only way to follow a reference across library boundaries; path
    /// table indices are private to their library.
    pub fn lookup(&self, library: &str, qualified_path: &str) -> Vec<&Item> {
        let Some(&pos) = self.by_name.get(library) else {
            return Vec::new();
        };
        self.by_path[pos]
            .get(qualified_path)
            .map(|items| items.iter().map(|&i| &self.libraries[pos].items[i]).collect())
            .unwrap_or_default()
    }

    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub(crate) fn library_at(&self, pos: usize) -> &LibraryIndex {
        &self.libraries[pos]
    }
}

/// Check names and referential integrity of one library.
fn validate(library: &LibraryIndex) -> Result<(), IntegrityViolation> {
    if library.name.trim().is_empty() {
        return Err(IntegrityViolation::EmptyLibraryName);
    }

    let len = library.paths.len();
    for (pos, item) in library.items.iter().enumerate() {
        if item.name.is_empty() {
            return Err(IntegrityViolation::EmptyItemName { item: pos });
        }

        if let Some(parent) = item.parent
            && parent >= len
        {
            return Err(IntegrityViolation::ParentOutOfBounds {
                item: pos,
                name: item.name.clone(),
                index: parent,
                len,
            });
        }

        let Some(signature) = &item.signature else {
            continue;
        };
        let positioned = signature
            .inputs
            .iter()
            .enumerate()
            .map(|(i, param)| (TypePosition::Input(i), &param.ty))
            .chain(signature.output.iter().map(|ty| (TypePosition::Output, ty)));

        for (position, ty) in positioned {
            if let TypeRef::Path(index) = *ty
                && index >= len
            {
                return Err(IntegrityViolation::TypeOutOfBounds {
                    item: pos,
                    name: item.name.clone(),
                    position,
                    index,
                    len,
                });
            }
        }
    }

    Ok(())
}

/// Precompute folded names and the qualified path. Requires a validated library.
fn build_entry(library: &LibraryIndex, library_pos: usize, item_pos: usize, item: &Item) -> Entry {
    let module = if item.path.is_empty() {
        library.name.as_str()
    } else {
        item.path.as_str()
    };

    let mut parents: Vec<String> = module.split("::").map(str::to_lowercase).collect();
    let mut qualified_path = module.to_string();
    if let Some(parent) = item.parent {
        let parent_name = &library.paths[parent].name;
        parents.push(parent_name.to_lowercase());
        qualified_path.push_str("::");
        qualified_path.push_str(parent_name);
    }
    qualified_path.push_str("::");
    qualified_path.push_str(&item.name);

    let fold = |ty: &TypeRef| library.type_name(ty).unwrap_or_default().to_lowercase();
    let signature = item.signature.as_ref().map(|sig| EntrySignature {
        inputs: sig.inputs.iter().map(|param| fold(&param.ty)).collect(),
        output: sig.output.as_ref().map(fold),
    });

    Entry {
        library: library_pos,
        item: item_pos,
        name: item.name.to_lowercase(),
        qualified_path,
        parents,
        signature,
    }
}

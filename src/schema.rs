//! Index schema: the compact, normalized description of a library's public API.
//!
//! A [`LibraryIndex`] is produced once by an external generator and is immutable for
//! the lifetime of a query session. Items refer to owning types and signature types
//! through indices into the library's own deduplicated [`PathEntry`] table; those
//! indices are never meaningful outside that library.

use serde::{Deserialize, Serialize};

/// Item kinds, in the order of the legacy rustdoc item-type codes.
///
/// The discriminant of each variant is its legacy numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Module = 0,
    ExternCrate = 1,
    Import = 2,
    Struct = 3,
    Enum = 4,
    Function = 5,
    TypeAlias = 6,
    Static = 7,
    Trait = 8,
    Impl = 9,
    TyMethod = 10,
    Method = 11,
    StructField = 12,
    Variant = 13,
    Macro = 14,
    Primitive = 15,
    AssocType = 16,
    Constant = 17,
    AssocConst = 18,
    Union = 19,
    ForeignType = 20,
    Keyword = 21,
    OpaqueType = 22,
    ProcAttribute = 23,
    ProcDerive = 24,
    TraitAlias = 25,
}

impl ItemKind {
    const ALL: [Self; 26] = [
        Self::Module,
        Self::ExternCrate,
        Self::Import,
        Self::Struct,
        Self::Enum,
        Self::Function,
        Self::TypeAlias,
        Self::Static,
        Self::Trait,
        Self::Impl,
        Self::TyMethod,
        Self::Method,
        Self::StructField,
        Self::Variant,
        Self::Macro,
        Self::Primitive,
        Self::AssocType,
        Self::Constant,
        Self::AssocConst,
        Self::Union,
        Self::ForeignType,
        Self::Keyword,
        Self::OpaqueType,
        Self::ProcAttribute,
        Self::ProcDerive,
        Self::TraitAlias,
    ];

    /// Map a legacy `search-index.js` item-type code to a kind.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// The legacy numeric code of this kind.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Short display name, as rustdoc prints it.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Module => "mod",
            Self::ExternCrate => "externcrate",
            Self::Import => "import",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Function => "fn",
            Self::TypeAlias => "type",
            Self::Static => "static",
            Self::Trait => "trait",
            Self::Impl => "impl",
            Self::TyMethod => "tymethod",
            Self::Method => "method",
            Self::StructField => "field",
            Self::Variant => "variant",
            Self::Macro => "macro",
            Self::Primitive => "primitive",
            Self::AssocType => "associatedtype",
            Self::Constant => "constant",
            Self::AssocConst => "associatedconstant",
            Self::Union => "union",
            Self::ForeignType => "foreigntype",
            Self::Keyword => "keyword",
            Self::OpaqueType => "opaque",
            Self::ProcAttribute => "attr",
            Self::ProcDerive => "derive",
            Self::TraitAlias => "traitalias",
        }
    }

    /// Whether items of this kind can carry a signature.
    pub const fn is_callable(self) -> bool {
        matches!(self, Self::Function | Self::Method | Self::TyMethod)
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One documented library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryIndex {
    pub name: String,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub paths: Vec<PathEntry>,
}

impl LibraryIndex {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: String::new(),
            items: Vec::new(),
            paths: Vec::new(),
        }
    }

    /// Display name of a type reference, resolved through this library's path table.
    pub fn type_name<'a>(&'a self, ty: &'a TypeRef) -> Option<&'a str> {
        match ty {
            TypeRef::Named(name) => Some(name),
            TypeRef::Path(index) => self.paths.get(*index).map(|entry| entry.name.as_str()),
        }
    }

    /// Qualified path of an item: module path, parent name, item name.
    ///
    /// Returns `None` when the item's parent does not resolve.
    pub fn qualified_path(&self, item: &Item) -> Option<String> {
        let mut path = if item.path.is_empty() {
            self.name.clone()
        } else {
            item.path.clone()
        };
        if let Some(parent) = item.parent {
            path.push_str("::");
            path.push_str(&self.paths.get(parent)?.name);
        }
        path.push_str("::");
        path.push_str(&item.name);
        Some(path)
    }
}

/// One exported symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    pub name: String,
    /// Module path the item lives in; empty means the library root.
    #[serde(default)]
    pub path: String,
    /// Owning type or trait, as an index into the library's path table.
    #[serde(default)]
    pub parent: Option<usize>,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub signature: Option<Signature>,
}

impl Item {
    pub fn new(kind: ItemKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            path: String::new(),
            parent: None,
            doc: String::new(),
            signature: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub const fn with_parent(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }
}

/// A deduplicated type or module reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathEntry {
    pub kind: ItemKind,
    pub name: String,
}

impl PathEntry {
    pub fn new(kind: ItemKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

/// Parameter and return types of a callable item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub inputs: Vec<Param>,
    #[serde(default)]
    pub output: Option<TypeRef>,
}

impl Signature {
    pub fn new(inputs: Vec<Param>, output: Option<TypeRef>) -> Self {
        Self { inputs, output }
    }

    /// Every type reference in the signature, inputs first.
    pub fn type_refs(&self) -> impl Iterator<Item = &TypeRef> {
        self.inputs
            .iter()
            .map(|param| &param.ty)
            .chain(self.output.as_ref())
    }
}

/// A positional parameter, optionally named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    #[serde(default)]
    pub name: Option<String>,
    pub ty: TypeRef,
}

impl Param {
    pub const fn positional(ty: TypeRef) -> Self {
        Self { name: None, ty }
    }

    pub fn named(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: Some(name.into()),
            ty,
        }
    }
}

/// A type named either directly or through the owning library's path table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    /// Primitive, generic or otherwise unresolved type name.
    Named(String),
    /// Index into the library's path table.
    Path(usize),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

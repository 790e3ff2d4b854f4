//! Rustdoc JSON payloads (`cargo rustdoc -- -Z unstable-options --output-format json`).
//!
//! Only local items are indexed: module-level items that appear in the crate's path
//! summary table, methods of inherent and trait impls on local types, required and
//! provided trait methods, and enum variants.

use crate::error::DecodeError;
use crate::schema::{Item, ItemKind, LibraryIndex, Param, PathEntry, Signature, TypeRef};
use ahash::AHashMap;
use rustdoc_types::{
    Crate, GenericBound, Id, Item as RustdocItem, ItemEnum, ItemKind as RustdocItemKind, MacroKind, ProcMacro,
    Type,
};

/// Whether `text` looks like rustdoc JSON rather than a schema document.
pub fn is_rustdoc_json(text: &str) -> bool {
    text.trim_start().starts_with('{') && text.contains("\"format_version\"") && text.contains("\"root\"")
}

/// Convert an ItemEnum to the schema's item kind.
fn item_enum_to_kind(inner: &ItemEnum) -> ItemKind {
    match inner {
        ItemEnum::Module(_) => ItemKind::Module,
        ItemEnum::ExternCrate { .. } => ItemKind::ExternCrate,
        ItemEnum::Use(_) => ItemKind::Import,
        ItemEnum::Union(_) => ItemKind::Union,
        ItemEnum::Struct(_) => ItemKind::Struct,
        ItemEnum::StructField(_) => ItemKind::StructField,
        ItemEnum::Enum(_) => ItemKind::Enum,
        ItemEnum::Variant(_) => ItemKind::Variant,
        ItemEnum::Function(_) => ItemKind::Function,
        ItemEnum::Trait(_) => ItemKind::Trait,
        ItemEnum::TraitAlias(_) => ItemKind::TraitAlias,
        ItemEnum::Impl(_) => ItemKind::Impl,
        ItemEnum::TypeAlias(_) => ItemKind::TypeAlias,
        ItemEnum::Constant { .. } => ItemKind::Constant,
        ItemEnum::Static(_) => ItemKind::Static,
        ItemEnum::ExternType => ItemKind::ForeignType,
        ItemEnum::ProcMacro(ProcMacro {
            kind: MacroKind::Attr,
            ..
        }) => ItemKind::ProcAttribute,
        ItemEnum::ProcMacro(ProcMacro {
            kind: MacroKind::Derive,
            ..
        }) => ItemKind::ProcDerive,
        ItemEnum::Macro(_)
        | ItemEnum::ProcMacro(ProcMacro {
            kind: MacroKind::Bang,
            ..
        }) => ItemKind::Macro,
        ItemEnum::Primitive(_) => ItemKind::Primitive,
        ItemEnum::AssocConst { .. } => ItemKind::AssocConst,
        ItemEnum::AssocType { .. } => ItemKind::AssocType,
    }
}

/// Convert a path summary kind, for entries that are only referenced.
const fn summary_kind(kind: RustdocItemKind) -> ItemKind {
    match kind {
        RustdocItemKind::Module => ItemKind::Module,
        RustdocItemKind::Struct => ItemKind::Struct,
        RustdocItemKind::Enum => ItemKind::Enum,
        RustdocItemKind::Union => ItemKind::Union,
        RustdocItemKind::Trait => ItemKind::Trait,
        RustdocItemKind::TraitAlias => ItemKind::TraitAlias,
        RustdocItemKind::TypeAlias => ItemKind::TypeAlias,
        RustdocItemKind::Primitive => ItemKind::Primitive,
        RustdocItemKind::Function => ItemKind::Function,
        RustdocItemKind::Macro => ItemKind::Macro,
        RustdocItemKind::Constant => ItemKind::Constant,
        RustdocItemKind::Static => ItemKind::Static,
        RustdocItemKind::ExternType => ItemKind::ForeignType,
        _ => ItemKind::Struct,
    }
}

/// First line of an item's docs.
fn summary_line(docs: Option<&str>) -> String {
    docs.and_then(|docs| docs.lines().map(str::trim).find(|line| !line.is_empty()))
        .unwrap_or_default()
        .to_string()
}

struct Converter<'a> {
    krate: &'a Crate,
    paths: Vec<PathEntry>,
    path_ids: AHashMap<Id, usize>,
    items: Vec<Item>,
}

impl<'a> Converter<'a> {
    fn new(krate: &'a Crate) -> Self {
        Self {
            krate,
            paths: Vec::new(),
            path_ids: AHashMap::new(),
            items: Vec::new(),
        }
    }

    /// Deduplicated path-table index for a summarized id.
    fn intern(&mut self, id: &Id) -> Option<usize> {
        if let Some(&index) = self.path_ids.get(id) {
            return Some(index);
        }
        let summary = self.krate.paths.get(id)?;
        let name = summary.path.last()?.clone();
        let index = self.paths.len();
        self.paths.push(PathEntry::new(summary_kind(summary.kind), name));
        self.path_ids.insert(*id, index);
        Some(index)
    }

    /// Module path for an id, from the summary table (everything but the last segment).
    fn module_of(&self, id: &Id) -> Option<String> {
        let summary = self.krate.paths.get(id)?;
        let (_, module) = summary.path.split_last()?;
        Some(module.join("::"))
    }

    fn type_ref(&mut self, ty: &Type, self_parent: Option<usize>) -> TypeRef {
        match ty {
            Type::ResolvedPath(path) => match self.intern(&path.id) {
                Some(index) => TypeRef::Path(index),
                None => TypeRef::named(path.path.rsplit("::").next().unwrap_or(&path.path)),
            },
            Type::Generic(name) if name == "Self" => match self_parent {
                Some(parent) => TypeRef::Path(parent),
                None => TypeRef::named("self"),
            },
            Type::Generic(name) | Type::Primitive(name) => TypeRef::named(name.as_str()),
            Type::BorrowedRef { type_, .. } | Type::RawPointer { type_, .. } => self.type_ref(type_, self_parent),
            Type::Slice(_) => TypeRef::named("slice"),
            Type::Array { .. } => TypeRef::named("array"),
            Type::Tuple(types) if types.is_empty() => TypeRef::named("()"),
            Type::Tuple(_) => TypeRef::named("tuple"),
            Type::FunctionPointer(_) => TypeRef::named("fn"),
            Type::ImplTrait(_) | Type::DynTrait(_) => self.first_trait(ty, self_parent),
            Type::QualifiedPath { name, .. } => TypeRef::named(name.as_str()),
            _ => TypeRef::named("_"),
        }
    }

    fn first_trait(&mut self, ty: &Type, self_parent: Option<usize>) -> TypeRef {
        let trait_path = match ty {
            Type::ImplTrait(bounds) => bounds.iter().find_map(|bound| match bound {
                GenericBound::TraitBound { trait_, .. } => Some(trait_),
                _ => None,
            }),
            Type::DynTrait(dyn_trait) => dyn_trait.traits.first().map(|poly| &poly.trait_),
            _ => None,
        };
        match trait_path {
            Some(path) => self.type_ref(&Type::ResolvedPath(path.clone()), self_parent),
            None => TypeRef::named("_"),
        }
    }

    fn signature(&mut self, item: &RustdocItem, self_parent: Option<usize>) -> Option<Signature> {
        let ItemEnum::Function(function) = &item.inner else {
            return None;
        };
        let inputs = function
            .sig
            .inputs
            .iter()
            .map(|(name, ty)| Param::named(name.as_str(), self.type_ref(ty, self_parent)))
            .collect();
        let output = function
            .sig
            .output
            .as_ref()
            .map(|ty| self.type_ref(ty, self_parent));
        Some(Signature::new(inputs, output))
    }

    fn push(&mut self, item: &RustdocItem, kind: ItemKind, module: String, parent: Option<usize>) {
        let Some(name) = item.name.clone() else {
            return;
        };
        let signature = if kind.is_callable() {
            self.signature(item, parent)
        } else {
            None
        };
        self.items.push(Item {
            kind,
            name,
            path: module,
            parent,
            doc: summary_line(item.docs.as_deref()),
            signature,
        });
    }

    /// Children of a parent type or trait: methods, assoc items, variants.
    fn push_children(&mut self, child_ids: &[Id], parent_id: &Id, method_kind: ItemKind) {
        let Some(module) = self.module_of(parent_id) else {
            return;
        };
        let Some(parent) = self.intern(parent_id) else {
            return;
        };
        let krate = self.krate;
        for child_id in child_ids {
            let Some(child) = krate.index.get(child_id) else {
                continue;
            };
            let kind = match &child.inner {
                ItemEnum::Function(_) => method_kind,
                other => item_enum_to_kind(other),
            };
            self.push(child, kind, module.clone(), Some(parent));
        }
    }

    fn convert(mut self) -> Result<LibraryIndex, DecodeError> {
        let krate = self.krate;
        let root = krate.index.get(&krate.root).ok_or(DecodeError::UnnamedCrate)?;
        let name = root.name.clone().ok_or(DecodeError::UnnamedCrate)?;

        // HashMap order is arbitrary; ids give a stable generation order.
        let mut ids: Vec<&Id> = krate
            .index
            .iter()
            .filter(|(_, item)| item.crate_id == 0)
            .map(|(id, _)| id)
            .collect();
        ids.sort_by_key(|id| id.0);

        for id in ids {
            let item = &krate.index[id];
            if *id == krate.root {
                continue;
            }
            match &item.inner {
                ItemEnum::Impl(imp) => {
                    if imp.is_synthetic || imp.blanket_impl.is_some() {
                        continue;
                    }
                    if let Type::ResolvedPath(for_path) = &imp.for_ {
                        self.push_children(&imp.items, &for_path.id, ItemKind::Method);
                    }
                }
                ItemEnum::Trait(tr) => {
                    self.push_top_level(id, item);
                    self.push_children(&tr.items, id, ItemKind::TyMethod);
                }
                ItemEnum::Enum(en) => {
                    self.push_top_level(id, item);
                    self.push_children(&en.variants, id, ItemKind::Variant);
                }
                ItemEnum::Use(_) | ItemEnum::StructField(_) | ItemEnum::Variant(_) => {}
                ItemEnum::AssocConst { .. } | ItemEnum::AssocType { .. } => {}
                _ => self.push_top_level(id, item),
            }
        }

        tracing::debug!(
            "Converted rustdoc JSON for '{}': {} items, {} paths",
            name,
            self.items.len(),
            self.paths.len()
        );

        Ok(LibraryIndex {
            name,
            doc: summary_line(root.docs.as_deref()),
            items: self.items,
            paths: self.paths,
        })
    }

    /// Items reachable by a public path: the summary table lists exactly those.
    fn push_top_level(&mut self, id: &Id, item: &RustdocItem) {
        let Some(module) = self.module_of(id) else {
            return;
        };
        self.push(item, item_enum_to_kind(&item.inner), module, None);
    }
}

/// Decode one crate's rustdoc JSON into a library index.
pub fn decode(text: &str) -> Result<LibraryIndex, DecodeError> {
    let krate: Crate = serde_json::from_str(text)?;
    Converter::new(&krate).convert()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    #[test]
    fn test_detects_rustdoc_json() {
        check!(is_rustdoc_json(r#"{"root":0,"format_version":56,"index":{}}"#));
        check!(!is_rustdoc_json(r#"{"sfmt":{"items":[]}}"#));
        check!(!is_rustdoc_json("searchIndex[\"a\"] = {};"));
    }

    #[rstest]
    #[case(None, "")]
    #[case(Some(""), "")]
    #[case(Some("\n  Fast generator.\n\nMore detail."), "Fast generator.")]
    fn test_summary_line(#[case] docs: Option<&str>, #[case] expected: &str) {
        check!(summary_line(docs) == expected);
    }

    #[test]
    fn test_summary_kinds() {
        check!(summary_kind(RustdocItemKind::Trait) == ItemKind::Trait);
        check!(summary_kind(RustdocItemKind::ExternType) == ItemKind::ForeignType);
        check!(summary_kind(RustdocItemKind::Module) == ItemKind::Module);
    }

    #[test]
    fn test_malformed_document() {
        let_assert!(Err(DecodeError::Json(_)) = decode(r#"{"root":0,"format_version":56}"#));
    }
}

//! Query tokenization: name fragments, path qualifiers, kind filters and type hints.
//!
//! Grammar, informally:
//!
//! ```text
//! [kind:] [path::]*name [(type, type)] [-> type]
//! ```
//!
//! - The first unescaped `->` splits the name side from the return-type hint;
//!   `\->` stands for a literal `->`.
//! - A trailing `(...)` group on the name side holds parameter-type hints.
//! - Every part is optional, but a query with neither a name nor a type hint is empty.

use crate::schema::ItemKind;

/// A parsed, case-folded search query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Name fragment; empty means no name constraint.
    pub name: String,
    /// Module/type components that must end the item's parent path.
    pub path: Vec<String>,
    /// Kind filter from a `kind:` prefix.
    pub kinds: Option<&'static [ItemKind]>,
    /// Parameter type hints.
    pub params: Vec<String>,
    /// Return type hint.
    pub returns: Option<String>,
}

impl SearchQuery {
    /// Parse a raw query string. Returns `None` when nothing searchable remains.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let (left, right) = split_arrow(input);
        let returns = right.as_deref().and_then(normalize_type);

        let (left, kinds) = strip_kind_filter(left.trim());
        let (name_part, params) = split_params(left);

        let mut components = parse_path_components(name_part);
        let name = components.pop().unwrap_or_default();

        let query = Self {
            name,
            path: components,
            kinds,
            params,
            returns,
        };

        if query.name.is_empty() && !query.has_type_hints() {
            None
        } else {
            Some(query)
        }
    }

    pub fn has_type_hints(&self) -> bool {
        self.returns.is_some() || !self.params.is_empty()
    }

    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }

    /// Whether the kind filter admits `kind`.
    pub fn admits_kind(&self, kind: ItemKind) -> bool {
        self.kinds.is_none_or(|kinds| kinds.contains(&kind))
    }
}

/// Split at the first unescaped `->`, unescaping `\->` on the left side.
fn split_arrow(input: &str) -> (String, Option<String>) {
    let mut left = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        if let Some(after) = rest.strip_prefix("\\->") {
            left.push_str("->");
            rest = after;
        } else if let Some(after) = rest.strip_prefix("->") {
            return (left, Some(after.to_string()));
        } else {
            left.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }

    (left, None)
}

/// Recognize rustdoc-style `kind:` prefixes; unknown prefixes stay part of the name.
fn strip_kind_filter(input: &str) -> (&str, Option<&'static [ItemKind]>) {
    if let Some((prefix, rest)) = input.split_once(':')
        && !rest.starts_with(':')
        && let Some(kinds) = kind_filter(prefix.trim())
    {
        return (rest.trim(), Some(kinds));
    }
    (input, None)
}

fn kind_filter(prefix: &str) -> Option<&'static [ItemKind]> {
    let kinds: &'static [ItemKind] = match prefix.to_lowercase().as_str() {
        "fn" | "function" => &[ItemKind::Function, ItemKind::Method, ItemKind::TyMethod],
        "method" => &[ItemKind::Method, ItemKind::TyMethod],
        "struct" => &[ItemKind::Struct],
        "enum" => &[ItemKind::Enum],
        "trait" => &[ItemKind::Trait, ItemKind::TraitAlias],
        "type" => &[ItemKind::TypeAlias, ItemKind::AssocType],
        "const" | "constant" => &[ItemKind::Constant, ItemKind::AssocConst],
        "static" => &[ItemKind::Static],
        "macro" => &[
            ItemKind::Macro,
            ItemKind::ProcAttribute,
            ItemKind::ProcDerive,
        ],
        "mod" | "module" => &[ItemKind::Module],
        "variant" => &[ItemKind::Variant],
        "field" => &[ItemKind::StructField],
        "union" => &[ItemKind::Union],
        "primitive" => &[ItemKind::Primitive],
        _ => return None,
    };
    Some(kinds)
}

/// Split a trailing `(a, b)` group off the name side.
fn split_params(input: &str) -> (&str, Vec<String>) {
    let trimmed = input.trim_end();
    if let Some(inner) = trimmed.strip_suffix(')')
        && let Some(open) = matching_open(inner)
    {
        let params = split_top_level(&inner[open + 1..])
            .into_iter()
            .filter_map(normalize_type)
            .collect();
        return (&inner[..open], params);
    }
    (input, Vec::new())
}

/// Offset of the `(` closed by the `)` that was stripped from the end of `inner`.
fn matching_open(inner: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in inner.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' if depth == 0 => return Some(i),
            '(' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Split on commas that are not nested inside `<>`, `()` or `[]`.
fn split_top_level(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&list[start..]);
    parts
}

/// Parse an item path query into case-folded components.
///
/// Examples:
/// - `Vec` → ["vec"]
/// - `std::vec::Vec` → ["std", "vec", "vec"]
pub fn parse_path_components(query: &str) -> Vec<String> {
    query
        .split("::")
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Case-fold a type hint and drop reference sigils (`&`, `&mut`, `*const`) and
/// generic arguments, since corpus type names are bare.
fn normalize_type(raw: &str) -> Option<String> {
    let mut ty = raw.trim();
    loop {
        let stripped = ty
            .strip_prefix('&')
            .or_else(|| ty.strip_prefix("*const "))
            .or_else(|| ty.strip_prefix("*mut "))
            .or_else(|| ty.strip_prefix("mut "))
            .map(str::trim_start);
        match stripped {
            Some(rest) => ty = rest,
            None => break,
        }
    }
    let ty = ty.split_once('<').map_or(ty, |(base, _)| base);
    // Qualified hints match on their last component.
    let ty = ty.rsplit("::").next().unwrap_or(ty).trim();
    if ty.is_empty() {
        None
    } else {
        Some(ty.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("->")]
    #[case("()")]
    #[case("fn:")]
    fn test_empty_queries(#[case] input: &str) {
        check!(SearchQuery::parse(input).is_none());
    }

    #[test]
    fn test_plain_name_is_folded() {
        let_assert!(Some(query) = SearchQuery::parse("  ThreadRng "));
        check!(query.name == "threadrng");
        check!(query.path.is_empty());
        check!(!query.has_type_hints());
    }

    #[test]
    fn test_return_type_only() {
        let_assert!(Some(query) = SearchQuery::parse("-> ThreadRng"));
        check!(!query.has_name());
        check!(query.returns.as_deref() == Some("threadrng"));
        check!(query.params.is_empty());
    }

    #[test]
    fn test_name_and_return() {
        let_assert!(Some(query) = SearchQuery::parse("new -> Self"));
        check!(query.name == "new");
        check!(query.returns.as_deref() == Some("self"));
    }

    #[test]
    fn test_parameter_hints() {
        let_assert!(Some(query) = SearchQuery::parse("(u32, &mut SFMT) -> u64"));
        check!(!query.has_name());
        check!(query.params == vec!["u32".to_string(), "sfmt".to_string()]);
        check!(query.returns.as_deref() == Some("u64"));
    }

    #[rstest]
    #[case("(Vec<(u8, u16)>)", &["vec"])]
    #[case("(Vec<(u8, u16)>, &str)", &["vec", "str"])]
    #[case("(HashMap<String, Vec<u8>>, [u8; 4])", &["hashmap", "[u8; 4]"])]
    #[case("push((u8, u16))", &["(u8, u16)"])]
    fn test_nested_parameter_hints(#[case] input: &str, #[case] expected: &[&str]) {
        let_assert!(Some(query) = SearchQuery::parse(input));
        check!(query.params == expected);
    }

    #[test]
    fn test_nested_group_keeps_name() {
        let_assert!(Some(query) = SearchQuery::parse("insert(HashMap<K, V>, K)"));
        check!(query.name == "insert");
        check!(query.params == vec!["hashmap".to_string(), "k".to_string()]);
    }

    #[test]
    fn test_parameter_only_query() {
        let_assert!(Some(query) = SearchQuery::parse("(u32)"));
        check!(query.params == vec!["u32".to_string()]);
        check!(query.returns.is_none());
    }

    #[test]
    fn test_name_with_parameters() {
        let_assert!(Some(query) = SearchQuery::parse("new(u32)"));
        check!(query.name == "new");
        check!(query.params == vec!["u32".to_string()]);
    }

    #[test]
    fn test_escaped_arrow_stays_in_name() {
        let_assert!(Some(query) = SearchQuery::parse(r"a\->b -> c"));
        check!(query.name == "a->b");
        check!(query.returns.as_deref() == Some("c"));
    }

    #[test]
    fn test_only_first_arrow_splits() {
        let_assert!(Some(query) = SearchQuery::parse("f -> a -> b"));
        check!(query.name == "f");
        check!(query.returns.as_deref() == Some("a -> b"));
    }

    #[rstest]
    #[case("fn:thread_rng", "thread_rng", ItemKind::Function, ItemKind::Struct)]
    #[case("struct: SFMT", "sfmt", ItemKind::Struct, ItemKind::Function)]
    #[case("method:new", "new", ItemKind::Method, ItemKind::Function)]
    fn test_kind_filter(
        #[case] input: &str,
        #[case] name: &str,
        #[case] admitted: ItemKind,
        #[case] rejected: ItemKind,
    ) {
        let_assert!(Some(query) = SearchQuery::parse(input));
        check!(query.name == name);
        check!(query.admits_kind(admitted));
        check!(!query.admits_kind(rejected));
    }

    #[test]
    fn test_unknown_prefix_is_name() {
        let_assert!(Some(query) = SearchQuery::parse("nope:thing"));
        check!(query.kinds.is_none());
        check!(query.name == "nope:thing");
    }

    #[test]
    fn test_path_qualified_name() {
        let_assert!(Some(query) = SearchQuery::parse("SFMT::new"));
        check!(query.name == "new");
        check!(query.path == vec!["sfmt".to_string()]);
    }

    #[rstest]
    #[case("Vec", &["vec"])]
    #[case("std::vec::Vec", &["std", "vec", "vec"])]
    #[case("::a:: ::b", &["a", "b"])]
    fn test_parse_path_components(#[case] input: &str, #[case] expected: &[&str]) {
        check!(parse_path_components(input) == expected);
    }

    #[rstest]
    #[case("&str", Some("str"))]
    #[case("&mut Vec", Some("vec"))]
    #[case("*const u8", Some("u8"))]
    #[case("sfmt::ThreadRng", Some("threadrng"))]
    #[case("std::vec::Vec<std::string::String>", Some("vec"))]
    #[case("  ", None)]
    fn test_normalize_type(#[case] input: &str, #[case] expected: Option<&str>) {
        check!(normalize_type(input).as_deref() == expected);
    }
}

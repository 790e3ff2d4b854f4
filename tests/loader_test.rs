mod common;

use assert2::{check, let_assert};
use common::{library_of, sfmt, sfmt_engine};
use rstest::rstest;
use rustdoc_search::error::{IntegrityViolation, LoadError, TypePosition};
use rustdoc_search::schema::{Item, ItemKind, LibraryIndex, Signature, TypeRef};
use rustdoc_search::search::Corpus;
use rustdoc_search::state::SearchEngine;

/// Test: Loading then searching the empty query yields nothing.
#[rstest]
fn loaded_corpus_answers_empty_query_with_nothing(sfmt: LibraryIndex) {
    let corpus = Corpus::load(vec![sfmt]).unwrap();
    check!(corpus.item_count() == 10);
    check!(rustdoc_search::search::search("", &corpus, 10).unwrap().is_empty());
}

/// Test: A dangling parent index fails the load and keeps the old corpus serving.
#[rstest]
fn dangling_parent_keeps_previous_corpus(sfmt_engine: SearchEngine) {
    let mut broken = library_of("broken", &[]);
    broken.items.push(Item::new(ItemKind::Method, "orphan").with_parent(3));

    let_assert!(Err(LoadError::MalformedIndex { library, violation }) = sfmt_engine.reload(vec![broken]));
    check!(library == "broken");
    let_assert!(IntegrityViolation::ParentOutOfBounds { index: 3, len: 0, .. } = violation);

    check!(sfmt_engine.generation() == 1);
    check!(sfmt_engine.search("SFMT", 5).unwrap().len() == 1);
}

/// Test: A dangling signature type is reported with its position.
#[rstest]
fn dangling_signature_type_is_malformed(mut sfmt: LibraryIndex) {
    sfmt.items.push(
        Item::new(ItemKind::Function, "seeded")
            .with_signature(Signature::new(vec![], Some(TypeRef::Path(9)))),
    );

    let_assert!(Err(LoadError::MalformedIndex { violation, .. }) = Corpus::load(vec![sfmt]));
    let_assert!(
        IntegrityViolation::TypeOutOfBounds {
            position: TypePosition::Output,
            index: 9,
            len: 2,
            ..
        } = violation
    );
}

/// Test: The whole load fails when one library is bad, even if others are fine.
#[rstest]
fn one_bad_library_fails_the_whole_load(sfmt: LibraryIndex) {
    let mut unnamed = LibraryIndex::new("");
    unnamed.items.push(Item::new(ItemKind::Function, "f"));

    let_assert!(Err(LoadError::MalformedIndex { violation, .. }) = Corpus::load(vec![sfmt, unnamed]));
    check!(violation == IntegrityViolation::EmptyLibraryName);
}

/// Test: Same-name libraries are rejected; distinct names load side by side.
#[rstest]
fn duplicate_library_names(sfmt: LibraryIndex) {
    let_assert!(Err(LoadError::DuplicateLibrary { name }) = Corpus::load(vec![sfmt.clone(), sfmt.clone()]));
    check!(name == "sfmt");

    let mut renamed = sfmt.clone();
    renamed.name = "sfmt_compat".to_string();
    let corpus = Corpus::load(vec![sfmt, renamed]).unwrap();
    check!(corpus.libraries().map(|l| l.name).collect::<Vec<_>>() == ["sfmt", "sfmt_compat"]);

    let results = rustdoc_search::search::search("SFMT", &corpus, 10).unwrap();
    let libraries: Vec<_> = results.results.iter().map(|r| r.library.as_str()).collect();
    check!(libraries == ["sfmt", "sfmt_compat"]);
}

/// Test: Items resolve by library and qualified path, including duplicate names.
#[rstest]
fn lookup_by_qualified_path(sfmt: LibraryIndex) {
    let corpus = Corpus::load(vec![sfmt]).unwrap();

    let found = corpus.lookup("sfmt", "sfmt::SFMT::new");
    let_assert!([item] = found.as_slice());
    check!(item.doc == "Create a new state from a seed.");
    check!(corpus.lookup("sfmt", "sfmt::ThreadRng::clone").len() == 1);
    check!(corpus.lookup("sfmt", "sfmt::Missing").is_empty());
    check!(corpus.lookup("rand", "sfmt::SFMT::new").is_empty());
}

/// Test: Library summaries report table sizes.
#[rstest]
fn library_summaries(sfmt_engine: SearchEngine) {
    let corpus = sfmt_engine.corpus();
    let summaries: Vec<_> = corpus.libraries().collect();
    let_assert!([summary] = summaries.as_slice());
    check!(summary.name == "sfmt");
    check!(summary.items == 10);
    check!(summary.paths == 2);
    check!(summary.doc.starts_with("Rust implementation"));
}

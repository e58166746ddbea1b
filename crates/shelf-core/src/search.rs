//! Search over the book collection
//!
//! Case-insensitive substring match on title, author, or any tag.

use std::collections::BTreeMap;

use crate::models::Book;

/// Whether `book` matches an already lower-cased term
fn matches_lowered(book: &Book, term: &str) -> bool {
    book.title.to_lowercase().contains(term)
        || book.author.to_lowercase().contains(term)
        || book.tags.iter().any(|t| t.to_lowercase().contains(term))
}

/// Books matching `term`, in collection order
///
/// An empty term matches every book.
pub fn filter_books<'a>(books: &'a [Book], term: &str) -> Vec<&'a Book> {
    let term = term.to_lowercase();
    books
        .iter()
        .filter(|book| matches_lowered(book, &term))
        .collect()
}

/// Distinct tags with the number of books carrying each, sorted by name
///
/// A book listing the same tag twice counts once.
pub fn tag_counts(books: &[Book]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for book in books {
        let mut seen: Vec<&str> = Vec::new();
        for tag in &book.tags {
            if !seen.contains(&tag.as_str()) {
                seen.push(tag);
                *counts.entry(tag).or_insert(0) += 1;
            }
        }
    }
    counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect()
}

//! Book command handlers

use anyhow::{bail, Result};

use shelf_core::{BookForm, ShelfError};

use crate::commands::CliStore;
use crate::output::Output;
use crate::platform::SystemOpener;
use crate::prompt::{confirm, is_interactive, prompt_line};

/// Add a new book
///
/// When required fields are missing and a terminal is attached, the
/// missing fields are asked for until the form is complete or the user
/// leaves every prompt empty.
pub fn add(store: &mut CliStore, form: BookForm, output: &Output) -> Result<()> {
    let interactive = output.should_prompt() && is_interactive();
    add_with(store, form, output, interactive, prompt_line)
}

fn add_with<F>(
    store: &mut CliStore,
    mut form: BookForm,
    output: &Output,
    interactive: bool,
    mut ask: F,
) -> Result<()>
where
    F: FnMut(&str) -> Result<String>,
{
    loop {
        match store.add(&mut form) {
            Ok(book) => return output.print_book(&book),
            Err(ShelfError::MissingFields(missing)) if interactive => {
                if !fill_missing(&mut form, &missing, &mut ask)? {
                    bail!(ShelfError::MissingFields(missing));
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Ask for each missing field; false if nothing was entered
fn fill_missing<F>(form: &mut BookForm, missing: &[&'static str], ask: &mut F) -> Result<bool>
where
    F: FnMut(&str) -> Result<String>,
{
    let mut entered = false;
    for field in missing {
        let value = ask(&format!("{} *", capitalize(field)))?;
        if value.is_empty() {
            continue;
        }
        entered = true;
        match *field {
            "title" => form.title = value,
            "author" => form.author = value,
            "link" => form.link = value,
            _ => {}
        }
    }
    Ok(entered)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// List books, optionally filtered by a search term
pub fn list(store: &mut CliStore, search: Option<String>, output: &Output) -> Result<()> {
    store.set_search_term(search.unwrap_or_default());
    output.print_books(&store.visible(), store.len())
}

/// Search books by title, author or tag
pub fn search(store: &mut CliStore, term: String, output: &Output) -> Result<()> {
    list(store, Some(term), output)
}

/// Show a single book
pub fn show(store: &CliStore, id: String, output: &Output) -> Result<()> {
    let book = store.resolve(&id)?;
    output.print_book(book)
}

/// Delete a book
pub fn delete(store: &mut CliStore, id: String, yes: bool, output: &Output) -> Result<()> {
    let book = store.resolve(&id)?.clone();

    if !yes && output.should_prompt() {
        println!("Delete book: {} - {}", book.id, book.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.delete(&book.id)?;
    Ok(())
}

/// Open a book's link
///
/// Failures are reported by the store as notifications, not errors.
pub fn open(store: &mut CliStore, id: String) -> Result<()> {
    let book = store.resolve(&id)?.clone();
    store.open_book(&SystemOpener, &book.link, &book.title);
    Ok(())
}

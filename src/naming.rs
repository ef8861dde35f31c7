//! Slug derivation for generated pages.
//!
//! Every catalog entry gets a stable, URL-safe file name built from its title
//! and release year. The same slug is used for the page file, the canonical
//! URL, and the search index record, so this module is the single place the
//! rule lives.
//!
//! ## Rule
//!
//! - Lowercase the title.
//! - Replace every run of characters outside `[a-z0-9]` with one `-`.
//! - Trim leading and trailing `-`.
//! - If nothing is left, fall back to `movie-<id>` (or `untitled-content` when
//!   there is no id either).
//! - Append `-<year>`, where year is the four-digit release year or `NA`.
//!
//! ```text
//! "Test! Movie", 42, "2021"  → test-movie-2021
//! "¡¿?!",        42, "2020"  → movie-42-2020
//! "Amélie",      194, "2001" → am-lie-2001
//! ```
//!
//! Two different entries that normalize to the same slug and year collide:
//! the second one finds the first one's page on disk and is skipped.

/// Normalize a title into its URL-safe stem, with the id fallback applied.
///
/// `id` is taken as a string so callers with no id at all can pass `""`.
pub fn slugify(title: &str, id: &str) -> String {
    let lower = title.to_lowercase();
    let mut slug = String::with_capacity(lower.len());
    let mut pending_dash = false;
    for c in lower.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if !slug.is_empty() {
        slug
    } else if !id.is_empty() {
        format!("movie-{id}")
    } else {
        "untitled-content".to_string()
    }
}

/// Full page slug: `<normalized title>-<year>`.
pub fn resolve_slug(title: &str, id: u64, year: &str) -> String {
    format!("{}-{}", slugify(title, &id.to_string()), year)
}

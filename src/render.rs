//! Placeholder substitution for page templates.
//!
//! A template is plain HTML with `{{NAME}}` markers. Rendering is a single
//! left-to-right pass: each marker whose name is present in the field map is
//! replaced by its value, anything else is copied through untouched. Values
//! are never rescanned, so a value that happens to contain `{{X}}` stays
//! literal.
//!
//! The renderer has no control flow. Conditional output (trailer player vs
//! backdrop, analytics on or off) is decided while building the field map in
//! [`crate::fields`] and arrives here as plain strings.
//!
//! ## Placeholder contract
//!
//! | Name | Value |
//! |------|-------|
//! | `ANALYTICS` | GA4 snippet on authority sites, empty otherwise |
//! | `API_KEY` | Client-side catalog key |
//! | `TITLE`, `SAFE_TITLE` | Quote-escaped title |
//! | `TYPE` | `Movie` or `TV Show` |
//! | `MEDIA_TYPE` | `movie` or `tv` |
//! | `SEO_DESCRIPTION` | Meta description |
//! | `OVERVIEW` | Synopsis plus the generated promotional paragraph |
//! | `POSTER_URL`, `POSTER_PATH`, `POSTER_ALT` | Poster image |
//! | `YEAR`, `RATING`, `RUNTIME`, `CERTIFICATION` | Facts row |
//! | `VIDEO_KEY`, `DISPLAY_PLAYER`, `DISPLAY_BACKDROP` | Trailer toggle |
//! | `GENRES`, `CAST_LIST` | Pre-rendered markup |
//! | `ID`, `FOLDER`, `SLUG` | Identity |
//! | `SCHEMA` | JSON-LD block |
//! | `CANONICAL`, `AUTHORITY_DOMAIN` | Canonical link target |

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("template not found: {0}")]
    TemplateMissing(PathBuf),
    #[error("failed to read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Placeholder name → resolved value.
pub type Fields = BTreeMap<&'static str, String>;

/// A page template, loaded once per run.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
}

impl Template {
    /// Read a template from disk. A missing file is fatal for the whole run.
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        match fs::read_to_string(path) {
            Ok(source) => Ok(Self { source }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(RenderError::TemplateMissing(path.to_path_buf()))
            }
            Err(source) => Err(RenderError::TemplateRead {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_string(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn render(&self, fields: &Fields) -> String {
        render(&self.source, fields)
    }
}

/// Substitute every known `{{NAME}}` in `template` in one pass.
pub fn render(template: &str, fields: &Fields) -> String {
    let mut out = String::with_capacity(template.len() + 4096);
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        match after_open.find("}}") {
            Some(close) => {
                let name = &after_open[..close];
                match fields.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(name);
                        out.push_str("}}");
                    }
                }
                rest = &after_open[close + 2..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

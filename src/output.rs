//! CLI output formatting for every command.
//!
//! Logging (via `tracing`) narrates a run as it happens; this module prints
//! the summary a person reads once the run is over. Each site is shown by its
//! domain, with the pages it gained listed underneath by canonical URL.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! https://example.com (authority)
//!     001 https://example.com/movies/test-movie-2021.html
//!     written 1, skipped 39, invalid 0, failed 0
//!     queued 1, index 40 records
//! https://mirror.example.net
//!     written 0, skipped 40, invalid 0, failed 0
//!     index 40 records
//! https://gone.example.org
//!     not processed: output directory not found: /srv/gone
//!
//! Generated 1 page across 2 sites in 4.2s
//! ```
//!
//! ## Submit
//!
//! ```text
//! Queue new_urls.txt: 250 pending
//!     submitted 198, failed 2, dropped 50
//!     queue cleared
//! ```
//!
//! ## Check
//!
//! ```text
//! Sites
//! 001 https://example.com (authority)
//!     Output: ./public_html
//! 002 https://mirror.example.net
//!     Output: /srv/mirror (missing)
//!
//! Files
//!     Template: template.html
//!     Queue: new_urls.txt (3 pending)
//!
//! Environment
//!     TMDB_API_KEY: set
//!     GOOGLE_INDEXING_JSON: not set
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::config::{API_KEY_VAR, CREDENTIAL_VAR, Config};
use crate::generate::{RunReport, SiteReport};
use crate::submit::SubmitReport;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn site_header(domain: &str, authority: bool) -> String {
    if authority {
        format!("{domain} (authority)")
    } else {
        domain.to_string()
    }
}

// ============================================================================
// Generate
// ============================================================================

fn format_site(site: &SiteReport) -> Vec<String> {
    let mut lines = vec![site_header(&site.domain, site.authority)];
    for (i, url) in site.written.iter().enumerate() {
        lines.push(format!("{}{} {}", indent(1), format_index(i + 1), url));
    }
    lines.push(format!(
        "{}written {}, skipped {}, invalid {}, failed {}",
        indent(1),
        site.written.len(),
        site.skipped,
        site.invalid,
        site.failed
    ));
    if site.authority {
        lines.push(format!(
            "{}queued {}, index {}",
            indent(1),
            site.queued,
            plural(site.indexed, "record")
        ));
    } else {
        lines.push(format!("{}index {}", indent(1), plural(site.indexed, "record")));
    }
    lines
}

pub fn format_generate_output(report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();
    for site in &report.sites {
        lines.extend(format_site(site));
    }
    for aborted in &report.aborted {
        lines.push(aborted.domain.clone());
        lines.push(format!("{}not processed: {}", indent(1), aborted.error));
    }
    lines.push(String::new());
    lines.push(format!(
        "Generated {} across {} in {:.1}s",
        plural(report.total_written(), "page"),
        plural(report.sites.len(), "site"),
        report.elapsed.as_secs_f64()
    ));
    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(report: &RunReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Submit
// ============================================================================

pub fn format_submit_output(report: &SubmitReport, queue_path: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "Queue {}: {} pending",
        queue_path.display(),
        report.pending
    )];
    if report.pending == 0 {
        lines.push(format!("{}nothing to submit", indent(1)));
        return lines;
    }
    lines.push(format!(
        "{}submitted {}, failed {}, dropped {}",
        indent(1),
        report.submitted,
        report.failed,
        report.dropped
    ));
    if report.cleared {
        lines.push(format!("{}queue cleared", indent(1)));
    }
    lines
}

pub fn print_submit_output(report: &SubmitReport, queue_path: &Path) {
    for line in format_submit_output(report, queue_path) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Filesystem and environment facts gathered by the `check` command.
#[derive(Debug, Clone, Default)]
pub struct Readiness {
    /// Per site, in config order: does the output root exist.
    pub roots_present: Vec<bool>,
    pub template_present: bool,
    pub pending: usize,
    pub api_key_set: bool,
    pub credential_set: bool,
}

impl Readiness {
    /// Everything `generate` needs is in place.
    pub fn can_generate(&self) -> bool {
        self.template_present && self.api_key_set && self.roots_present.iter().any(|p| *p)
    }
}

pub fn format_check_output(config: &Config, readiness: &Readiness) -> Vec<String> {
    let missing = |present: bool| if present { "" } else { " (missing)" };
    let set = |present: bool| if present { "set" } else { "not set" };

    let mut lines = vec!["Sites".to_string()];
    for (i, site) in config.sites.iter().enumerate() {
        let present = readiness.roots_present.get(i).copied().unwrap_or(false);
        lines.push(format!(
            "{} {}",
            format_index(i + 1),
            site_header(&site.domain, site.is_authority())
        ));
        lines.push(format!(
            "{}Output: {}{}",
            indent(1),
            site.output_root.display(),
            missing(present)
        ));
        if !site.is_authority() {
            lines.push(format!("{}Canonical: {}", indent(1), site.authority_domain));
        }
        if let Some(id) = config.analytics_id(site) {
            lines.push(format!("{}Analytics: {}", indent(1), id));
        }
    }

    lines.push(String::new());
    lines.push("Files".to_string());
    lines.push(format!(
        "{}Template: {}{}",
        indent(1),
        config.generate.template.display(),
        missing(readiness.template_present)
    ));
    lines.push(format!(
        "{}Queue: {} ({} pending)",
        indent(1),
        config.generate.queue_file.display(),
        readiness.pending
    ));

    lines.push(String::new());
    lines.push("Environment".to_string());
    lines.push(format!("{}{}: {}", indent(1), API_KEY_VAR, set(readiness.api_key_set)));
    lines.push(format!(
        "{}{}: {}",
        indent(1),
        CREDENTIAL_VAR,
        set(readiness.credential_set)
    ));
    lines
}

pub fn print_check_output(config: &Config, readiness: &Readiness) {
    for line in format_check_output(config, readiness) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Sitemaps and robots directives.
//!
//! Regenerated for every site on every run, whether or not any page was
//! written. The per-folder sitemaps are built from the `.html` files present
//! on disk, not from the search index, so pages added or removed by hand are
//! picked up on the next run.
//!
//! ## Output
//!
//! ```text
//! public_html/
//! ├── movies_sitemap.xml     # every movies/*.html with its mtime
//! ├── tvshows_sitemap.xml    # every tvshows/*.html with its mtime
//! ├── sitemap.xml            # index pointing at the two above
//! └── robots.txt
//! ```

use crate::config::TargetSite;
use crate::types::MediaType;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, error};
use walkdir::WalkDir;

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// One page listed in a folder sitemap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub file_name: String,
    pub modified: NaiveDate,
}

/// Regenerate every artifact for a site. Failures are logged per file.
pub fn write_all(site: &TargetSite, today: NaiveDate) {
    let root = &site.output_root;
    for media_type in MediaType::ALL {
        let folder = media_type.folder();
        match write_folder_sitemap(root, &site.domain, folder) {
            Ok(Some(count)) => debug!(folder, count, "wrote folder sitemap"),
            Ok(None) => debug!(folder, "folder missing, no sitemap"),
            Err(e) => error!(folder, error = %e, "failed to write folder sitemap"),
        }
    }
    if let Err(e) = fs::write(root.join("sitemap.xml"), master_sitemap(&site.domain, today)) {
        error!(error = %e, "failed to write master sitemap");
    }
    if let Err(e) = fs::write(root.join("robots.txt"), robots_txt(&site.domain)) {
        error!(error = %e, "failed to write robots.txt");
    }
}

/// Write `<root>/<folder>_sitemap.xml` from the folder's current contents.
///
/// Returns the number of pages listed, or `None` when the folder is absent.
pub fn write_folder_sitemap(
    root: &Path,
    domain: &str,
    folder: &str,
) -> io::Result<Option<usize>> {
    let dir = root.join(folder);
    if !dir.is_dir() {
        return Ok(None);
    }
    let entries = scan_pages(&dir)?;
    let xml = folder_sitemap(domain, folder, &entries);
    fs::write(root.join(format!("{folder}_sitemap.xml")), xml)?;
    Ok(Some(entries.len()))
}

/// List the `.html` files directly inside `dir`, sorted by name.
pub fn scan_pages(dir: &Path) -> io::Result<Vec<SitemapEntry>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("html") {
            continue;
        }
        let modified: DateTime<Utc> = entry.metadata().map_err(io::Error::other)?.modified()?.into();
        entries.push(SitemapEntry {
            file_name: entry.file_name().to_string_lossy().into_owned(),
            modified: modified.date_naive(),
        });
    }
    entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(entries)
}

pub fn folder_sitemap(domain: &str, folder: &str, entries: &[SitemapEntry]) -> String {
    let mut xml = format!("{XML_HEADER}\n<urlset xmlns=\"{SITEMAP_NS}\">\n");
    for entry in entries {
        let _ = write!(
            xml,
            "  <url>\n    <loc>{domain}/{folder}/{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>weekly</changefreq>\n  </url>\n",
            xml_escape(&entry.file_name),
            entry.modified.format("%Y-%m-%d"),
        );
    }
    xml.push_str("</urlset>");
    xml
}

pub fn master_sitemap(domain: &str, today: NaiveDate) -> String {
    let date = today.format("%Y-%m-%d");
    let mut xml = format!("{XML_HEADER}\n<sitemapindex xmlns=\"{SITEMAP_NS}\">\n");
    for media_type in MediaType::ALL {
        let _ = write!(
            xml,
            "  <sitemap>\n    <loc>{domain}/{}_sitemap.xml</loc>\n    <lastmod>{date}</lastmod>\n  </sitemap>\n",
            media_type.folder(),
        );
    }
    xml.push_str("</sitemapindex>");
    xml
}

pub fn robots_txt(domain: &str) -> String {
    format!(
        "User-agent: *\n\
         Allow: /\n\
         Disallow: /*?search=\n\
         Disallow: /*&search=\n\
         Disallow: /*?lang=\n\
         Disallow: /*&lang=\n\
         Sitemap: {domain}/sitemap.xml\n"
    )
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn robots_points_to_master_sitemap() {
        let robots = robots_txt("https://a.test");
        assert!(robots.starts_with("User-agent: *\nAllow: /\n"));
        assert!(robots.contains("Disallow: /*?lang=\n"));
        assert!(robots.ends_with("Sitemap: https://a.test/sitemap.xml\n"));
    }

    #[test]
    fn master_sitemap_lists_both_folders_with_today() {
        let xml = master_sitemap("https://a.test", date("2026-10-18"));
        assert!(xml.contains("<loc>https://a.test/movies_sitemap.xml</loc>"));
        assert!(xml.contains("<loc>https://a.test/tvshows_sitemap.xml</loc>"));
        assert_eq!(xml.matches("<lastmod>2026-10-18</lastmod>").count(), 2);
    }

    #[test]
    fn folder_sitemap_renders_entries() {
        let xml = folder_sitemap(
            "https://a.test",
            "movies",
            &[SitemapEntry {
                file_name: "up-2009.html".into(),
                modified: date("2024-01-02"),
            }],
        );
        assert!(xml.starts_with(XML_HEADER));
        assert!(xml.contains("<loc>https://a.test/movies/up-2009.html</loc>"));
        assert!(xml.contains("<lastmod>2024-01-02</lastmod>"));
        assert!(xml.contains("<changefreq>weekly</changefreq>"));
        assert!(xml.ends_with("</urlset>"));
    }

    #[test]
    fn scan_pages_only_lists_html() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a-2020.html"), "").unwrap();
        fs::write(tmp.path().join("notes.txt"), "").unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("sub/nested.html"), "").unwrap();

        let entries = scan_pages(tmp.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name, "a-2020.html");
    }

    #[test]
    fn hand_added_page_appears_in_next_sitemap() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("movies")).unwrap();
        fs::write(tmp.path().join("movies/a-2020.html"), "").unwrap();
        write_folder_sitemap(tmp.path(), "https://a.test", "movies").unwrap();

        fs::write(tmp.path().join("movies/manual-page.html"), "").unwrap();
        let count = write_folder_sitemap(tmp.path(), "https://a.test", "movies").unwrap();
        assert_eq!(count, Some(2));

        let xml = fs::read_to_string(tmp.path().join("movies_sitemap.xml")).unwrap();
        assert!(xml.contains("https://a.test/movies/manual-page.html"));
    }

    #[test]
    fn missing_folder_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let count = write_folder_sitemap(tmp.path(), "https://a.test", "tvshows").unwrap();
        assert_eq!(count, None);
        assert!(!tmp.path().join("tvshows_sitemap.xml").exists());
    }

    #[test]
    fn write_all_produces_every_file() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("movies")).unwrap();
        fs::create_dir(tmp.path().join("tvshows")).unwrap();
        let site = TargetSite {
            domain: "https://a.test".into(),
            output_root: PathBuf::from(tmp.path()),
            authority_domain: "https://a.test".into(),
        };
        write_all(&site, date("2026-10-18"));
        for name in [
            "movies_sitemap.xml",
            "tvshows_sitemap.xml",
            "sitemap.xml",
            "robots.txt",
        ] {
            assert!(tmp.path().join(name).exists(), "{name} missing");
        }
    }
}

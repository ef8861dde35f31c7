//! Resolves a detail record into the placeholder values of one page.
//!
//! Everything conditional about a page is decided here: which trailer to
//! embed and whether the player or the backdrop is shown, whether analytics
//! are injected, which certification applies. The result is a flat
//! [`Fields`] map handed to the renderer.
//!
//! Markup fragments (genre tags, cast cards, the analytics snippet) are built
//! with Maud so interpolated catalog text is HTML-escaped. Plain text fields
//! keep the quote escaping of [`safe_str`], since templates also embed them
//! inside inline script strings.

use crate::config::{PromoConfig, TargetSite};
use crate::render::Fields;
use crate::source::DetailRecord;
use crate::spintax::{self, Blurb};
use crate::types::{ContentItem, MediaType};
use maud::{Markup, PreEscaped, html};
use serde_json::json;

const POSTER_PLACEHOLDER: &str = "https://via.placeholder.com/500x750?text=No+Poster";
const PROFILE_PLACEHOLDER: &str = "https://via.placeholder.com/200";
const MAX_CAST_CARDS: usize = 10;
const MAX_SCHEMA_ACTORS: usize = 5;

/// Per-site values that are the same for every page of a run.
pub struct PageContext<'a> {
    pub site: &'a TargetSite,
    /// GA4 id when this site is an authority with a mapping.
    pub analytics_id: Option<&'a str>,
    pub client_api_key: &'a str,
    /// e.g. `https://image.tmdb.org/t/p`
    pub image_base: &'a str,
    pub promo: &'a PromoConfig,
}

impl PageContext<'_> {
    /// URL of the page on the site being written.
    pub fn page_url(&self, media_type: MediaType, slug: &str) -> String {
        format!("{}/{}/{}.html", self.site.domain, media_type.folder(), slug)
    }

    /// URL of the same page on the authority site.
    pub fn canonical_url(&self, media_type: MediaType, slug: &str) -> String {
        canonical_url(self.site, media_type, slug)
    }
}

pub fn canonical_url(site: &TargetSite, media_type: MediaType, slug: &str) -> String {
    format!(
        "{}/{}/{}.html",
        site.authority_domain,
        media_type.folder(),
        slug
    )
}

/// Build the complete field map for one page.
pub fn page_fields(
    item: &ContentItem,
    title: &str,
    slug: &str,
    detail: &DetailRecord,
    ctx: &PageContext,
    rng: &mut fastrand::Rng,
) -> Fields {
    let media_type = item.media_type;
    let year = item.year();
    let clean_domain = ctx.site.clean_domain();

    let overview = safe_str(
        detail
            .overview
            .as_deref()
            .filter(|o| !o.is_empty())
            .unwrap_or("No synopsis available."),
    );
    let seo_description = format!(
        "Watch {title} ({year}). {}... Review and details on {clean_domain}.",
        truncate_chars(&overview, 100)
    );
    let promo = spintax::promo_paragraph(
        rng,
        &Blurb {
            title,
            site: clean_domain,
            network: ctx.site.clean_authority(),
        },
        ctx.promo,
        media_type,
        slug,
    );

    let poster_url = poster_url(ctx.image_base, detail.poster_path.as_deref());
    let poster_alt = format!(
        "{title} ({year}) - {} details on {clean_domain}",
        capitalize(media_type.as_str())
    );
    let trailer = trailer_key(detail);
    let (display_player, display_backdrop) = if trailer.is_empty() {
        ("none", "block")
    } else {
        ("block", "none")
    };

    let mut fields = Fields::new();
    fields.insert(
        "ANALYTICS",
        ctx.analytics_id
            .map(|id| analytics_snippet(id).into_string())
            .unwrap_or_default(),
    );
    fields.insert("API_KEY", ctx.client_api_key.to_string());
    fields.insert("TITLE", safe_str(title));
    fields.insert("SAFE_TITLE", safe_str(title));
    fields.insert("TYPE", media_type.label().to_string());
    fields.insert("MEDIA_TYPE", media_type.as_str().to_string());
    fields.insert("SEO_DESCRIPTION", seo_description);
    fields.insert("OVERVIEW", format!("{overview}<br><br>{promo}"));
    fields.insert("POSTER_URL", poster_url);
    fields.insert(
        "POSTER_PATH",
        detail.poster_path.clone().unwrap_or_default(),
    );
    fields.insert("POSTER_ALT", safe_str(&poster_alt));
    fields.insert("YEAR", year);
    fields.insert("RATING", format_rating(detail.vote_average));
    fields.insert("VIDEO_KEY", trailer);
    fields.insert("DISPLAY_PLAYER", display_player.to_string());
    fields.insert("DISPLAY_BACKDROP", display_backdrop.to_string());
    fields.insert(
        "RUNTIME",
        format_runtime(detail.runtime_minutes(media_type)),
    );
    fields.insert("CERTIFICATION", certification(detail, media_type));
    fields.insert("GENRES", genre_tags(detail).into_string());
    fields.insert("CAST_LIST", cast_cards(detail, ctx.image_base).into_string());
    fields.insert("ID", item.id.to_string());
    fields.insert("FOLDER", media_type.folder().to_string());
    fields.insert("SLUG", slug.to_string());
    fields.insert(
        "SCHEMA",
        json_ld(detail, media_type, title, ctx.image_base),
    );
    fields.insert("CANONICAL", ctx.canonical_url(media_type, slug));
    fields.insert("AUTHORITY_DOMAIN", ctx.site.clean_authority().to_string());
    fields
}

/// Escape both quote kinds with a backslash.
pub fn safe_str(text: &str) -> String {
    text.replace('\'', "\\'").replace('"', "\\\"")
}

/// Vote average cut (not rounded) to one decimal: `7.46` → `7.4`.
pub fn format_rating(vote_average: f64) -> String {
    // Thousandths first so 2.3 stays 2.3 despite binary representation.
    let tenths = (vote_average.max(0.0) * 1000.0).round() as u64 / 100;
    format!("{}.{}", tenths / 10, tenths % 10)
}

/// `Xh Ym`, or `N/A` for zero.
pub fn format_runtime(minutes: u32) -> String {
    if minutes == 0 {
        "N/A".to_string()
    } else {
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

/// The first YouTube trailer, else the first video of any kind, else empty.
pub fn trailer_key(detail: &DetailRecord) -> String {
    let videos = &detail.videos.results;
    videos
        .iter()
        .find(|v| v.site == "YouTube" && v.kind == "Trailer")
        .or_else(|| videos.first())
        .map(|v| v.key.clone())
        .unwrap_or_default()
}

/// US certification (movies) or US content rating (TV), else `NR`.
pub fn certification(detail: &DetailRecord, media_type: MediaType) -> String {
    let found = match media_type {
        MediaType::Movie => detail
            .release_dates
            .results
            .iter()
            .find(|c| c.iso_3166_1 == "US")
            .and_then(|us| {
                us.release_dates
                    .iter()
                    .map(|r| r.certification.as_str())
                    .find(|c| !c.is_empty())
            }),
        MediaType::Tv => detail
            .content_ratings
            .results
            .iter()
            .find(|c| c.iso_3166_1 == "US")
            .map(|us| us.rating.as_str())
            .filter(|r| !r.is_empty()),
    };
    found.unwrap_or("NR").to_string()
}

fn poster_url(image_base: &str, path: Option<&str>) -> String {
    match path.filter(|p| !p.is_empty()) {
        Some(p) => format!("{image_base}/w500{p}"),
        None => POSTER_PLACEHOLDER.to_string(),
    }
}

fn genre_tags(detail: &DetailRecord) -> Markup {
    html! {
        @for genre in &detail.genres {
            span.genre-tag { (genre.name) }
        }
    }
}

fn cast_cards(detail: &DetailRecord, image_base: &str) -> Markup {
    html! {
        @for member in detail.credits.cast.iter().take(MAX_CAST_CARDS) {
            @let src = member
                .profile_path
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(|p| format!("{image_base}/w200{p}"))
                .unwrap_or_else(|| PROFILE_PLACEHOLDER.to_string());
            div.cast-card {
                img.cast-img src=(src);
                div.cast-name { (member.name) }
            }
        }
    }
}

fn analytics_snippet(id: &str) -> Markup {
    let init = format!(
        "window.dataLayer=window.dataLayer||[];function gtag(){{dataLayer.push(arguments);}}gtag('js',new Date());gtag('config','{id}');"
    );
    html! {
        script async src={ "https://www.googletagmanager.com/gtag/js?id=" (id) } {}
        script { (PreEscaped(init)) }
    }
}

/// schema.org block for rich results.
pub fn json_ld(
    detail: &DetailRecord,
    media_type: MediaType,
    title: &str,
    image_base: &str,
) -> String {
    let runtime = detail.runtime_minutes(media_type);
    let mut schema = json!({
        "@context": "https://schema.org",
        "@type": media_type.schema_type(),
        "name": title,
        "image": poster_url(image_base, detail.poster_path.as_deref()),
        "description": truncate_chars(detail.overview.as_deref().unwrap_or(""), 160),
        "datePublished": detail.published(media_type),
        "genre": detail.genres.iter().map(|g| g.name.as_str()).collect::<Vec<_>>(),
        "actor": detail
            .credits
            .cast
            .iter()
            .take(MAX_SCHEMA_ACTORS)
            .map(|c| json!({"@type": "Person", "name": c.name}))
            .collect::<Vec<_>>(),
        "aggregateRating": {
            "@type": "AggregateRating",
            "ratingValue": detail.vote_average,
            "bestRating": "10",
            "ratingCount": detail.vote_count.max(1),
        },
    });
    if runtime > 0 {
        schema["duration"] = json!(format!("PT{}H{}M", runtime / 60, runtime % 60));
    }
    schema.to_string()
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

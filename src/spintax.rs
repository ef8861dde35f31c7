//! Randomized promotional copy.
//!
//! Each page's overview is followed by one sentence picked at random from a
//! fixed set, plus an optional call to action linking the same slug on a
//! streaming site. Mirrors of the same title then differ in wording.
//!
//! Choices come from a caller-supplied [`fastrand::Rng`] so tests can seed it.

use crate::config::PromoConfig;
use crate::types::MediaType;

/// Inputs shared by every variant.
pub struct Blurb<'a> {
    pub title: &'a str,
    /// Domain of the page being written, without scheme.
    pub site: &'a str,
    /// Authority domain, without scheme.
    pub network: &'a str,
}

type Variant = fn(&Blurb) -> String;

const SEO_VARIANTS: [Variant; 20] = [
    |c| format!("Find complete details and reviews for <strong>{}</strong> on <strong>{}</strong>, part of the {} network.", c.title, c.site, c.network),
    |c| format!("Searching for <strong>{}</strong>? <strong>{}</strong> has it covered, as a member of the {} family.", c.title, c.site, c.network),
    |c| format!("Cast, synopsis and ratings for <strong>{}</strong>, brought to you by <strong>{}</strong> ({} network).", c.title, c.site, c.network),
    |c| format!("Trailers, updates and audience reviews for <strong>{}</strong> are here at <strong>{}</strong>, powered by {}.", c.title, c.site, c.network),
    |c| format!("Go deeper into <strong>{}</strong> with the full rundown on <strong>{}</strong>, a {} partner site.", c.title, c.site, c.network),
    |c| format!("Everything to know about <strong>{}</strong> before pressing play. Presented by <strong>{}</strong> ({}).", c.title, c.site, c.network),
    |c| format!("In-depth notes and community scores for <strong>{}</strong>, available on <strong>{}</strong> through the {} ecosystem.", c.title, c.site, c.network),
    |c| format!("Wondering what <strong>{}</strong> is about? <strong>{}</strong> has the answers, backed by {}.", c.title, c.site, c.network),
    |c| format!("Fans are exploring <strong>{}</strong> on <strong>{}</strong>, an official site of the {} network.", c.title, c.site, c.network),
    |c| format!("From cast to release date, <strong>{}</strong> is your guide to <strong>{}</strong>. Powered by {}.", c.site, c.title, c.network),
    |c| format!("Trivia, background and full reviews of <strong>{}</strong> at <strong>{}</strong> ({} group).", c.title, c.site, c.network),
    |c| format!("Make <strong>{}</strong> your stop for all things <strong>{}</strong>, proudly part of the {} family.", c.site, c.title, c.network),
    |c| format!("Top entertainment info on <strong>{}</strong> lives here at <strong>{}</strong>, backed by {}.", c.title, c.site, c.network),
    |c| format!("Catch our coverage of <strong>{}</strong> and read the full synopsis on <strong>{}</strong> ({} network).", c.title, c.site, c.network),
    |c| format!("Ratings, runtime or cast: <strong>{}</strong> covers <strong>{}</strong> completely. A {} affiliated site.", c.site, c.title, c.network),
    |c| format!("Get the full picture on <strong>{}</strong> today, hosted on <strong>{}</strong> within the {} media group.", c.title, c.site, c.network),
    |c| format!("The latest reviews for <strong>{}</strong> from the team at <strong>{}</strong> (a {} company).", c.title, c.site, c.network),
    |c| format!("Is <strong>{}</strong> worth watching? Find out on <strong>{}</strong>, powered by {}.", c.title, c.site, c.network),
    |c| format!("Your search for <strong>{}</strong> ends here, with a complete overview from <strong>{}</strong> and the {} network.", c.title, c.site, c.network),
    |c| format!("Posters, synopses and metadata for <strong>{}</strong> at <strong>{}</strong>, brought to you by {}.", c.title, c.site, c.network),
];

const CTA_VARIANTS: [fn(&str, &str, &str) -> String; 5] = [
    |title, href, name| format!("Ready to watch? Stream <strong>{title}</strong> now on <a href='{href}' target='_blank' rel='dofollow'><strong>{name}</strong></a>."),
    |title, href, name| format!("Want the full feature? Watch <strong>{title}</strong> in high quality at <a href='{href}' target='_blank' rel='dofollow'><strong>{name}</strong></a>."),
    |title, href, name| format!("Skip the reading and see it: <strong>{title}</strong> is online at <a href='{href}' target='_blank' rel='dofollow'><strong>{name}</strong></a>."),
    |title, href, name| format!("Grab some popcorn and head to <a href='{href}' target='_blank' rel='dofollow'><strong>{name}</strong></a> to enjoy <strong>{title}</strong> today."),
    |title, href, name| format!("Looking for the full movie or episode? Start streaming <strong>{title}</strong> on <a href='{href}' target='_blank' rel='dofollow'><strong>{name}</strong></a>."),
];

/// One promotional sentence, plus a call to action when a promo domain is set.
pub fn promo_paragraph(
    rng: &mut fastrand::Rng,
    blurb: &Blurb,
    promo: &PromoConfig,
    media_type: MediaType,
    slug: &str,
) -> String {
    let seo = SEO_VARIANTS[rng.usize(..SEO_VARIANTS.len())](blurb);
    if promo.domain.is_empty() {
        return seo;
    }
    let href = format!(
        "{}/{}/{}.html",
        promo.domain.trim_end_matches('/'),
        media_type.folder(),
        slug
    );
    let name = if promo.name.is_empty() {
        promo.domain.as_str()
    } else {
        promo.name.as_str()
    };
    let cta = CTA_VARIANTS[rng.usize(..CTA_VARIANTS.len())](blurb.title, &href, name);
    format!("{seo} {cta}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blurb() -> Blurb<'static> {
        Blurb {
            title: "Dune",
            site: "mirror.test",
            network: "king.test",
        }
    }

    #[test]
    fn every_seo_variant_mentions_title_and_domains() {
        for variant in SEO_VARIANTS {
            let text = variant(&blurb());
            assert!(text.contains("<strong>Dune</strong>"), "{text}");
            assert!(text.contains("mirror.test"), "{text}");
            assert!(text.contains("king.test"), "{text}");
        }
    }

    #[test]
    fn no_cta_without_promo_domain() {
        let mut rng = fastrand::Rng::with_seed(7);
        let text = promo_paragraph(
            &mut rng,
            &blurb(),
            &PromoConfig::default(),
            MediaType::Movie,
            "dune-2021",
        );
        assert!(!text.contains("<a href"));
    }

    #[test]
    fn cta_links_same_slug_on_promo_site() {
        let mut rng = fastrand::Rng::with_seed(7);
        let promo = PromoConfig {
            domain: "https://stream.test/".into(),
            name: "StreamSite".into(),
        };
        let text = promo_paragraph(&mut rng, &blurb(), &promo, MediaType::Tv, "dune-2021");
        assert!(text.contains("href='https://stream.test/tvshows/dune-2021.html'"));
        assert!(text.contains("<strong>StreamSite</strong>"));
    }

    #[test]
    fn same_seed_same_copy() {
        let promo = PromoConfig::default();
        let a = promo_paragraph(
            &mut fastrand::Rng::with_seed(1),
            &blurb(),
            &promo,
            MediaType::Movie,
            "s",
        );
        let b = promo_paragraph(
            &mut fastrand::Rng::with_seed(1),
            &blurb(),
            &promo,
            MediaType::Movie,
            "s",
        );
        assert_eq!(a, b);
    }
}

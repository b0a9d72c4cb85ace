//! Signal-count tiered checks. Each analyzer declares a list of boolean
//! detectors; severity is a monotonic function of how many fired, never of
//! any single signal. The tiering itself lives in one shared helper.

use crate::analyzers::links::classify_links;
use crate::context::AnalyzeContext;
use crate::verdict::{Severity, Verdict};
use serde_json::json;

pub struct Signal {
    pub name: &'static str,
    pub fired: bool,
    pub issue: String,
    pub recommendation: String,
}

impl Signal {
    fn new(
        name: &'static str,
        fired: bool,
        issue: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            name,
            fired,
            issue: issue.into(),
            recommendation: recommendation.into(),
        }
    }
}

/// Map a detector list to a tiered verdict: below `warn_at` fired signals is
/// a fail, below `pass_at` a warning, at or above `pass_at` a pass. Every
/// fired signal contributes an issue line, every missing one a targeted
/// recommendation.
pub fn tiered_verdict(topic: &str, signals: Vec<Signal>, warn_at: usize, pass_at: usize) -> Verdict {
    let fired: Vec<&Signal> = signals.iter().filter(|s| s.fired).collect();
    let count = fired.len();

    let severity = if count >= pass_at {
        Severity::Pass
    } else if count >= warn_at {
        Severity::Warning
    } else {
        Severity::Fail
    };

    let issues = if fired.is_empty() {
        vec![format!("No {} signals detected on the page", topic)]
    } else {
        let mut lines = vec![format!(
            "{} of {} {} signals detected",
            count,
            signals.len(),
            topic
        )];
        lines.extend(fired.iter().map(|s| s.issue.clone()));
        lines
    };

    let recommendations = signals
        .iter()
        .filter(|s| !s.fired)
        .map(|s| s.recommendation.clone())
        .collect();

    let fired_names: Vec<&str> = fired.iter().map(|s| s.name).collect();
    Verdict {
        severity,
        issues,
        recommendations,
        details: json!({
            "signals_fired": count,
            "signals_total": signals.len(),
            "fired": fired_names,
        }),
    }
}

fn jsonld_mentions(ctx: &AnalyzeContext, needle: &str) -> bool {
    ctx.doc
        .select(r#"script[type="application/ld+json"]"#)
        .iter()
        .any(|el| el.inner_html().contains(needle))
}

/// Answer-engine optimization: content shaped so assistants can lift direct
/// answers out of the page.
pub fn aeo(ctx: &AnalyzeContext) -> Verdict {
    let question_headings = ctx
        .doc
        .headings()
        .iter()
        .any(|(level, text)| (2..=3).contains(level) && text.trim_end().ends_with('?'));
    let paragraphs = ctx.doc.select("p");
    let concise_paragraphs = paragraphs
        .iter()
        .filter(|el| {
            let len = crate::document::element_text(**el).chars().count();
            (40..=300).contains(&len)
        })
        .count()
        >= 2;

    let signals = vec![
        Signal::new(
            "faq_schema",
            jsonld_mentions(ctx, "FAQPage"),
            "FAQPage structured data is present",
            "Add FAQPage structured data for question-and-answer content",
        ),
        Signal::new(
            "howto_schema",
            jsonld_mentions(ctx, "HowTo"),
            "HowTo structured data is present",
            "Mark up step-by-step content with HowTo schema",
        ),
        Signal::new(
            "question_headings",
            question_headings,
            "Headings phrased as questions were found",
            "Phrase section headings as the questions users actually ask",
        ),
        Signal::new(
            "lists",
            !ctx.doc.select("ol, ul").is_empty(),
            "List markup is present",
            "Use ordered/unordered lists; they are easy for engines to quote",
        ),
        Signal::new(
            "tables",
            !ctx.doc.select("table").is_empty(),
            "Tabular data is present",
            "Present comparable facts in tables",
        ),
        Signal::new(
            "definitions",
            !ctx.doc.select("dl").is_empty(),
            "Definition list markup is present",
            "Use definition lists for term/definition pairs",
        ),
        Signal::new(
            "concise_answers",
            concise_paragraphs,
            "Concise answer-sized paragraphs were found",
            "Open sections with a 40-300 character direct answer",
        ),
    ];

    tiered_verdict("answer-engine optimization", signals, 2, 4)
}

/// Generative-engine optimization: trust and citability markers that make
/// content quotable by generative engines.
pub fn geo(ctx: &AnalyzeContext) -> Verdict {
    let text = ctx.doc.visible_text();
    let numeric_tokens = text
        .split_whitespace()
        .filter(|w| w.chars().any(|c| c.is_ascii_digit()))
        .count();
    let authority_phrases = ["according to", "study", "research", "survey", "report"]
        .iter()
        .any(|phrase| text.to_lowercase().contains(phrase));
    let audit = classify_links(ctx);

    let signals = vec![
        Signal::new(
            "statistics",
            numeric_tokens >= 3,
            "Numeric data points are present in the copy",
            "Back claims with concrete numbers; generative engines prefer citable figures",
        ),
        Signal::new(
            "citations",
            audit.external_count >= 3,
            "Multiple external citations are present",
            "Cite at least three authoritative external sources",
        ),
        Signal::new(
            "quotes",
            !ctx.doc.select("blockquote, q").is_empty(),
            "Quote markup is present",
            "Quote primary sources with <blockquote>",
        ),
        Signal::new(
            "author",
            ctx.doc.meta_content("author").is_some()
                || !ctx.doc.select(r#"[rel="author"]"#).is_empty(),
            "Author attribution is present",
            "Attribute the content to a named author",
        ),
        Signal::new(
            "dates",
            !ctx.doc.select("time[datetime]").is_empty()
                || ctx.doc.meta_property("article:published_time").is_some(),
            "Machine-readable publication dates are present",
            "Add <time datetime> or article:published_time metadata",
        ),
        Signal::new(
            "authority_language",
            authority_phrases,
            "Research-backed language was found",
            "Reference studies or reports to signal sourced content",
        ),
        Signal::new(
            "article_schema",
            jsonld_mentions(ctx, "Article"),
            "Article structured data is present",
            "Wrap editorial content in Article schema",
        ),
    ];

    tiered_verdict("generative-engine optimization", signals, 2, 4)
}

/// Template-scale SEO hygiene for pages generated from data.
pub fn programmatic_seo(ctx: &AnalyzeContext) -> Verdict {
    let audit = classify_links(ctx);
    let path_depth = ctx.url.path().split('/').filter(|s| !s.is_empty()).count();
    let pagination = !ctx
        .doc
        .select(r#"link[rel="next"], link[rel="prev"], a[rel="next"], a[rel="prev"]"#)
        .is_empty();

    let signals = vec![
        Signal::new(
            "canonical",
            !ctx.doc.select(r#"link[rel="canonical"]"#).is_empty(),
            "Canonical URL is declared",
            "Declare canonicals; template pages multiply duplicate-URL risk",
        ),
        Signal::new(
            "structured_data",
            !ctx.doc
                .select(r#"script[type="application/ld+json"]"#)
                .is_empty(),
            "Structured data is present",
            "Emit structured data from the page template",
        ),
        Signal::new(
            "breadcrumb_trail",
            jsonld_mentions(ctx, "BreadcrumbList"),
            "BreadcrumbList schema is present",
            "Add BreadcrumbList schema so hierarchy survives in results",
        ),
        Signal::new(
            "pagination_links",
            pagination,
            "Pagination link relations are present",
            "Expose rel=next/prev style pagination links on listing pages",
        ),
        Signal::new(
            "hierarchical_url",
            path_depth >= 2,
            "URL follows a hierarchical template pattern",
            "Use hierarchical URL patterns (e.g. /category/item)",
        ),
        Signal::new(
            "internal_linking",
            audit.internal_count >= 10,
            "Dense internal linking is present",
            "Cross-link related generated pages (10+ internal links)",
        ),
        Signal::new(
            "meta_description",
            ctx.doc.meta_content("description").is_some(),
            "Template emits meta descriptions",
            "Generate a unique meta description per templated page",
        ),
    ];

    tiered_verdict("programmatic SEO", signals, 2, 4)
}

/// Readiness for AI-driven search surfaces.
pub fn ai_search_visibility(ctx: &AnalyzeContext) -> Verdict {
    let headings = ctx.doc.headings();
    let clear_outline = headings.iter().any(|(l, _)| *l == 1)
        && headings.iter().filter(|(l, _)| *l == 2).count() >= 2;
    let robots_open = match &ctx.ancillary.robots_txt {
        // No robots.txt means nothing is blocked.
        None => true,
        Some(robots) => super::ancillary::blocked_ai_bots(robots).is_empty(),
    };

    let signals = vec![
        Signal::new(
            "llms_txt",
            ctx.ancillary.llms.llms_txt.is_some(),
            "/llms.txt is published",
            "Publish /llms.txt to guide AI assistants through the site",
        ),
        Signal::new(
            "ai_crawlers_allowed",
            robots_open,
            "No AI crawlers are blocked in robots.txt",
            "Unblock AI crawlers in robots.txt to appear in AI search",
        ),
        Signal::new(
            "structured_data",
            !ctx.doc
                .select(r#"script[type="application/ld+json"]"#)
                .is_empty(),
            "Structured data is present",
            "Add JSON-LD so AI surfaces can ground answers in your entities",
        ),
        Signal::new(
            "semantic_html",
            !ctx.doc.select("article, main, section").is_empty(),
            "Semantic HTML5 landmarks are present",
            "Use <main>/<article>/<section> landmarks instead of generic divs",
        ),
        Signal::new(
            "meta_description",
            ctx.doc.meta_content("description").is_some(),
            "Meta description is present",
            "Provide a meta description AI surfaces can fall back on",
        ),
        Signal::new(
            "clear_outline",
            clear_outline,
            "A clear H1/H2 outline is present",
            "Give the page one H1 and several H2 sections",
        ),
        Signal::new(
            "open_graph",
            ctx.doc.meta_property("og:title").is_some(),
            "Open Graph metadata is present",
            "Add Open Graph tags; AI answer cards reuse them",
        ),
    ];

    tiered_verdict("AI search visibility", signals, 2, 4)
}

/// Local-business discovery signals.
pub fn local_seo(ctx: &AnalyzeContext) -> Verdict {
    let text = ctx.doc.visible_text();
    let has_phone = !ctx.doc.select(r#"a[href^="tel:"]"#).is_empty()
        || text
            .split_whitespace()
            .any(|w| w.chars().filter(|c| c.is_ascii_digit()).count() >= 7);
    let map_embed = ctx.doc.select("iframe[src]").iter().any(|el| {
        let src = el.value().attr("src").unwrap_or_default().to_lowercase();
        src.contains("google.com/maps") || src.contains("maps.google")
    });

    let signals = vec![
        Signal::new(
            "local_business_schema",
            jsonld_mentions(ctx, "LocalBusiness"),
            "LocalBusiness structured data is present",
            "Add LocalBusiness schema with name, address and phone",
        ),
        Signal::new(
            "address",
            !ctx.doc.select("address").is_empty() || jsonld_mentions(ctx, "PostalAddress"),
            "A postal address is marked up",
            "Mark the address up with <address> or PostalAddress schema",
        ),
        Signal::new(
            "phone",
            has_phone,
            "A phone number is present",
            "List a phone number, ideally as a tel: link",
        ),
        Signal::new(
            "map_embed",
            map_embed,
            "An embedded map is present",
            "Embed a map of the business location",
        ),
        Signal::new(
            "opening_hours",
            jsonld_mentions(ctx, "openingHours")
                || text.to_lowercase().contains("opening hours"),
            "Opening hours are published",
            "Publish opening hours, ideally as openingHours schema",
        ),
        Signal::new(
            "geo_metadata",
            ctx.doc.meta_content("geo.position").is_some()
                || ctx.doc.meta_content("ICBM").is_some(),
            "Geographic position metadata is present",
            "Add geo.position/ICBM meta tags with the business coordinates",
        ),
    ];

    tiered_verdict("local SEO", signals, 2, 4)
}

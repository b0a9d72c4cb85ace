//! The rule engine: ~45 stateless checks, each a pure function from the
//! analysis context to a [`Verdict`]. Checks are independent and
//! order-insensitive; the registry below is the single source of truth for
//! the fixed set of check names.

pub mod ancillary;
pub mod content;
pub mod links;
pub mod meta;
pub mod signals;
pub mod technical;

use crate::context::AnalyzeContext;
use crate::verdict::Verdict;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use tracing::error;

type Check = fn(&AnalyzeContext) -> Verdict;

/// Fixed registry of every check, keyed by report name.
pub const CHECKS: &[(&str, Check)] = &[
    ("title", meta::title),
    ("meta_description", meta::meta_description),
    ("meta_keywords", meta::meta_keywords),
    ("h1", content::h1),
    ("heading_hierarchy", content::heading_hierarchy),
    ("images_alt", content::images_alt),
    ("links", links::links),
    ("canonical", meta::canonical),
    ("robots_meta", meta::robots_meta),
    ("viewport", meta::viewport),
    ("charset", meta::charset),
    ("doctype", meta::doctype),
    ("html_lang", meta::html_lang),
    ("favicon", meta::favicon),
    ("open_graph", meta::open_graph),
    ("twitter_cards", meta::twitter_cards),
    ("structured_data", technical::structured_data),
    ("html_size", technical::html_size),
    ("server_response", technical::server_response),
    ("compression", technical::compression),
    ("word_count", content::word_count),
    ("keyword_density", content::keyword_density),
    ("url_structure", technical::url_structure),
    ("https", technical::https),
    ("mixed_content", technical::mixed_content),
    ("inline_scripts", technical::inline_scripts),
    ("deprecated_tags", technical::deprecated_tags),
    ("text_html_ratio", content::text_html_ratio),
    ("iframes", technical::iframes),
    ("sitemap", ancillary::sitemap),
    ("ai_crawler_access", ancillary::ai_crawler_access),
    ("llms_txt", ancillary::llms_txt),
    ("performance", ancillary::performance),
    ("cdn_usage", technical::cdn_usage),
    ("https_redirect", ancillary::https_redirect),
    ("hreflang", meta::hreflang),
    ("aeo", signals::aeo),
    ("geo", signals::geo),
    ("programmatic_seo", signals::programmatic_seo),
    ("ai_search_visibility", signals::ai_search_visibility),
    ("local_seo", signals::local_seo),
    ("social_links", links::social_links),
    ("render_blocking", technical::render_blocking),
    ("lazy_loading", technical::lazy_loading),
    ("breadcrumbs", content::breadcrumbs),
];

/// Run every check against the context. No analyzer may abort the batch:
/// a panicking check is converted to a fail verdict and the rest continue.
pub fn run_all(ctx: &AnalyzeContext) -> BTreeMap<String, Verdict> {
    let mut results = BTreeMap::new();

    for (name, check) in CHECKS {
        let verdict = match std::panic::catch_unwind(AssertUnwindSafe(|| check(ctx))) {
            Ok(verdict) => verdict,
            Err(_) => {
                error!("Check '{}' panicked on this document", name);
                Verdict::fail(format!(
                    "The '{}' check could not be evaluated on this document",
                    name
                ))
            }
        };
        results.insert((*name).to_string(), verdict);
    }

    results
}

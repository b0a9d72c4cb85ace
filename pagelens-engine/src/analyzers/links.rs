//! Anchor classification: internal/external split, nofollow tallies and
//! social profile detection.

use crate::context::AnalyzeContext;
use crate::tables;
use crate::verdict::Verdict;
use serde_json::json;
use std::collections::HashSet;
use url::Url;

/// Returned lists are deduplicated by resolved target and capped at 50;
/// the counts and the social-platform labels are taken over the full
/// deduplicated sets.
pub struct LinkAudit {
    pub internal: Vec<String>,
    pub external: Vec<String>,
    pub internal_count: usize,
    pub external_count: usize,
    pub nofollow_count: usize,
    pub social: Vec<&'static str>,
}

const LIST_CAP: usize = 50;

pub fn classify_links(ctx: &AnalyzeContext) -> LinkAudit {
    let base_host = ctx.url.host_str().unwrap_or_default().to_string();

    let mut internal = Vec::new();
    let mut external = Vec::new();
    let mut social = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut nofollow_count = 0usize;

    for anchor in ctx.doc.select("a[href]") {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(resolved) = resolve_href(ctx.url, href) else {
            continue;
        };

        // nofollow tally is taken over anchors, before deduplication
        if anchor
            .value()
            .attr("rel")
            .map(|rel| rel.to_lowercase().contains("nofollow"))
            .unwrap_or(false)
        {
            nofollow_count += 1;
        }

        if !seen.insert(resolved.to_string()) {
            continue;
        }

        if is_internal(&resolved, &base_host) {
            internal.push(resolved.to_string());
        } else if matches!(resolved.scheme(), "http" | "https") {
            if let Some(platform) =
                tables::match_domain_table(resolved.as_str(), tables::SOCIAL_DOMAINS)
            {
                social.push(platform);
            }
            external.push(resolved.to_string());
        }
    }

    let internal_count = internal.len();
    let external_count = external.len();
    internal.truncate(LIST_CAP);
    external.truncate(LIST_CAP);
    social.sort_unstable();
    social.dedup();

    LinkAudit {
        internal,
        external,
        internal_count,
        external_count,
        nofollow_count,
        social,
    }
}

pub fn links(ctx: &AnalyzeContext) -> Verdict {
    let audit = classify_links(ctx);
    let total = audit.internal_count + audit.external_count;

    let details = json!({
        "internal": audit.internal,
        "external": audit.external,
        "internal_count": audit.internal_count,
        "external_count": audit.external_count,
        "nofollow_count": audit.nofollow_count,
    });

    if total == 0 {
        return Verdict::fail("No links found on the page")
            .recommend("Add internal links so crawlers can discover related pages")
            .with_details(details);
    }

    let mut verdict = if audit.internal_count == 0 {
        Verdict::warning(format!(
            "No internal links among {} total links",
            total
        ))
        .recommend("Link to related pages on the same site to distribute authority")
    } else {
        Verdict::pass(format!(
            "{} internal and {} external links found",
            audit.internal_count, audit.external_count
        ))
    };

    if audit.external_count == 0 {
        verdict = verdict
            .recommend("Consider citing a few authoritative external sources");
    }

    verdict.with_details(details)
}

pub fn social_links(ctx: &AnalyzeContext) -> Verdict {
    let audit = classify_links(ctx);
    let platforms = &audit.social;

    if platforms.is_empty() {
        Verdict::warning("No social profile links detected")
            .recommend("Link your social profiles; they reinforce entity signals for your brand")
    } else {
        Verdict::pass(format!(
            "Social profiles linked: {}",
            platforms.join(", ")
        ))
        .with_details(json!({ "platforms": platforms }))
    }
}

/// Resolve an href against the page URL, dropping fragments and non-page
/// schemes (mailto:, tel:, javascript:) as well as bare fragments.
fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let trimmed = href.trim();
    if trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("javascript:")
        || trimmed.starts_with("mailto:")
        || trimmed.starts_with("tel:")
    {
        return None;
    }

    let mut resolved = base.join(trimmed).ok()?;
    resolved.set_fragment(None);
    Some(resolved)
}

/// Internal means the same hostname or a subdomain of it.
fn is_internal(url: &Url, base_host: &str) -> bool {
    if base_host.is_empty() {
        return false;
    }
    url.host_str()
        .map(|host| host == base_host || host.ends_with(&format!(".{}", base_host)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::fetch::FetchResult;
    use crate::probes::AncillaryData;
    use crate::verdict::Severity;
    use std::collections::BTreeMap;

    fn ctx_parts(html: &str) -> (Document, Url, FetchResult, AncillaryData) {
        (
            Document::parse(html),
            Url::parse("https://example.com/").unwrap(),
            FetchResult {
                url: "https://example.com/".to_string(),
                status: 200,
                headers: BTreeMap::new(),
                body: html.to_string(),
                elapsed_ms: 100,
                byte_length: html.len(),
            },
            AncillaryData::empty(),
        )
    }

    macro_rules! with_ctx {
        ($html:expr, $ctx:ident, $body:block) => {{
            let (doc, url, fetch, ancillary) = ctx_parts($html);
            let $ctx = AnalyzeContext {
                doc: &doc,
                url: &url,
                fetch: &fetch,
                ancillary: &ancillary,
            };
            $body
        }};
    }

    #[test]
    fn test_classification_against_base() {
        let html = r#"<body>
            <a href="/about">About</a>
            <a href="https://sub.example.com/x">Sub</a>
            <a href="https://other.com">Other</a>
        </body>"#;
        with_ctx!(html, ctx, {
            let audit = classify_links(&ctx);
            assert_eq!(audit.internal, vec![
                "https://example.com/about".to_string(),
                "https://sub.example.com/x".to_string(),
            ]);
            assert_eq!(audit.external, vec!["https://other.com/".to_string()]);
        });
    }

    #[test]
    fn test_non_page_schemes_skipped() {
        let html = r##"<body>
            <a href="mailto:a@b.com">mail</a>
            <a href="tel:+123">tel</a>
            <a href="javascript:void(0)">js</a>
            <a href="#section">frag</a>
        </body>"##;
        with_ctx!(html, ctx, {
            let audit = classify_links(&ctx);
            assert_eq!(audit.internal_count + audit.external_count, 0);
        });
    }

    #[test]
    fn test_dedupe_by_resolved_target() {
        let html = r#"<body>
            <a href="/about">a</a>
            <a href="/about#team">b</a>
            <a href="https://example.com/about">c</a>
        </body>"#;
        with_ctx!(html, ctx, {
            let audit = classify_links(&ctx);
            assert_eq!(audit.internal_count, 1);
        });
    }

    #[test]
    fn test_counts_uncapped_list_capped() {
        let mut html = String::from("<body>");
        for i in 0..60 {
            html.push_str(&format!(r#"<a href="/page{}">p</a>"#, i));
        }
        html.push_str("</body>");
        with_ctx!(&html, ctx, {
            let audit = classify_links(&ctx);
            assert_eq!(audit.internal_count, 60);
            assert_eq!(audit.internal.len(), 50);
        });
    }

    #[test]
    fn test_nofollow_tally() {
        let html = r#"<body>
            <a href="/a" rel="nofollow">a</a>
            <a href="/a" rel="nofollow">duplicate target still tallies</a>
            <a href="/b">b</a>
        </body>"#;
        with_ctx!(html, ctx, {
            let audit = classify_links(&ctx);
            assert_eq!(audit.nofollow_count, 2);
            assert_eq!(audit.internal_count, 2);
        });
    }

    #[test]
    fn test_no_links_fails(){
        with_ctx!("<body><p>nothing</p></body>", ctx, {
            assert_eq!(links(&ctx).severity, Severity::Fail);
        });
    }

    #[test]
    fn test_social_links_detected_past_list_cap() {
        let mut html = String::from("<body>");
        for i in 0..55 {
            html.push_str(&format!(r#"<a href="https://ext{}.com/">e</a>"#, i));
        }
        html.push_str(r#"<a href="https://twitter.com/example">t</a></body>"#);
        with_ctx!(&html, ctx, {
            let audit = classify_links(&ctx);
            assert_eq!(audit.external.len(), 50);
            assert_eq!(audit.social, vec!["Twitter/X"]);
            assert_eq!(social_links(&ctx).severity, Severity::Pass);
        });
    }

    #[test]
    fn test_social_links_detected() {
        let html = r#"<body>
            <a href="https://twitter.com/example">t</a>
            <a href="https://www.linkedin.com/company/example">l</a>
        </body>"#;
        with_ctx!(html, ctx, {
            let v = social_links(&ctx);
            assert_eq!(v.severity, Severity::Pass);
            assert!(v.issues[0].contains("LinkedIn"));
        });
    }
}

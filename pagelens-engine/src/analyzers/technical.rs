//! Technical checks: transfer size and timing, transport security, markup
//! hygiene and structured data.

use crate::context::AnalyzeContext;
use crate::tables;
use crate::verdict::{Severity, Verdict};
use serde_json::json;

const KB: usize = 1024;

pub fn html_size(ctx: &AnalyzeContext) -> Verdict {
    let bytes = ctx.fetch.byte_length;
    let kb = bytes as f64 / KB as f64;

    let verdict = if bytes <= 33 * KB {
        Verdict::pass(format!("HTML size is excellent ({:.0} KB)", kb))
    } else if bytes <= 100 * KB {
        Verdict::pass(format!("HTML size is good ({:.0} KB)", kb))
    } else if bytes <= 250 * KB {
        Verdict::warning(format!("HTML document is large ({:.0} KB)", kb))
            .recommend("Trim inline scripts/styles or defer non-critical markup")
    } else if bytes <= 500 * KB {
        Verdict::warning(format!("HTML document is very large ({:.0} KB)", kb))
            .recommend("Documents over 250 KB slow parsing noticeably; split or slim the page")
    } else {
        Verdict::fail(format!("HTML document is excessive ({:.0} KB)", kb))
            .recommend("Documents over 500 KB risk partial indexing; restructure the page")
    };

    verdict.with_details(json!({ "bytes": bytes }))
}

pub fn server_response(ctx: &AnalyzeContext) -> Verdict {
    let ms = ctx.fetch.elapsed_ms;

    let verdict = if ms < 1000 {
        Verdict::pass(format!("Server responded in {} ms", ms))
    } else if ms <= 3000 {
        Verdict::warning(format!("Server response is slow ({} ms)", ms))
            .recommend("Aim for under 1000 ms; look at caching and server rendering time")
    } else {
        Verdict::fail(format!("Server response is very slow ({} ms)", ms))
            .recommend("Responses over 3 seconds actively hurt ranking and abandonment")
    };

    verdict.with_details(json!({ "elapsed_ms": ms }))
}

pub fn compression(ctx: &AnalyzeContext) -> Verdict {
    match ctx.header("content-encoding") {
        Some(encoding) => {
            Verdict::pass(format!("Response is compressed ({})", encoding))
                .with_details(json!({ "content_encoding": encoding }))
        }
        None => Verdict::warning("No compression detected on the HTML response")
            .recommend("Enable gzip or brotli compression on the web server"),
    }
}

pub fn url_structure(ctx: &AnalyzeContext) -> Verdict {
    let path = ctx.url.path();
    let mut issues = Vec::new();

    if path.len() > 100 {
        issues.push(format!("URL path is long ({} characters)", path.len()));
    }
    if path.chars().any(|c| c.is_ascii_uppercase()) {
        issues.push("URL path contains uppercase characters".to_string());
    }
    if path.contains('_') {
        issues.push("URL path uses underscores instead of hyphens".to_string());
    }

    let depth = path.split('/').filter(|s| !s.is_empty()).count();
    if depth > 5 {
        issues.push(format!("URL is deeply nested ({} path segments)", depth));
    }

    let param_count = ctx.url.query_pairs().count();
    if param_count > 3 {
        issues.push(format!("URL carries {} query parameters", param_count));
    }

    Verdict::from_issues(Severity::Warning, issues, "URL structure is clean")
        .with_details(json!({ "path": path, "depth": depth, "query_params": param_count }))
}

pub fn https(ctx: &AnalyzeContext) -> Verdict {
    if ctx.url.scheme() == "https" {
        Verdict::pass("Page is served over HTTPS")
    } else {
        Verdict::fail("Page is served over plain HTTP")
            .recommend("Serve the site over HTTPS and redirect all HTTP traffic")
    }
}

pub fn mixed_content(ctx: &AnalyzeContext) -> Verdict {
    if ctx.url.scheme() != "https" {
        return Verdict::warning("Page is not on HTTPS; mixed-content check not applicable")
            .recommend("Move the page to HTTPS first");
    }

    let mut insecure = Vec::new();
    for el in ctx
        .doc
        .select("img[src], script[src], iframe[src], video[src], audio[src], source[src], link[href]")
    {
        let value = el
            .value()
            .attr("src")
            .or_else(|| el.value().attr("href"))
            .unwrap_or_default();
        if value.starts_with("http://") {
            insecure.push(format!("<{}> loads {}", el.value().name(), value));
        }
    }

    if insecure.is_empty() {
        return Verdict::pass("No mixed-content resources found");
    }

    let count = insecure.len();
    insecure.truncate(10);
    let mut verdict = Verdict::new(
        Severity::Fail,
        format!("{} resources are loaded over insecure HTTP", count),
    );
    for line in insecure {
        verdict = verdict.issue(line);
    }
    verdict.recommend("Browsers block mixed content; switch these resources to https:// URLs")
}

pub fn inline_scripts(ctx: &AnalyzeContext) -> Verdict {
    let inline: Vec<String> = ctx
        .doc
        .select("script")
        .iter()
        .filter(|el| el.value().attr("src").is_none())
        .map(|el| el.inner_html())
        .collect();

    let count = inline.len();
    let total_bytes: usize = inline.iter().map(String::len).sum();
    let uses_document_write = ctx.raw_html().contains("document.write(");

    let mut issues = Vec::new();
    if count > 15 {
        issues.push(format!("{} inline script blocks on the page", count));
    }
    if total_bytes > 20 * KB {
        issues.push(format!(
            "Inline scripts total {} KB of markup",
            total_bytes / KB
        ));
    }
    if uses_document_write {
        issues.push("document.write() found in page scripts".to_string());
    }

    let verdict = if count == 0 {
        Verdict::pass("No inline scripts on the page")
    } else {
        Verdict::from_issues(
            Severity::Warning,
            issues,
            format!("Inline script usage is moderate ({} blocks)", count),
        )
        .recommend("Move large scripts to external files so the HTML stays lean and cacheable")
    };

    verdict.with_details(json!({
        "inline_blocks": count,
        "inline_bytes": total_bytes,
        "document_write": uses_document_write
    }))
}

pub fn deprecated_tags(ctx: &AnalyzeContext) -> Verdict {
    let mut found = Vec::new();
    for tag in tables::DEPRECATED_TAGS {
        let count = ctx.doc.count(tag);
        if count > 0 {
            found.push((*tag, count));
        }
    }

    if found.is_empty() {
        return Verdict::pass("No deprecated HTML tags in use");
    }

    let listing: Vec<String> = found
        .iter()
        .map(|(tag, count)| format!("<{}> used {} times", tag, count))
        .collect();
    let mut verdict = Verdict::new(
        Severity::Warning,
        format!("{} deprecated tag types found", found.len()),
    );
    for line in listing {
        verdict = verdict.issue(line);
    }
    verdict
        .recommend("Replace deprecated tags with CSS-styled semantic equivalents")
        .with_details(json!({
            "tags": found.iter().map(|(t, c)| json!({"tag": t, "count": c})).collect::<Vec<_>>()
        }))
}

pub fn iframes(ctx: &AnalyzeContext) -> Verdict {
    let frames = ctx.doc.select("iframe");

    if frames.is_empty() {
        return Verdict::pass("No iframes on the page");
    }

    let untitled = frames
        .iter()
        .filter(|el| el.value().attr("title").map(str::trim).filter(|t| !t.is_empty()).is_none())
        .count();

    let mut verdict = Verdict::warning(format!(
        "{} iframes found; iframe content is not indexed as part of this page",
        frames.len()
    ));
    if untitled > 0 {
        verdict = verdict.issue(format!("{} iframes are missing a title attribute", untitled));
    }
    verdict
        .recommend("Keep important content in the page itself rather than inside iframes")
        .with_details(json!({ "count": frames.len(), "untitled": untitled }))
}

pub fn structured_data(ctx: &AnalyzeContext) -> Verdict {
    let blocks = ctx.doc.select(r#"script[type="application/ld+json"]"#);

    if blocks.is_empty() {
        return Verdict::warning("No JSON-LD structured data found")
            .recommend("Add schema.org JSON-LD so engines can interpret the page entity");
    }

    let mut types = Vec::new();
    let mut invalid = 0usize;
    // Each block parses independently; one bad block never hides the others.
    for block in &blocks {
        match serde_json::from_str::<serde_json::Value>(&block.inner_html()) {
            Ok(value) => types.push(schema_type(&value)),
            Err(_) => {
                types.push("Invalid JSON".to_string());
                invalid += 1;
            }
        }
    }

    let details = json!({ "blocks": blocks.len(), "types": types });
    if invalid > 0 {
        Verdict::warning(format!(
            "{} of {} JSON-LD blocks failed to parse",
            invalid,
            blocks.len()
        ))
        .recommend("Validate the JSON-LD blocks; invalid JSON is silently ignored by crawlers")
        .with_details(details)
    } else {
        Verdict::pass(format!("Structured data present: {}", types.join(", ")))
            .with_details(details)
    }
}

fn schema_type(value: &serde_json::Value) -> String {
    match value.get("@type") {
        Some(serde_json::Value::String(t)) => t.clone(),
        Some(serde_json::Value::Array(items)) => items
            .first()
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
            .to_string(),
        _ if value.get("@graph").is_some() => "Graph".to_string(),
        _ => "Unknown".to_string(),
    }
}

pub fn cdn_usage(ctx: &AnalyzeContext) -> Verdict {
    let mut providers = Vec::new();

    for el in ctx.doc.select("script[src], link[href], img[src]") {
        let value = el
            .value()
            .attr("src")
            .or_else(|| el.value().attr("href"))
            .unwrap_or_default();
        if let Some(provider) = tables::match_domain_table(value, tables::CDN_DOMAINS) {
            providers.push(provider);
        }
    }
    if let Some(server) = ctx.header("server")
        && let Some(provider) = tables::match_domain_table(server, tables::CDN_DOMAINS)
    {
        providers.push(provider);
    }

    providers.sort_unstable();
    providers.dedup();

    if providers.is_empty() {
        Verdict::warning("No CDN usage detected")
            .recommend("Serving static assets through a CDN improves global load times")
    } else {
        Verdict::pass(format!("CDN detected: {}", providers.join(", ")))
            .with_details(json!({ "providers": providers }))
    }
}

pub fn render_blocking(ctx: &AnalyzeContext) -> Verdict {
    let blocking_scripts = ctx
        .doc
        .select("head script[src]")
        .iter()
        .filter(|el| {
            el.value().attr("defer").is_none() && el.value().attr("async").is_none()
        })
        .count();
    let head_stylesheets = ctx.doc.count(r#"head link[rel="stylesheet"]"#);

    let mut issues = Vec::new();
    if blocking_scripts > 0 {
        issues.push(format!(
            "{} scripts in <head> load without defer/async",
            blocking_scripts
        ));
    }
    if head_stylesheets > 3 {
        issues.push(format!(
            "{} stylesheets load in <head>; consider bundling",
            head_stylesheets
        ));
    }

    let severity = if blocking_scripts > 5 {
        Severity::Fail
    } else {
        Severity::Warning
    };

    Verdict::from_issues(severity, issues, "No render-blocking resources in <head>")
        .with_details(json!({
            "blocking_scripts": blocking_scripts,
            "head_stylesheets": head_stylesheets
        }))
}

pub fn lazy_loading(ctx: &AnalyzeContext) -> Verdict {
    let images = ctx.doc.select("img");
    let total = images.len();

    if total <= 3 {
        return Verdict::pass(format!(
            "Few images on the page ({}); lazy loading not critical",
            total
        ));
    }

    let lazy = images
        .iter()
        .filter(|el| {
            el.value()
                .attr("loading")
                .map(|v| v.eq_ignore_ascii_case("lazy"))
                .unwrap_or(false)
        })
        .count();

    let verdict = if lazy == 0 {
        Verdict::warning(format!("None of the {} images use loading=\"lazy\"", total))
            .recommend("Lazy-load below-the-fold images to cut initial page weight")
    } else {
        Verdict::pass(format!("{} of {} images are lazy-loaded", lazy, total))
    };

    verdict.with_details(json!({ "images": total, "lazy": lazy }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::fetch::FetchResult;
    use crate::probes::AncillaryData;
    use std::collections::BTreeMap;
    use url::Url;

    fn fetch_with(body: &str, byte_length: usize, elapsed_ms: u64) -> FetchResult {
        FetchResult {
            url: "https://example.com/".to_string(),
            status: 200,
            headers: BTreeMap::new(),
            body: body.to_string(),
            elapsed_ms,
            byte_length,
        }
    }

    #[test]
    fn test_html_size_tiers() {
        let doc = Document::parse("");
        let url = Url::parse("https://example.com/").unwrap();
        let ancillary = AncillaryData::empty();
        let cases = [
            (33 * KB, Severity::Pass),
            (100 * KB, Severity::Pass),
            (250 * KB, Severity::Warning),
            (500 * KB, Severity::Warning),
            (500 * KB + 1, Severity::Fail),
        ];
        for (bytes, expected) in cases {
            let fetch = fetch_with("", bytes, 100);
            let ctx = AnalyzeContext {
                doc: &doc,
                url: &url,
                fetch: &fetch,
                ancillary: &ancillary,
            };
            assert_eq!(html_size(&ctx).severity, expected, "{} bytes", bytes);
        }
    }

    #[test]
    fn test_server_response_tiers() {
        let doc = Document::parse("");
        let url = Url::parse("https://example.com/").unwrap();
        let ancillary = AncillaryData::empty();
        let cases = [
            (999, Severity::Pass),
            (1000, Severity::Warning),
            (3000, Severity::Warning),
            (3001, Severity::Fail),
        ];
        for (ms, expected) in cases {
            let fetch = fetch_with("", 0, ms);
            let ctx = AnalyzeContext {
                doc: &doc,
                url: &url,
                fetch: &fetch,
                ancillary: &ancillary,
            };
            assert_eq!(server_response(&ctx).severity, expected, "{} ms", ms);
        }
    }

    #[test]
    fn test_compression_header() {
        let doc = Document::parse("");
        let url = Url::parse("https://example.com/").unwrap();
        let ancillary = AncillaryData::empty();

        let mut fetch = fetch_with("", 0, 100);
        fetch
            .headers
            .insert("content-encoding".to_string(), "gzip".to_string());
        let ctx = AnalyzeContext {
            doc: &doc,
            url: &url,
            fetch: &fetch,
            ancillary: &ancillary,
        };
        assert_eq!(compression(&ctx).severity, Severity::Pass);

        let fetch = fetch_with("", 0, 100);
        let ctx = AnalyzeContext {
            doc: &doc,
            url: &url,
            fetch: &fetch,
            ancillary: &ancillary,
        };
        assert_eq!(compression(&ctx).severity, Severity::Warning);
    }

    #[test]
    fn test_structured_data_partial_invalid() {
        let html = r#"<head>
            <script type="application/ld+json">{"@type": "Article"}</script>
            <script type="application/ld+json">{not valid json</script>
            <script type="application/ld+json">{"@graph": []}</script>
        </head>"#;
        let doc = Document::parse(html);
        let url = Url::parse("https://example.com/").unwrap();
        let fetch = fetch_with(html, html.len(), 100);
        let ancillary = AncillaryData::empty();
        let ctx = AnalyzeContext {
            doc: &doc,
            url: &url,
            fetch: &fetch,
            ancillary: &ancillary,
        };

        let v = structured_data(&ctx);
        assert_eq!(v.severity, Severity::Warning);
        let types: Vec<&str> = v.details["types"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t.as_str().unwrap())
            .collect();
        assert_eq!(types, vec!["Article", "Invalid JSON", "Graph"]);
    }

    #[test]
    fn test_schema_type_from_array() {
        let value = serde_json::json!({"@type": ["Organization", "LocalBusiness"]});
        assert_eq!(schema_type(&value), "Organization");
    }

    #[test]
    fn test_mixed_content_on_https_page() {
        let html = r#"<body><img src="http://cdn.old.com/a.png"><img src="https://ok.com/b.png"></body>"#;
        let doc = Document::parse(html);
        let url = Url::parse("https://example.com/").unwrap();
        let fetch = fetch_with(html, html.len(), 100);
        let ancillary = AncillaryData::empty();
        let ctx = AnalyzeContext {
            doc: &doc,
            url: &url,
            fetch: &fetch,
            ancillary: &ancillary,
        };

        let v = mixed_content(&ctx);
        assert_eq!(v.severity, Severity::Fail);
        assert!(v.issues.iter().any(|i| i.contains("cdn.old.com")));
    }

    #[test]
    fn test_cdn_detection_from_resources() {
        let html = r#"<head><script src="https://cdn.jsdelivr.net/npm/x.js"></script></head>"#;
        let doc = Document::parse(html);
        let url = Url::parse("https://example.com/").unwrap();
        let fetch = fetch_with(html, html.len(), 100);
        let ancillary = AncillaryData::empty();
        let ctx = AnalyzeContext {
            doc: &doc,
            url: &url,
            fetch: &fetch,
            ancillary: &ancillary,
        };

        let v = cdn_usage(&ctx);
        assert_eq!(v.severity, Severity::Pass);
        assert!(v.issues[0].contains("jsDelivr"));
    }

    #[test]
    fn test_url_structure_flags() {
        let doc = Document::parse("");
        let url = Url::parse("https://example.com/Some_Path/a/b/c/d/e/f?x=1&y=2&z=3&w=4").unwrap();
        let fetch = fetch_with("", 0, 100);
        let ancillary = AncillaryData::empty();
        let ctx = AnalyzeContext {
            doc: &doc,
            url: &url,
            fetch: &fetch,
            ancillary: &ancillary,
        };

        let v = url_structure(&ctx);
        assert_eq!(v.severity, Severity::Warning);
        assert!(v.issues.iter().any(|i| i.contains("uppercase")));
        assert!(v.issues.iter().any(|i| i.contains("underscores")));
        assert!(v.issues.iter().any(|i| i.contains("query parameters")));
        assert!(v.issues.iter().any(|i| i.contains("deeply nested")));
    }
}

//! Body-content checks: headings, images, visible-text volume and the
//! keyword/n-gram frequency tables.

use crate::context::AnalyzeContext;
use crate::document::element_text;
use crate::tables;
use crate::verdict::{Severity, Verdict};
use serde_json::json;
use std::collections::HashMap;

pub fn h1(ctx: &AnalyzeContext) -> Verdict {
    let h1s = ctx.doc.select("h1");

    match h1s.len() {
        0 => Verdict::fail("No H1 heading found")
            .recommend("Add exactly one H1 describing the page topic"),
        1 => {
            let text = element_text(h1s[0]);
            let length = text.chars().count();
            let verdict = if length < 10 {
                Verdict::warning(format!("H1 is very short ({} characters)", length))
                    .recommend("Use a descriptive H1 of at least 10 characters")
            } else if length > 70 {
                Verdict::warning(format!("H1 is very long ({} characters)", length))
                    .recommend("Keep the H1 under 70 characters")
            } else {
                Verdict::pass(format!("Exactly one H1 found ({} characters)", length))
            };
            verdict.with_details(json!({ "h1": text, "length": length }))
        }
        n => {
            let texts: Vec<String> = h1s.iter().map(|el| element_text(*el)).collect();
            Verdict::warning(format!("Multiple H1 headings found ({})", n))
                .recommend("Keep a single H1; demote the others to H2")
                .with_details(json!({ "h1s": texts }))
        }
    }
}

pub fn heading_hierarchy(ctx: &AnalyzeContext) -> Verdict {
    let headings = ctx.doc.headings();

    if headings.is_empty() {
        return Verdict::fail("No headings found on the page")
            .recommend("Structure the content with H1-H6 headings");
    }

    let mut issues = Vec::new();
    if headings[0].0 != 1 {
        issues.push(format!(
            "First heading is an <h{}>, expected <h1>",
            headings[0].0
        ));
    }
    // Only increases of more than one level are violations; decreases and
    // repeats are normal document structure.
    for pair in headings.windows(2) {
        let (prev, next) = (pair[0].0, pair[1].0);
        if next > prev + 1 {
            issues.push(format!(
                "Skipped heading level: <h{}> follows <h{}>",
                next, prev
            ));
        }
    }

    let outline: Vec<String> = headings
        .iter()
        .map(|(level, text)| format!("h{}: {}", level, text))
        .collect();

    Verdict::from_issues(
        Severity::Warning,
        issues,
        format!("Heading levels are properly nested ({} headings)", headings.len()),
    )
    .with_details(json!({ "outline": outline }))
}

pub fn images_alt(ctx: &AnalyzeContext) -> Verdict {
    let images = ctx.doc.select("img");
    let total = images.len();

    if total == 0 {
        return Verdict::pass("No images on the page");
    }

    let missing: Vec<String> = images
        .iter()
        .filter(|el| {
            el.value()
                .attr("alt")
                .map(|alt| alt.trim().is_empty())
                .unwrap_or(true)
        })
        .map(|el| el.value().attr("src").unwrap_or("(no src)").to_string())
        .collect();

    let verdict = if missing.is_empty() {
        Verdict::pass(format!("All {} images have alt text", total))
    } else {
        let severity = if missing.len() * 2 >= total {
            Severity::Fail
        } else {
            Severity::Warning
        };
        Verdict::new(
            severity,
            format!("{} of {} images are missing alt text", missing.len(), total),
        )
        .recommend("Add descriptive alt attributes; they drive image search and accessibility")
    };

    let sample: Vec<&String> = missing.iter().take(10).collect();
    verdict.with_details(json!({
        "total": total,
        "missing_alt": missing.len(),
        "sample": sample
    }))
}

pub fn word_count(ctx: &AnalyzeContext) -> Verdict {
    let words = ctx.doc.visible_text().split_whitespace().count();

    let verdict = if words >= 600 {
        Verdict::pass(format!("Page has substantial content ({} words)", words))
    } else if words >= 300 {
        Verdict::warning(format!("Page content is on the thin side ({} words)", words))
            .recommend("Aim for 600+ words of useful content on pages meant to rank")
    } else {
        Verdict::fail(format!("Page content is thin ({} words)", words))
            .recommend("Pages under 300 words rarely rank; expand the content substantially")
    };

    verdict.with_details(json!({ "word_count": words }))
}

pub fn keyword_density(ctx: &AnalyzeContext) -> Verdict {
    let text = ctx.doc.visible_text();
    let tokens = tokenize(&text);

    if tokens.is_empty() {
        return Verdict::fail("No visible text to extract keywords from")
            .recommend("Add indexable text content to the page");
    }

    let unigrams = top_unigrams(&tokens, 20);
    let bigrams = top_ngrams(&tokens, 2, 15);
    let trigrams = top_ngrams(&tokens, 3, 15);
    let quadgrams = top_ngrams(&tokens, 4, 10);

    let details = json!({
        "total_words": tokens.len(),
        "unigrams": freq_json(&unigrams),
        "bigrams": freq_json(&bigrams),
        "trigrams": freq_json(&trigrams),
        "quadgrams": freq_json(&quadgrams),
    });

    let Some((top_word, top_count)) = unigrams.first().cloned() else {
        return Verdict::warning("No recurring keywords found in the page text")
            .recommend("Repeat the page's target phrases naturally in the copy")
            .with_details(details);
    };

    let density = top_count as f64 / tokens.len() as f64 * 100.0;
    let verdict = if density > 3.0 {
        Verdict::warning(format!(
            "'{}' appears {} times ({:.1}% of all words), which reads as keyword stuffing",
            top_word, top_count, density
        ))
        .recommend("Keep any single keyword under ~3% of total words")
    } else {
        Verdict::pass(format!(
            "Keyword distribution is natural (top term '{}' at {:.1}%)",
            top_word, density
        ))
    };

    verdict.with_details(details)
}

pub fn text_html_ratio(ctx: &AnalyzeContext) -> Verdict {
    let html_bytes = ctx.fetch.byte_length.max(1);
    let text_bytes = ctx.doc.visible_text().len();
    let ratio = text_bytes as f64 / html_bytes as f64 * 100.0;

    let verdict = if ratio >= 15.0 {
        Verdict::pass(format!("Text-to-HTML ratio is healthy ({:.1}%)", ratio))
    } else if ratio >= 5.0 {
        Verdict::warning(format!("Text-to-HTML ratio is low ({:.1}%)", ratio))
            .recommend("Reduce markup/script overhead or add more visible content")
    } else {
        Verdict::fail(format!("Text-to-HTML ratio is very low ({:.1}%)", ratio))
            .recommend("The page is almost entirely markup; add substantial visible text")
    };

    verdict.with_details(json!({
        "text_bytes": text_bytes,
        "html_bytes": html_bytes,
        "ratio_percent": (ratio * 10.0).round() / 10.0
    }))
}

pub fn breadcrumbs(ctx: &AnalyzeContext) -> Verdict {
    let markup_hit = ctx
        .doc
        .first(r#"nav[aria-label="breadcrumb"], nav[aria-label="Breadcrumb"], [itemtype$="BreadcrumbList"]"#)
        .is_some()
        || ctx
            .doc
            .select("nav, ol, ul")
            .iter()
            .any(|el| {
                el.value()
                    .attr("class")
                    .map(|c| c.to_lowercase().contains("breadcrumb"))
                    .unwrap_or(false)
            });
    let schema_hit = ctx
        .doc
        .select(r#"script[type="application/ld+json"]"#)
        .iter()
        .any(|el| el.inner_html().contains("BreadcrumbList"));

    if markup_hit || schema_hit {
        let via = match (markup_hit, schema_hit) {
            (true, true) => "markup and BreadcrumbList schema",
            (true, false) => "markup",
            _ => "BreadcrumbList schema",
        };
        Verdict::pass(format!("Breadcrumb navigation detected ({})", via))
    } else {
        Verdict::warning("No breadcrumb navigation detected")
            .recommend("Add breadcrumbs with BreadcrumbList structured data for richer snippets")
    }
}

/// Lowercased tokens with punctuation trimmed from both ends. Used for the
/// n-gram tables; the unigram table applies stop-word filtering on top.
fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

fn top_unigrams(tokens: &[String], cap: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for token in tokens {
        if token.len() < 3 || tables::is_stop_word(token) || token.chars().all(|c| c.is_numeric())
        {
            continue;
        }
        *counts.entry(token).or_insert(0) += 1;
    }
    sorted_and_capped(counts, cap)
}

fn top_ngrams(tokens: &[String], n: usize, cap: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for window in tokens.windows(n) {
        *counts.entry(window.join(" ")).or_insert(0) += 1;
    }
    sorted_and_capped(
        counts.iter().map(|(k, v)| (k.as_str(), *v)).collect(),
        cap,
    )
}

/// Keep only grams seen at least twice, sort by count descending (ties
/// alphabetically, for determinism) and cap the list.
fn sorted_and_capped(counts: HashMap<&str, usize>, cap: usize) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = counts
        .into_iter()
        .filter(|(_, count)| *count >= 2)
        .map(|(gram, count)| (gram.to_string(), count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(cap);
    entries
}

fn freq_json(entries: &[(String, usize)]) -> serde_json::Value {
    json!(entries
        .iter()
        .map(|(gram, count)| json!({ "gram": gram, "count": count }))
        .collect::<Vec<_>>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::fetch::FetchResult;
    use crate::probes::AncillaryData;
    use std::collections::BTreeMap;
    use url::Url;

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
    fn test_h1_counts() {
        with_ctx!("<body><p>no headings</p></body>", ctx, {
            assert_eq!(h1(&ctx).severity, Severity::Fail);
        });
        with_ctx!("<body><h1>A perfectly sized heading</h1></body>", ctx, {
            assert_eq!(h1(&ctx).severity, Severity::Pass);
        });
        with_ctx!("<body><h1>One here</h1><h1>Two here</h1></body>", ctx, {
            assert_eq!(h1(&ctx).severity, Severity::Warning);
        });
    }

    #[test]
    fn test_h1_length_warnings() {
        with_ctx!("<body><h1>Short</h1></body>", ctx, {
            let v = h1(&ctx);
            assert_eq!(v.severity, Severity::Warning);
            assert!(v.issues[0].contains("short"));
        });
        let long = format!("<body><h1>{}</h1></body>", "y".repeat(71));
        with_ctx!(&long, ctx, {
            assert_eq!(h1(&ctx).severity, Severity::Warning);
        });
    }

    #[test]
    fn test_heading_hierarchy_skip_flagged_once() {
        with_ctx!("<body><h1>A</h1><h3>B</h3></body>", ctx, {
            let v = heading_hierarchy(&ctx);
            assert_eq!(v.severity, Severity::Warning);
            let skips = v
                .issues
                .iter()
                .filter(|i| i.contains("Skipped heading level"))
                .count();
            assert_eq!(skips, 1);
        });
    }

    #[test]
    fn test_heading_hierarchy_decreases_pass() {
        with_ctx!("<body><h1>A</h1><h2>B</h2><h2>C</h2><h3>D</h3></body>", ctx, {
            assert_eq!(heading_hierarchy(&ctx).severity, Severity::Pass);
        });
        // decrease from h3 back to h2 is never flagged
        with_ctx!("<body><h1>A</h1><h2>B</h2><h3>C</h3><h2>D</h2></body>", ctx, {
            assert_eq!(heading_hierarchy(&ctx).severity, Severity::Pass);
        });
    }

    #[test]
    fn test_heading_hierarchy_first_not_h1() {
        with_ctx!("<body><h2>B</h2><h3>C</h3></body>", ctx, {
            let v = heading_hierarchy(&ctx);
            assert_eq!(v.severity, Severity::Warning);
            assert!(v.issues[0].contains("expected <h1>"));
        });
    }

    #[test]
    fn test_images_alt_ratio() {
        with_ctx!(r#"<body><img src="a.png" alt="a"><img src="b.png" alt="b"></body>"#, ctx, {
            assert_eq!(images_alt(&ctx).severity, Severity::Pass);
        });
        with_ctx!(
            r#"<body><img src="a.png" alt="a"><img src="b.png" alt="b"><img src="c.png"></body>"#,
            ctx,
            {
                assert_eq!(images_alt(&ctx).severity, Severity::Warning);
            }
        );
        with_ctx!(r#"<body><img src="a.png"><img src="b.png"></body>"#, ctx, {
            assert_eq!(images_alt(&ctx).severity, Severity::Fail);
        });
    }

    #[test]
    fn test_word_count_tiers() {
        let page = |n: usize| format!("<body><p>{}</p></body>", vec!["word"; n].join(" "));
        with_ctx!(&page(299), ctx, {
            assert_eq!(word_count(&ctx).severity, Severity::Fail);
        });
        with_ctx!(&page(300), ctx, {
            assert_eq!(word_count(&ctx).severity, Severity::Warning);
        });
        with_ctx!(&page(600), ctx, {
            assert_eq!(word_count(&ctx).severity, Severity::Pass);
        });
    }

    #[test]
    fn test_tokenize_strips_punctuation() {
        assert_eq!(
            tokenize("Hello, world! It's rust-lang."),
            vec!["hello", "world", "it's", "rust-lang"]
        );
    }

    #[test]
    fn test_unigrams_filter_stop_words_and_require_two() {
        let tokens = tokenize("the quick brown fox likes the other quick fox once");
        let unigrams = top_unigrams(&tokens, 20);
        assert!(unigrams.iter().all(|(w, _)| w != "the"));
        assert!(unigrams.iter().any(|(w, c)| w == "quick" && *c == 2));
        assert!(unigrams.iter().any(|(w, c)| w == "fox" && *c == 2));
        // 'brown' appears once, dropped by the count>=2 rule
        assert!(unigrams.iter().all(|(w, _)| w != "brown"));
    }

    #[test]
    fn test_ngrams_keep_stop_words() {
        let tokens = tokenize("state of the art state of the art");
        let trigrams = top_ngrams(&tokens, 3, 15);
        assert!(trigrams.iter().any(|(g, c)| g == "state of the" && *c == 2));
    }

    #[test]
    fn test_keyword_density_empty_page_fails() {
        with_ctx!("<body></body>", ctx, {
            assert_eq!(keyword_density(&ctx).severity, Severity::Fail);
        });
    }
}

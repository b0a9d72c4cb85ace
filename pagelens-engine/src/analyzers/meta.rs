//! Head/metadata checks: title, description, canonical, social tags and the
//! raw-byte checks (doctype, charset) that cannot be answered from the
//! parsed tree alone.

use crate::context::AnalyzeContext;
use crate::verdict::{Severity, Verdict};
use serde_json::json;

pub fn title(ctx: &AnalyzeContext) -> Verdict {
    let Some(text) = ctx.doc.text_of_first("title").filter(|t| !t.is_empty()) else {
        return Verdict::fail("Missing <title> tag")
            .recommend("Add a unique, descriptive title of 30-60 characters");
    };

    let length = text.chars().count();
    let verdict = if length < 30 {
        Verdict::warning(format!("Title is too short ({} characters)", length))
            .recommend("Expand the title to 30-60 characters to use the full search snippet")
    } else if length > 60 {
        Verdict::warning(format!("Title is too long ({} characters)", length))
            .recommend("Shorten the title to 60 characters or fewer so it is not truncated")
    } else {
        Verdict::pass(format!("Title length is optimal ({} characters)", length))
    };

    verdict.with_details(json!({ "title": text, "length": length }))
}

pub fn meta_description(ctx: &AnalyzeContext) -> Verdict {
    let Some(description) = ctx.doc.meta_content("description") else {
        return Verdict::fail("Missing meta description")
            .recommend("Add a meta description of 120-160 characters summarizing the page");
    };

    let length = description.chars().count();
    let verdict = if length < 70 {
        Verdict::warning(format!("Meta description is too short ({} characters)", length))
            .recommend("Expand the description to at least 70 characters, ideally 120-160")
    } else if length > 160 {
        Verdict::warning(format!("Meta description is too long ({} characters)", length))
            .recommend("Trim the description to 160 characters or fewer")
    } else if length >= 120 {
        Verdict::pass(format!(
            "Meta description length is optimal ({} characters)",
            length
        ))
    } else {
        Verdict::pass(format!(
            "Meta description length is acceptable ({} characters)",
            length
        ))
        .recommend("Aim for 120-160 characters for the best snippet coverage")
    };

    verdict.with_details(json!({ "description": description, "length": length }))
}

pub fn meta_keywords(ctx: &AnalyzeContext) -> Verdict {
    let Some(keywords) = ctx.doc.meta_content("keywords") else {
        return Verdict::warning("No meta keywords tag found").recommend(
            "Meta keywords are ignored by major search engines; adding them is optional",
        );
    };

    let count = keywords.split(',').filter(|k| !k.trim().is_empty()).count();
    let verdict = if count == 0 {
        Verdict::warning("Meta keywords tag is empty")
    } else if count > 10 {
        Verdict::warning(format!(
            "Meta keywords tag lists {} keywords, which looks like stuffing",
            count
        ))
        .recommend("Keep the keyword list short and relevant, or remove the tag")
    } else {
        Verdict::pass(format!("Meta keywords tag present ({} keywords)", count))
    };

    verdict.with_details(json!({ "keywords": keywords, "count": count }))
}

pub fn canonical(ctx: &AnalyzeContext) -> Verdict {
    let canonicals = ctx.doc.select(r#"link[rel="canonical"]"#);

    if canonicals.is_empty() {
        return Verdict::warning("No canonical URL declared")
            .recommend("Add a <link rel=\"canonical\"> to guard against duplicate-content URLs");
    }
    if canonicals.len() > 1 {
        return Verdict::warning(format!(
            "Multiple canonical tags found ({})",
            canonicals.len()
        ))
        .recommend("Keep exactly one canonical tag; conflicting ones are ignored by crawlers");
    }

    let Some(href) = canonicals[0].value().attr("href").map(str::trim).filter(|h| !h.is_empty())
    else {
        return Verdict::fail("Canonical tag has no href");
    };

    let Ok(resolved) = ctx.url.join(href) else {
        return Verdict::fail(format!("Canonical URL '{}' cannot be resolved", href));
    };

    let self_referencing = resolved.as_str().trim_end_matches('/')
        == ctx.url.as_str().trim_end_matches('/');
    let verdict = if self_referencing {
        Verdict::pass("Self-referencing canonical URL is present")
    } else {
        Verdict::pass(format!("Canonical points to {}", resolved))
            .recommend("Confirm the canonical target is the preferred version of this page")
    };

    verdict.with_details(json!({
        "canonical": resolved.to_string(),
        "self_referencing": self_referencing
    }))
}

pub fn robots_meta(ctx: &AnalyzeContext) -> Verdict {
    let Some(content) = ctx.doc.meta_content("robots") else {
        return Verdict::pass("No robots meta tag; page defaults to index,follow");
    };

    let directives = content.to_lowercase();
    let verdict = if directives.contains("noindex") {
        Verdict::fail(format!("Page is blocked from indexing ({})", content))
            .recommend("Remove 'noindex' if this page should appear in search results")
    } else if directives.contains("nofollow") {
        Verdict::warning(format!("Links on this page are not followed ({})", content))
            .recommend("Remove 'nofollow' unless link equity should be withheld site-wide")
    } else {
        Verdict::pass(format!("Robots meta tag allows indexing ({})", content))
    };

    verdict.with_details(json!({ "robots": content }))
}

pub fn viewport(ctx: &AnalyzeContext) -> Verdict {
    let Some(content) = ctx.doc.meta_content("viewport") else {
        return Verdict::fail("Missing viewport meta tag")
            .recommend("Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"> for mobile rendering");
    };

    if !content.to_lowercase().contains("width=") {
        return Verdict::warning(format!("Viewport tag does not set a width ({})", content))
            .recommend("Include width=device-width so mobile browsers scale correctly")
            .with_details(json!({ "viewport": content }));
    }

    Verdict::pass(format!("Viewport is configured ({})", content))
        .with_details(json!({ "viewport": content }))
}

pub fn charset(ctx: &AnalyzeContext) -> Verdict {
    let raw = ctx.raw_html().to_lowercase();

    let declared = ctx
        .doc
        .attr_of_first("meta[charset]", "charset")
        .or_else(|| {
            ctx.doc
                .attr_of_first(r#"meta[http-equiv="Content-Type"]"#, "content")
                .and_then(|c| {
                    c.to_lowercase()
                        .split("charset=")
                        .nth(1)
                        .map(|s| s.trim().to_string())
                })
        });

    let Some(charset) = declared else {
        return Verdict::warning("No character encoding declared")
            .recommend("Add <meta charset=\"utf-8\"> as the first element inside <head>");
    };

    let mut verdict = if charset.eq_ignore_ascii_case("utf-8") {
        Verdict::pass("Character encoding is UTF-8")
    } else {
        Verdict::warning(format!("Non-UTF-8 character encoding declared ({})", charset))
            .recommend("Prefer UTF-8; other encodings risk mojibake in snippets")
    };

    // Browsers only honor a charset declared within the first 1024 bytes.
    // Anchor on the declaring tag itself; the bare word can appear earlier
    // in scripts or URLs.
    let declaration_pos = raw
        .find("<meta charset")
        .or_else(|| raw.find(r#"http-equiv="content-type""#))
        .or_else(|| raw.find("http-equiv='content-type'"));
    if let Some(pos) = declaration_pos
        && pos > 1024
    {
        verdict = verdict
            .issue(format!(
                "Charset declaration appears {} bytes into the document",
                pos
            ))
            .recommend("Move the charset declaration into the first 1024 bytes");
        verdict.severity = Severity::Warning;
    }

    verdict.with_details(json!({ "charset": charset }))
}

pub fn doctype(ctx: &AnalyzeContext) -> Verdict {
    let head = ctx.raw_html().trim_start().to_lowercase();

    if head.starts_with("<!doctype") {
        // The HTML5 doctype is exactly `<!doctype html>`; anything longer
        // (PUBLIC identifiers, system URLs) is a legacy declaration.
        let declaration = head
            .split('>')
            .next()
            .unwrap_or_default()
            .trim_end()
            .to_string();
        if declaration == "<!doctype html" {
            Verdict::pass("HTML5 doctype declared")
        } else {
            Verdict::warning("Legacy doctype declared")
                .recommend("Replace with the HTML5 doctype: <!DOCTYPE html>")
                .with_details(json!({ "doctype": format!("{}>", declaration) }))
        }
    } else {
        Verdict::fail("No doctype declaration found")
            .recommend("Add <!DOCTYPE html> as the first line to avoid quirks-mode rendering")
    }
}

pub fn html_lang(ctx: &AnalyzeContext) -> Verdict {
    match ctx.doc.attr_of_first("html", "lang").filter(|l| !l.is_empty()) {
        Some(lang) => Verdict::pass(format!("Page language declared ({})", lang))
            .with_details(json!({ "lang": lang })),
        None => Verdict::fail("Missing lang attribute on <html>")
            .recommend("Declare the page language, e.g. <html lang=\"en\">"),
    }
}

pub fn favicon(ctx: &AnalyzeContext) -> Verdict {
    let icons = ctx.doc.select(
        r#"link[rel="icon"], link[rel="shortcut icon"], link[rel="apple-touch-icon"]"#,
    );

    if icons.is_empty() {
        return Verdict::warning("No favicon link found")
            .recommend("Add a <link rel=\"icon\"> so browsers do not fall back to guessing /favicon.ico");
    }

    let hrefs: Vec<String> = icons
        .iter()
        .filter_map(|el| el.value().attr("href").map(String::from))
        .collect();
    Verdict::pass(format!("Favicon declared ({} link tags)", icons.len()))
        .with_details(json!({ "icons": hrefs }))
}

pub fn open_graph(ctx: &AnalyzeContext) -> Verdict {
    const REQUIRED: [&str; 4] = ["og:title", "og:description", "og:image", "og:url"];

    let missing: Vec<&str> = REQUIRED
        .iter()
        .filter(|p| ctx.doc.meta_property(p).is_none())
        .copied()
        .collect();

    if missing.len() == REQUIRED.len() {
        return Verdict::fail("No Open Graph tags found")
            .recommend("Add og:title, og:description, og:image and og:url for link previews");
    }

    let mut verdict = if missing.is_empty() {
        Verdict::pass("All core Open Graph tags are present")
    } else {
        let mut v = Verdict::new(
            Severity::Warning,
            format!("Missing Open Graph tags: {}", missing.join(", ")),
        );
        for tag in &missing {
            v = v.recommend(format!("Add a {} meta property", tag));
        }
        v
    };

    // og:image dimensions, when declared, must meet the 1200x630 minimum.
    let width = ctx
        .doc
        .meta_property("og:image:width")
        .and_then(|w| w.parse::<u32>().ok());
    let height = ctx
        .doc
        .meta_property("og:image:height")
        .and_then(|h| h.parse::<u32>().ok());
    if let (Some(w), Some(h)) = (width, height)
        && (w < 1200 || h < 630)
    {
        verdict = verdict
            .issue(format!("og:image is {}x{}, below the 1200x630 minimum", w, h))
            .recommend("Use a share image of at least 1200x630 pixels");
        verdict.severity = Severity::Warning;
    }

    verdict.with_details(json!({
        "missing": missing,
        "image_width": width,
        "image_height": height
    }))
}

pub fn twitter_cards(ctx: &AnalyzeContext) -> Verdict {
    let card = ctx.doc.meta_content("twitter:card");
    let title = ctx.doc.meta_content("twitter:title");
    let description = ctx.doc.meta_content("twitter:description");
    let image = ctx.doc.meta_content("twitter:image");

    let Some(card) = card else {
        return Verdict::warning("No twitter:card meta tag found")
            .recommend("Add twitter:card (summary_large_image) so shares render as rich cards");
    };

    let mut missing = Vec::new();
    if title.is_none() {
        missing.push("twitter:title");
    }
    if description.is_none() {
        missing.push("twitter:description");
    }
    if image.is_none() {
        missing.push("twitter:image");
    }

    let verdict = if missing.is_empty() {
        Verdict::pass(format!("Twitter card is fully configured ({})", card))
    } else {
        Verdict::warning(format!(
            "Twitter card '{}' is missing: {}",
            card,
            missing.join(", ")
        ))
        .recommend("Fill in the missing twitter:* tags, or rely on Open Graph fallbacks")
    };

    verdict.with_details(json!({ "card": card, "missing": missing }))
}

pub fn hreflang(ctx: &AnalyzeContext) -> Verdict {
    let alternates = ctx.doc.select(r#"link[rel="alternate"][hreflang]"#);

    if alternates.is_empty() {
        return Verdict::pass("No hreflang annotations (fine for single-language sites)");
    }

    let codes: Vec<String> = alternates
        .iter()
        .filter_map(|el| el.value().attr("hreflang").map(|v| v.trim().to_string()))
        .collect();

    let mut issues = Vec::new();
    for code in &codes {
        if !valid_hreflang(code) {
            issues.push(format!("Invalid hreflang code '{}'", code));
        }
    }
    if !codes.iter().any(|c| c.eq_ignore_ascii_case("x-default")) {
        issues.push("No x-default hreflang entry".to_string());
    }

    Verdict::from_issues(
        Severity::Warning,
        issues,
        format!("{} hreflang alternates declared", codes.len()),
    )
    .with_details(json!({ "hreflangs": codes }))
}

fn valid_hreflang(code: &str) -> bool {
    if code.eq_ignore_ascii_case("x-default") {
        return true;
    }
    let mut parts = code.split('-');
    let lang = parts.next().unwrap_or_default();
    if !(lang.len() == 2 || lang.len() == 3) || !lang.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    match parts.next() {
        None => true,
        Some(region) => {
            region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic())
        }
    }
}

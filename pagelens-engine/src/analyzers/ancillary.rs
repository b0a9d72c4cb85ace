//! Checks that consume ancillary data. A degraded probe never removes a
//! check from the report: it renders a "could not retrieve" warning instead.

use crate::context::AnalyzeContext;
use crate::llms::parse_llms_txt;
use crate::probes::PerfOutcome;
use crate::tables;
use crate::verdict::{Severity, Verdict};
use serde_json::json;
use std::collections::BTreeMap;

pub fn sitemap(ctx: &AnalyzeContext) -> Verdict {
    let probe = &ctx.ancillary.sitemap;

    if probe.tested_urls.is_empty() {
        return Verdict::warning("Could not probe for a sitemap")
            .recommend("Verify /sitemap.xml is reachable and listed in robots.txt");
    }

    let details = json!({ "tested_urls": probe.tested_urls, "found_at": probe.found_at });
    if probe.exists {
        let location = probe.found_at.as_deref().unwrap_or("/sitemap.xml");
        Verdict::pass(format!("Sitemap found at {}", location)).with_details(details)
    } else {
        Verdict::fail(format!(
            "No sitemap.xml found (tested {})",
            probe.tested_urls.join(", ")
        ))
        .recommend("Publish a sitemap.xml and reference it from robots.txt")
        .with_details(details)
    }
}

pub fn llms_txt(ctx: &AnalyzeContext) -> Verdict {
    let probe = &ctx.ancillary.llms;

    match (&probe.llms_txt, &probe.llms_full_txt) {
        (None, None) => Verdict::fail("Neither /llms.txt nor /llms-full.txt exists")
            .recommend("Publish an llms.txt so AI assistants can navigate your content"),
        (None, Some(_)) => {
            Verdict::warning("Only /llms-full.txt exists; the standard /llms.txt is missing")
                .recommend("Add a concise /llms.txt index alongside the full variant")
        }
        (Some(content), full) => {
            let doc = parse_llms_txt(content);

            let mut missing = Vec::new();
            if doc.title.is_none() {
                missing.push("a title (`# ...` line)");
            }
            if doc.description.is_none() {
                missing.push("a description (`> ...` line)");
            }
            if doc.section_count == 0 {
                missing.push("at least one `## section`");
            }
            if doc.link_count == 0 {
                missing.push("at least one link entry");
            }

            let details = json!({
                "title": doc.title,
                "description": doc.description,
                "sections": doc.section_count,
                "links": doc.link_count,
                "llms_full_txt": full.is_some(),
            });

            if missing.is_empty() {
                Verdict::pass(format!(
                    "llms.txt is complete ({} sections, {} links)",
                    doc.section_count, doc.link_count
                ))
                .with_details(details)
            } else {
                let mut verdict =
                    Verdict::warning("llms.txt exists but is incomplete".to_string());
                for item in missing {
                    verdict = verdict.recommend(format!("Add {}", item));
                }
                verdict.with_details(details)
            }
        }
    }
}

pub fn performance(ctx: &AnalyzeContext) -> Verdict {
    match &ctx.ancillary.perf {
        PerfOutcome::Scores(scores) => {
            let mut verdict = match scores.performance {
                Some(score) if score >= 0.9 => {
                    Verdict::pass(format!("Performance score: {:.0}/100", score * 100.0))
                }
                Some(score) if score >= 0.5 => {
                    Verdict::warning(format!("Performance score: {:.0}/100", score * 100.0))
                        .recommend("Work through the PageSpeed opportunities to reach 90+")
                }
                Some(score) => {
                    Verdict::fail(format!("Performance score: {:.0}/100", score * 100.0))
                        .recommend("The page scores poorly on mobile; prioritize Core Web Vitals")
                }
                None => Verdict::warning("PageSpeed returned no performance score"),
            };

            for (label, value) in [
                ("SEO", scores.seo),
                ("Accessibility", scores.accessibility),
                ("Best practices", scores.best_practices),
            ] {
                if let Some(v) = value {
                    verdict = verdict.issue(format!("{} score: {:.0}/100", label, v * 100.0));
                }
            }

            verdict.with_details(json!({
                "performance": scores.performance,
                "seo": scores.seo,
                "accessibility": scores.accessibility,
                "best_practices": scores.best_practices,
            }))
        }
        PerfOutcome::Error { kind } => {
            Verdict::warning(format!("Could not retrieve performance data: {}", kind.message()))
                .recommend("Re-run the analysis later to get PageSpeed scores")
                .with_details(json!({ "error": kind }))
        }
    }
}

pub fn https_redirect(ctx: &AnalyzeContext) -> Verdict {
    let Some(probe) = &ctx.ancillary.https_redirect else {
        return Verdict::warning("Could not verify the HTTP-to-HTTPS redirect")
            .recommend("Check manually that http:// requests redirect to https://");
    };

    let details = json!({ "status": probe.status, "location": probe.location });
    match probe.status {
        301 | 302 | 307 | 308 => match probe.location.as_deref() {
            Some(location) if location.starts_with("https://") => {
                Verdict::pass(format!("HTTP redirects to HTTPS ({})", probe.status))
                    .with_details(details)
            }
            Some(location) => Verdict::fail(format!(
                "HTTP redirects to a non-HTTPS target ({})",
                location
            ))
            .recommend("Point the redirect at the https:// origin")
            .with_details(details),
            None => Verdict::warning(format!(
                "HTTP returns {} without a Location header",
                probe.status
            ))
            .with_details(details),
        },
        200 => Verdict::fail("The site serves content over plain HTTP without redirecting")
            .recommend("Add a permanent (301) redirect from HTTP to HTTPS")
            .with_details(details),
        status => Verdict::warning(format!(
            "Unexpected status {} from the HTTP origin",
            status
        ))
        .with_details(details),
    }
}

pub fn ai_crawler_access(ctx: &AnalyzeContext) -> Verdict {
    let Some(robots) = &ctx.ancillary.robots_txt else {
        return Verdict::warning("Could not retrieve robots.txt")
            .recommend("Serve a robots.txt so AI crawler policy is explicit");
    };

    let blocked = blocked_ai_bots(robots);
    let allowed = explicitly_allowed_ai_bots(robots);

    // The allow re-scan can disagree with the state-machine pass; an
    // explicit allow takes precedence over a block verdict for that bot.
    let mut states: BTreeMap<&'static str, &'static str> = BTreeMap::new();
    for (bot, _) in tables::AI_BOTS {
        let state = if allowed.contains(bot) {
            "allowed"
        } else if blocked.contains(bot) {
            "blocked"
        } else {
            "not restricted"
        };
        states.insert(*bot, state);
    }

    let blocked_final: Vec<&str> = states
        .iter()
        .filter(|(_, state)| **state == "blocked")
        .map(|(bot, _)| *bot)
        .collect();

    let details = json!({ "bots": states });
    if blocked_final.is_empty() {
        return Verdict::pass("No known AI crawlers are blocked in robots.txt").with_details(details);
    }

    let severity = if blocked_final.len() * 2 > tables::AI_BOTS.len() {
        Severity::Fail
    } else {
        Severity::Warning
    };
    let mut verdict = Verdict::new(
        severity,
        format!("{} AI crawlers are blocked in robots.txt", blocked_final.len()),
    );
    for bot in &blocked_final {
        verdict = verdict.issue(format!("{} is disallowed from the whole site", bot));
        verdict = verdict.recommend(format!(
            "Remove the Disallow rule for {} if AI search visibility is desired",
            bot
        ));
    }
    verdict.with_details(details)
}

/// First pass: a line state machine tracking the current user-agent group.
/// A bot is blocked only by `Disallow: /` under its own named agent block;
/// a wildcard `*` disallow-all never counts against a named bot.
pub(super) fn blocked_ai_bots(robots: &str) -> Vec<&'static str> {
    let mut blocked = Vec::new();
    let mut current_agents: Vec<String> = Vec::new();
    let mut last_line_was_agent = false;

    for raw_line in robots.lines() {
        let line = raw_line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let lower = line.to_lowercase();

        if let Some(agent) = lower.strip_prefix("user-agent:") {
            if !last_line_was_agent {
                current_agents.clear();
            }
            current_agents.push(agent.trim().to_string());
            last_line_was_agent = true;
            continue;
        }
        last_line_was_agent = false;

        if let Some(path) = lower.strip_prefix("disallow:")
            && path.trim() == "/"
        {
            for (bot, _) in tables::AI_BOTS {
                if current_agents.iter().any(|a| a.eq_ignore_ascii_case(bot))
                    && !blocked.contains(bot)
                {
                    blocked.push(*bot);
                }
            }
        }
    }

    blocked
}

/// Second pass: re-scan the whole file for each bot name and look for an
/// `Allow: /` on any later line. The scan deliberately runs past block
/// boundaries and can disagree with the state-machine pass; that behavior
/// is kept as-is.
fn explicitly_allowed_ai_bots(robots: &str) -> Vec<&'static str> {
    let lower = robots.to_lowercase();
    let mut allowed = Vec::new();

    for (bot, _) in tables::AI_BOTS {
        if let Some(pos) = lower.find(&bot.to_lowercase()) {
            let tail = &lower[pos..];
            let has_allow = tail.lines().any(|line| {
                line.trim_start()
                    .strip_prefix("allow:")
                    .map(|path| path.trim() == "/")
                    .unwrap_or(false)
            });
            if has_allow {
                allowed.push(*bot);
            }
        }
    }

    allowed
}

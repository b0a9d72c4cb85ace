//! Static lookup tables used by the analyzers. Loaded once, never mutated.

/// English stop words filtered out of the unigram frequency table.
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "an", "and", "any", "are", "as", "at",
    "be", "because", "been", "before", "being", "below", "between", "both", "but", "by", "can",
    "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how",
    "if", "in", "into", "is", "it", "its", "just", "me", "more", "most", "my", "no", "nor", "not",
    "now", "of", "off", "on", "once", "only", "or", "other", "our", "out", "over", "own", "same",
    "she", "should", "so", "some", "such", "than", "that", "the", "their", "them", "then", "there",
    "these", "they", "this", "those", "through", "to", "too", "under", "until", "up", "very",
    "was", "we", "were", "what", "when", "where", "which", "while", "who", "why", "will", "with",
    "would", "you", "your",
];

/// HTML tags deprecated in HTML5. Any occurrence is flagged.
pub const DEPRECATED_TAGS: &[&str] = &[
    "acronym", "applet", "basefont", "big", "blink", "center", "dir", "font", "frame", "frameset",
    "isindex", "marquee", "noframes", "strike", "tt",
];

/// CDN/provider detection table: (domain fragment, provider label).
/// Matched case-insensitively as a substring; first match wins per resource.
pub const CDN_DOMAINS: &[(&str, &str)] = &[
    ("cloudflare", "Cloudflare"),
    ("cloudfront.net", "Amazon CloudFront"),
    ("akamai", "Akamai"),
    ("fastly", "Fastly"),
    ("cdn.jsdelivr.net", "jsDelivr"),
    ("cdnjs.cloudflare.com", "cdnjs"),
    ("unpkg.com", "unpkg"),
    ("stackpath", "StackPath"),
    ("b-cdn.net", "Bunny CDN"),
    ("azureedge.net", "Azure CDN"),
    ("gstatic.com", "Google CDN"),
    ("googleapis.com", "Google CDN"),
    ("keycdn", "KeyCDN"),
];

/// Known AI crawler user-agent identifiers: (agent token, vendor label).
pub const AI_BOTS: &[(&str, &str)] = &[
    ("GPTBot", "OpenAI"),
    ("ChatGPT-User", "OpenAI"),
    ("OAI-SearchBot", "OpenAI"),
    ("ClaudeBot", "Anthropic"),
    ("Claude-Web", "Anthropic"),
    ("anthropic-ai", "Anthropic"),
    ("PerplexityBot", "Perplexity"),
    ("Google-Extended", "Google"),
    ("Applebot-Extended", "Apple"),
    ("CCBot", "Common Crawl"),
    ("Bytespider", "ByteDance"),
    ("cohere-ai", "Cohere"),
    ("meta-externalagent", "Meta"),
];

/// Social platform domains: (domain fragment, platform label).
pub const SOCIAL_DOMAINS: &[(&str, &str)] = &[
    ("facebook.com", "Facebook"),
    ("twitter.com", "Twitter/X"),
    ("x.com", "Twitter/X"),
    ("instagram.com", "Instagram"),
    ("linkedin.com", "LinkedIn"),
    ("youtube.com", "YouTube"),
    ("tiktok.com", "TikTok"),
    ("pinterest.com", "Pinterest"),
    ("threads.net", "Threads"),
    ("github.com", "GitHub"),
];

/// Case-insensitive substring match against a (fragment, label) table.
/// Returns the first matching label.
pub fn match_domain_table<'t>(value: &str, table: &'t [(&str, &str)]) -> Option<&'t str> {
    let lower = value.to_lowercase();
    table
        .iter()
        .find(|(fragment, _)| lower.contains(fragment))
        .map(|(_, label)| *label)
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_table_first_match_wins() {
        // cloudflare appears before cdnjs in the table, and the cdnjs host
        // contains both fragments
        assert_eq!(
            match_domain_table("https://cdnjs.cloudflare.com/ajax/libs/x.js", CDN_DOMAINS),
            Some("Cloudflare")
        );
    }

    #[test]
    fn test_domain_table_case_insensitive() {
        assert_eq!(
            match_domain_table("https://D111.CLOUDFRONT.NET/app.js", CDN_DOMAINS),
            Some("Amazon CloudFront")
        );
        assert_eq!(match_domain_table("https://example.com/x.js", CDN_DOMAINS), None);
    }

    #[test]
    fn test_stop_words() {
        assert!(is_stop_word("the"));
        assert!(!is_stop_word("rust"));
    }
}

//! Line-oriented parser for the llms.txt markdown dialect.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmsDoc {
    pub title: Option<String>,
    pub description: Option<String>,
    pub sections: Vec<LlmsSection>,
    pub link_count: usize,
    pub section_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmsSection {
    pub title: String,
    pub links: Vec<LlmsLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmsLink {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Single pass over the file. The first `#` heading line is the title, the
/// first `>` line the description (first match only, in both cases). Each
/// `##` heading line opens a section that following link lines attach to.
/// Link lines always increment the global link count, even outside any
/// section.
pub fn parse_llms_txt(content: &str) -> LlmsDoc {
    let mut doc = LlmsDoc::default();

    for raw_line in content.lines() {
        let line = raw_line.trim_end();

        if let Some(rest) = heading_text(line, "##") {
            doc.sections.push(LlmsSection {
                title: rest.to_string(),
                links: Vec::new(),
            });
            continue;
        }

        if doc.title.is_none()
            && let Some(rest) = heading_text(line, "#")
        {
            doc.title = Some(rest.to_string());
            continue;
        }

        if doc.description.is_none()
            && let Some(rest) = line.strip_prefix('>')
        {
            doc.description = Some(rest.trim().to_string());
            continue;
        }

        if let Some(link) = parse_link_line(line) {
            doc.link_count += 1;
            if let Some(section) = doc.sections.last_mut() {
                section.links.push(link);
            }
        }
    }

    doc.section_count = doc.sections.len();
    doc
}

/// Matches a heading marker followed by at least one whitespace character
/// (space or tab, repeated). A deeper marker (`###` against `##`) or a
/// marker glued to text does not match.
fn heading_text<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(marker)?;
    rest.starts_with(char::is_whitespace)
        .then(|| rest.trim_start())
}

/// Parses `- [Title](URL)` with an optional `: description` suffix.
fn parse_link_line(line: &str) -> Option<LlmsLink> {
    let rest = line.trim_start().strip_prefix("- [")?;
    let (title, rest) = rest.split_once("](")?;
    let (url, rest) = rest.split_once(')')?;

    if url.trim().is_empty() {
        return None;
    }

    let description = rest
        .trim_start()
        .strip_prefix(':')
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    Some(LlmsLink {
        title: title.trim().to_string(),
        url: url.trim().to_string(),
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_complete_document() {
        let doc = parse_llms_txt("# Title\n> Desc\n## Sec\n- [A](http://a.com): d\n");
        assert_eq!(doc.title.as_deref(), Some("Title"));
        assert_eq!(doc.description.as_deref(), Some("Desc"));
        assert_eq!(doc.section_count, 1);
        assert_eq!(doc.link_count, 1);
        let section = &doc.sections[0];
        assert_eq!(section.title, "Sec");
        assert_eq!(section.links.len(), 1);
        assert_eq!(section.links[0].title, "A");
        assert_eq!(section.links[0].url, "http://a.com");
        assert_eq!(section.links[0].description.as_deref(), Some("d"));
    }

    #[test]
    fn test_first_title_and_description_win() {
        let doc = parse_llms_txt("# First\n# Second\n> one\n> two\n");
        assert_eq!(doc.title.as_deref(), Some("First"));
        assert_eq!(doc.description.as_deref(), Some("one"));
    }

    #[test]
    fn test_tab_and_repeated_whitespace_after_marker() {
        let doc = parse_llms_txt("#\tTitle\n##\t  Sec\n- [A](http://a.com)\n");
        assert_eq!(doc.title.as_deref(), Some("Title"));
        assert_eq!(doc.sections[0].title, "Sec");
        assert_eq!(doc.sections[0].links.len(), 1);
    }

    #[test]
    fn test_marker_glued_to_text_is_not_a_heading() {
        let doc = parse_llms_txt("#NoTitle\n##NoSection\n### Deeper\n");
        assert!(doc.title.is_none());
        assert_eq!(doc.section_count, 0);
    }

    #[test]
    fn test_section_header_is_not_a_title() {
        let doc = parse_llms_txt("## Only Section\n");
        assert!(doc.title.is_none());
        assert_eq!(doc.section_count, 1);
    }

    #[test]
    fn test_orphan_links_count_but_do_not_attach() {
        let doc = parse_llms_txt("- [A](http://a.com)\n## Sec\n- [B](http://b.com)\n");
        assert_eq!(doc.link_count, 2);
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].links.len(), 1);
        assert_eq!(doc.sections[0].links[0].title, "B");
    }

    #[test]
    fn test_link_without_description() {
        let doc = parse_llms_txt("## S\n- [A](http://a.com)\n");
        assert!(doc.sections[0].links[0].description.is_none());
    }

    #[test]
    fn test_malformed_link_lines_ignored() {
        let doc = parse_llms_txt("- [broken\n- [empty]()\n- plain dash line\n");
        assert_eq!(doc.link_count, 0);
    }

    #[test]
    fn test_links_attach_to_latest_section() {
        let doc = parse_llms_txt("## One\n- [A](http://a.com)\n## Two\n- [B](http://b.com)\n- [C](http://c.com)\n");
        assert_eq!(doc.section_count, 2);
        assert_eq!(doc.sections[0].links.len(), 1);
        assert_eq!(doc.sections[1].links.len(), 2);
        assert_eq!(doc.link_count, 3);
    }
}

//! Small HTML scraping helpers for the guide listing pages
//!
//! Table and anchor extraction is regex based; the listing pages are flat and
//! never nest tables inside cells.

use std::sync::OnceLock;

use regex::Regex;

fn row_regex() -> &'static Regex {
    static ROW: OnceLock<Regex> = OnceLock::new();
    ROW.get_or_init(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr>").expect("valid row regex"))
}

fn cell_regex() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| {
        Regex::new(r"(?is)<t([dh])\b[^>]*>(.*?)</t[dh]>").expect("valid cell regex")
    })
}

fn anchor_regex() -> &'static Regex {
    static ANCHOR: OnceLock<Regex> = OnceLock::new();
    ANCHOR.get_or_init(|| {
        Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a>"#)
            .expect("valid anchor regex")
    })
}

/// A link found in a page: raw `href` and its visible text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub text: String,
}

/// Visible text of every cell (`td` and `th`) of every table row
///
/// Cell texts are tag-stripped, entity-decoded and whitespace-collapsed.
pub fn table_rows(html: &str) -> Vec<Vec<String>> {
    row_regex()
        .captures_iter(html)
        .map(|row| {
            cell_regex()
                .captures_iter(&row[1])
                .map(|cell| cell_text(&cell[2]))
                .collect()
        })
        .collect()
}

/// Every `<a href=...>` in document order
pub fn links(html: &str) -> Vec<Link> {
    anchor_regex()
        .captures_iter(html)
        .map(|caps| Link {
            href: normalize_entities(caps[1].trim()),
            text: cell_text(&caps[2]),
        })
        .collect()
}

/// Tag-free, entity-decoded, whitespace-collapsed text of an HTML fragment
pub fn cell_text(fragment: &str) -> String {
    normalize_ws(&normalize_entities(&strip_tags(fragment)))
}

/// Remove all `<...>` tags
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Decode the handful of entities the listing pages actually use
pub fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Collapse whitespace runs into single spaces and trim
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_rows_extract_cell_text() {
        let html = r#"
            <table>
              <TR class="hd"><th>频道</th><th>节目</th></TR>
              <tr><td><a href="/x">CCTV-1</a></td><td> 新闻联播 &amp; 天气  19:00-19:30 </td></tr>
            </table>"#;
        let rows = table_rows(html);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["频道", "节目"]);
        assert_eq!(rows[1], vec!["CCTV-1", "新闻联播 & 天气 19:00-19:30"]);
    }

    #[test]
    fn test_links_in_document_order() {
        let html = r#"<a class="c" href="/epg/yangshi/CCTV1/">CCTV-1 <b>综合</b></a>
                      <a href='https://x.test/a?b=1&amp;c=2'>next</a>"#;
        let found = links(html);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].href, "/epg/yangshi/CCTV1/");
        assert_eq!(found[0].text, "CCTV-1 综合");
        assert_eq!(found[1].href, "https://x.test/a?b=1&c=2");
    }

    #[test]
    fn test_text_helpers() {
        assert_eq!(strip_tags("<p>a<br/>b</p>"), "ab");
        assert_eq!(normalize_ws("  a \n\t b  "), "a b");
        assert_eq!(normalize_entities("&lt;x&gt;&nbsp;"), "<x> ");
    }
}

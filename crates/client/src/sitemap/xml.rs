//! Minimal XML writing for sitemap documents.

use std::borrow::Cow;
use std::fmt::{self, Write};

use chrono::NaiveDate;

pub const URLSET_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Escape the five reserved XML characters.
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Reverse [`escape`]. Unknown entities are left as written.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let entity = [("&amp;", '&'), ("&lt;", '<'), ("&gt;", '>'), ("&quot;", '"'), ("&apos;", '\'')]
            .into_iter()
            .find(|(name, _)| rest.starts_with(name));
        match entity {
            Some((name, c)) => {
                out.push(c);
                rest = &rest[name.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// One `<url>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
    pub loc: String,
    pub lastmod: NaiveDate,
    pub changefreq: String,
    pub priority: String,
}

impl UrlEntry {
    fn write_to(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "  <url>")?;
        writeln!(out, "    <loc>{}</loc>", escape(&self.loc))?;
        writeln!(out, "    <lastmod>{}</lastmod>", self.lastmod.format("%Y-%m-%d"))?;
        writeln!(out, "    <changefreq>{}</changefreq>", escape(&self.changefreq))?;
        writeln!(out, "    <priority>{}</priority>", escape(&self.priority))?;
        writeln!(out, "  </url>")
    }
}

/// Render a complete `<urlset>` document.
pub fn render_urlset(entries: &[UrlEntry]) -> Result<String, fmt::Error> {
    let mut out = String::with_capacity(128 + entries.len() * 160);
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(out, r#"<urlset xmlns="{URLSET_NS}">"#)?;
    for entry in entries {
        entry.write_to(&mut out)?;
    }
    writeln!(out, "</urlset>")?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_reserved() {
        assert_eq!(escape(r#"a&b<c>d"e'f"#), "a&amp;b&lt;c&gt;d&quot;e&apos;f");
    }

    #[test]
    fn test_escape_plain_borrows() {
        assert!(matches!(escape("https://roamaxa.app/blog/"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_unescape_round_trip() {
        let original = r#"https://roamaxa.app/blog/?q=<beach>&tag="sun"&who='me'"#;
        assert_eq!(unescape(&escape(original)), original);
    }

    #[test]
    fn test_unescape_does_not_double_decode() {
        assert_eq!(unescape("&amp;lt;"), "&lt;");
        assert_eq!(unescape("fish &chips;"), "fish &chips;");
    }

    #[test]
    fn test_render_urlset_layout() {
        let entries = vec![UrlEntry {
            loc: "https://roamaxa.app/".into(),
            lastmod: NaiveDate::from_ymd_opt(2025, 8, 13).unwrap(),
            changefreq: "daily".into(),
            priority: "1.0".into(),
        }];

        let xml = render_urlset(&entries).unwrap();
        let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
            <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n  \
            <url>\n    <loc>https://roamaxa.app/</loc>\n    <lastmod>2025-08-13</lastmod>\n    \
            <changefreq>daily</changefreq>\n    <priority>1.0</priority>\n  </url>\n\
            </urlset>\n";
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_render_empty_urlset() {
        let xml = render_urlset(&[]).unwrap();
        assert!(xml.ends_with("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n</urlset>\n"));
    }
}

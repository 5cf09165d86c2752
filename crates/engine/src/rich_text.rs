//! Inline rich text: runs of plain text carrying formatting marks.
//!
//! Cell content is stored as an HTML fragment. Formatting operations parse
//! it into runs, edit the runs, and serialize back; nothing here depends on
//! a browser editing API.

use std::ops::Range as TextRange;
use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub target: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub link: Option<Link>,
}

/// A toggleable inline mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
}

impl Marks {
    pub fn has(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
        }
    }

    pub fn set(&mut self, mark: Mark, on: bool) {
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
            Mark::Underline => self.underline = on,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub marks: Marks,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichText {
    runs: Vec<Run>,
}

impl RichText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(text: &str) -> Self {
        let mut rt = Self::new();
        rt.push(text, Marks::default());
        rt
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Append text, extending the last run when the marks match.
    pub fn push(&mut self, text: &str, marks: Marks) {
        if text.is_empty() {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.marks == marks => last.text.push_str(text),
            _ => self.runs.push(Run { text: text.to_string(), marks }),
        }
    }

    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Length in chars; text ranges are char offsets.
    pub fn char_len(&self) -> usize {
        self.runs.iter().map(|r| r.text.chars().count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// True when there is text and every run carries `mark`.
    pub fn has_mark_everywhere(&self, mark: Mark) -> bool {
        !self.runs.is_empty() && self.runs.iter().all(|r| r.marks.has(mark))
    }

    pub fn set_mark(&mut self, mark: Mark, on: bool) {
        for run in &mut self.runs {
            run.marks.set(mark, on);
        }
        self.coalesce();
    }

    /// Remove `mark` if every run has it, apply it everywhere otherwise.
    /// Returns the new state.
    pub fn toggle(&mut self, mark: Mark) -> bool {
        let on = !self.has_mark_everywhere(mark);
        self.set_mark(mark, on);
        on
    }

    /// Set or clear the link on a char range.
    pub fn set_link(&mut self, range: TextRange<usize>, link: Option<Link>) {
        let first = self.split_at(range.start);
        let last = self.split_at(range.end);
        for run in &mut self.runs[first..last] {
            run.marks.link = link.clone();
        }
        self.coalesce();
    }

    /// Replace a char range with `text` carrying `marks`.
    pub fn replace_range(&mut self, range: TextRange<usize>, text: &str, marks: Marks) {
        let first = self.split_at(range.start);
        let last = self.split_at(range.end);
        self.runs.drain(first..last);
        if !text.is_empty() {
            self.runs.insert(first, Run { text: text.to_string(), marks });
        }
        self.coalesce();
    }

    /// Marks at a char offset (of the char before it, or the first char at 0).
    pub fn marks_at(&self, offset: usize) -> Marks {
        let mut seen = 0;
        for run in &self.runs {
            let len = run.text.chars().count();
            if offset <= seen + len && (offset > seen || seen == 0) {
                return run.marks.clone();
            }
            seen += len;
        }
        Marks::default()
    }

    /// Ensure a run boundary at char `offset`; returns the index of the run
    /// starting there (== runs.len() at the end).
    fn split_at(&mut self, offset: usize) -> usize {
        let mut seen = 0;
        for i in 0..self.runs.len() {
            let len = self.runs[i].text.chars().count();
            if offset == seen {
                return i;
            }
            if offset < seen + len {
                let byte = self.runs[i]
                    .text
                    .char_indices()
                    .nth(offset - seen)
                    .map(|(b, _)| b)
                    .unwrap_or(self.runs[i].text.len());
                let tail = self.runs[i].text.split_off(byte);
                let marks = self.runs[i].marks.clone();
                self.runs.insert(i + 1, Run { text: tail, marks });
                return i + 1;
            }
            seen += len;
        }
        self.runs.len()
    }

    fn coalesce(&mut self) {
        let runs = std::mem::take(&mut self.runs);
        for run in runs {
            self.push(&run.text, run.marks);
        }
    }

    // =========================================================================
    // HTML boundary
    // =========================================================================

    /// Parse an HTML fragment. `b/strong`, `i/em`, `u` and `a` become marks,
    /// `br` and block ends become newlines, other tags are dropped.
    pub fn from_html(html: &str) -> Self {
        let mut rt = Self::new();
        let mut stack: Vec<(String, Option<Link>)> = Vec::new();
        let mut rest = html;

        while !rest.is_empty() {
            let Some(lt) = rest.find('<') else {
                rt.push(&decode_entities(rest), current_marks(&stack));
                break;
            };
            if lt > 0 {
                rt.push(&decode_entities(&rest[..lt]), current_marks(&stack));
            }
            let Some(gt) = rest[lt..].find('>') else {
                rt.push(&decode_entities(&rest[lt..]), current_marks(&stack));
                break;
            };
            let tag = &rest[lt + 1..lt + gt];
            rest = &rest[lt + gt + 1..];

            let closing = tag.starts_with('/');
            let body = tag.trim_start_matches('/').trim();
            let name: String = body
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase();

            match (closing, name.as_str()) {
                (_, "br") => rt.push("\n", current_marks(&stack)),
                (false, "a") => stack.push((name, Some(parse_link(body)))),
                (false, "b" | "strong" | "i" | "em" | "u") if !body.ends_with('/') => {
                    stack.push((name, None))
                }
                (true, "p" | "div" | "li") => {
                    if !rt.is_empty() {
                        rt.push("\n", current_marks(&stack));
                    }
                }
                (true, _) => {
                    if let Some(idx) = stack.iter().rposition(|(open, _)| *open == name) {
                        stack.remove(idx);
                    }
                }
                _ => {}
            }
        }

        // Block closers leave a trailing newline.
        if let Some(last) = rt.runs.last_mut() {
            while last.text.ends_with('\n') {
                last.text.pop();
            }
            if last.text.is_empty() {
                rt.runs.pop();
            }
        }
        rt
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for run in &self.runs {
            let m = &run.marks;
            if let Some(link) = &m.link {
                out.push_str("<a href=\"");
                out.push_str(&escape_attr(&link.href));
                out.push('"');
                if let Some(target) = &link.target {
                    out.push_str(" target=\"");
                    out.push_str(&escape_attr(target));
                    out.push('"');
                }
                out.push('>');
            }
            if m.bold {
                out.push_str("<strong>");
            }
            if m.italic {
                out.push_str("<em>");
            }
            if m.underline {
                out.push_str("<u>");
            }
            out.push_str(&escape_html(&run.text).replace('\n', "<br>"));
            if m.underline {
                out.push_str("</u>");
            }
            if m.italic {
                out.push_str("</em>");
            }
            if m.bold {
                out.push_str("</strong>");
            }
            if m.link.is_some() {
                out.push_str("</a>");
            }
        }
        out
    }
}

fn current_marks(stack: &[(String, Option<Link>)]) -> Marks {
    let mut marks = Marks::default();
    for (name, link) in stack {
        match name.as_str() {
            "b" | "strong" => marks.bold = true,
            "i" | "em" => marks.italic = true,
            "u" => marks.underline = true,
            "a" => marks.link = link.clone(),
            _ => {}
        }
    }
    marks
}

fn attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\b(href|target)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
            .expect("valid attribute regex")
    })
}

fn parse_link(tag_body: &str) -> Link {
    let mut link = Link::default();
    for caps in attr_regex().captures_iter(tag_body) {
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| decode_entities(m.as_str()))
            .unwrap_or_default();
        match caps[1].to_ascii_lowercase().as_str() {
            "href" => link.href = value,
            "target" => link.target = Some(value),
            _ => {}
        }
    }
    link
}

/// Escape text for inclusion in HTML content.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(text: &str) -> String {
    escape_html(text).replace('"', "&quot;")
}

pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let Some((semi, _)) = rest.char_indices().take(12).find(|(_, c)| *c == ';') else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let entity = &rest[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" | "#39" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                u32::from_str_radix(&entity[2..], 16).ok().and_then(char::from_u32)
            }
            _ if entity.starts_with('#') => entity[1..].parse().ok().and_then(char::from_u32),
            _ => None,
        };
        match decoded {
            Some(ch) => {
                out.push(ch);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text() {
        let rt = RichText::from_html("a &amp; b");
        assert_eq!(rt.plain_text(), "a & b");
        assert_eq!(rt.runs().len(), 1);
    }

    #[test]
    fn test_parse_nested_marks() {
        let rt = RichText::from_html("<b>bold <i>both</i></b> none");
        assert_eq!(rt.runs().len(), 3);
        assert!(rt.runs()[0].marks.bold && !rt.runs()[0].marks.italic);
        assert!(rt.runs()[1].marks.bold && rt.runs()[1].marks.italic);
        assert_eq!(rt.runs()[2].marks, Marks::default());
    }

    #[test]
    fn test_parse_link_attributes() {
        let rt = RichText::from_html(r#"<a href="https://x.test/?a=1&amp;b=2" target='_blank'>x</a>"#);
        let link = rt.runs()[0].marks.link.clone().unwrap();
        assert_eq!(link.href, "https://x.test/?a=1&b=2");
        assert_eq!(link.target.as_deref(), Some("_blank"));
    }

    #[test]
    fn test_block_tags_become_newlines() {
        let rt = RichText::from_html("<p>one</p><p>two</p>");
        assert_eq!(rt.plain_text(), "one\ntwo");
        assert_eq!(rt.to_html(), "one<br>two");
    }

    #[test]
    fn test_toggle_bold_round_trip() {
        let mut rt = RichText::from_html("hello");
        assert!(rt.toggle(Mark::Bold));
        assert_eq!(rt.to_html(), "<strong>hello</strong>");
        assert!(!rt.toggle(Mark::Bold));
        assert_eq!(rt.to_html(), "hello");
    }

    #[test]
    fn test_toggle_partial_bold_applies_everywhere() {
        let mut rt = RichText::from_html("<b>a</b>b");
        assert!(rt.toggle(Mark::Bold));
        assert_eq!(rt.to_html(), "<strong>ab</strong>");
    }

    #[test]
    fn test_set_link_on_middle_range() {
        let mut rt = RichText::plain("click here now");
        rt.set_link(6..10, Some(Link { href: "/x".into(), target: None }));
        assert_eq!(rt.to_html(), r#"click <a href="/x">here</a> now"#);
        rt.set_link(0..14, None);
        assert_eq!(rt.to_html(), "click here now");
    }

    #[test]
    fn test_replace_range_inserts_text() {
        let mut rt = RichText::plain("ab");
        rt.replace_range(1..1, "X", Marks { bold: true, ..Marks::default() });
        assert_eq!(rt.to_html(), "a<strong>X</strong>b");
    }

    #[test]
    fn test_multibyte_split() {
        let mut rt = RichText::plain("héllo");
        rt.set_link(1..3, Some(Link { href: "#".into(), target: None }));
        assert_eq!(rt.runs()[1].text, "él");
    }

    #[test]
    fn test_escape_round_trip() {
        let rt = RichText::plain("1 < 2 & 3 > 2");
        assert_eq!(RichText::from_html(&rt.to_html()), rt);
    }

    #[test]
    fn test_unterminated_tag_kept_as_text() {
        let rt = RichText::from_html("a <b");
        assert_eq!(rt.plain_text(), "a <b");
    }

    #[test]
    fn test_numeric_entities() {
        assert_eq!(decode_entities("&#65;&#x42;&unknown;"), "AB&unknown;");
    }

    #[test]
    fn test_ampersand_before_multibyte_text() {
        assert_eq!(RichText::from_html("& 日本語の表").plain_text(), "& 日本語の表");
        assert_eq!(decode_entities("Café &amp; crème &é;"), "Café & crème &é;");
        assert_eq!(decode_entities("&日本語の表;x"), "&日本語の表;x");
    }
}

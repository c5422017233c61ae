//! Smart punctuation transformations (smart quotes, dashes, ellipsis).

/// Post-processes rendered HTML for typography.
pub trait Typographer {
    /// Return the typographically refined HTML.
    fn apply(&self, html: &str) -> String;
}

impl<F> Typographer for F
where
    F: Fn(&str) -> String,
{
    fn apply(&self, html: &str) -> String {
        (self)(html)
    }
}

/// Default typographer: curly quotes, en/em dashes and ellipsis.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmartyPants;

impl Typographer for SmartyPants {
    fn apply(&self, html: &str) -> String {
        apply_smartypants(html)
    }
}

/// Elements whose content is never touched.
const RAW_ELEMENTS: [&str; 4] = ["code", "pre", "script", "style"];

/// Apply smartypants-style replacements to HTML, skipping tag markup,
/// code/pre/script/style elements and backtick spans.
///
/// A backtick span needs its closing backtick on the same line; a lone
/// backtick is ordinary text. `&quot;` entities count as straight double
/// quotes, since the markdown stage escapes them.
pub fn apply_smartypants(input: &str) -> String {
    if !input.contains(['"', '\'', '-']) && !input.contains("...") && !input.contains("&quot;") {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut raw_depth = 0usize;
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        let consumed = match c {
            '<' => {
                let end = rest.find('>').map_or(rest.len(), |idx| idx + 1);
                raw_depth = raw_depth_after(&rest[..end], raw_depth);
                out.push_str(&rest[..end]);
                end
            }
            _ if raw_depth > 0 => {
                out.push(c);
                c.len_utf8()
            }
            '`' => {
                let end = backtick_span_len(rest);
                out.push_str(&rest[..end]);
                end
            }
            _ => match smarten(rest, &out) {
                Some((replacement, len)) => {
                    out.push(replacement);
                    len
                }
                None => {
                    out.push(c);
                    c.len_utf8()
                }
            },
        };
        rest = &rest[consumed..];
    }

    out
}

/// Nesting of raw elements after `tag`, given the depth before it.
fn raw_depth_after(tag: &str, depth: usize) -> usize {
    let lower = tag.to_ascii_lowercase();
    let (closing, after) = match lower.strip_prefix("</") {
        Some(after) => (true, after),
        None => (false, lower.get(1..).unwrap_or_default()),
    };
    let name = after
        .split(|c: char| !c.is_ascii_alphanumeric())
        .next()
        .unwrap_or_default();
    if !RAW_ELEMENTS.contains(&name) {
        depth
    } else if closing {
        depth.saturating_sub(1)
    } else {
        depth + 1
    }
}

/// Length of the backtick span starting at `text`, or 1 when the backtick
/// has no partner on its line.
fn backtick_span_len(text: &str) -> usize {
    let line = text[1..].split('\n').next().unwrap_or_default();
    line.find('`').map_or(1, |idx| idx + 2)
}

/// The typographic replacement for the punctuation at the start of `text`
/// and how many bytes it replaces.
fn smarten(text: &str, out: &str) -> Option<(char, usize)> {
    if text.starts_with("---") {
        Some(('\u{2014}', 3))
    } else if text.starts_with("--") {
        Some(('\u{2013}', 2))
    } else if text.starts_with("...") {
        Some(('\u{2026}', 3))
    } else if text.starts_with("&quot;") {
        Some((double_quote(out), 6))
    } else if text.starts_with('"') {
        Some((double_quote(out), 1))
    } else if text.starts_with('\'') {
        let quote = if opens_quote(out) { '\u{2018}' } else { '\u{2019}' };
        Some((quote, 1))
    } else {
        None
    }
}

fn double_quote(out: &str) -> char {
    if opens_quote(out) { '\u{201c}' } else { '\u{201d}' }
}

/// Whether a quote written after `out` opens rather than closes.
fn opens_quote(out: &str) -> bool {
    let opener = |c: char| c.is_whitespace() || "([{\"'\u{2014}\u{2013}\u{201c}\u{2018}".contains(c);
    if out.is_empty() || out.ends_with(opener) {
        return true;
    }
    // Right after an opening tag such as `<p>` or `<em>`.
    out.ends_with('>')
        && out
            .rfind('<')
            .is_some_and(|start| !out[start..].starts_with("</"))
}

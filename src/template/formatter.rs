//! Markdown-like message text to HTML for previews.
//!
//! Rules run in a fixed order, each as one global non-greedy pass:
//!
//! | source | output |
//! |--------|--------|
//! | three or more `\n` | two `\n` |
//! | `\n` | `<br/>` |
//! | `*x*` | `<b>x</b>` |
//! | `_x_` | `<i>x</i>` |
//! | `~x~` | `<s>x</s>` |
//! | ```` ```x``` ```` | `<code>x</code>` |
//!
//! Markers are not re-scanned, so `**x**` renders as `<b></b>x<b></b>`.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EXCESS_NEWLINES: Regex = Regex::new(r"\n{3,}").unwrap();
    static ref BOLD: Regex = Regex::new(r"\*(.*?)\*").unwrap();
    static ref ITALIC: Regex = Regex::new(r"_(.*?)_").unwrap();
    static ref STRIKE: Regex = Regex::new(r"~(.*?)~").unwrap();
    static ref CODE: Regex = Regex::new(r"```(.*?)```").unwrap();
}

/// Format text to HTML, escaping HTML-significant characters first.
pub fn format_text(input: &str) -> String {
    apply_markup(&escape_html(input))
}

/// Format text to HTML without escaping.
///
/// Only safe for trusted input: markup in the source passes straight through.
pub fn format_text_unescaped(input: &str) -> String {
    apply_markup(input)
}

fn apply_markup(input: &str) -> String {
    let text = EXCESS_NEWLINES.replace_all(input, "\n\n");
    let text = text.replace('\n', "<br/>");
    let text = BOLD.replace_all(&text, "<b>$1</b>");
    let text = ITALIC.replace_all(&text, "<i>$1</i>");
    let text = STRIKE.replace_all(&text, "<s>$1</s>");
    CODE.replace_all(&text, "<code>$1</code>").into_owned()
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

//! Canonical, comparable form of message text.
//!
//! `normalize` folds case, strips rich-text formatting and canonicalizes
//! mentions, so two messages that differ only in markup or in who they
//! address compare equal.

use crate::mention::canonicalize_mentions;
use regex::Regex;
use std::sync::LazyLock;

/// Emphasis, strike, spoiler and code markers.
static FORMAT_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[*_~`|]+").unwrap());

/// `[label](url)` and `[label](<url>)`.
static MASKED_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]]*)\]\(<?[^()\s<>]*>?\)").unwrap());

/// Heading, sub-text and block quote prefixes, possibly stacked.
static LINE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[^\S\n]*(?:(?:>>>|>|#{1,3}|-#)[^\S\n]+)+").unwrap());

static HORIZONTAL_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").unwrap());

/// Upper bound on stabilization passes. Each rule runs to completion within
/// a pass, so extra passes only settle interactions between rules.
const MAX_PASSES: usize = 32;

/// Normalize raw message text.
///
/// `responders` are the user ids whose mentions become the placeholder
/// token (the bot at query time). The result is a fixed point of a single
/// pass, which makes `normalize` idempotent.
pub fn normalize(raw: &str, responders: &[&str]) -> String {
    let mut current = normalize_pass(raw, responders);
    for _ in 0..MAX_PASSES {
        let next = normalize_pass(&current, responders);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Remove formatting without touching case or mentions.
pub fn strip_markdown(text: &str) -> String {
    let mut unlinked = FORMAT_CHARS_RE.replace_all(text, "").into_owned();
    // Innermost links first; every replacement shrinks the text.
    while MASKED_LINK_RE.is_match(&unlinked) {
        unlinked = MASKED_LINK_RE.replace_all(&unlinked, "$1").into_owned();
    }
    LINE_PREFIX_RE.replace_all(&unlinked, "").into_owned()
}

fn normalize_pass(text: &str, responders: &[&str]) -> String {
    let lowered = text.to_lowercase();
    let stripped = strip_markdown(&lowered);
    let canonical = canonicalize_mentions(&stripped, responders);
    collapse_whitespace(&canonical)
}

fn collapse_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| HORIZONTAL_SPACE_RE.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn folds_case_and_formatting() {
        assert_eq!(normalize("**Hello** _World_", &[]), "hello world");
        assert_eq!(normalize("||spoiler|| ~~gone~~ `code`", &[]), "spoiler gone code");
    }

    #[test]
    fn strips_line_prefixes_and_links() {
        assert_eq!(normalize("# Title\n> quoted\n-# small", &[]), "title\nquoted\nsmall");
        assert_eq!(normalize("see [the docs](https://example.com)", &[]), "see the docs");
        assert_eq!(normalize("> # stacked", &[]), "stacked");
    }

    #[test]
    fn code_fences_collapse() {
        assert_eq!(normalize("```\nlet x = 1;\n```", &[]), "let x = 1;");
    }

    #[test]
    fn mentions_are_canonical() {
        assert_eq!(normalize("<@99> how are you <@5>", &["99"]), "<@0> how are you <@user>");
    }

    #[test]
    fn hashtags_are_not_headings() {
        assert_eq!(normalize("#general is busy", &[]), "#general is busy");
    }

    #[test]
    fn nested_links_unwrap_fully() {
        let once = normalize("[[inner](a)](b)", &[]);
        assert_eq!(once, "inner");
        assert_eq!(normalize(&once, &[]), once);
    }

    #[test]
    fn deeply_nested_links_unwrap_in_one_call() {
        let mut input = "x".to_string();
        for _ in 0..48 {
            input = format!("[{input}](a)");
        }
        assert_eq!(strip_markdown(&input), "x");
        let once = normalize(&input, &[]);
        assert_eq!(once, "x");
        assert_eq!(normalize(&once, &[]), once);
    }

    #[test]
    fn idempotent_on_tricky_inputs() {
        for input in [
            "",
            "# # double",
            "<@*5>",
            "[# ](x)hi",
            "  spaced\t\tout  \n\n\nlines ",
            "ΣΑΣ final sigma",
            "> >>> deep",
        ] {
            let once = normalize(input, &["5"]);
            assert_eq!(normalize(&once, &["5"]), once, "input: {input:?}");
        }
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(input in "[a-zA-Z0-9<>@!#*_~`| \\[\\]()\\-\n]{0,48}") {
            let once = normalize(&input, &["7"]);
            prop_assert_eq!(normalize(&once, &["7"]), once);
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! README tagline extraction.
//!
//! The tagline is the first line of prose: front matter, headings, badges,
//! quotes, HTML, rules, bare links and navigation rows are skipped, and
//! inline markup is stripped from the line that remains.

use std::sync::LazyLock;

use regex::Regex;

/// Lines shorter than this are not prose.
const MIN_LEN: usize = 10;
/// Longer taglines are cut to `MAX_LEN - 3` characters plus `...`.
const MAX_LEN: usize = 350;

#[allow(clippy::expect_used)]
static HORIZONTAL_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*_]{3,}$").expect("valid regex"));

#[allow(clippy::expect_used)]
static BARE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[.+\]\(.+\)$").expect("valid regex"));

#[allow(clippy::expect_used)]
static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://").expect("valid regex"));

#[allow(clippy::expect_used)]
static NAV_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[.+\](?:\(.+\))?\s*(?:[·|]\s*\[.+\](?:\(.+\))?)+$").expect("valid regex")
});

#[allow(clippy::expect_used)]
static LEADING_EMOJI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\x{1F300}-\x{1F9FF}\x{2600}-\x{27BF}]\s*").expect("valid regex")
});

/// Inline markup, applied in order, each replaced by its first group.
#[allow(clippy::expect_used)]
static MARKUP: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\*\*(.+?)\*\*", "$1"),
        (r"\*(.+?)\*", "$1"),
        (r"_(.+?)_", "$1"),
        (r"`(.+?)`", "$1"),
        (r"\[(.+?)\]\(.+?\)", "$1"),
        (r"<[^>]+>", ""),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).expect("valid regex"), replacement))
    .collect()
});

/// First prose line of a README, with markup removed.
pub fn extract(readme: &str) -> Option<String> {
    let mut delimiters = 0;
    let mut in_front_matter = false;

    for line in readme.lines() {
        let line = line.trim();

        if line == "---" && delimiters < 2 {
            delimiters += 1;
            in_front_matter = delimiters == 1;
            continue;
        }
        if in_front_matter || is_decoration(line) {
            continue;
        }

        let mut tagline = LEADING_EMOJI.replace(line, "").into_owned();
        for (pattern, replacement) in MARKUP.iter() {
            tagline = pattern.replace_all(&tagline, *replacement).into_owned();
        }
        if tagline.chars().count() > MAX_LEN {
            tagline = tagline.chars().take(MAX_LEN - 3).collect::<String>() + "...";
        }
        let tagline = tagline.trim();
        return (!tagline.is_empty()).then(|| tagline.to_string());
    }
    None
}

fn is_decoration(line: &str) -> bool {
    line.is_empty()
        || line.starts_with('#')
        || line.starts_with("![")
        || line.starts_with("[![")
        || line.starts_with('>')
        || line.starts_with('<')
        || HORIZONTAL_RULE.is_match(line)
        || BARE_LINK.is_match(line)
        || BARE_URL.is_match(line)
        || NAV_ROW.is_match(line)
        || line.chars().count() < MIN_LEN
}

#[cfg(test)]
#[path = "tagline_tests.rs"]
mod tests;

//! Turns marked-up legal study text into plain text that reads well aloud.
//!
//! The transformation is an ordered list of rewrite rules grouped in four
//! stages: markup stripping, citation expansion, abbreviation expansion and
//! whitespace cleanup. Later rules assume the earlier ones already ran. A
//! rewrite can expose a new match for an earlier rule (an outer link once the
//! inner one is gone, a glyph once spaces collapse), so the stages repeat
//! until the text stops changing.

use super::legal_terms::{ordinal_words, parse_roman, Gender, ABBREVIATIONS_BY_LENGTH};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

/// Inciso markers written without the word "inciso" are only trusted up to
/// this value; larger letter runs are usually acronyms.
const MAX_BARE_INCISO: u32 = 100;

/// Upper bound on full passes. Real content settles in two.
const MAX_PASSES: usize = 16;

const HORIZONTAL_SPACE: &str = r"[ \t\x{00A0}\x{2007}\x{202F}]+";

enum Rewrite {
    Template(&'static str),
    Expand(fn(&Captures<'_>) -> String),
}

struct Rule {
    pattern: Regex,
    rewrite: Rewrite,
}

impl Rule {
    fn template(pattern: &str, replacement: &'static str) -> Self {
        Self {
            pattern: compile(pattern),
            rewrite: Rewrite::Template(replacement),
        }
    }

    fn expand(pattern: &str, f: fn(&Captures<'_>) -> String) -> Self {
        Self {
            pattern: compile(pattern),
            rewrite: Rewrite::Expand(f),
        }
    }

    fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match &self.rewrite {
            Rewrite::Template(replacement) => self.pattern.replace_all(text, *replacement),
            Rewrite::Expand(f) => self.pattern.replace_all(text, |caps: &Captures<'_>| f(caps)),
        }
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("normalizer rule pattern must compile")
}

/// Leading list bullets, enumerations and blockquote markers, possibly stacked.
const LINE_PREFIX_PATTERN: &str = r"(?m)^[ \t]*(?:(?:[-+*•]|\d{1,3}[.)])[ \t]+|>[ \t]*)+";

static LINE_PREFIX: Lazy<Regex> = Lazy::new(|| compile(LINE_PREFIX_PATTERN));

static ROMAN_TOKEN: Lazy<Regex> = Lazy::new(|| compile(r"\b[IVXLCDM]+\b"));

const HORIZONTAL_RULE: &str = r"(?m)^[ \t]*(?:[-*_][ \t]*){3,}$";

static MARKUP_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::template(HORIZONTAL_SPACE, " "),
        Rule::template(
            r"[\p{Extended_Pictographic}\x{FE0F}\x{200D}\x{2022}\x{2190}-\x{21FF}\x{25A0}-\x{25FF}\x{2605}\x{2606}\x{2700}-\x{27BF}]",
            "",
        ),
        Rule::template(r"</?[A-Za-z][A-Za-z0-9]*(?:\s[^<>]*)?/?>", " "),
        Rule::template(r"&nbsp;", " "),
        Rule::template(r"(?m)^[ \t]*(?:```|~~~)[^\n]*$", ""),
        Rule::template(r"`([^`\n]*)`", "$1"),
        Rule::template(r"`", ""),
        Rule::template(r"!\[[^\]\n]*\]\([^)\n]*\)", ""),
        Rule::template(r"\[([^\[\]\n]*)\]\([^()\n]*\)", "$1"),
        Rule::template(r"\[([^\]\n]*)\]\[[^\]\n]*\]", "$1"),
        Rule::template(HORIZONTAL_RULE, ""),
        Rule::template(r"\*+|_{2,}|~~", ""),
        Rule::template(r"(?m)(^|[\s(\[])_+", "$1"),
        Rule::template(r"(?m)_+([\s)\].,;:!?]|$)", "$1"),
        Rule::template(LINE_PREFIX_PATTERN, ""),
        // a quoted or bulleted rule only shows up once its prefix is gone
        Rule::template(HORIZONTAL_RULE, ""),
        Rule::template(r"(?m)^[ \t]*#{1,6}[ \t]*$", ""),
        Rule::expand(r"(?m)^[ \t]*#{1,6}[ \t]+(.*?)[ \t#]*$", header_sentence),
        Rule::template(
            r"(?m)^[ \t]*\|?(?:[ \t]*:?-+:?[ \t]*\|)+(?:[ \t]*:?-+:?[ \t]*)?(?:\n|\z)",
            "",
        ),
        Rule::expand(r"(?m)^[ \t]*\|(.*)\|[ \t]*$", table_row),
    ]
});

static CITATION_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::template(r"§§[ \t]*", "parágrafos "),
        Rule::template(r"§[ \t]*[Úú]nico", "parágrafo único"),
        Rule::template(r"§[ \t]*", "parágrafo "),
        Rule::expand(r"(^|[^\p{L}\p{N}/])(\d+)[ \t]*([º°ª])(\p{L}?)", ordinal_number),
        Rule::expand(
            r"\b(incisos|Incisos|incs\.)[ \t]+([IVXLCDM]+(?:(?:[ \t]*,[ \t]*|[ \t]+(?:e|a|ou)[ \t]+)[IVXLCDM]+)*)\b",
            inciso_list,
        ),
        Rule::expand(
            r"\b(?:inciso|Inciso|inc\.)[ \t]+([IVXLCDM]+)\b([ \t]*[-–—]+[ \t]*)?",
            named_inciso,
        ),
        Rule::expand(
            r"\b(Título|TÍTULO|Capítulo|CAPÍTULO|Livro|LIVRO|Parte|PARTE|Seção|SEÇÃO|Subseção|SUBSEÇÃO)[ \t]+([IVXLCDM]+)\b",
            division_heading,
        ),
        Rule::expand(r"\b([IVXLCDM]+)[ \t]*[-–—]+[ \t]+", bare_inciso),
        Rule::template(
            r#"(?m)(^|[ \t,;:])(?:(?:[Aa]l[íi]nea|al\.)[ \t]+)?["“']?([a-z])["”']?\)"#,
            "${1}alínea ${2}",
        ),
        Rule::template(r"(?m)(^|[ \t])\(([a-z])\)", "${1}alínea ${2}"),
    ]
});

static WHITESPACE_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::template(HORIZONTAL_SPACE, " "),
        Rule::template(r"(?m)^ +| +$", ""),
        Rule::template(r"\n{3,}", "\n\n"),
    ]
});

/// Normalize legal study text for narration.
///
/// Pure and total: unknown symbols pass through untouched, and applying it
/// twice yields the same text as applying it once.
pub fn normalize(text: &str) -> String {
    let mut out = text.replace("\r\n", "\n").replace('\r', "\n");

    for _ in 0..MAX_PASSES {
        let next = normalize_pass(&out);
        if next == out {
            break;
        }
        out = next;
    }

    out
}

fn normalize_pass(text: &str) -> String {
    let mut out = text.to_string();

    for rule in MARKUP_RULES.iter().chain(CITATION_RULES.iter()) {
        out = rule.apply(&out).into_owned();
    }

    out = expand_abbreviations(&out);

    for rule in WHITESPACE_RULES.iter() {
        out = rule.apply(&out).into_owned();
    }

    out.trim().to_string()
}

/// Longest-match-first dictionary substitution on token boundaries.
fn expand_abbreviations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    let mut i = 0;

    while i < text.len() {
        let rest = &text[i..];

        if prev.map_or(true, |c| !c.is_alphanumeric()) {
            let found = ABBREVIATIONS_BY_LENGTH
                .iter()
                .find(|(abbr, _)| abbreviation_at(rest, abbr));

            if let Some((abbr, expansion)) = found {
                out.push_str(expansion);
                i += abbr.len();
                prev = expansion.chars().last();

                // "Art.5" -> "Artigo 5"
                if text[i..].chars().next().map_or(false, char::is_alphanumeric) {
                    out.push(' ');
                    prev = Some(' ');
                }
                continue;
            }
        }

        let Some(c) = rest.chars().next() else {
            break;
        };
        out.push(c);
        prev = Some(c);
        i += c.len_utf8();
    }

    out
}

fn abbreviation_at(rest: &str, abbr: &str) -> bool {
    if !rest.starts_with(abbr) {
        return false;
    }
    let ends_in_word = abbr.chars().last().map_or(false, char::is_alphanumeric);
    !ends_in_word
        || rest[abbr.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric())
}

fn ends_with_terminal(text: &str) -> bool {
    text.ends_with(&['.', '!', '?', ':', ';'][..])
}

fn as_sentence(text: &str) -> String {
    let text = LINE_PREFIX.replace(text.trim(), "");
    let text = text.trim();
    if text.is_empty() || ends_with_terminal(text) {
        text.to_string()
    } else {
        format!("{}.", text)
    }
}

fn header_sentence(caps: &Captures<'_>) -> String {
    as_sentence(&caps[1])
}

fn table_row(caps: &Captures<'_>) -> String {
    let cells: Vec<&str> = caps[1]
        .split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .collect();
    as_sentence(&cells.join(", "))
}

fn ordinal_number(caps: &Captures<'_>) -> String {
    let (prefix, digits, glyph, next) = (&caps[1], &caps[2], &caps[3], &caps[4]);

    // "30°C" is a temperature
    if glyph == "°" && !next.is_empty() {
        return caps[0].to_string();
    }

    let gender = if glyph == "ª" {
        Gender::Feminine
    } else {
        Gender::Masculine
    };
    let spoken = digits
        .parse::<u32>()
        .ok()
        .and_then(|n| ordinal_words(n, gender))
        .unwrap_or_else(|| digits.to_string());

    if next.is_empty() {
        format!("{}{}", prefix, spoken)
    } else {
        format!("{}{} {}", prefix, spoken, next)
    }
}

fn roman_ordinal(token: &str, gender: Gender, max: u32) -> Option<String> {
    parse_roman(token)
        .filter(|n| *n <= max)
        .and_then(|n| ordinal_words(n, gender))
}

fn inciso_list(caps: &Captures<'_>) -> String {
    let items = ROMAN_TOKEN.replace_all(&caps[2], |item: &Captures<'_>| {
        roman_ordinal(&item[0], Gender::Masculine, u32::MAX).unwrap_or_else(|| item[0].to_string())
    });
    let label = if &caps[1] == "Incisos" { "Incisos" } else { "incisos" };
    format!("{} {}", label, items)
}

fn named_inciso(caps: &Captures<'_>) -> String {
    match roman_ordinal(&caps[1], Gender::Masculine, u32::MAX) {
        Some(ordinal) if caps.get(2).is_some() => format!("inciso {}, ", ordinal),
        Some(ordinal) => format!("inciso {}", ordinal),
        None => caps[0].to_string(),
    }
}

fn division_heading(caps: &Captures<'_>) -> String {
    let gender = match caps[1].to_lowercase().as_str() {
        "parte" | "seção" | "subseção" => Gender::Feminine,
        _ => Gender::Masculine,
    };
    match roman_ordinal(&caps[2], gender, u32::MAX) {
        Some(ordinal) => format!("{} {}", &caps[1], ordinal),
        None => caps[0].to_string(),
    }
}

fn bare_inciso(caps: &Captures<'_>) -> String {
    match roman_ordinal(&caps[1], Gender::Masculine, MAX_BARE_INCISO) {
        Some(ordinal) => format!("inciso {}, ", ordinal),
        None => caps[0].to_string(),
    }
}

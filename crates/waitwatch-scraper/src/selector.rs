//! Locating the wait-count element on a store page and reading a number
//! out of its text.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector as CssSelector};
use waitwatch_core::{Selector, SelectorKind};

use crate::error::ScraperError;

static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9０-９]+").expect("valid regex"));

/// Returns the trimmed text of the first element matching `selector`.
///
/// # Errors
///
/// - [`ScraperError::InvalidSelector`] if the selector cannot be compiled
///   (including XPath outside the supported subset).
/// - [`ScraperError::NoMatch`] if no element matches.
pub fn extract_wait_text(html: &str, selector: &Selector) -> Result<String, ScraperError> {
    let css = to_css(selector)?;
    let compiled = CssSelector::parse(&css).map_err(|e| ScraperError::InvalidSelector {
        selector: selector.value.clone(),
        reason: e.to_string(),
    })?;

    let document = Html::parse_document(html);
    let element = document
        .select(&compiled)
        .next()
        .ok_or_else(|| ScraperError::NoMatch {
            selector: selector.value.clone(),
        })?;

    Ok(element.text().collect::<String>().trim().to_string())
}

fn to_css(selector: &Selector) -> Result<String, ScraperError> {
    match selector.kind {
        SelectorKind::Css => Ok(selector.value.trim().to_string()),
        SelectorKind::Class => {
            let css: String = selector
                .value
                .split_whitespace()
                .map(|class| format!(".{class}"))
                .collect();
            if css.is_empty() {
                return Err(ScraperError::InvalidSelector {
                    selector: selector.value.clone(),
                    reason: "empty class name".to_string(),
                });
            }
            Ok(css)
        }
        SelectorKind::Xpath => xpath_to_css(&selector.value),
    }
}

/// Reads a queue length out of element text.
///
/// A lone `-` means nobody is waiting. Otherwise the first run of digits
/// (ASCII or full-width) is the count, so `"3組"` and `"待ち ３ 人"` both
/// read as 3. Text without digits, or a number too large for `u32`, is `None`.
#[must_use]
pub fn parse_wait_count(text: &str) -> Option<u32> {
    let text = text.trim();
    if text == "-" {
        return Some(0);
    }
    let digits: String = DIGITS
        .find(text)?
        .as_str()
        .chars()
        .map(|c| match c {
            '０'..='９' => char::from_digit(c as u32 - '０' as u32, 10).unwrap_or(c),
            _ => c,
        })
        .collect();
    digits.parse().ok()
}

/// Translates an absolute XPath location path into an equivalent CSS
/// selector.
///
/// Supported: `/` and `//` axes, element names or `*`, positional
/// predicates `[n]`, attribute predicates `[@a]`, `[@a='v']`, and
/// `[contains(@a,'v')]`. A trailing `/text()` step is ignored.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidSelector`] for anything outside that subset.
pub fn xpath_to_css(xpath: &str) -> Result<String, ScraperError> {
    let invalid = |reason: &str| ScraperError::InvalidSelector {
        selector: xpath.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = xpath.trim();
    let path = trimmed.strip_suffix("/text()").unwrap_or(trimmed);
    if !path.starts_with('/') {
        return Err(invalid("xpath must be an absolute path"));
    }

    let chars: Vec<char> = path.chars().collect();
    let mut css = String::new();
    let mut i = 0;

    while i < chars.len() {
        let descendant = chars.get(i + 1) == Some(&'/');
        i += if descendant { 2 } else { 1 };
        if !css.is_empty() {
            css.push_str(if descendant { " " } else { " > " });
        }

        let start = i;
        while i < chars.len() && is_name_char(chars[i]) {
            i += 1;
        }
        let name: String = chars[start..i].iter().collect();
        if name.is_empty() {
            return Err(invalid("empty location step"));
        }
        if name.contains('*') && name != "*" {
            return Err(invalid("wildcard must stand alone"));
        }
        css.push_str(&name);

        while chars.get(i) == Some(&'[') {
            let (predicate, next) =
                read_predicate(&chars, i + 1).ok_or_else(|| invalid("unterminated predicate"))?;
            let translated = translate_predicate(predicate.trim(), &name)
                .ok_or_else(|| invalid(&format!("unsupported predicate [{predicate}]")))?;
            css.push_str(&translated);
            i = next;
        }

        if i < chars.len() && chars[i] != '/' {
            return Err(invalid(&format!("unexpected character '{}'", chars[i])));
        }
    }

    if css.is_empty() {
        return Err(invalid("no location steps"));
    }
    Ok(css)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '*' | '-' | '_')
}

/// Reads predicate text starting just after `[` up to the matching `]`,
/// skipping brackets inside quoted literals. Returns the text and the index
/// after the closing bracket.
fn read_predicate(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut quote: Option<char> = None;
    for (offset, &c) in chars[start..].iter().enumerate() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (None, '\'' | '"') => quote = Some(c),
            (None, ']') => {
                let text = chars[start..start + offset].iter().collect();
                return Some((text, start + offset + 1));
            }
            _ => {}
        }
    }
    None
}

fn translate_predicate(predicate: &str, element: &str) -> Option<String> {
    if let Ok(position) = predicate.parse::<u32>() {
        if position == 0 {
            return None;
        }
        let pseudo = if element == "*" {
            "nth-child"
        } else {
            "nth-of-type"
        };
        return Some(format!(":{pseudo}({position})"));
    }

    if let Some(args) = predicate
        .strip_prefix("contains(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let (attr, value) = args.split_once(',')?;
        let attr = attr.trim().strip_prefix('@')?;
        let value = unquote(value.trim())?;
        return Some(format!("[{}*=\"{}\"]", attr_name(attr)?, escape(value)));
    }

    let attr = predicate.strip_prefix('@')?;
    match attr.split_once('=') {
        None => Some(format!("[{}]", attr_name(attr.trim())?)),
        Some((name, value)) => {
            let value = unquote(value.trim())?;
            Some(format!("[{}=\"{}\"]", attr_name(name.trim())?, escape(value)))
        }
    }
}

fn attr_name(name: &str) -> Option<&str> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'));
    valid.then_some(name)
}

fn unquote(literal: &str) -> Option<&str> {
    ['\'', '"'].into_iter().find_map(|quote| {
        literal
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
            .filter(|inner| !inner.contains(quote))
    })
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
#[path = "selector_test.rs"]
mod tests;

//! Pattern resolution and compilation.
//!
//! Patterns use `regex` syntax and match anywhere in the subject. When
//! interpolation is enabled, `%{name}` references are replaced with the
//! current value of field `name` before the pattern is compiled.

use std::borrow::Cow;
use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::event::Event;
use crate::error::{AppError, Result};

/// Matches a `%{name}` template reference.
static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%\{([^}]+)\}").expect("reference pattern is valid"));

/// Stand-in used to validate templated patterns at build time.
const PLACEHOLDER: &str = "_";

/// Resolves the `%{name}` references in `pattern` against `event`.
///
/// Sequence values are joined with a comma. References to fields the event
/// does not have are left as they are.
pub fn resolve<'a>(pattern: &'a str, event: &Event, interpolate: bool) -> Cow<'a, str> {
    if !interpolate || !REFERENCE.is_match(pattern) {
        return Cow::Borrowed(pattern);
    }

    REFERENCE.replace_all(pattern, |caps: &Captures| match event.get(reference_name(&caps[1])) {
        Some(value) => value.interpolated().into_owned(),
        None => caps[0].to_string(),
    })
}

/// `%{[name]}` is accepted as a spelling of `%{name}`.
fn reference_name(inner: &str) -> &str {
    inner
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .filter(|s| !s.contains(['[', ']']))
        .unwrap_or(inner)
}

/// Compiles `pattern`, treating braces that are not part of a counted
/// repetition or an escape as literal characters.
pub fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(&escape_literal_braces(pattern)).map_err(|e| AppError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

fn escape_literal_braces(pattern: &str) -> Cow<'_, str> {
    if !pattern.contains(['{', '}']) {
        return Cow::Borrowed(pattern);
    }

    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut in_class = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                out.push(c);
                i += 1;
                let Some(&next) = chars.get(i) else { break };
                out.push(next);
                i += 1;
                // \p{..}, \P{..}, \x{..}, \u{..}, \U{..} own their braces
                if matches!(next, 'p' | 'P' | 'x' | 'u' | 'U') && chars.get(i) == Some(&'{') {
                    while i < chars.len() {
                        out.push(chars[i]);
                        i += 1;
                        if chars[i - 1] == '}' {
                            break;
                        }
                    }
                }
            }
            '[' if !in_class => {
                in_class = true;
                out.push(c);
                i += 1;
                if chars.get(i) == Some(&'^') {
                    out.push('^');
                    i += 1;
                }
                // a leading ']' is a literal member of the class
                if chars.get(i) == Some(&']') {
                    out.push(']');
                    i += 1;
                }
            }
            ']' if in_class => {
                in_class = false;
                out.push(c);
                i += 1;
            }
            '{' if !in_class => {
                let repeatable = matches!(out.chars().last(), Some(prev) if prev != '(' && prev != '|');
                match counted_repetition_len(&chars[i..]) {
                    Some(len) if repeatable => {
                        out.extend(&chars[i..i + len]);
                        i += len;
                    }
                    _ => {
                        out.push_str("\\{");
                        i += 1;
                    }
                }
            }
            '}' if !in_class => {
                out.push_str("\\}");
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    Cow::Owned(out)
}

/// Length of a `{n}`, `{n,}` or `{n,m}` quantifier at the start of `chars`.
fn counted_repetition_len(chars: &[char]) -> Option<usize> {
    let mut i = 1;
    let digits_start = i;
    while chars.get(i).is_some_and(char::is_ascii_digit) {
        i += 1;
    }
    if i == digits_start {
        return None;
    }
    if chars.get(i) == Some(&',') {
        i += 1;
        while chars.get(i).is_some_and(char::is_ascii_digit) {
            i += 1;
        }
    }
    (chars.get(i) == Some(&'}')).then_some(i + 1)
}

/// A configured pattern, compiled once at build time when it can be.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    compiled: Option<Regex>,
}

impl Pattern {
    /// Builds a pattern. With `interpolate` set, patterns holding references
    /// are validated here and compiled per event.
    pub fn new(raw: &str, interpolate: bool) -> Result<Self> {
        if interpolate && REFERENCE.is_match(raw) {
            let placeholder = REFERENCE.replace_all(raw, PLACEHOLDER);
            compile(&placeholder).map_err(|e| match e {
                AppError::InvalidPattern { reason, .. } => AppError::InvalidPattern {
                    pattern: raw.to_string(),
                    reason,
                },
                other => other,
            })?;
            return Ok(Self { raw: raw.to_string(), compiled: None });
        }

        Ok(Self { raw: raw.to_string(), compiled: Some(compile(raw)?) })
    }

    pub fn is_templated(&self) -> bool {
        self.compiled.is_none()
    }
}

/// Resolves patterns against one event. Lives for a single stage of a
/// single invocation; templated patterns are compiled at most once per
/// resolved string.
pub(crate) struct Resolver<'e> {
    event: &'e Event,
    cache: HashMap<String, Option<Regex>>,
}

impl<'e> Resolver<'e> {
    pub(crate) fn new(event: &'e Event) -> Self {
        Self { event, cache: HashMap::new() }
    }

    /// `None` when the resolved pattern does not compile; such a pattern
    /// matches nothing.
    pub(crate) fn resolve<'p>(&mut self, pattern: &'p Pattern) -> Option<Cow<'p, Regex>> {
        if let Some(regex) = &pattern.compiled {
            return Some(Cow::Borrowed(regex));
        }

        let resolved = resolve(&pattern.raw, self.event, true).into_owned();
        let compiled = self.cache.entry(resolved).or_insert_with_key(|resolved| {
            match compile(resolved) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    tracing::warn!("Pattern '{}' does not compile after interpolation: {}", pattern.raw, e);
                    None
                }
            }
        });

        compiled.clone().map(Cow::Owned)
    }

    pub(crate) fn resolve_all<'p>(&mut self, patterns: &'p [Pattern]) -> Vec<Cow<'p, Regex>> {
        patterns.iter().filter_map(|p| self.resolve(p)).collect()
    }
}

use std::borrow::Cow;

use regex::Regex;

use super::event::Event;
use super::pattern::{Pattern, Resolver};
use super::PruneFilter;
use crate::error::Result;

/// A name pattern paired with the value pattern it enforces.
#[derive(Debug, Clone)]
pub struct ValueRule {
    name: Pattern,
    value: Pattern,
}

impl ValueRule {
    pub fn new(name: &str, value: &str, interpolate: bool) -> Result<Self> {
        Ok(Self {
            name: Pattern::new(name, interpolate)?,
            value: Pattern::new(value, interpolate)?,
        })
    }
}

struct ResolvedRule<'p> {
    name: Option<Cow<'p, Regex>>,
    value: Option<Cow<'p, Regex>>,
}

fn resolve_rules<'p>(rules: &'p [ValueRule], resolver: &mut Resolver<'_>) -> Vec<ResolvedRule<'p>> {
    rules
        .iter()
        .map(|rule| ResolvedRule {
            name: resolver.resolve(&rule.name),
            value: resolver.resolve(&rule.value),
        })
        .collect()
}

/// Value patterns of the rules naming `field`, or `None` when no rule does.
fn value_patterns<'a>(rules: &'a [ResolvedRule<'_>], field: &str) -> Option<Vec<&'a Regex>> {
    let mut applies = false;
    let mut patterns = Vec::new();

    for rule in rules {
        if rule.name.as_ref().is_some_and(|re| re.is_match(field)) {
            applies = true;
            if let Some(value) = &rule.value {
                patterns.push(&**value);
            }
        }
    }

    applies.then_some(patterns)
}

impl PruneFilter {
    /// Narrows fields named by the value maps. Whitelisted values are kept
    /// first, then blacklisted values are removed from what is left.
    /// Sequence fields lose only the offending elements and are dropped
    /// once empty. Fields no rule names are untouched.
    ///
    /// Patterns are resolved against the event as it is when the stage starts.
    pub fn filter_values(&self, event: &mut Event) {
        if self.whitelist_values.is_empty() && self.blacklist_values.is_empty() {
            return;
        }

        let (whitelist, blacklist) = {
            let mut resolver = Resolver::new(event);
            (
                resolve_rules(&self.whitelist_values, &mut resolver),
                resolve_rules(&self.blacklist_values, &mut resolver),
            )
        };

        event.retain_named(|name, value| {
            if let Some(allowed) = value_patterns(&whitelist, name) {
                if !value.retain(|v| allowed.iter().any(|re| re.is_match(v))) {
                    tracing::trace!("Dropping field '{}': no whitelisted value", name);
                    return false;
                }
            }
            if let Some(denied) = value_patterns(&blacklist, name) {
                if !value.retain(|v| !denied.iter().any(|re| re.is_match(v))) {
                    tracing::trace!("Dropping field '{}': every value blacklisted", name);
                    return false;
                }
            }
            true
        });
    }
}

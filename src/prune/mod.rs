//! Field pruning for structured events.
//!
//! A [`PruneFilter`] is compiled once from a [`PruneConfig`] and applied to
//! any number of events. Each call first filters fields by name, then
//! narrows the surviving fields by value:
//!
//! ```
//! use prunegate::prune::{Event, FieldValue, PruneConfig};
//!
//! let config = PruneConfig {
//!     whitelist_values: vec![("status", "^(1|2|3)")].into_iter().collect(),
//!     ..Default::default()
//! };
//! let filter = config.build().unwrap();
//!
//! let mut event = Event::new();
//! event.insert("status", vec!["100", "200", "300", "400", "500"]);
//! filter.prune(&mut event);
//!
//! assert_eq!(event.get("status"), Some(&FieldValue::from(vec!["100", "200", "300"])));
//! ```

pub mod config;
pub mod event;
pub mod names;
pub mod pattern;
pub mod values;

pub use config::{PruneConfig, ValuePatternMap, UNRESOLVED_REFERENCE};
pub use event::{Event, Field, FieldValue};
pub use pattern::{resolve, Pattern};

use crate::error::Result;
use values::ValueRule;

/// Compiled prune rules. Immutable after construction and safe to share
/// between tasks.
#[derive(Debug, Clone)]
pub struct PruneFilter {
    whitelist_names: Vec<Pattern>,
    blacklist_names: Vec<Pattern>,
    whitelist_values: Vec<ValueRule>,
    blacklist_values: Vec<ValueRule>,
    interpolate: bool,
}

impl PruneFilter {
    pub fn new(config: &PruneConfig) -> Result<Self> {
        let interpolate = config.interpolate;

        let compile_names = |patterns: &[String]| -> Result<Vec<Pattern>> {
            patterns.iter().map(|p| Pattern::new(p, interpolate)).collect()
        };
        let compile_values = |map: &ValuePatternMap| -> Result<Vec<ValueRule>> {
            map.iter().map(|(n, v)| ValueRule::new(n, v, interpolate)).collect()
        };

        let filter = Self {
            whitelist_names: compile_names(config.whitelist_names.as_slice())?,
            blacklist_names: compile_names(config.blacklist_names.as_slice())?,
            whitelist_values: compile_values(&config.whitelist_values)?,
            blacklist_values: compile_values(&config.blacklist_values)?,
            interpolate,
        };

        tracing::debug!(
            "Compiled prune filter: {} whitelisted names, {} blacklisted names, {} whitelisted values, {} blacklisted values, interpolate={}",
            filter.whitelist_names.len(),
            filter.blacklist_names.len(),
            filter.whitelist_values.len(),
            filter.blacklist_values.len(),
            filter.interpolate,
        );

        Ok(filter)
    }

    /// Applies the name stage, then the value stage, to `event` in place.
    pub fn prune(&self, event: &mut Event) {
        self.filter_names(event);
        self.filter_values(event);
    }
}

/// Compiles `config` and prunes a single event with it.
pub fn prune(event: &mut Event, config: &PruneConfig) -> Result<()> {
    PruneFilter::new(config)?.prune(event);
    Ok(())
}

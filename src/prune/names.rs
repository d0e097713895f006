use super::event::Event;
use super::pattern::Resolver;
use super::PruneFilter;

impl PruneFilter {
    /// Removes fields whose name is not whitelisted or is blacklisted.
    /// A blacklist match always wins.
    ///
    /// Patterns are resolved against the event as it is when the stage starts.
    pub fn filter_names(&self, event: &mut Event) {
        if self.whitelist_names.is_empty() && self.blacklist_names.is_empty() {
            return;
        }

        let (whitelist, blacklist) = {
            let mut resolver = Resolver::new(event);
            (
                resolver.resolve_all(&self.whitelist_names),
                resolver.resolve_all(&self.blacklist_names),
            )
        };
        let restricted = !self.whitelist_names.is_empty();

        event.retain_named(|name, _| {
            if restricted && !whitelist.iter().any(|re| re.is_match(name)) {
                tracing::trace!("Dropping field '{}': name not whitelisted", name);
                return false;
            }
            if blacklist.iter().any(|re| re.is_match(name)) {
                tracing::trace!("Dropping field '{}': name blacklisted", name);
                return false;
            }
            true
        });
    }
}

//! Selector: applies the rule set to enumerated resources

use snapsweep_common::{Resource, RuleSet};
use tracing::debug;

/// Identifiers of every resource the rules include, in enumeration order.
///
/// No sorting or deduplication is done.
pub fn select(resources: &[Resource], rules: &RuleSet) -> Vec<String> {
    resources
        .iter()
        .filter(|resource| match rules.evaluate(resource) {
            Ok(()) => true,
            Err(reason) => {
                debug!(identifier = %resource.identifier, %reason, "Skipping");
                false
            }
        })
        .map(|resource| resource.identifier.clone())
        .collect()
}

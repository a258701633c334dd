// Ordered, idempotent merge of configuration fragments onto a server factory

use apimount_core::{PathResolver, ResolvedPath, Result};
use std::sync::Arc;
use tracing::debug;

use crate::component::append_unique;
use crate::factory::ServerFactory;
use crate::fragment::{ConfigFragment, FragmentConfig};

/// Order fragments for application: every fragment that applies to all
/// servers comes first, otherwise input order is kept.
pub fn ordered(fragments: &[ConfigFragment]) -> Vec<&ConfigFragment> {
    let mut ordered: Vec<&ConfigFragment> = fragments.iter().collect();
    ordered.sort_by_key(|fragment| !fragment.applies_to_all());
    ordered
}

/// Apply one fragment's configuration to `target`.
///
/// Lists gain only components not already present (by identity), properties
/// are overwritten key by key, and a supplied bus replaces the current one.
pub fn apply(config: &FragmentConfig, target: &mut ServerFactory) {
    if let Some(bus) = config.bus() {
        target.bus = Some(Arc::clone(bus));
    }

    append_unique(&mut target.features, config.features());
    append_unique(&mut target.in_interceptors, config.in_interceptors());
    append_unique(&mut target.out_interceptors, config.out_interceptors());
    append_unique(&mut target.in_fault_interceptors, config.in_fault_interceptors());
    append_unique(&mut target.out_fault_interceptors, config.out_fault_interceptors());
    append_unique(&mut target.providers, config.providers());

    for (key, value) in config.properties() {
        target.properties.insert(key.clone(), value.clone());
    }
}

/// Applies configuration fragments to server factories.
#[derive(Debug, Clone)]
pub struct MergeEngine {
    resolver: Arc<dyn PathResolver>,
}

impl MergeEngine {
    pub fn new(resolver: Arc<dyn PathResolver>) -> Self {
        MergeEngine { resolver }
    }

    /// Merge every fragment applicable to `key` into `target`, in priority order.
    ///
    /// A missing target is skipped. Returns the number of fragments applied.
    pub fn merge(
        &self,
        target: Option<&mut ServerFactory>,
        fragments: &[ConfigFragment],
        key: &ResolvedPath,
    ) -> Result<usize> {
        let Some(target) = target else {
            debug!("No server factory for {}, skipping {} fragments", key, fragments.len());
            return Ok(0);
        };

        let mut applied = 0;
        for fragment in ordered(fragments) {
            if fragment.applies_to(self.resolver.as_ref(), key)? {
                debug!("Applying fragment '{}' to {}", fragment.name(), key);
                apply(fragment.config(), target);
                applied += 1;
            } else {
                debug!("Fragment '{}' does not target {}", fragment.name(), key);
            }
        }
        Ok(applied)
    }

    /// Merge using the factory's own path as the key.
    pub fn customize(
        &self,
        target: &mut ServerFactory,
        fragments: &[ConfigFragment],
    ) -> Result<usize> {
        let key = target.path().clone();
        self.merge(Some(target), fragments, &key)
    }
}

// Interface alias -> canonical port name remapping

use crate::counters_db::RawCounters;
use std::collections::HashMap;

/// Rewrites interface-alias keys to canonical port names. Identity-preserving
/// for already-canonical names; never drops entries.
#[derive(Debug, Default, Clone)]
pub struct PortAliasMap {
    aliases: HashMap<String, String>,
}

impl PortAliasMap {
    pub fn new(aliases: HashMap<String, String>) -> Self {
        Self { aliases }
    }

    /// Canonical port name for `name`, or `name` itself when it is not a
    /// known alias.
    pub fn canonical_port<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Remap the interface segment (text before the first ':') of every
    /// queue key. Queue index and any trailing marker are preserved.
    pub fn remap_queues(&self, raw: RawCounters) -> RawCounters {
        raw.into_iter()
            .map(|(queue_key, counters)| {
                let remapped = match queue_key.split_once(':') {
                    Some((iface, rest)) => format!("{}:{}", self.canonical_port(iface), rest),
                    None => self.canonical_port(&queue_key).to_string(),
                };
                (remapped, counters)
            })
            .collect()
    }
}

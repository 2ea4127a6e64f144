//! Maps free-text channel names onto canonical display names

use super::aliases::AliasTable;

/// Alias-table driven name normalizer
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    aliases: AliasTable,
    lowered_keys: Vec<(String, String)>,
}

impl NameNormalizer {
    pub fn new(aliases: AliasTable) -> Self {
        let lowered_keys = aliases
            .iter()
            .map(|(variant, canonical)| (variant.to_lowercase(), canonical.to_string()))
            .collect();
        Self {
            aliases,
            lowered_keys,
        }
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Canonical display name for `raw_name`, or `raw_name` itself when unknown
    ///
    /// Lookup order: exact key, case-insensitive key, then case-insensitive
    /// substring in either direction. The substring pass returns the first
    /// table entry that hits, so e.g. `"CCTV10 高清"` resolves through the
    /// `cctv1` entry. Kept as-is for compatibility with existing guides.
    pub fn normalize(&self, raw_name: &str) -> String {
        let lowered = raw_name.trim().to_lowercase();
        if lowered.is_empty() {
            return raw_name.to_string();
        }

        if let Some(canonical) = self.aliases.get(raw_name) {
            return canonical.to_string();
        }

        if let Some((_, canonical)) = self.lowered_keys.iter().find(|(key, _)| *key == lowered) {
            return canonical.clone();
        }

        if let Some((_, canonical)) = self
            .lowered_keys
            .iter()
            .find(|(key, _)| lowered.contains(key.as_str()) || key.contains(lowered.as_str()))
        {
            return canonical.clone();
        }

        raw_name.to_string()
    }
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new(AliasTable::builtin())
    }
}

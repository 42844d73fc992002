use std::collections::HashSet;

use shared::domain::{ClassMapCombination, CombinationId};

use crate::{
    parser::{parse_script_name, GameClass, KnownMap},
    CatalogError,
};

/// One selectable combination together with the parsed variants the action
/// router dispatches on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub combination: ClassMapCombination,
    pub class: GameClass,
    pub map: Option<KnownMap>,
}

impl CatalogEntry {
    pub fn id(&self) -> &CombinationId {
        &self.combination.id
    }
}

/// Immutable set of class+map combinations derived from script names.
#[derive(Debug, Clone, Default)]
pub struct CombinationCatalog {
    entries: Vec<CatalogEntry>,
}

impl CombinationCatalog {
    /// Builds the catalog from `(script_name, has_image)` pairs, keeping their
    /// order. Names that do not parse are skipped.
    pub fn from_scripts<I, S>(scripts: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for (script_name, has_image) in scripts {
            let script_name = script_name.as_ref();
            let Some(parsed) = parse_script_name(script_name) else {
                continue;
            };
            if !seen.insert(parsed.stem.clone()) {
                continue;
            }
            entries.push(CatalogEntry {
                combination: ClassMapCombination {
                    id: CombinationId(parsed.stem),
                    class_name: parsed.class.display_name().to_string(),
                    map_name: parsed.map_name,
                    script_name: script_name.to_string(),
                    has_image,
                },
                class: parsed.class,
                map: parsed.map,
            });
        }
        Self { entries }
    }

    pub fn list(&self) -> Vec<ClassMapCombination> {
        self.entries
            .iter()
            .map(|entry| entry.combination.clone())
            .collect()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn resolve(&self, id: &CombinationId) -> Result<&CatalogEntry, CatalogError> {
        self.entries
            .iter()
            .find(|entry| entry.id() == id)
            .ok_or_else(|| CatalogError::NotFound(format!("combination '{id}' not found")))
    }

    pub fn contains(&self, id: &CombinationId) -> bool {
        self.resolve(id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;

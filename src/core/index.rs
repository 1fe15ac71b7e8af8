//! Purpose: In-memory lookup tables built from one scan of a villager file.
//! Exports: `VillagerIndex`.
//! Role: Answers the same queries as `VillagerFile` without re-reading the file.
//! Invariants: Answers match a fresh scan of the same file contents.
//! Invariants: The index is a caller-owned snapshot; it never re-reads or refreshes itself.
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::core::error::Error;
use crate::core::query::{HobbyGroups, VillagerFile, unknown_villager_error};
use crate::core::record::{SpeciesFilter, VillagerRecord};

#[derive(Clone, Debug, Default)]
pub struct VillagerIndex {
    path: PathBuf,
    records: Vec<VillagerRecord>,
    by_name: BTreeMap<String, usize>,
    by_species: BTreeMap<String, Vec<String>>,
    by_personality: BTreeMap<String, BTreeSet<String>>,
    by_hobby: HobbyGroups,
    all_names: Vec<String>,
}

impl VillagerIndex {
    /// Build an index with the default line policy.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        VillagerFile::new(path.as_ref()).index()
    }

    pub(crate) fn empty(path: PathBuf) -> Self {
        Self {
            path,
            ..Self::default()
        }
    }

    pub(crate) fn insert(&mut self, record: VillagerRecord) {
        let position = self.records.len();
        self.by_name.entry(record.name.clone()).or_insert(position);
        self.by_species
            .entry(record.species.clone())
            .or_default()
            .push(record.name.clone());
        self.by_personality
            .entry(record.personality.clone())
            .or_default()
            .insert(record.name.clone());
        if let Some(hobby) = record.hobby_bucket() {
            self.by_hobby[hobby.index()].push(record.name.clone());
        }
        self.all_names.push(record.name.clone());
        self.records.push(record);
    }

    pub(crate) fn finish(&mut self) {
        for names in self.by_species.values_mut() {
            names.sort();
        }
        for names in self.by_hobby.iter_mut() {
            names.sort();
        }
        self.all_names.sort();
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&VillagerRecord> {
        self.by_name.get(name).map(|&position| &self.records[position])
    }

    pub fn species_set(&self) -> BTreeSet<String> {
        self.by_species.keys().cloned().collect()
    }

    pub fn villagers_by_species(&self, filter: &SpeciesFilter) -> Vec<String> {
        match filter {
            SpeciesFilter::Any => self.all_names.clone(),
            SpeciesFilter::Only(species) => {
                self.by_species.get(species).cloned().unwrap_or_default()
            }
        }
    }

    pub fn names_by_hobby(&self) -> HobbyGroups {
        self.by_hobby.clone()
    }

    pub fn all_records(&self) -> &[VillagerRecord] {
        &self.records
    }

    pub fn find_motto(&self, name: &str) -> Option<&str> {
        self.get(name).map(|record| record.saying.as_str())
    }

    pub fn likeminded(&self, name: &str) -> Result<BTreeSet<String>, Error> {
        let record = self
            .get(name)
            .ok_or_else(|| unknown_villager_error(name, &self.path))?;
        Ok(self
            .by_personality
            .get(&record.personality)
            .cloned()
            .unwrap_or_default())
    }
}

//! Purpose: The six villager queries, each answered by one fresh scan of the file.
//! Exports: `VillagerFile`, `HobbyGroups`, and path-taking free functions for each query.
//! Role: Data access layer used by the CLI, the index, and library callers.
//! Invariants: No state survives between calls; repeated calls on an unmodified file agree.
//! Invariants: Name lookups are exact and the first matching record wins.
//! Invariants: An unknown name is `Ok(None)` for mottos and `NotFound` for likeminded.
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::error::{Error, ErrorKind};
use crate::core::index::VillagerIndex;
use crate::core::reader::{LinePolicy, ScanSummary, SkipHandler, SkippedLine, scan};
use crate::core::record::{Hobby, SpeciesFilter, VillagerRecord};

/// Sorted names per hobby, indexed in `Hobby::ALL` order.
pub type HobbyGroups = [Vec<String>; Hobby::COUNT];

/// A villager file plus the options every query on it should use.
#[derive(Clone)]
pub struct VillagerFile {
    path: PathBuf,
    policy: LinePolicy,
    on_skip: Option<SkipHandler>,
}

impl fmt::Debug for VillagerFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VillagerFile")
            .field("path", &self.path)
            .field("policy", &self.policy)
            .field("on_skip", &self.on_skip.is_some())
            .finish()
    }
}

impl VillagerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            policy: LinePolicy::default(),
            on_skip: None,
        }
    }

    pub fn with_policy(mut self, policy: LinePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Called once per malformed line dropped under `LinePolicy::Skip`.
    pub fn with_skip_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&SkippedLine) + Send + Sync + 'static,
    {
        self.on_skip = Some(Arc::new(handler));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> LinePolicy {
        self.policy
    }

    pub(crate) fn scan<F>(&self, on_record: F) -> Result<ScanSummary, Error>
    where
        F: FnMut(VillagerRecord),
    {
        scan(&self.path, self.policy, self.on_skip.as_ref(), on_record)
    }

    pub fn species_set(&self) -> Result<BTreeSet<String>, Error> {
        let mut species = BTreeSet::new();
        self.scan(|record| {
            species.insert(record.species);
        })?;
        Ok(species)
    }

    pub fn villagers_by_species(&self, filter: &SpeciesFilter) -> Result<Vec<String>, Error> {
        let mut names = Vec::new();
        self.scan(|record| {
            if filter.matches(&record.species) {
                names.push(record.name);
            }
        })?;
        names.sort();
        Ok(names)
    }

    pub fn names_by_hobby(&self) -> Result<HobbyGroups, Error> {
        let mut groups: HobbyGroups = Default::default();
        self.scan(|record| {
            if let Some(hobby) = record.hobby_bucket() {
                groups[hobby.index()].push(record.name);
            }
        })?;
        for names in groups.iter_mut() {
            names.sort();
        }
        Ok(groups)
    }

    pub fn all_records(&self) -> Result<Vec<VillagerRecord>, Error> {
        let mut records = Vec::new();
        self.scan(|record| records.push(record))?;
        Ok(records)
    }

    pub fn find_motto(&self, name: &str) -> Result<Option<String>, Error> {
        let records = self.all_records()?;
        Ok(records
            .into_iter()
            .find(|record| record.name == name)
            .map(|record| record.saying))
    }

    /// Names sharing the personality of `name`'s first record, `name` included.
    pub fn likeminded(&self, name: &str) -> Result<BTreeSet<String>, Error> {
        let records = self.all_records()?;
        let personality = records
            .iter()
            .find(|record| record.name == name)
            .map(|record| record.personality.clone())
            .ok_or_else(|| unknown_villager_error(name, &self.path))?;
        Ok(records
            .into_iter()
            .filter(|record| record.personality == personality)
            .map(|record| record.name)
            .collect())
    }

    /// Read the file once and keep an index for repeated queries.
    pub fn index(&self) -> Result<VillagerIndex, Error> {
        let mut index = VillagerIndex::empty(self.path.clone());
        self.scan(|record| index.insert(record))?;
        index.finish();
        Ok(index)
    }
}

pub(crate) fn unknown_villager_error(name: &str, path: &Path) -> Error {
    Error::new(ErrorKind::NotFound)
        .with_message(format!("no villager named '{name}'"))
        .with_path(path)
}

pub fn species_set(path: impl AsRef<Path>) -> Result<BTreeSet<String>, Error> {
    VillagerFile::new(path.as_ref()).species_set()
}

pub fn villagers_by_species(
    path: impl AsRef<Path>,
    filter: &SpeciesFilter,
) -> Result<Vec<String>, Error> {
    VillagerFile::new(path.as_ref()).villagers_by_species(filter)
}

pub fn names_by_hobby(path: impl AsRef<Path>) -> Result<HobbyGroups, Error> {
    VillagerFile::new(path.as_ref()).names_by_hobby()
}

pub fn all_records(path: impl AsRef<Path>) -> Result<Vec<VillagerRecord>, Error> {
    VillagerFile::new(path.as_ref()).all_records()
}

pub fn find_motto(path: impl AsRef<Path>, name: &str) -> Result<Option<String>, Error> {
    VillagerFile::new(path.as_ref()).find_motto(name)
}

pub fn likeminded(path: impl AsRef<Path>, name: &str) -> Result<BTreeSet<String>, Error> {
    VillagerFile::new(path.as_ref()).likeminded(name)
}

#[cfg(test)]
mod tests {
    use super::{
        VillagerFile, all_records, find_motto, likeminded, names_by_hobby, species_set,
        villagers_by_species,
    };
    use crate::core::error::ErrorKind;
    use crate::core::reader::LinePolicy;
    use crate::core::record::SpeciesFilter;
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SAMPLE: &str = "Bob|Cat|Peppy|Fitness|Hi\nSue|Dog|Peppy|Nature|Yo\nAl|Cat|Lazy|Fitness|Hey\n";

    fn fixture(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("villagers.csv");
        fs::write(&path, contents).expect("write fixture");
        (dir, path)
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn species_are_deduplicated() {
        let (_dir, path) = fixture(SAMPLE);
        assert_eq!(species_set(&path).expect("species"), set(&["Cat", "Dog"]));
    }

    #[test]
    fn villagers_filter_by_species_sorted() {
        let (_dir, path) = fixture(SAMPLE);
        assert_eq!(
            villagers_by_species(&path, &SpeciesFilter::only("Cat")).expect("cats"),
            vec!["Al", "Bob"]
        );
        assert_eq!(
            villagers_by_species(&path, &SpeciesFilter::Any).expect("all"),
            vec!["Al", "Bob", "Sue"]
        );
        assert!(
            villagers_by_species(&path, &SpeciesFilter::only("Wolf"))
                .expect("wolves")
                .is_empty()
        );
    }

    #[test]
    fn hobby_groups_follow_fixed_order() {
        let (_dir, path) = fixture(SAMPLE);
        let groups = names_by_hobby(&path).expect("groups");
        let expected: [Vec<String>; 6] = [
            vec!["Al".to_string(), "Bob".to_string()],
            vec!["Sue".to_string()],
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
        ];
        assert_eq!(groups, expected);
    }

    #[test]
    fn unknown_hobbies_are_excluded() {
        let (_dir, path) = fixture("Zed|Cat|Lazy|Cooking|Mm\nAmy|Dog|Smug|Play|Ha\n");
        let groups = names_by_hobby(&path).expect("groups");
        assert_eq!(groups[5], vec!["Amy"]);
        assert_eq!(groups.iter().map(Vec::len).sum::<usize>(), 1);
    }

    #[test]
    fn all_records_keeps_file_order() {
        let (_dir, path) = fixture(SAMPLE);
        let names: Vec<String> = all_records(&path)
            .expect("records")
            .into_iter()
            .map(|record| record.name)
            .collect();
        assert_eq!(names, vec!["Bob", "Sue", "Al"]);
    }

    #[test]
    fn motto_lookup_first_match_or_none() {
        let (_dir, path) = fixture("Sue|Dog|Peppy|Nature|Yo\nSue|Cat|Lazy|Play|Second\n");
        assert_eq!(find_motto(&path, "Sue").expect("motto"), Some("Yo".to_string()));
        assert_eq!(find_motto(&path, "Zoe").expect("motto"), None);
        assert_eq!(find_motto(&path, "sue").expect("motto"), None);
    }

    #[test]
    fn likeminded_includes_self() {
        let (_dir, path) = fixture(SAMPLE);
        assert_eq!(likeminded(&path, "Bob").expect("likeminded"), set(&["Bob", "Sue"]));
        assert_eq!(likeminded(&path, "Al").expect("likeminded"), set(&["Al"]));
    }

    #[test]
    fn likeminded_unknown_name_is_not_found() {
        let (_dir, path) = fixture(SAMPLE);
        let err = likeminded(&path, "Zoe").expect_err("unknown");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.message().expect("message").contains("Zoe"));
        assert_eq!(err.hint(), None);
    }

    #[test]
    fn likeminded_uses_first_matching_record() {
        let (_dir, path) =
            fixture("Sue|Dog|Peppy|Nature|Yo\nSue|Cat|Lazy|Play|Zz\nAl|Cat|Lazy|Fitness|Hey\n");
        assert_eq!(likeminded(&path, "Sue").expect("likeminded"), set(&["Sue"]));
    }

    #[test]
    fn empty_file_yields_empty_results() {
        let (_dir, path) = fixture("");
        assert!(species_set(&path).expect("species").is_empty());
        assert!(all_records(&path).expect("records").is_empty());
        assert!(names_by_hobby(&path).expect("groups").iter().all(Vec::is_empty));
        assert_eq!(find_motto(&path, "Bob").expect("motto"), None);
    }

    #[test]
    fn skip_policy_flows_through_queries() {
        let (_dir, path) = fixture("Bob|Cat|Peppy|Fitness|Hi\nnot a record\nSue|Dog|Peppy|Nature|Yo\n");
        assert_eq!(
            species_set(&path).expect_err("stop").kind(),
            ErrorKind::Corrupt
        );

        let skipped = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&skipped);
        let file = VillagerFile::new(&path)
            .with_policy(LinePolicy::Skip)
            .with_skip_handler(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        assert_eq!(file.species_set().expect("species"), set(&["Cat", "Dog"]));
        assert_eq!(file.likeminded("Sue").expect("likeminded"), set(&["Bob", "Sue"]));
        assert_eq!(skipped.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn repeated_calls_agree() {
        let (_dir, path) = fixture(SAMPLE);
        let file = VillagerFile::new(&path);
        assert_eq!(file.all_records().expect("first"), file.all_records().expect("second"));
        assert_eq!(file.names_by_hobby().expect("first"), file.names_by_hobby().expect("second"));
    }
}

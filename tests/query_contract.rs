//! Purpose: Contract coverage for the public query API against the bundled sample file.
//! Exports: Integration tests only.
//! Role: Pin observable query results and cross-query properties.
//! Invariants: Tests only read fixtures; temp files are used for anything written.
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use villagers::api::{
    ErrorKind, Hobby, SpeciesFilter, VillagerIndex, all_records, find_motto, likeminded,
    names_by_hobby, species_set, villagers_by_species,
};

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("villagers.csv")
}

#[test]
fn wolves_are_listed_sorted() {
    let names = villagers_by_species(sample_path(), &SpeciesFilter::only("Wolf")).expect("wolves");
    assert_eq!(names, vec!["Audie", "Dobie", "Fang", "Skye"]);
}

#[test]
fn species_are_unique_and_verbatim() {
    let species = species_set(sample_path()).expect("species");
    let records = all_records(sample_path()).expect("records");
    assert_eq!(species.len(), 16);
    for value in &species {
        assert!(records.iter().any(|record| &record.species == value));
    }
}

#[test]
fn unfiltered_listing_is_union_of_species_listings() {
    let path = sample_path();
    let all = villagers_by_species(&path, &SpeciesFilter::Any).expect("all");

    let mut union = Vec::new();
    for species in species_set(&path).expect("species") {
        union.extend(villagers_by_species(&path, &SpeciesFilter::Only(species)).expect("subset"));
    }
    union.sort();

    assert_eq!(all, union);
    assert!(all.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn hobby_groups_partition_known_hobbies() {
    let path = sample_path();
    let groups = names_by_hobby(&path).expect("groups");
    let records = all_records(&path).expect("records");

    assert_eq!(groups[Hobby::Fitness.index()], vec!["Agent S", "Al", "Audie", "Bam"]);
    assert_eq!(groups[Hobby::Education.index()], vec!["Alice", "Judy"]);
    assert_eq!(groups[Hobby::Play.index()], vec!["Agnes", "Alfonso", "Bob"]);

    let grouped: usize = groups.iter().map(Vec::len).sum();
    let known = records
        .iter()
        .filter(|record| record.hobby_bucket().is_some())
        .count();
    assert_eq!(grouped, known);
    assert!(grouped <= records.len());
}

#[test]
fn motto_lookup() {
    assert_eq!(
        find_motto(sample_path(), "Audie").expect("motto").as_deref(),
        Some("Never leave the house without a smile.")
    );
    assert_eq!(find_motto(sample_path(), "Tom Nook").expect("motto"), None);
}

#[test]
fn likeminded_peppy_villagers() {
    let expected: BTreeSet<String> = ["Agent S", "Anabelle", "Audie", "Bella", "Carmen", "Wendy"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(likeminded(sample_path(), "Wendy").expect("likeminded"), expected);
}

#[test]
fn likeminded_always_contains_the_queried_villager() {
    let path = sample_path();
    for record in all_records(&path).expect("records") {
        let names = likeminded(&path, &record.name).expect("likeminded");
        assert!(names.contains(&record.name));
    }
}

#[test]
fn likeminded_unknown_villager_is_not_found() {
    let err = likeminded(sample_path(), "Tom Nook").expect_err("unknown");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn repeated_queries_are_stable() {
    let path = sample_path();
    assert_eq!(species_set(&path).expect("first"), species_set(&path).expect("second"));
    assert_eq!(all_records(&path).expect("first"), all_records(&path).expect("second"));
    assert_eq!(
        likeminded(&path, "Bob").expect("first"),
        likeminded(&path, "Bob").expect("second")
    );
}

#[test]
fn index_matches_fresh_scans() {
    let path = sample_path();
    let index = VillagerIndex::load(&path).expect("index");
    assert_eq!(index.len(), all_records(&path).expect("records").len());
    assert_eq!(index.species_set(), species_set(&path).expect("species"));
    assert_eq!(index.names_by_hobby(), names_by_hobby(&path).expect("groups"));
    assert_eq!(
        index.likeminded("Skye").expect("index"),
        likeminded(&path, "Skye").expect("scan")
    );
}

#[test]
fn three_record_file_answers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("villagers.csv");
    fs::write(
        &path,
        "Bob|Cat|Peppy|Fitness|Hi\nSue|Dog|Peppy|Nature|Yo\nAl|Cat|Lazy|Fitness|Hey\n",
    )
    .expect("write fixture");

    let species: Vec<String> = species_set(&path).expect("species").into_iter().collect();
    assert_eq!(species, vec!["Cat", "Dog"]);
    assert_eq!(
        villagers_by_species(&path, &SpeciesFilter::only("Cat")).expect("cats"),
        vec!["Al", "Bob"]
    );
    let groups = names_by_hobby(&path).expect("groups");
    assert_eq!(groups[0], vec!["Al", "Bob"]);
    assert_eq!(groups[1], vec!["Sue"]);
    assert!(groups[2..].iter().all(Vec::is_empty));
    assert_eq!(find_motto(&path, "Sue").expect("motto").as_deref(), Some("Yo"));
    assert_eq!(find_motto(&path, "Zoe").expect("motto"), None);
    let bob: Vec<String> = likeminded(&path, "Bob").expect("likeminded").into_iter().collect();
    assert_eq!(bob, vec!["Bob", "Sue"]);
}

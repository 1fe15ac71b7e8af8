//! Purpose: Define the stable public Rust API boundary for villager queries.
//! Exports: Record types, query functions, the file handle, the index, and errors.
//! Role: Public, additive-only surface used by the CLI and library callers.
//! Invariants: Callers never need to reach into `core` submodules directly.

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::index::VillagerIndex;
pub use crate::core::query::{
    HobbyGroups, VillagerFile, all_records, find_motto, likeminded, names_by_hobby, species_set,
    villagers_by_species,
};
pub use crate::core::reader::{LinePolicy, ScanSummary, SkippedLine};
pub use crate::core::record::{FIELD_COUNT, FIELD_DELIMITER, Hobby, SpeciesFilter, VillagerRecord};

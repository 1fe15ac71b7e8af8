// Villager record model and the pipe-delimited line codec.
use std::fmt;

use serde::Serialize;

use crate::core::error::{Error, ErrorKind};

pub const FIELD_DELIMITER: char = '|';
pub const FIELD_COUNT: usize = 5;

/// One parsed line: name, species, personality, hobby, saying.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct VillagerRecord {
    pub name: String,
    pub species: String,
    pub personality: String,
    pub hobby: String,
    pub saying: String,
}

impl VillagerRecord {
    /// Parse a line with trailing whitespace already stripped.
    ///
    /// Fails with `Corrupt` when the line does not split into exactly
    /// [`FIELD_COUNT`] fields. The caller attaches path and line context.
    pub fn from_line(line: &str) -> Result<Self, Error> {
        let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
        let [name, species, personality, hobby, saying] = fields.as_slice() else {
            return Err(field_count_error(fields.len()));
        };
        Ok(Self {
            name: name.to_string(),
            species: species.to_string(),
            personality: personality.to_string(),
            hobby: hobby.to_string(),
            saying: saying.to_string(),
        })
    }

    /// The hobby bucket this record groups into, if its hobby is one of the six.
    pub fn hobby_bucket(&self) -> Option<Hobby> {
        Hobby::parse(&self.hobby)
    }
}

pub(crate) fn field_count_error(found: usize) -> Error {
    Error::new(ErrorKind::Corrupt).with_message(format!(
        "expected {FIELD_COUNT} '{FIELD_DELIMITER}'-separated fields, found {found}"
    ))
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Hobby {
    Fitness,
    Nature,
    Education,
    Music,
    Fashion,
    Play,
}

impl Hobby {
    pub const COUNT: usize = 6;

    /// Grouping order used by `names_by_hobby`.
    pub const ALL: [Hobby; Hobby::COUNT] = [
        Hobby::Fitness,
        Hobby::Nature,
        Hobby::Education,
        Hobby::Music,
        Hobby::Fashion,
        Hobby::Play,
    ];

    /// Exact, case-sensitive match against the field text.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|hobby| hobby.as_str() == value)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Hobby::Fitness => "Fitness",
            Hobby::Nature => "Nature",
            Hobby::Education => "Education",
            Hobby::Music => "Music",
            Hobby::Fashion => "Fashion",
            Hobby::Play => "Play",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Hobby {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Species selection for `villagers_by_species`; `Any` matches every record.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum SpeciesFilter {
    #[default]
    Any,
    Only(String),
}

impl SpeciesFilter {
    pub fn only(species: impl Into<String>) -> Self {
        SpeciesFilter::Only(species.into())
    }

    pub fn matches(&self, species: &str) -> bool {
        match self {
            SpeciesFilter::Any => true,
            SpeciesFilter::Only(wanted) => wanted == species,
        }
    }
}

impl From<Option<String>> for SpeciesFilter {
    fn from(value: Option<String>) -> Self {
        value.map_or(SpeciesFilter::Any, SpeciesFilter::Only)
    }
}

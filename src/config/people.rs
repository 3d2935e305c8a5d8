//! Birthday list loading and validation.

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::BIRTHDAY_DATE_FORMAT;

/// Errors that can occur while reading the data files.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Entry at index {index} in {} has an empty `{field}`", .path.display())]
    BlankField {
        path: PathBuf,
        index: usize,
        field: &'static str,
    },

    #[error(
        "Entry at index {index} in {} has invalid date {value:?} (expected YYYY-MM-DD)",
        .path.display()
    )]
    InvalidDate {
        path: PathBuf,
        index: usize,
        value: String,
    },
}

/// A person with a birthday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    /// Name used in the greeting.
    pub name: String,

    /// Telegram username, with or without the leading `@`.
    pub nickname: String,

    /// Date of birth. Only month and day are used for matching.
    pub birthday: NaiveDate,
}

impl Person {
    /// Creates a new person entry.
    #[must_use]
    pub const fn new(name: String, nickname: String, birthday: NaiveDate) -> Self {
        Self {
            name,
            nickname,
            birthday,
        }
    }

    /// Returns the Telegram mention for this person (`@nickname`).
    #[must_use]
    pub fn mention(&self) -> String {
        let nick = self.nickname.trim();
        if nick.starts_with('@') {
            nick.to_owned()
        } else {
            format!("@{nick}")
        }
    }

    /// Checks whether the birthday falls on the same month and day as `date`.
    #[must_use]
    pub fn has_birthday_on(&self, date: NaiveDate) -> bool {
        self.birthday.month() == date.month() && self.birthday.day() == date.day()
    }
}

/// On-disk shape of a birthday entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonRecord {
    pub name: String,
    pub nickname: String,
    #[serde(alias = "birth_date")]
    pub date: String,
}

impl From<&Person> for PersonRecord {
    fn from(person: &Person) -> Self {
        Self {
            name: person.name.clone(),
            nickname: person.nickname.clone(),
            date: person.birthday.format(BIRTHDAY_DATE_FORMAT).to_string(),
        }
    }
}

/// Loads the birthday list from a JSON file.
///
/// Any malformed entry aborts loading; nothing is skipped.
pub fn load_people(path: impl AsRef<Path>) -> Result<Vec<Person>, DataError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_owned(),
        source,
    })?;
    parse_people(&content, path)
}

/// Parses the birthday list; `path` is only used for error messages.
pub fn parse_people(content: &str, path: &Path) -> Result<Vec<Person>, DataError> {
    let records: Vec<PersonRecord> =
        serde_json::from_str(content).map_err(|source| DataError::Parse {
            path: path.to_owned(),
            source,
        })?;

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| person_from_record(record, index, path))
        .collect()
}

fn person_from_record(
    record: PersonRecord,
    index: usize,
    path: &Path,
) -> Result<Person, DataError> {
    let blank = |field| DataError::BlankField {
        path: path.to_owned(),
        index,
        field,
    };

    let name = record.name.trim();
    if name.is_empty() {
        return Err(blank("name"));
    }

    let nickname = record.nickname.trim();
    if nickname.is_empty() {
        return Err(blank("nickname"));
    }

    let value = record.date.trim();
    let birthday = NaiveDate::parse_from_str(value, BIRTHDAY_DATE_FORMAT).map_err(|_| {
        DataError::InvalidDate {
            path: path.to_owned(),
            index,
            value: value.to_owned(),
        }
    })?;

    Ok(Person::new(name.to_owned(), nickname.to_owned(), birthday))
}

/// Writes the birthday list to a JSON file.
pub fn save_people(people: &[Person], path: impl AsRef<Path>) -> Result<(), DataError> {
    let path = path.as_ref();
    let records: Vec<PersonRecord> = people.iter().map(PersonRecord::from).collect();
    let content = serde_json::to_string_pretty(&records).map_err(|source| DataError::Parse {
        path: path.to_owned(),
        source,
    })?;
    std::fs::write(path, content).map_err(|source| DataError::Io {
        path: path.to_owned(),
        source,
    })
}

/// Returns names that appear more than once, in first-seen order.
#[must_use]
pub fn duplicate_names(people: &[Person]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    let mut duplicates = Vec::new();

    for person in people {
        let name = person.name.as_str();
        if !seen.insert(name) && !duplicates.contains(&name) {
            duplicates.push(name);
        }
    }

    duplicates
}

/// Example birthday list for new installations.
#[must_use]
pub fn example_people() -> Vec<Person> {
    let entries = [
        ("Ana", "ana_b", (1990, 5, 10)),
        ("Boris", "@boris", (1985, 12, 31)),
        ("Leap Day Lena", "lena29", (1996, 2, 29)),
    ];

    entries
        .into_iter()
        .filter_map(|(name, nick, (y, m, d))| {
            NaiveDate::from_ymd_opt(y, m, d)
                .map(|date| Person::new(name.to_owned(), nick.to_owned(), date))
        })
        .collect()
}

//! Where the people and templates come from.

use std::path::PathBuf;

use tracing::debug;

use super::{DataError, MessageTemplate, Person, load_people, load_templates};

/// Source of the run's input data.
pub trait DataSource {
    fn load_people(&self) -> Result<Vec<Person>, DataError>;

    fn load_templates(&self) -> Result<Vec<MessageTemplate>, DataError>;
}

/// Reads both lists from JSON files.
#[derive(Debug, Clone)]
pub struct FileDataSource {
    pub birthdays_path: PathBuf,
    pub messages_path: PathBuf,
}

impl FileDataSource {
    #[must_use]
    pub fn new(birthdays_path: impl Into<PathBuf>, messages_path: impl Into<PathBuf>) -> Self {
        Self {
            birthdays_path: birthdays_path.into(),
            messages_path: messages_path.into(),
        }
    }
}

impl DataSource for FileDataSource {
    fn load_people(&self) -> Result<Vec<Person>, DataError> {
        debug!("Reading birthdays from {}", self.birthdays_path.display());
        load_people(&self.birthdays_path)
    }

    fn load_templates(&self) -> Result<Vec<MessageTemplate>, DataError> {
        debug!("Reading templates from {}", self.messages_path.display());
        load_templates(&self.messages_path)
    }
}

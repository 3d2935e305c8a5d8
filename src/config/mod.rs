//! Configuration module for the birthday bot.
//!
//! Handles loading and validation of the birthday list, the greeting
//! templates, and the Telegram credentials taken from the environment.

mod people;
mod settings;
mod source;
mod templates;

pub use people::{
    DataError, Person, PersonRecord, duplicate_names, example_people, load_people, parse_people,
    save_people,
};
pub use settings::{BotSettings, ConfigError, TelegramConfig};
pub use source::{DataSource, FileDataSource};
pub use templates::{
    MessageTemplate, PLACEHOLDERS, example_templates, load_templates, parse_templates,
    save_templates,
};

/// Default location of the birthday list.
pub const DEFAULT_BIRTHDAYS_PATH: &str = "data/birthdays.json";

/// Default location of the greeting templates.
pub const DEFAULT_MESSAGES_PATH: &str = "data/messages.json";

/// Date format used for birthdays in the data files.
pub const BIRTHDAY_DATE_FORMAT: &str = "%Y-%m-%d";

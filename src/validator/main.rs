//! Standalone validator for the birthday bot's data files.
//!
//! Checks the birthday list and the greeting templates, and can preview
//! who would be congratulated on a given date without sending anything.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::Parser;

use birthday_bot::celebration::celebrants_on;
use birthday_bot::config::{
    BIRTHDAY_DATE_FORMAT, DEFAULT_BIRTHDAYS_PATH, DEFAULT_MESSAGES_PATH, MessageTemplate, Person,
    duplicate_names, example_people, example_templates, load_people, load_templates, save_people,
    save_templates,
};

/// Birthday data validator.
#[derive(Parser, Debug)]
#[command(name = "validate_birthdays")]
#[command(about = "Validates the birthday list and message templates")]
#[command(version)]
struct Args {
    /// Path to the birthdays JSON file.
    #[arg(short, long, default_value = DEFAULT_BIRTHDAYS_PATH)]
    birthdays: PathBuf,

    /// Path to the message templates JSON file.
    #[arg(short, long, default_value = DEFAULT_MESSAGES_PATH)]
    messages: PathBuf,

    /// Preview celebrants and rendered messages for this date (YYYY-MM-DD, or "today").
    #[arg(short, long)]
    date: Option<String>,

    /// Write example birthdays.json and messages.json into this directory.
    #[arg(long)]
    generate_example: Option<PathBuf>,

    /// Show detailed information for each entry.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Handle example generation
    if let Some(dir) = args.generate_example {
        return generate_example(&dir);
    }

    let preview_date = match args.date.as_deref().map(parse_preview_date).transpose() {
        Ok(date) => date,
        Err(e) => {
            eprintln!("✗ {e}");
            return ExitCode::FAILURE;
        }
    };

    let people = validate_people(&args.birthdays, args.verbose);
    println!();
    let templates = validate_templates(&args.messages, args.verbose);
    println!();

    let (Some(people), Some(templates)) = (people, templates) else {
        println!("✗ Validation failed");
        return ExitCode::FAILURE;
    };

    if templates.is_empty() {
        println!("✗ Validation failed: no message templates configured");
        return ExitCode::FAILURE;
    }

    println!(
        "✓ {} people and {} templates are valid!",
        people.len(),
        templates.len()
    );

    if let Some(date) = preview_date {
        println!();
        preview(&people, &templates, date);
    }

    ExitCode::SUCCESS
}

fn parse_preview_date(raw: &str) -> Result<NaiveDate, String> {
    if raw.eq_ignore_ascii_case("today") {
        return Ok(Local::now().date_naive());
    }
    NaiveDate::parse_from_str(raw, BIRTHDAY_DATE_FORMAT)
        .map_err(|_| format!("Invalid date {raw:?} (expected YYYY-MM-DD)"))
}

fn generate_example(dir: &Path) -> ExitCode {
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("✗ Failed to create {}: {e}", dir.display());
        return ExitCode::FAILURE;
    }

    let birthdays = dir.join("birthdays.json");
    let messages = dir.join("messages.json");

    let result = save_people(&example_people(), &birthdays)
        .and_then(|()| save_templates(&example_templates(), &messages));

    match result {
        Ok(()) => {
            println!("✓ Example birthdays written to: {}", birthdays.display());
            println!("✓ Example messages written to:  {}", messages.display());
            println!("\nTemplates may use {{name}}, {{nickname}} and {{mention}}.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Failed to write example files: {:#}", anyhow::Error::new(e));
            ExitCode::FAILURE
        }
    }
}

fn validate_people(path: &Path, verbose: bool) -> Option<Vec<Person>> {
    println!("Validating: {}", path.display());

    let people = match load_people(path) {
        Ok(p) => p,
        Err(e) => {
            println!("  ✗ Error: {:#}", anyhow::Error::new(e));
            return None;
        }
    };

    if verbose {
        for person in &people {
            println!(
                "  {} ({}) born {}",
                person.name,
                person.mention(),
                person.birthday.format(BIRTHDAY_DATE_FORMAT)
            );
        }
    }

    if people.is_empty() {
        println!("  ⚠ Warning: the birthday list is empty");
    }

    for name in duplicate_names(&people) {
        println!("  ⚠ Warning: {name:?} appears more than once");
    }

    println!("  ✓ {} people loaded", people.len());
    Some(people)
}

fn validate_templates(path: &Path, verbose: bool) -> Option<Vec<MessageTemplate>> {
    println!("Validating: {}", path.display());

    let templates = match load_templates(path) {
        Ok(t) => t,
        Err(e) => {
            println!("  ✗ Error: {:#}", anyhow::Error::new(e));
            return None;
        }
    };

    for (index, template) in templates.iter().enumerate() {
        if verbose {
            println!("  [{index}] \"{}\"", truncate(&template.text, 50));
        }

        let unknown = template.unknown_placeholders();
        if !unknown.is_empty() {
            let keys = unknown
                .iter()
                .map(|key| format!("{{{key}}}"))
                .collect::<Vec<_>>()
                .join(", ");
            println!("  ⚠ Warning: template {index} has unknown placeholder(s) {keys}; sent as-is");
        } else if !template.has_known_placeholder() {
            println!("  ⚠ Warning: template {index} does not mention the person");
        }
    }

    println!("  ✓ {} templates loaded", templates.len());
    Some(templates)
}

fn preview(people: &[Person], templates: &[MessageTemplate], date: NaiveDate) {
    let celebrants = celebrants_on(people, date);

    if celebrants.is_empty() {
        println!("No birthdays on {}.", date.format(BIRTHDAY_DATE_FORMAT));
        return;
    }

    println!("Birthdays on {}:", date.format(BIRTHDAY_DATE_FORMAT));
    for person in celebrants {
        println!("- {} ({})", person.name, person.mention());
        for template in templates {
            println!("    {}", template.render(person));
        }
    }
}

/// Truncates a string for display.
fn truncate(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_owned()
    } else {
        format!("{}...", chars[..max_len].iter().collect::<String>())
    }
}

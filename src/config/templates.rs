//! Greeting templates and placeholder rendering.
//!
//! Templates are plain strings with `{name}`, `{nickname}` and `{mention}`
//! placeholders. `{{` and `}}` produce literal braces. Anything else in braces
//! is copied through untouched.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{DataError, Person};

/// Placeholders understood by [`MessageTemplate::render`].
pub const PLACEHOLDERS: [&str; 3] = ["name", "nickname", "mention"];

/// A greeting template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct MessageTemplate {
    pub text: String,
}

/// A piece of a template after scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

impl MessageTemplate {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Fills in the template with the person's information.
    #[must_use]
    pub fn render(&self, person: &Person) -> String {
        let mut out = String::with_capacity(self.text.len() + 32);

        for segment in segments(&self.text) {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Placeholder("name") => out.push_str(&person.name),
                Segment::Placeholder("nickname") => out.push_str(&person.nickname),
                Segment::Placeholder("mention") => out.push_str(&person.mention()),
                Segment::Placeholder(other) => {
                    out.push('{');
                    out.push_str(other);
                    out.push('}');
                }
            }
        }

        out
    }

    /// Returns placeholders in this template that [`render`](Self::render)
    /// leaves as-is.
    #[must_use]
    pub fn unknown_placeholders(&self) -> Vec<&str> {
        segments(&self.text)
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Placeholder(key) if !PLACEHOLDERS.contains(&key) => Some(key),
                _ => None,
            })
            .collect()
    }

    /// Checks whether the template addresses the person at all.
    #[must_use]
    pub fn has_known_placeholder(&self) -> bool {
        segments(&self.text).into_iter().any(|segment| {
            matches!(segment, Segment::Placeholder(key) if PLACEHOLDERS.contains(&key))
        })
    }
}

/// Splits a template into literal text and `{key}` placeholders.
fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = text;

    while let Some(pos) = rest.find(['{', '}']) {
        if pos > 0 {
            segments.push(Segment::Literal(&rest[..pos]));
        }
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            segments.push(Segment::Literal(&tail[..1]));
            rest = &tail[2..];
            continue;
        }

        if tail.starts_with('{')
            && let Some(end) = tail[1..].find(['{', '}'])
            && tail.as_bytes()[end + 1] == b'}'
        {
            segments.push(Segment::Placeholder(&tail[1..=end]));
            rest = &tail[end + 2..];
            continue;
        }

        // Stray brace.
        segments.push(Segment::Literal(&tail[..1]));
        rest = &tail[1..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }

    segments
}

/// Loads message templates from a JSON array of strings.
///
/// Entries are trimmed and blank ones are dropped.
pub fn load_templates(path: impl AsRef<Path>) -> Result<Vec<MessageTemplate>, DataError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_owned(),
        source,
    })?;
    parse_templates(&content, path)
}

/// Parses message templates; `path` is only used for error messages.
pub fn parse_templates(content: &str, path: &Path) -> Result<Vec<MessageTemplate>, DataError> {
    let entries: Vec<String> = serde_json::from_str(content).map_err(|source| DataError::Parse {
        path: path.to_owned(),
        source,
    })?;

    Ok(entries
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(MessageTemplate::new)
        .collect())
}

/// Writes templates to a JSON file.
pub fn save_templates(
    templates: &[MessageTemplate],
    path: impl AsRef<Path>,
) -> Result<(), DataError> {
    let path = path.as_ref();
    let content = serde_json::to_string_pretty(templates).map_err(|source| DataError::Parse {
        path: path.to_owned(),
        source,
    })?;
    std::fs::write(path, content).map_err(|source| DataError::Io {
        path: path.to_owned(),
        source,
    })
}

/// Example templates for new installations.
#[must_use]
pub fn example_templates() -> Vec<MessageTemplate> {
    vec![
        MessageTemplate::new(
            "🎉 Happy birthday, {name} ({mention})! Wishing you a fantastic year ahead!",
        ),
        MessageTemplate::new("🎂 {mention}, today is your day! Happy birthday, {name}!"),
        MessageTemplate::new("🥳 Everyone, please congratulate {name} {mention} on their birthday!"),
    ]
}

use std::fmt;

use serde::Serialize;

use super::types::EntityKind;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 120;
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const ID_SLUG_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Id,
    Name,
    Description,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Id => f.write_str("id"),
            Field::Name => f.write_str("name"),
            Field::Description => f.write_str("description"),
        }
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: Field,
    pub message: String,
}

impl ValidationError {
    fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check name and description limits. `None` means the field was not supplied.
///
/// A supplied name must have at least 2 non-blank characters and at most 120.
/// Lengths count characters, not bytes.
pub fn validate_fields(name: Option<&str>, description: Option<&str>) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(name) = name {
        if name.trim().chars().count() < NAME_MIN_CHARS {
            errors.push(ValidationError::new(
                Field::Name,
                format!("must be at least {} characters", NAME_MIN_CHARS),
            ));
        }
        if name.chars().count() > NAME_MAX_CHARS {
            errors.push(ValidationError::new(
                Field::Name,
                format!("cannot exceed {} characters", NAME_MAX_CHARS),
            ));
        }
    }

    if let Some(description) = description {
        if description.chars().count() > DESCRIPTION_MAX_CHARS {
            errors.push(ValidationError::new(
                Field::Description,
                format!("cannot exceed {} characters", DESCRIPTION_MAX_CHARS),
            ));
        }
    }

    errors
}

pub(crate) fn blank_id() -> ValidationError {
    ValidationError::new(Field::Id, "must not be blank")
}

pub(crate) fn duplicate_id(id: &str) -> ValidationError {
    ValidationError::new(Field::Id, format!("'{}' is already in use", id))
}

/// Derive an id from a display name: `<prefix>-<slug>`.
///
/// The slug is the lowercased name with everything except `a-z`, `0-9` and
/// whitespace dropped, whitespace runs turned into `-`, cut to 50 characters.
pub fn generate_id(name: &str, kind: EntityKind) -> String {
    let kept: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    let mut slug = String::with_capacity(kept.len());
    let mut in_space = false;
    for c in kept.chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.push(c);
            in_space = false;
        }
    }
    // Only ASCII remains, so byte and char positions agree
    slug.truncate(ID_SLUG_MAX_CHARS);

    format!("{}-{}", kind.id_prefix(), slug)
}

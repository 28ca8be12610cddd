//! Parsing and validation of the visitor's style/color/beard choices.
//!
//! Every choice field on the generate form is mandatory: the client must
//! send either a numeric catalog id or the literal sentinel `"none"`.
//! An absent or empty field is a distinct error from an explicit "none"
//! -- the UI forces the visitor through each decision, and the API
//! enforces it.

use crate::error::CoreError;
use crate::types::DbId;

/// The sentinel value a client sends to decline an optional choice.
pub const NONE_SENTINEL: &str = "none";

/// A parsed choice field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Field was absent or blank -- the client never made a choice.
    Missing,
    /// The explicit "none" sentinel.
    Declined,
    /// A catalog row id.
    Id(DbId),
}

impl Choice {
    /// Parse a raw form value. `field_label` feeds the error message for
    /// a value that is neither "none" nor a valid id.
    pub fn parse(raw: Option<&str>, field_label: &str) -> Result<Choice, CoreError> {
        let trimmed = raw.unwrap_or("").trim();
        if trimmed.is_empty() {
            return Ok(Choice::Missing);
        }
        if trimmed.eq_ignore_ascii_case(NONE_SENTINEL) {
            return Ok(Choice::Declined);
        }
        trimmed
            .parse::<DbId>()
            .map(Choice::Id)
            .map_err(|_| CoreError::Validation(format!("Invalid {field_label} selection.")))
    }

    /// The id, when one was chosen.
    pub fn id(&self) -> Option<DbId> {
        match self {
            Choice::Id(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Choice::Missing)
    }
}

/// Where a color option may be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScope {
    Hair,
    Beard,
    Both,
}

impl ColorScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScope::Hair => "hair",
            ColorScope::Beard => "beard",
            ColorScope::Both => "both",
        }
    }
}

/// Validate the choice ladder for a generation request before any
/// catalog lookup. Returns the user-facing validation error for the
/// first violated rule, in the same order the client encounters the
/// form.
pub fn check_required_choices(
    hair_color: Choice,
    beard_style: Choice,
    beard_color: Choice,
) -> Result<(), CoreError> {
    if hair_color.is_missing() {
        return Err(CoreError::Validation(
            "Choose a hair color option first.".into(),
        ));
    }
    if beard_style.is_missing() {
        return Err(CoreError::Validation(
            "Choose a beard style option first.".into(),
        ));
    }
    if beard_color.is_missing() {
        return Err(CoreError::Validation(
            "Choose a beard color option first.".into(),
        ));
    }
    Ok(())
}

/// Exactly one of {curated style id, custom style upload} must identify
/// the style source.
pub fn check_style_source(has_style_id: bool, has_custom_upload: bool) -> Result<(), CoreError> {
    if has_style_id && has_custom_upload {
        return Err(CoreError::Validation(
            "Choose either a curated style or upload a custom style, not both.".into(),
        ));
    }
    if !has_style_id && !has_custom_upload {
        return Err(CoreError::Validation(
            "Select a hairstyle or upload a custom haircut image.".into(),
        ));
    }
    Ok(())
}

/// A beard color only makes sense once a beard style is chosen.
pub fn check_beard_color_requires_style(
    beard_style: Choice,
    beard_color: Choice,
) -> Result<(), CoreError> {
    if beard_style.id().is_none() && beard_color.id().is_some() {
        return Err(CoreError::Validation(
            "Choose a beard style before applying beard color.".into(),
        ));
    }
    Ok(())
}

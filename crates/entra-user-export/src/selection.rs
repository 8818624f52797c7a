//! Parsing of the operator's field selection.
//!
//! Accepted input:
//! - `all`, `a` or `*` selects every optional field;
//! - `7`, `exit` or `quit` aborts, as does any list containing `7`;
//! - an empty line selects nothing (core fields only);
//! - otherwise a comma-separated list of menu numbers or Graph property
//!   names, e.g. `2,4,6` or `officeLocation, mobilePhone`.

use std::collections::HashSet;

use crate::fields::{UserField, EXIT_MENU_KEY};

/// Ordered, duplicate-free set of optional fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    fields: Vec<UserField>,
}

impl Selection {
    /// Builds a selection, keeping the first occurrence of each field.
    pub fn new(fields: impl IntoIterator<Item = UserField>) -> Self {
        let mut seen = HashSet::new();
        let fields = fields.into_iter().filter(|f| seen.insert(*f)).collect();
        Self { fields }
    }

    /// Every catalog field, in menu order.
    #[must_use]
    pub fn all() -> Self {
        Self::new(UserField::ALL)
    }

    /// Core fields only.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn fields(&self) -> &[UserField] {
        &self.fields
    }

    /// Graph property names in selection order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(UserField::key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("(core only)");
        }
        let keys: Vec<_> = self.keys().collect();
        f.write_str(&keys.join(", "))
    }
}

/// Result of parsing operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Proceed with these fields.
    Fields(Selection),
    /// The operator chose to leave before anything was fetched.
    Abort,
}

/// Rejected selection input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("invalid selection '{0}': expected menu numbers 1-7, field names, or \"all\"")]
    InvalidToken(String),
}

/// Parses one line of selection input.
pub fn parse_selection(input: &str) -> Result<SelectionOutcome, SelectionError> {
    let choice = input.trim().to_lowercase();

    match choice.as_str() {
        "all" | "a" | "*" => return Ok(SelectionOutcome::Fields(Selection::all())),
        "7" | "exit" | "quit" => return Ok(SelectionOutcome::Abort),
        "" => return Ok(SelectionOutcome::Fields(Selection::empty())),
        _ => {}
    }

    let mut fields = Vec::new();
    let mut abort = false;

    for token in choice.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if token == EXIT_MENU_KEY {
            abort = true;
            continue;
        }
        let field = UserField::from_menu_key(token)
            .or_else(|| UserField::from_key(token))
            .ok_or_else(|| SelectionError::InvalidToken(token.to_string()))?;
        fields.push(field);
    }

    if abort {
        return Ok(SelectionOutcome::Abort);
    }

    Ok(SelectionOutcome::Fields(Selection::new(fields)))
}

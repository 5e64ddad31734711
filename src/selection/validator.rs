use super::FileSelection;
use crate::error::ValidationError;

/// Largest batch accepted in one submission.
pub const MAX_FILES: usize = 5;

/// A selection that passed [`validate`]. The orchestrator only accepts this.
#[derive(Debug, Clone)]
pub struct ValidSelection(FileSelection);

impl ValidSelection {
    pub fn selection(&self) -> &FileSelection {
        &self.0
    }
}

pub fn validate(selection: &FileSelection) -> Result<ValidSelection, ValidationError> {
    match selection.len() {
        0 => Err(ValidationError::NoFiles),
        count if count > MAX_FILES => Err(ValidationError::TooManyFiles {
            count,
            max: MAX_FILES,
        }),
        _ => Ok(ValidSelection(selection.clone())),
    }
}

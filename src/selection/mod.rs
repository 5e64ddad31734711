mod types;
mod validator;

pub use types::{FileSelection, SelectedFile};
pub use validator::{validate, ValidSelection};

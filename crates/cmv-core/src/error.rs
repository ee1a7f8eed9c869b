use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Schema field {index} has a blank name")]
    BlankField { index: usize },

    #[error("Schema lists column '{name}' more than once")]
    DuplicateField { name: String },
}

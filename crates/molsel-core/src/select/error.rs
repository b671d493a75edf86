use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SelectionError {
    /// The expression is syntactically malformed.
    #[error("parse error in selection '{expr}' at token {pos}: {message}")]
    Parse {
        expr: String,
        pos: usize,
        message: String,
    },

    /// The expression references an unknown keyword, attribute, or macro.
    #[error("unknown keyword or attribute '{word}' in selection '{expr}'")]
    Semantic { expr: String, word: String },
}

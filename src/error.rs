use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("syntax error: {message}")]
    Syntax {
        message: String,
        /// Byte offset into the source, when the parser reports one.
        offset: Option<usize>,
    },

    #[error("hashbang line is not allowed")]
    HashBang,

    // swc positions are 32-bit
    #[error("source of {0} bytes is too large")]
    TooLarge(usize),

    #[error("no parser was configured")]
    MissingParser,

    #[error("serialize ast failed: {0}")]
    Serialize(String),

    #[error("{0}")]
    Custom(String),
}

impl ParseError {
    pub fn syntax(message: impl Into<String>, offset: Option<usize>) -> Self {
        Self::Syntax {
            message: message.into(),
            offset,
        }
    }

    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unexpected character {found:?} on line {line}")]
    UnexpectedChar { found: char, line: u32 },

    #[error("unterminated string literal starting on line {line}")]
    UnterminatedString { line: u32 },

    #[error("unterminated block comment starting on line {line}")]
    UnterminatedComment { line: u32 },

    #[error("expected {expected} on line {line}, found {found}")]
    Unexpected {
        expected: &'static str,
        found: String,
        line: u32,
    },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },

    #[error("unsupported construct {construct} on line {line}")]
    Unsupported { construct: String, line: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;

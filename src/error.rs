//! Crate-level error type.
//!
//! Library modules carry their own narrow error enums; this folds them
//! together with the input-handling failures the binary can hit, so one
//! `Result` type flows from `main` down.

use thiserror::Error;

use crate::qrcode::EncodeError;
use crate::render::RenderError;

#[derive(Debug, Error)]
pub enum Error {
    /// No payload to encode: neither an argument nor piped stdin
    /// supplied one, or what was supplied is empty.
    #[error("no payload supplied (pass text as an argument or pipe it to stdin)")]
    NoInput,

    /// Both an argument and piped stdin supplied a payload.
    #[error("both an argument and piped stdin were given; pick one")]
    AmbiguousInput,

    /// A flag combination or value the command line parser accepts
    /// syntactically but that makes no sense together.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("encoding failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

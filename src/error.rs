use std::io;

use thiserror::Error;

/// The global `Result` alias of the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by [`CssInliner`](crate::CssInliner)
/// implementations.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The global `Error` enum of the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot parse MIME message")]
    ParseMessageError,
    #[error("cannot write MIME message")]
    WriteMessageError(#[source] io::Error),
    #[error("cannot inline css")]
    InlineCssError(#[source] BoxedError),
    #[error("cannot render plain text")]
    RenderPlainTextError(#[source] BoxedError),
}

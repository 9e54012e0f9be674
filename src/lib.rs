#![doc = include_str!("../README.md")]

pub mod config;
pub mod css;
mod error;
pub mod message;

pub use self::config::InlinerConfig;
pub use self::css::CssInliner;
pub use self::error::{BoxedError, Error, Result};
pub use self::message::{
    inliner::MessageInliner, Located, Message, Part, PartBody, PartId, PartKind,
    SKIP_INLINE_HEADER,
};

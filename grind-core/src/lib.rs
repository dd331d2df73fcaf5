//! # grind-core
//!
//! Core types and traits for the game automation runtime: [`Transport`], [`Handler`], message,
//! embed and user types, and tracing initialization. Transport-agnostic; the chat platform's
//! wire format lives behind [`Transport`] and [`ToCoreMessage`].

pub mod error;
pub mod logger;
pub mod transport;
pub mod types;

pub use error::{GrindError, HandlerError, Result};
pub use logger::init_tracing;
pub use transport::{SentMessage, Transport};
pub use types::{
    Attachment, ButtonStyle, Channel, ChannelKind, Component, Embed, EmbedField, Handler,
    HandlerResponse, Message, MessageReference, ToCoreMessage, User,
};

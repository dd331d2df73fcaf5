//! Core types: user, channel, message (with embeds, attachments, components), handler response, and Handler trait.
//!
//! Types are split into one file per main type.

mod channel;
mod embed;
mod handler;
mod message;
mod response;
mod user;

pub use channel::{Channel, ChannelKind};
pub use embed::{Attachment, ButtonStyle, Component, Embed, EmbedField};
pub use handler::{Handler, ToCoreMessage};
pub use message::{Message, MessageReference};
pub use response::HandlerResponse;
pub use user::User;

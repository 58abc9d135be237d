//! Data models for quotewheel.
//!
//! - `ContentTree`, `Part`, `PartContent`: the content tree document
//! - `QuoteItem`, `QuoteKind`: quotes derived from the tree
//! - `Message`: chat records exchanged with the messaging backend
//! - `NicknameFile`: the nickname suggestion document

pub mod content;
pub mod message;

pub use content::{ContentTree, Part, PartContent, QuoteItem, QuoteKind};
pub use message::{Message, NicknameEntry, NicknameFile};

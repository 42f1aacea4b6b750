//! `cardbox` - local-first contact card storage and rendering
//!
//! This library persists contact cards in an embedded local store, indexes
//! them for prefix search over last name and profession, and renders them
//! as fixed-size printable card documents.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod card;
pub mod config;
pub mod error;
pub mod logging;
pub mod render;
pub mod storage;

pub use card::{CardDraft, CardPatch, ContactCard};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use render::{render_document, Document, DrawOp, Template};
pub use storage::CardRepository;

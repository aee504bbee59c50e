//! Avatar Studio: client core for creating, training and talking to
//! candidate avatars hosted by a remote avatar service.

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod history;
pub mod identity;
pub mod lifecycle;
pub mod manage;
pub mod notify;
pub mod routes;
pub mod store;
pub mod wizard;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};

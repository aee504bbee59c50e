//! Client-local persisted state: a key/value contract plus memory and file backends.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::{LocalStore, keys};

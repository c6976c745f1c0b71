//! System Definitions.
//!
//! Códigos de erro compartilhados entre o núcleo e os backends.

pub mod error;

pub use error::Errno;

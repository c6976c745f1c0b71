//! Core Module
//!
//! Peças centrais do kernel que não pertencem a um subsistema:
//! logging, tempo, o contexto global e o panic handler.

pub mod context;
pub mod logging;
pub mod time;

#[cfg(all(not(test), target_os = "none"))]
pub mod panic;

//! Core types shared by the documentation site crates.
//!
//! This crate provides the `Result` alias used at composition boundaries and
//! the strongly-typed identifiers handed between the security layers.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ParseIdError, SessionId};

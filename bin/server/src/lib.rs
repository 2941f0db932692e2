//! docsite web server.
//!
//! This crate wires the documentation site together: layered configuration,
//! documentation metadata binding, GitHub sign-in, the security chain and
//! the server-rendered pages.

pub mod app;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod pages;

//! Stockspot Core - Shared types library.
//!
//! This crate provides common types used across all Stockspot components:
//! - `app` - Remote store client and the locator/inventory screen models
//! - `cli` - Command-line driver for the screens
//!
//! # Architecture
//!
//! The core crate contains only types and formatting - no I/O, no HTTP
//! clients, no async. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, coordinates, opening hours, shops and products
//! - [`records`] - Row shapes exchanged with the remote store
//! - [`format`] - Relative verification ages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod format;
pub mod records;
pub mod types;

pub use types::*;

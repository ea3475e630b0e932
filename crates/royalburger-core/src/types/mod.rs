//! Type system utilities and aliases.
//!
//! This module provides type aliases and utilities for commonly used
//! complex types throughout the codebase.
//!
//! ## Modules
//!
//! - [`aliases`]: Type aliases for `Arc<Mutex<T>>`, listener handles, etc.

pub mod aliases;

pub use aliases::*;

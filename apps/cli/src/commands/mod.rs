//! # CLI Commands
//!
//! Handlers invoked by [`crate::run`] for each subcommand.
//!
//! - [`cart`] - list / add / increment / decrement / clear

pub mod cart;

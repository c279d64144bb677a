//! # CLI Layer
//!
//! This module is **one possible UI client** for docshelf, not the
//! application itself. It is the only place that:
//! - Knows about terminal I/O (stdout, stderr, the confirmation prompt)
//! - Parses arguments
//! - Writes produced files to disk, through [`docshelf::download`]
//! - Formats output for humans
//!
//! ## Structure
//!
//! - `setup`: clap definitions and grouped help
//! - `commands`: `run()` plus one `handle_*()` per command
//! - `render`: list, detail and message output

pub mod commands;
pub mod render;
pub mod setup;

pub use commands::run;

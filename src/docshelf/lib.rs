//! # Docshelf Architecture
//!
//! Docshelf is a **UI-agnostic document library**: it stores documents,
//! finds them again and converts Word and text files to PDF. The command-line
//! client is one consumer of it, not the application itself.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prints results, prompts, saves files   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Parses selectors, applies configured defaults            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Add, list, view, delete, convert, export                 │
//! │  - Returns CmdResult; produced files are Artifacts          │
//! └─────────────────────────────────────────────────────────────┘
//!                  │                             │
//!                  ▼                             ▼
//! ┌───────────────────────────────┐ ┌───────────────────────────┐
//! │  Storage (store/)             │ │  Conversion (convert/)    │
//! │  - One JSON collection        │ │  - Text → PDF             │
//! │  - FileStore / InMemoryStore  │ │  - DOCX → HTML → image    │
//! │                               │ │    → paged PDF            │
//! └───────────────────────────────┘ └───────────────────────────┘
//! ```
//!
//! ## Stored Documents
//!
//! Every document is a [`model::DocumentRecord`] whose content is the whole
//! original file as a data URL ([`data_url`]). The collection is read and
//! written as a unit under one storage key.
//!
//! ## Testing Strategy
//!
//! - **Commands**: unit tests against `InMemoryStore` fixtures.
//! - **Conversion**: unit tests on each stage plus async end-to-end
//!   conversions of DOCX packages built in the tests.
//! - **CLI**: `assert_cmd` tests in `tests/`, pointing `DOCSHELF_DATA` at a
//!   temporary directory.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Logic for each operation
//! - [`convert`]: Conversion engine and its pipeline stages
//! - [`detect`]: File type detection
//! - [`download`]: Saving produced files without overwriting
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Document records and file categories
//! - [`index`]: Display indexes and selectors
//! - [`config`]: Configuration
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod convert;
pub mod data_url;
pub mod detect;
pub mod download;
pub mod error;
pub mod index;
pub mod init;
pub mod input;
pub mod model;
pub mod store;

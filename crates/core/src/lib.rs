//! Core library for devtui
//!
//! This crate implements the **Functional Core** of the devtui application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The devtui project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`devtui_core`** (this crate): Pure transformation functions with zero I/O
//! - **`devtui`**: Input resolution, rendering, the MCP server and the license client
//!   (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! All functions in this crate take text or values and return values. They never read
//! stdin, touch the filesystem or the network. Randomness is injected through an
//! `rand::Rng` argument and time through a `DateTime<Utc>` argument, so every function
//! can be tested with fixture data and no mocking.
//!
//! # Module Organization
//!
//! - [`convert`]: Parsing and rendering of JSON, YAML, TOML, XML and TOON documents
//! - [`csv`]: CSV to JSON with path-addressed headers (`a.b`, `items[0]`)
//! - [`encoding`]: Base64 encoding and decoding
//! - [`iban`]: IBAN generation and validation
//! - [`input`]: Input heuristics used to build helpful error messages
//! - [`license`]: License record, integrity hash and recheck schedule
//! - [`numbers`]: Integer parsing and base conversion
//! - [`repair`]: Best-effort repair of malformed JSON
//! - [`text`]: Text statistics and URL extraction
//! - [`toon`]: TOON encoder
//! - [`uuid`]: UUID decoding
//! - [`xml`]: XML to JSON mapping and back
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use devtui_core::convert::{convert, Format, RenderStyle};
//!
//! let yaml = convert("{\"a\": [1, 2]}", Format::Json, Format::Yaml, &RenderStyle::default())?;
//! assert_eq!(yaml, "a:\n- 1\n- 2\n");
//! ```

pub mod convert;
pub mod csv;
pub mod encoding;
pub mod error;
pub mod iban;
pub mod input;
pub mod license;
pub mod numbers;
pub mod repair;
pub mod text;
pub mod toon;
pub mod uuid;
pub mod xml;

pub use error::{Error, Result};

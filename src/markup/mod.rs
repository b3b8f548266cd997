//! XML serialization of hierarchical results
//!
//! Options are validated into a [`MarkupConfig`] before a single byte is
//! written. Three views are available (`attributes`, `forest`, `standard`);
//! the forest view can be read back with [`parse_forest`].

mod config;
mod errors;
mod reader;
mod views;
mod writer;

pub use config::{MarkupConfig, MarkupOptions, NameSource, View};
pub use errors::{MarkupError, MarkupResult};
pub use reader::{parse_forest, MAX_ELEMENT_DEPTH};
pub use views::{render_result, row_to_markup, to_markup};
pub use writer::{escape, is_valid_name, sanitize_name};

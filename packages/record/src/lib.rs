#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record normalization and export.
//!
//! [`normalize::Normalizer`] turns a [`gamelog_record_models::RawTable`] into
//! canonical [`gamelog_record_models::GameRecord`]s: header labels are mapped
//! through a [`synonyms::SynonymTable`], cells are parsed by the functions in
//! [`parse`], and anything unreadable becomes a warning instead of a bogus
//! value. [`export`] writes the finished records as CSV and JSON.

pub mod export;
pub mod normalize;
pub mod parse;
pub mod synonyms;

pub use export::ExportError;
pub use normalize::{NormalizeContext, Normalizer};
pub use synonyms::SynonymTable;

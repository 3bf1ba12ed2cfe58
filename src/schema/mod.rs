//! Session record schema
//!
//! This module defines the wire shape of a row in the `sessions` table as
//! delivered by the external data source, and the adapter that validates rows
//! into [`crate::types::Session`] values.

mod adapter;
mod record;

pub use adapter::*;
pub use record::*;

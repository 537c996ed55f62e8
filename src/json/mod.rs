//! JSON interop for values and records.
//!
//! - `converter.rs` - `serde` implementations and `serde_json` conversions

mod converter;

//! JSON bridge
//!
//! Builds attribute trees from loosely-typed JSON content definitions,
//! including item references that are resolved against a content registry.

pub mod json_bridge;

pub use json_bridge::JsonAttributeConverter;

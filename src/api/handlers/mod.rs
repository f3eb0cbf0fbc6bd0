//! HTTP endpoint handlers.

pub mod page;

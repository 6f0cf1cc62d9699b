//! Dataset sinks.

mod writer;

pub use writer::{OutputFormat, Writer};

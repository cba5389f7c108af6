//! Protocols used to support a simple text-based console.

pub mod text;

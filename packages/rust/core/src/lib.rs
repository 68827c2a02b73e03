//! Core conversion pipeline and identity dispatch for texset.
//!
//! An inbound request flows: [`dispatch::Registry`] resolves the caller →
//! the matched handler runs → the conversion pipeline derives canonical
//! names from the attachments ([`collector`]), renders one descriptor per
//! name ([`descriptor`]), and sends the results back through the
//! [`sink::MessageSink`] boundary, cleaning up every local artifact on the
//! way out ([`pipeline`]).

pub mod collector;
pub mod descriptor;
pub mod dispatch;
pub mod fetch;
pub mod pipeline;
pub mod sink;

// Re-export public API at crate root for ergonomic imports.
pub use dispatch::{AdminHandler, Handler, MemorySnapshot, Registration, Registry};
pub use fetch::Fetcher;
pub use pipeline::{ConvertHandler, MAX_BATCH_FILES, PipelineReport};
pub use sink::MessageSink;

//! Delivery of native event notifications to registered handlers.
//!
//! The client library calls the fixed entry points in [`abi`] from its own threads. Each one
//! reads the process-wide [`registry::HandlerRegistry`], converts its arguments, and calls the
//! matching handler from [`callback::ClientCallbacks`] on the calling thread.

pub mod abi;
pub mod callback;
pub mod envelope;
pub mod registry;

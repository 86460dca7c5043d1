//! Pure transformations from fetched store payloads into chart-ready data.
//!
//! Each loader holds a borrowed store and the slice of configuration it
//! needs. Loading has no side effects beyond the store read, so a render
//! can run them any number of times.

pub mod batch;
pub mod stream;
pub mod topics;

pub use batch::{normalize_batch, parse_batch_payload, BatchResultLoader, BatchSource};
pub use stream::{normalize_stream, StreamResultLoader, StreamSource};
pub use topics::{normalize_topics, TopicKeywordLoader};

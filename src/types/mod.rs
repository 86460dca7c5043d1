pub mod batch;
pub mod series;
pub mod stream;
pub mod topics;

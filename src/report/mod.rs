pub mod digest;
pub mod summary;
pub mod writer;

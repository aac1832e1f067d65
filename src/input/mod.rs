//! Input module
//! Snapshot detection, loading and the document store boundary

pub mod file_detector;
pub mod manager;
pub mod store;

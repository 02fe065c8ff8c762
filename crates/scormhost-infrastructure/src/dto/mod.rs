//! Data Transfer Objects (DTOs) for persistence.
//!
//! Private to the infrastructure layer; they absorb older on-disk formats
//! so domain types stay single-shaped.

mod tracking;

pub use tracking::{TrackingFileDTO, VisitsFileDTO};

//! Tracking log, visits, and the per-visit combined view.

pub mod aggregator;
pub mod duration;
pub mod memory;
pub mod model;
pub mod repository;

pub use aggregator::{combine, combine_all};
pub use duration::{
    VisitSummary, parse_duration_seconds, session_seconds, summarize, summarize_all, visit_numbers,
};
pub use memory::InMemoryTrackingRepository;
pub use model::{
    CombinedSnapshot, TrackingEntry, UNKNOWN_VISIT, VisitLog, VisitReceipt, VisitRecord,
    new_visit_id, now_millis,
};
pub use repository::TrackingRepository;

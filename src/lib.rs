//! Boardroom CRUD-analytics screens for CourtEvo Vero.
//!
//! Every screen is the same pattern: a seed dataset loaded into an
//! undoable [`store::Store`], a filter layer over it, derived metrics and
//! canned insights on top, and CSV/PDF/markdown exports of what is visible.

pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod form;
pub mod metrics;
pub mod models;
pub mod narrative;
pub mod report;
pub mod scenario;
pub mod screen;
pub mod store;
pub mod widgets;

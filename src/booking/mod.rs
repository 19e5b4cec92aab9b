//! Booking engine for Recharge Travels.
//!
//! Covers both reservation flows end to end: the draft a visitor edits,
//! the step gates that pace them through it, deterministic pricing and
//! commission math, and submission to the booking store. Everything here
//! is pure apart from `services`, which wires the engine to Postgres and
//! the catalog cache.

pub mod calculators;
pub mod draft;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod services;
pub mod steps;
pub mod voucher;

// Re-export commonly used items
pub use calculators::{price, round_money, split, CommissionBreakdown, PricingSnapshot};
pub use draft::{BookingMode, Draft, SelectionStore};
pub use services::{BookingSession, BookingStore, QuoteOutcome, SubmitError};
pub use steps::{FlowController, GateReport, StepId};

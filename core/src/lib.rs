//! cohort-core: cohort × months-since-acquisition matrices for customer
//! retention and lifetime value, with a CAC / break-even overlay.
//!
//! Build order, leaves first:
//!   fact, month, currency, ratio → filter → pivot → cac → dashboard

pub mod cac;
pub mod config;
pub mod currency;
pub mod dashboard;
pub mod error;
pub mod fact;
pub mod filter;
pub mod loader;
pub mod month;
pub mod pivot;
pub mod ratio;
pub mod rng;
pub mod synthetic;
pub mod types;

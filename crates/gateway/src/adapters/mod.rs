//! Venue adapters

pub mod paper;

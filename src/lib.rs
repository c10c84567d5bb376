//! Intersection Scheduling Library
//!
//! Coordinates right-of-way for a single four-way intersection and simulates
//! vehicle motion under a strict one-lane-at-a-time crossing rule.

pub mod simulation;
pub mod stats;

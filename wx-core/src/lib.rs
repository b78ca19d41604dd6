//! Core types for the weather trend dashboard.
//!
//! This crate provides:
//! - `response`: wire types returned by the weather analysis service
//! - `normalized_date`: timestamp to calendar-day normalization
//! - `metric`: metric identifier classification and units
//! - `error`: the shared `TrendError` type

pub mod error;
pub mod metric;
pub mod normalized_date;
pub mod response;

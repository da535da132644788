//! Shared models for the e-filing petition service.
//!
//! `model` holds the static configuration shapes (field definitions and
//! template families) and `responses` the JSON bodies returned by the
//! backend's status and error endpoints.

pub mod model;
pub mod responses;

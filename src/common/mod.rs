//! Common utilities and shared functionality
//!
//! This module contains the seams and configuration plumbing used across the engine.

pub mod config;
pub mod traits;

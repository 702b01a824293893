//! Caller-facing use-case layer.
//!
//! # Responsibility
//! - Validate input and enforce business rules before delegating.
//! - Keep hosts decoupled from repository and storage details.

pub mod movie_controller;

//! NoteEase form intake backend.
//!
//! Contact messages, writer applications and generic requests are validated
//! against per-form field specs, stored in MongoDB with an optional uploaded
//! file, and announced to an administrator.

pub mod app;
pub mod config;
pub mod dto;
pub mod handler;
pub mod model;
pub mod repository;
pub mod router;
pub mod service;
pub mod util;
pub mod validation;

//! Helpers for persisting trained models.

pub mod json;

pub use json::{load_model, model_json, save_model};

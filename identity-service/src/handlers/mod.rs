//! HTTP handlers for the identity service.

pub mod admin;
pub mod auth;
pub mod menu;

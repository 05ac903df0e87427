//! Shopkart API library.
//!
//! This crate provides the backend functionality as a library, allowing it
//! to be tested and reused; `main.rs` is a thin bootstrap around it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

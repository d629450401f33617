//! Chat Service: two-party messaging di atas denormalized wide-column tables.
//!
//! Setiap message ditulis (fan-out) ke beberapa table yang masing-masing
//! di-partition untuk satu read pattern, sehingga setiap read hanya
//! menyentuh satu partition dalam native clustering order.

pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod repositories;
pub mod routes;
pub mod services;

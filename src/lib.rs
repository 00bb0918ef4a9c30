//! SportsHub - REST backend for publishing sports articles
//!
//! This library provides the core functionality for the SportsHub backend:
//! articles, languages, JWT authentication with a deny-list, and DB-backed
//! image storage.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

//! Core library for spotify-pkce-login
pub mod config;
pub mod db;
pub mod store;
pub mod api;

//! HTTP surface of the maintenance prediction service

pub mod api;
pub mod config;

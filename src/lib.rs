//! omegabrr - keeps autobrr filters in sync with Arr libraries and curated lists

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod jobs;
pub mod services;

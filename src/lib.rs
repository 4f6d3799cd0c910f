pub mod analytics;
pub mod app;
pub mod auth;
pub mod comments;
pub mod config;
pub mod error;
pub mod oauth;
pub mod posts;

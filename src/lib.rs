pub mod auth;
pub mod cli;
pub mod client;
pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod form;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod server;
pub mod services;
pub mod types;

#[cfg(test)]
pub mod testing;

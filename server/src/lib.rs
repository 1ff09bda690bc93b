pub extern crate actix_web;

pub mod admin;
pub mod broadcaster;
pub mod config;
pub mod connection;
pub mod connection_tx_storage;
pub mod handlers;
mod presence;
mod router;
pub mod server;
mod server_state;

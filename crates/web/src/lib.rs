pub mod client;
pub mod config;
pub mod pages;
pub mod render;
pub mod routes;
pub mod server;
pub mod submission;

pub mod config;
pub mod domain;
pub mod server;
pub mod store;
pub mod terminal;
pub mod worker;

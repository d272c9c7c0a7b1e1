pub mod api;
pub mod config;
pub mod departments;
pub mod export;
pub mod render;
pub mod search;
pub mod server;
pub mod solr;

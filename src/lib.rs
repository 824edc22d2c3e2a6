pub mod app;
pub mod config;
pub mod dynamo;
pub mod error;
pub mod models;
pub mod store;

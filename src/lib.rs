pub mod config;
pub mod models;
pub mod store;
pub mod policy;
pub mod follow;
pub mod gateway;
pub mod media;
pub mod worker;
pub mod metrics;
pub mod api;

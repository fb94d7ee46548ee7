pub mod config;
pub mod contract;
pub mod error;
pub mod http;
pub mod ipc;
pub mod models;
pub mod repository;
pub mod seed;
pub mod state;
pub mod storage;

pub use http::build_router;

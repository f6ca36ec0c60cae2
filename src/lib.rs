pub mod admin;
pub mod analysis;
pub mod config;
pub mod dataset;
pub mod output;
pub mod scoring;
pub mod storage;

pub mod auth;
pub mod broker;
pub mod compose;
pub mod config;
pub mod gateway;
pub mod job;
pub mod normalize;
pub mod report;
pub mod service;

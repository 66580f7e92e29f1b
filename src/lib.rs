//! Chirpy 服务库
//! 认证核心、仓储与 HTTP 层

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod telemetry;

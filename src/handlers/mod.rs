//! HTTP 处理器模块

pub mod admin;
pub mod auth;
pub mod chirp;
pub mod health;
pub mod user;
pub mod webhook;

use crate::error::AppError;
use axum::extract::{FromRequest, FromRequestParts};

/// JSON 请求体提取器，解析失败统一返回 400 错误体
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// 路径参数提取器，解析失败返回统一错误体
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// 查询参数提取器
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

//! `gettr-http` is an async HTTP client engine for the GETTR API.
//!
//! The crate wraps the platform's GET endpoints with a retrying,
//! envelope-unwrapping request engine:
//! - [`GettrClient::get`] — one request with transient-failure retries
//! - [`GettrClient::get_paginated`] — lazy offset-paginated page sequence
//!
//! Endpoint catalogs, auth header construction, and CLI front ends live in
//! separate crates; they hand this engine a path, query parameters, and an
//! opaque header map.

mod client;
mod error;
mod options;
mod pages;
mod params;

pub use client::{GettrClient, GETTR_API_BASE_URL};
pub use error::{FailureDetail, GettrError};
pub use options::ClientOptions;
pub use pages::Pages;
pub use params::Params;

pub type Result<T> = std::result::Result<T, GettrError>;

//! HTTP transport shared by the request pipeline and the refresh call

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};

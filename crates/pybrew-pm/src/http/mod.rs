//! Blocking HTTP access for index listings and distribution downloads.

mod client;

pub use client::{HttpClient, HttpClientConfig, HttpError, HttpResponse, Transport};

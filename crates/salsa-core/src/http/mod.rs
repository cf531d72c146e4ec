//! HTTP transport.

mod client;

pub use client::{
    cancellable, write_stream, DefaultHeader, HttpClient, HttpClientConfig, HttpError, ProgressFn,
};

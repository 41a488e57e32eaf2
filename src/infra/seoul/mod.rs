//! Seoul Open Data Plaza client (`openapi.seoul.go.kr`).

pub mod client;

pub use client::OpenApiClient;

// Common types and utilities shared across the application

pub mod credentials;

pub use credentials::ApiKey;

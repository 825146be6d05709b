pub mod client;
pub mod errors;
pub mod models;
pub mod sse;

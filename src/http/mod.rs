//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, request pipeline)
//!     → request.rs (request ID assigned and propagated)
//!     → [routing classifies, upstream fetches, privacy redacts]
//!     → response.rs (headers, JSON or plain text body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + SERVICE_HOST env + CLI flags
//!     → loader.rs (parse, deserialize, apply overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via ArcSwap with the request pipeline
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config, re-applying env and CLI overrides
//!     → validation.rs validates
//!     → atomic swap of Arc<GatewayConfig>
//!     → subsequent requests observe new config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields except the backend address have defaults
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_with, ConfigError, Overrides};
pub use schema::{
    CacheConfig, GatewayConfig, ListenerConfig, LogFormat, ObservabilityConfig, TimeoutConfig,
    UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};

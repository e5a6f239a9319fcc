pub mod browser_config;
pub mod cli;
pub mod clock;
pub mod config;
pub mod context;
pub mod engine;
pub mod executor;
pub mod formatter;
pub mod history;
pub mod intent;
pub mod rewriter;
pub mod scheduler;
pub mod storage;

pub use engine::Engine;
pub use helm_common::platform;
pub use helm_common::protocol;

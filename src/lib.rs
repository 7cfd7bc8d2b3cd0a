pub mod config;
pub mod context;
pub mod contracts;
pub mod history;
pub mod liquidation;
pub mod models;
pub mod monitoring;
pub mod scheduler;

pub use config::BotConfig;
pub use context::BotContext;
pub use history::HistoryStore;
pub use models::*;

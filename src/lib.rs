pub mod app;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod errors;
pub mod habits;
pub mod handlers;
pub mod models;
pub mod reminder;
pub mod remote;
pub mod state;
pub mod status;
pub mod storage;
pub mod sync;
pub mod ticker;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::{AppState, Session};
pub use storage::{FileStore, KeyValueStore, MemoryStore};

mod indexer;
mod server;
pub mod services;
mod settings;

pub use indexer::run as run_indexer;
pub use server::{configure_routes, run as run_server};
pub use settings::Settings;

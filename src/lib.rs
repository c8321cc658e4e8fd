pub mod config;
pub mod error;
pub mod infra;
pub mod routes;
pub mod shared;
pub mod state;

pub use config::Config;
pub use error::AppError;
pub use routes::router;
pub use state::AppState;

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use services::{Claims, ClockCodeService, UserRole};

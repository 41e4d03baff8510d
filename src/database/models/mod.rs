pub mod attendance;
pub mod clock;
pub mod settings;
pub mod shift;

// Re-export all models for easy importing
pub use attendance::*;
pub use clock::*;
pub use settings::*;
pub use shift::*;

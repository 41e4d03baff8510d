pub mod auth;
pub mod clock_code;

pub use auth::{Claims, UserRole};
pub use clock_code::{ClockCodeError, ClockCodeService, IssuedClockCode};

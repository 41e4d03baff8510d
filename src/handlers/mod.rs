pub mod clock;
pub mod reports;
pub mod shared;
pub mod shifts;

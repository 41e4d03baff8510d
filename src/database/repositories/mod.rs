pub mod attendance;
pub mod clock;
pub mod shift;

// Re-export all repositories for easy importing
pub use attendance::AttendanceRepository;
pub use clock::ClockRepository;
pub use shift::ShiftRepository;

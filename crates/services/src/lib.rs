#![forbid(unsafe_code)]

pub mod catalog;
pub mod content_service;
pub mod error;
pub mod profile_service;
pub mod session;
pub mod stats_service;

pub use quiz_core::Clock;

pub use content_service::ContentService;
pub use error::{ContentServiceError, ProfileServiceError, SessionError, StatsError};
pub use profile_service::ProfileService;
pub use session::{
    QuizSessionController, QuizSessionService, SessionClock, SessionProgress, SessionStatus,
    TimerHandle, SESSION_BUDGET_SECS,
};
pub use stats_service::StatsService;

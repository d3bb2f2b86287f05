//! Client core of the opening trainer: the practice-session controller, the
//! lesson replay controller and the pieces they share.

pub mod candidates;
pub mod clients;
pub mod config;
pub mod error;
pub mod lesson;
pub mod models;
pub mod openings;
pub mod session;
pub mod telemetry;

pub use candidates::CandidateTracker;
pub use clients::{HttpTrainerApi, TrainerApi};
pub use config::ClientConfig;
pub use error::{ClientError, LessonError};
pub use lesson::Lesson;
pub use models::{
    GameStartResponse, MoveResponse, OpeningDetail, OpeningId, OpeningSummary, PlayerColor,
    SessionId, ToggleAck,
};
pub use openings::OpeningCache;
pub use session::{Ending, Mode, PendingMove, Phase, SessionController, SubmitOutcome};

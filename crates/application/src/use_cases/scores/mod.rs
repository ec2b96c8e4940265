pub mod validate_score;

pub use validate_score::ValidateScoreUseCase;

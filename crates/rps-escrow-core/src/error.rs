use rps_custody::CustodyError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RoundError>;

/// Rejections of a round operation. Every variant leaves the round untouched.
#[derive(Debug, Error)]
pub enum RoundError {
    #[error("Betting closed: the round already has two players")]
    BettingClosed,

    #[error("Awaiting bets: both players must bet before revealing")]
    AwaitingBets,

    #[error("Duplicate: caller already acted in this phase")]
    Duplicate,

    #[error("Caller is not a player in the current round")]
    NotAPlayer,

    #[error("Cheating detected")]
    CheatingDetected,

    #[error("Too early: the round timeout has not elapsed")]
    TooEarly,

    #[error("Custody error: {0}")]
    Custody(#[from] CustodyError),
}

impl RoundError {
    /// Stable machine-readable code
    pub fn kind(&self) -> &'static str {
        match self {
            RoundError::BettingClosed => "betting_closed",
            RoundError::AwaitingBets => "awaiting_bets",
            RoundError::Duplicate => "duplicate",
            RoundError::NotAPlayer => "not_a_player",
            RoundError::CheatingDetected => "cheating_detected",
            RoundError::TooEarly => "too_early",
            RoundError::Custody(_) => "custody",
        }
    }
}

/// Invalid round configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Betting amount must be greater than zero")]
    ZeroBettingAmount,

    #[error("Round timeout must be greater than zero")]
    ZeroTimeout,

    #[error("Payout of twice the betting amount overflows")]
    PayoutOverflow,

    #[error("Asset identity must not be empty")]
    EmptyAsset,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

//! Fixed rules for the quiz board session.
//!
//! Scoring and timing rules are not configurable through board documents;
//! changing them is a code change.

/// Fewest teams a game can be started with.
pub const MIN_TEAMS: usize = 2;
/// Most teams a game can be started with.
pub const MAX_TEAMS: usize = 6;

/// Reward multiplier applied to a daily double clue's face value.
pub const DAILY_DOUBLE_MULTIPLIER: i64 = 2;

/// Sentinel id of the final clue in the answered set and wager ledger.
pub const FINAL_CLUE_ID: &str = "final";

/// Delay between the board being cleared and the final intro appearing.
pub const FINAL_OFFER_DELAY_MS: u64 = 3_000;

/// Seed used when the host does not supply one.
pub const DEFAULT_SEED: u64 = 0x0051_5A0B_0A2D;

// Domain tags for derived RNG streams.
pub(crate) const DAILY_DOUBLE_STREAM_TAG: &[u8] = b"quizboard-daily-double";

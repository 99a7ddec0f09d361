//! Core game logic - pure, deterministic, and testable
//!
//! This crate holds the rules engine of the match-3 game: the card grid, match
//! detection, cascades, scoring, timers and the session state machine. It has
//! no dependency on terminals, networking, or wall-clock time:
//!
//! - **Deterministic**: the same seed and input sequence produce the same game
//! - **Tick driven**: [`Session::tick`] is the only clock
//! - **Headless**: presentation reads snapshots and drains events
//!
//! # Module Structure
//!
//! - [`level`]: level records, normalization, session config resolution
//! - [`card`]: card entities, kind palette, card factory
//! - [`grid`]: the authoritative rows × cols grid
//! - [`matcher`]: match detection, swap testing, hint search
//! - [`cascade`]: remove → compact → refill → settle state machine
//! - [`scoring`]: points, combo multiplier, trap penalty
//! - [`clock`]: countdown and one-shot timers
//! - [`event`]: outcome events
//! - [`report`]: result records and the reporter seam
//! - [`session`]: the player-facing state machine
//!
//! # Example
//!
//! ```
//! use tui_match3_core::{CascadePacing, GameConfig, Session, SessionStatus};
//!
//! let config = GameConfig::campaign()
//!     .with_seed(42)
//!     .with_pacing(CascadePacing::immediate());
//! let mut session = Session::new(config);
//! assert_eq!(session.status(), SessionStatus::Playing);
//!
//! // Try the swap the hint search would suggest.
//! if session.use_hint() {
//!     if let Some((a, b)) = session.hint_pair() {
//!         session.select(a);
//!         session.select(b);
//!     }
//! }
//! session.tick(16);
//! for event in session.drain_events() {
//!     println!("{}", event.name());
//! }
//! ```

pub mod card;
pub mod cascade;
pub mod clock;
pub mod event;
pub mod grid;
pub mod level;
pub mod matcher;
pub mod report;
pub mod scoring;
pub mod session;

pub use tui_match3_types as types;

pub use card::{Card, CardFactory, CardId, KindPalette, SpawnRules};
pub use cascade::{CascadePacing, CascadePhase, CascadeResolver, CascadeSignal};
pub use clock::{Countdown, CountdownTick, OneShot};
pub use event::{GameEvent, OutcomeSummary, ScoreEvent};
pub use grid::Grid;
pub use level::{
    default_catalog, parse_levels, GameConfig, GridSizeConfig, LevelConfig, LevelDefinition,
    ResolvedConfig,
};
pub use matcher::{detect_swap_match, find_hint_pair, find_matches, has_possible_move, Axis, MatchGroup};
pub use report::{FnReporter, MemoryReporter, ReportError, ResultRecord, ResultReporter};
pub use scoring::{next_streak, score_cards, score_match, ScoreBreakdown};
pub use session::{Session, SessionStatus};

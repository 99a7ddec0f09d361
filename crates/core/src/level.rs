//! Level catalog module - level records, normalization and config resolution
//!
//! Levels arrive as loosely-typed [`LevelConfig`] records (usually JSON) and are
//! normalized into immutable [`LevelDefinition`]s. Normalization never rejects a
//! level: out-of-range values are clamped or floored to the nearest valid value.
//!
//! [`GameConfig`] carries the session-wide options and resolves into a
//! [`ResolvedConfig`], the single fully-populated configuration a
//! [`Session`](crate::session::Session) is built from.

use serde::{Deserialize, Serialize};

use crate::card::KindPalette;
use crate::cascade::CascadePacing;
use crate::types::{
    DEFAULT_CARD_KINDS, DEFAULT_COLS, DEFAULT_ROWS, MIN_MATCH_FLOOR, TRAP_RATE_MAX,
};

/// Largest accepted grid dimension.
pub const MAX_GRID_DIM: u8 = 64;

/// Target score of the synthesized default level.
pub const DEFAULT_TARGET_SCORE: u32 = 500;

/// Trap rate used by the synthesized default level when traps are enabled.
pub const DEFAULT_TRAP_RATE: f64 = 0.05;

/// Raw grid size as it appears in level files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSizeConfig {
    pub rows: f64,
    pub cols: f64,
}

/// Raw level record. Every field is optional; see [`LevelConfig::normalize`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LevelConfig {
    pub id: Option<u32>,
    pub name: Option<String>,
    pub grid_size: Option<GridSizeConfig>,
    pub card_kinds: Option<f64>,
    pub min_match: Option<f64>,
    pub trap_rate: Option<f64>,
    pub time_limit: Option<f64>,
    pub move_limit: Option<f64>,
    pub target_score: Option<f64>,
    pub shuffles: Option<f64>,
    pub hints: Option<f64>,
    pub combo_bonus: Option<f64>,
}

/// Fallbacks for fields a level record leaves out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelDefaults {
    pub rows: u8,
    pub cols: u8,
    pub card_kinds: u8,
    pub min_match: u8,
}

impl Default for LevelDefaults {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            card_kinds: DEFAULT_CARD_KINDS,
            min_match: MIN_MATCH_FLOOR,
        }
    }
}

/// A normalized, immutable level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelDefinition {
    pub id: u32,
    pub name: Option<String>,
    pub rows: u8,
    pub cols: u8,
    pub card_kinds: u8,
    /// Always `>= 3`.
    pub min_match: u8,
    /// Always within `0.0..=0.9`.
    pub trap_rate: f64,
    /// Countdown in seconds.
    pub time_limit: Option<u32>,
    pub move_limit: Option<u32>,
    pub target_score: u32,
    pub shuffles: u32,
    pub hints: u32,
    pub combo_bonus: f64,
}

impl LevelDefinition {
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("Level {}", self.id),
        }
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Floor `value` and clamp it into `min..=max`, falling back to `default`.
fn floor_clamped(value: Option<f64>, default: f64, min: f64, max: f64) -> f64 {
    finite(value).unwrap_or(default).floor().clamp(min, max)
}

impl LevelConfig {
    /// Normalize into a [`LevelDefinition`]. `index` is the record's position
    /// in the level list and supplies the default id.
    pub fn normalize(&self, index: usize, defaults: &LevelDefaults) -> LevelDefinition {
        let (rows, cols) = match self.grid_size {
            Some(size) => (
                floor_clamped(Some(size.rows), defaults.rows as f64, 1.0, MAX_GRID_DIM as f64),
                floor_clamped(Some(size.cols), defaults.cols as f64, 1.0, MAX_GRID_DIM as f64),
            ),
            None => (defaults.rows as f64, defaults.cols as f64),
        };

        let limit = |v: Option<f64>| finite(v).map(|v| v.floor().clamp(0.0, u32::MAX as f64) as u32);

        LevelDefinition {
            id: self.id.unwrap_or(index as u32 + 1),
            name: self.name.clone(),
            rows: rows as u8,
            cols: cols as u8,
            card_kinds: floor_clamped(self.card_kinds, defaults.card_kinds as f64, 1.0, u8::MAX as f64)
                as u8,
            min_match: floor_clamped(
                self.min_match,
                defaults.min_match as f64,
                MIN_MATCH_FLOOR as f64,
                u8::MAX as f64,
            ) as u8,
            trap_rate: finite(self.trap_rate).unwrap_or(0.0).clamp(0.0, TRAP_RATE_MAX),
            time_limit: limit(self.time_limit),
            move_limit: limit(self.move_limit),
            target_score: floor_clamped(self.target_score, 0.0, 0.0, u32::MAX as f64) as u32,
            shuffles: floor_clamped(self.shuffles, 0.0, 0.0, u32::MAX as f64) as u32,
            hints: floor_clamped(self.hints, 0.0, 0.0, u32::MAX as f64) as u32,
            combo_bonus: finite(self.combo_bonus).unwrap_or(0.0).max(0.0),
        }
    }
}

/// Parse a JSON array of level records.
pub fn parse_levels(json: &str) -> Result<Vec<LevelConfig>, serde_json::Error> {
    serde_json::from_str(json)
}

fn level(
    name: &str,
    size: (f64, f64),
    card_kinds: f64,
    trap_rate: f64,
    time_limit: Option<f64>,
    move_limit: Option<f64>,
    target_score: f64,
    shuffles: f64,
    hints: f64,
    combo_bonus: f64,
) -> LevelConfig {
    LevelConfig {
        id: None,
        name: Some(name.to_string()),
        grid_size: Some(GridSizeConfig {
            rows: size.0,
            cols: size.1,
        }),
        card_kinds: Some(card_kinds),
        min_match: Some(3.0),
        trap_rate: Some(trap_rate),
        time_limit,
        move_limit,
        target_score: Some(target_score),
        shuffles: Some(shuffles),
        hints: Some(hints),
        combo_bonus: Some(combo_bonus),
    }
}

/// The built-in campaign.
pub fn default_catalog() -> Vec<LevelConfig> {
    vec![
        level("Warm Up", (8.0, 8.0), 5.0, 0.0, None, Some(25.0), 500.0, 2.0, 3.0, 0.1),
        level("Traps Appear", (8.0, 8.0), 5.0, 0.05, Some(120.0), None, 800.0, 2.0, 2.0, 0.1),
        level("Six Colors", (8.0, 8.0), 6.0, 0.05, None, Some(30.0), 1200.0, 1.0, 2.0, 0.15),
        level("Wide Board", (9.0, 9.0), 6.0, 0.08, Some(150.0), Some(40.0), 1600.0, 1.0, 1.0, 0.15),
        level("Finale", (9.0, 9.0), 7.0, 0.1, Some(180.0), None, 2200.0, 1.0, 1.0, 0.2),
    ]
}

/// Session options before resolution.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Ordered level records. Empty means "synthesize one default level".
    pub levels: Vec<LevelConfig>,
    /// Level to start on (clamped into range).
    pub level_index: usize,
    /// Grid size for levels that omit one.
    pub grid_size: Option<(u8, u8)>,
    /// Card kinds for levels that omit them.
    pub card_kinds: Option<u8>,
    /// Minimum match for levels that omit it.
    pub min_match: Option<u8>,
    /// Enables traps on the synthesized default level.
    pub trap: bool,
    /// Initial sound state.
    pub sound: bool,
    pub palette: KindPalette,
    pub pacing: CascadePacing,
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            levels: Vec::new(),
            level_index: 0,
            grid_size: None,
            card_kinds: None,
            min_match: None,
            trap: false,
            sound: true,
            palette: KindPalette::default(),
            pacing: CascadePacing::default(),
            seed: 1,
        }
    }
}

impl GameConfig {
    /// Default options with the built-in campaign.
    pub fn campaign() -> Self {
        Self {
            levels: default_catalog(),
            ..Self::default()
        }
    }

    pub fn with_levels(mut self, levels: Vec<LevelConfig>) -> Self {
        self.levels = levels;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_pacing(mut self, pacing: CascadePacing) -> Self {
        self.pacing = pacing;
        self
    }

    fn defaults(&self) -> LevelDefaults {
        let base = LevelDefaults::default();
        let (rows, cols) = self.grid_size.unwrap_or((base.rows, base.cols));
        LevelDefaults {
            rows: rows.clamp(1, MAX_GRID_DIM),
            cols: cols.clamp(1, MAX_GRID_DIM),
            card_kinds: self.card_kinds.unwrap_or(base.card_kinds).max(1),
            min_match: self.min_match.unwrap_or(base.min_match).max(MIN_MATCH_FLOOR),
        }
    }

    fn synthesized_level(&self) -> LevelConfig {
        let defaults = self.defaults();
        LevelConfig {
            id: Some(1),
            name: Some("Default".to_string()),
            grid_size: Some(GridSizeConfig {
                rows: defaults.rows as f64,
                cols: defaults.cols as f64,
            }),
            card_kinds: Some(defaults.card_kinds as f64),
            min_match: Some(defaults.min_match as f64),
            trap_rate: Some(if self.trap { DEFAULT_TRAP_RATE } else { 0.0 }),
            time_limit: None,
            move_limit: None,
            target_score: Some(DEFAULT_TARGET_SCORE as f64),
            shuffles: Some(2.0),
            hints: Some(2.0),
            combo_bonus: Some(0.1),
        }
    }

    /// Merge defaults with overrides into one immutable configuration.
    pub fn resolve(&self) -> ResolvedConfig {
        let defaults = self.defaults();
        let levels: Vec<LevelDefinition> = if self.levels.is_empty() {
            vec![self.synthesized_level().normalize(0, &defaults)]
        } else {
            self.levels
                .iter()
                .enumerate()
                .map(|(idx, level)| level.normalize(idx, &defaults))
                .collect()
        };

        ResolvedConfig {
            start_index: self.level_index.min(levels.len() - 1),
            levels,
            sound: self.sound,
            palette: self.palette.clone(),
            pacing: self.pacing,
            seed: self.seed,
        }
    }
}

/// Fully-populated session configuration.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Never empty.
    pub levels: Vec<LevelDefinition>,
    pub start_index: usize,
    pub sound: bool,
    pub palette: KindPalette,
    pub pacing: CascadePacing,
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_clamps_out_of_range_values() {
        let raw = LevelConfig {
            grid_size: Some(GridSizeConfig {
                rows: -4.0,
                cols: 500.0,
            }),
            card_kinds: Some(0.0),
            min_match: Some(2.0),
            trap_rate: Some(3.0),
            time_limit: Some(-10.0),
            move_limit: Some(12.7),
            target_score: Some(-1.0),
            shuffles: Some(1.9),
            hints: Some(-2.0),
            combo_bonus: Some(-0.5),
            ..LevelConfig::default()
        };

        let level = raw.normalize(2, &LevelDefaults::default());

        assert_eq!(level.id, 3);
        assert_eq!(level.rows, 1);
        assert_eq!(level.cols, MAX_GRID_DIM);
        assert_eq!(level.card_kinds, 1);
        assert_eq!(level.min_match, 3);
        assert_eq!(level.trap_rate, TRAP_RATE_MAX);
        assert_eq!(level.time_limit, Some(0));
        assert_eq!(level.move_limit, Some(12));
        assert_eq!(level.target_score, 0);
        assert_eq!(level.shuffles, 1);
        assert_eq!(level.hints, 0);
        assert_eq!(level.combo_bonus, 0.0);
    }

    #[test]
    fn test_normalize_uses_defaults_for_missing_fields() {
        let level = LevelConfig::default().normalize(0, &LevelDefaults::default());

        assert_eq!(level.id, 1);
        assert_eq!((level.rows, level.cols), (DEFAULT_ROWS, DEFAULT_COLS));
        assert_eq!(level.card_kinds, DEFAULT_CARD_KINDS);
        assert_eq!(level.min_match, 3);
        assert_eq!(level.time_limit, None);
        assert_eq!(level.move_limit, None);
    }

    #[test]
    fn test_non_finite_numbers_fall_back() {
        let raw = LevelConfig {
            trap_rate: Some(f64::NAN),
            combo_bonus: Some(f64::INFINITY),
            time_limit: Some(f64::NAN),
            ..LevelConfig::default()
        };
        let level = raw.normalize(0, &LevelDefaults::default());
        assert_eq!(level.trap_rate, 0.0);
        assert_eq!(level.combo_bonus, 0.0);
        assert_eq!(level.time_limit, None);
    }

    #[test]
    fn test_parse_levels_from_json() {
        let json = r#"[
            {"id": 7, "name": "Seven", "gridSize": {"rows": 6, "cols": 7},
             "cardKinds": 4, "minMatch": 4, "trapRate": 0.2, "timeLimit": 60,
             "targetScore": 300, "shuffles": 1, "hints": 2, "comboBonus": 0.25},
            {"targetScore": 100}
        ]"#;

        let raw = parse_levels(json).unwrap();
        assert_eq!(raw.len(), 2);

        let first = raw[0].normalize(0, &LevelDefaults::default());
        assert_eq!(first.id, 7);
        assert_eq!(first.name.as_deref(), Some("Seven"));
        assert_eq!((first.rows, first.cols), (6, 7));
        assert_eq!(first.min_match, 4);
        assert_eq!(first.time_limit, Some(60));
        assert_eq!(first.combo_bonus, 0.25);

        let second = raw[1].normalize(1, &LevelDefaults::default());
        assert_eq!(second.id, 2);
        assert_eq!(second.target_score, 100);
    }

    #[test]
    fn test_empty_level_list_synthesizes_default() {
        let resolved = GameConfig::default().resolve();

        assert_eq!(resolved.levels.len(), 1);
        let level = &resolved.levels[0];
        assert_eq!(level.name.as_deref(), Some("Default"));
        assert_eq!(level.target_score, DEFAULT_TARGET_SCORE);
        assert_eq!(level.shuffles, 2);
        assert_eq!(level.hints, 2);
        assert_eq!(level.combo_bonus, 0.1);
        assert_eq!(level.trap_rate, 0.0);
    }

    #[test]
    fn test_trap_toggle_enables_default_trap_rate() {
        let config = GameConfig {
            trap: true,
            ..GameConfig::default()
        };
        assert_eq!(config.resolve().levels[0].trap_rate, DEFAULT_TRAP_RATE);
    }

    #[test]
    fn test_start_index_is_clamped() {
        let config = GameConfig {
            level_index: 99,
            ..GameConfig::campaign()
        };
        let resolved = config.resolve();
        assert_eq!(resolved.start_index, resolved.levels.len() - 1);
    }

    #[test]
    fn test_config_defaults_apply_to_sparse_levels() {
        let config = GameConfig {
            grid_size: Some((5, 6)),
            card_kinds: Some(4),
            min_match: Some(1),
            ..GameConfig::default()
        }
        .with_levels(vec![LevelConfig::default()]);

        let level = &config.resolve().levels[0];
        assert_eq!((level.rows, level.cols), (5, 6));
        assert_eq!(level.card_kinds, 4);
        assert_eq!(level.min_match, 3);
    }

    #[test]
    fn test_default_catalog_is_well_formed() {
        let resolved = GameConfig::campaign().resolve();
        assert_eq!(resolved.levels.len(), 5);
        for (idx, level) in resolved.levels.iter().enumerate() {
            assert_eq!(level.id, idx as u32 + 1);
            assert!(level.target_score > 0);
            assert!(level.time_limit.is_some() || level.move_limit.is_some() || idx == 0);
        }
    }
}

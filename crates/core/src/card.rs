//! Card module - card entities, the kind palette and card creation
//!
//! A [`Card`] is created once, mutated in place (position, state, hint) and
//! eventually marked [`CardState::Removed`]. Refills always allocate a fresh
//! [`CardId`]; a removed identity never comes back.

use rand::Rng;

use crate::level::LevelDefinition;
use crate::types::{CardState, Position, DEFAULT_PALETTE_SIZE, TILE_SIZE};

/// Opaque, session-unique card identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(u64);

impl CardId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// A single card on the grid
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: CardId,
    /// Index into the kind palette.
    pub kind: u8,
    pub row: u8,
    pub col: u8,
    /// Layout position in pixels, derived from `row`/`col`.
    pub top: i32,
    pub left: i32,
    pub state: CardState,
    pub is_trap: bool,
    pub is_hinted: bool,
    /// Set on refill so presentation can animate a drop-in.
    pub is_entering: bool,
    pub created_ms: u64,
    pub removed_ms: Option<u64>,
}

impl Card {
    pub fn new(id: CardId, kind: u8, pos: Position, created_ms: u64) -> Self {
        let mut card = Self {
            id,
            kind,
            row: pos.row,
            col: pos.col,
            top: 0,
            left: 0,
            state: CardState::Normal,
            is_trap: false,
            is_hinted: false,
            is_entering: false,
            created_ms,
            removed_ms: None,
        };
        card.relayout();
        card
    }

    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }

    /// Move to `pos` and recompute the layout position.
    pub fn move_to(&mut self, pos: Position) {
        self.row = pos.row;
        self.col = pos.col;
        self.relayout();
    }

    pub fn relayout(&mut self) {
        self.top = self.row as i32 * TILE_SIZE;
        self.left = self.col as i32 * TILE_SIZE;
    }

    /// True for cards that still take part in matching.
    pub fn is_live(&self) -> bool {
        self.state != CardState::Removed
    }
}

/// Kind index → display asset mapping.
///
/// The engine only ever works with kind indices; the palette is consulted to
/// bound the kind pool and to annotate cards for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindPalette {
    sprites: Vec<String>,
}

impl KindPalette {
    pub fn new(sprites: Vec<String>) -> Self {
        Self { sprites }
    }

    /// A palette without artwork. Gameplay is unaffected.
    pub fn empty() -> Self {
        Self {
            sprites: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Asset for `kind`, wrapping around when the palette is short.
    pub fn sprite(&self, kind: u8) -> Option<&str> {
        if self.sprites.is_empty() {
            return None;
        }
        let idx = kind as usize % self.sprites.len();
        self.sprites.get(idx).map(String::as_str)
    }

    /// Number of kinds a level may draw from: `min(card_kinds, palette size)`,
    /// never below one. Without artwork the level's own count is used.
    pub fn pool_size(&self, card_kinds: u8) -> u8 {
        if self.sprites.is_empty() {
            return card_kinds.max(1);
        }
        let len = self.sprites.len().min(u8::MAX as usize) as u8;
        card_kinds.min(len).max(1)
    }
}

impl Default for KindPalette {
    fn default() -> Self {
        let sprites = (1..=DEFAULT_PALETTE_SIZE)
            .map(|i| format!("/assets/cards/card-{:02}.webp", i))
            .collect();
        Self { sprites }
    }
}

/// Per-level parameters for card creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRules {
    pub pool: u8,
    pub trap_rate: f64,
}

impl SpawnRules {
    pub fn for_level(level: &LevelDefinition, palette: &KindPalette) -> Self {
        Self {
            pool: palette.pool_size(level.card_kinds),
            trap_rate: level.trap_rate,
        }
    }
}

/// Allocates card identities and creates cards.
#[derive(Debug, Clone, Default)]
pub struct CardFactory {
    next_id: u64,
}

impl CardFactory {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Make sure future ids are strictly greater than `id`.
    pub fn reserve_past(&mut self, id: CardId) {
        self.next_id = self.next_id.max(id.raw() + 1);
    }

    fn next_id(&mut self) -> CardId {
        let id = CardId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        id
    }

    /// Create a card at `pos` with a random kind from the pool.
    ///
    /// With `entering` set the card is placed one tile above the grid so the
    /// presentation layer can animate it falling in.
    pub fn create<R: Rng + ?Sized>(
        &mut self,
        pos: Position,
        rules: SpawnRules,
        rng: &mut R,
        now_ms: u64,
        entering: bool,
    ) -> Card {
        let kind = rng.gen_range(0..rules.pool.max(1));
        let is_trap = rules.trap_rate > 0.0 && rng.gen_bool(rules.trap_rate.clamp(0.0, 1.0));

        let mut card = Card::new(self.next_id(), kind, pos, now_ms);
        card.is_trap = is_trap;
        if entering {
            card.is_entering = true;
            card.top = -TILE_SIZE;
        }
        card
    }
}

//! Grid module - the authoritative card grid
//!
//! Cards live in a flat `Vec<Option<Card>>` in row-major order
//! (`row * cols + col`), so the flat card list and the grid can never disagree.
//! A slot is `None` only between compaction and refill.
//!
//! Coordinates: `(row, col)`, row 0 at the top.

use arrayvec::ArrayVec;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::card::{Card, CardFactory, CardId, SpawnRules};
use crate::types::{CardState, Position};

/// rows × cols card grid
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: u8,
    cols: u8,
    slots: Vec<Option<Card>>,
}

impl Grid {
    /// Create an empty grid
    pub fn new(rows: u8, cols: u8) -> Self {
        let len = rows as usize * cols as usize;
        Self {
            rows,
            cols,
            slots: vec![None; len],
        }
    }

    /// Create a grid and fill every slot with a fresh card.
    pub fn filled<R: Rng + ?Sized>(
        rows: u8,
        cols: u8,
        factory: &mut CardFactory,
        rules: SpawnRules,
        rng: &mut R,
        now_ms: u64,
    ) -> Self {
        let mut grid = Self::new(rows, cols);
        for row in 0..rows {
            for col in 0..cols {
                let card = factory.create(Position::new(row, col), rules, rng, now_ms, false);
                grid.place(card);
            }
        }
        grid
    }

    /// Build a grid from a kind layout, one slice per row. Ids are assigned in
    /// row-major order starting at 1. Useful for tests and scripted boards.
    pub fn from_kinds(layout: &[&[u8]]) -> Self {
        let rows = layout.len() as u8;
        let cols = layout.first().map_or(0, |row| row.len()) as u8;
        assert!(
            layout.iter().all(|row| row.len() == cols as usize),
            "ragged kind layout"
        );

        let mut grid = Self::new(rows, cols);
        let mut next = 1u64;
        for (r, row) in layout.iter().enumerate() {
            for (c, &kind) in row.iter().enumerate() {
                let pos = Position::new(r as u8, c as u8);
                grid.place(Card::new(CardId::new(next), kind, pos, 0));
                next += 1;
            }
        }
        grid
    }

    /// Kind layout of the live cards (`None` for empty or removed slots).
    pub fn kinds(&self) -> Vec<Vec<Option<u8>>> {
        (0..self.rows)
            .map(|row| {
                (0..self.cols)
                    .map(|col| self.kind_at(Position::new(row, col)))
                    .collect()
            })
            .collect()
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    /// Flat row-major index of `pos`, or `None` when out of bounds.
    #[inline(always)]
    pub fn index(&self, pos: Position) -> Option<usize> {
        if pos.row >= self.rows || pos.col >= self.cols {
            return None;
        }
        Some(pos.row as usize * self.cols as usize + pos.col as usize)
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    pub fn get(&self, pos: Position) -> Option<&Card> {
        self.index(pos).and_then(|idx| self.slots[idx].as_ref())
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Card> {
        let idx = self.index(pos)?;
        self.slots[idx].as_mut()
    }

    /// Card at `(row, col)`, removed or not.
    pub fn card_at(&self, row: u8, col: u8) -> Option<&Card> {
        self.get(Position::new(row, col))
    }

    /// Kind of the live card at `pos`.
    pub fn kind_at(&self, pos: Position) -> Option<u8> {
        self.get(pos).filter(|card| card.is_live()).map(|card| card.kind)
    }

    /// Put `card` into the slot named by its own position.
    /// Returns the previous occupant.
    pub fn place(&mut self, mut card: Card) -> Option<Card> {
        let idx = self.index(card.position())?;
        card.relayout();
        self.slots[idx].replace(card)
    }

    /// Move `card` to `pos` and put it there.
    pub fn place_at(&mut self, pos: Position, mut card: Card) -> Option<Card> {
        card.move_to(pos);
        self.place(card)
    }

    pub fn take(&mut self, pos: Position) -> Option<Card> {
        let idx = self.index(pos)?;
        self.slots[idx].take()
    }

    /// Exchange two cards' positions and slots. Identities and kinds are
    /// untouched. Both positions must hold cards.
    pub fn swap(&mut self, a: Position, b: Position) {
        let (Some(ia), Some(ib)) = (self.index(a), self.index(b)) else {
            debug_assert!(false, "swap outside the grid: {:?} <-> {:?}", a, b);
            return;
        };
        debug_assert!(self.slots[ia].is_some() && self.slots[ib].is_some());

        self.slots.swap(ia, ib);
        if let Some(card) = self.slots[ia].as_mut() {
            card.move_to(a);
        }
        if let Some(card) = self.slots[ib].as_mut() {
            card.move_to(b);
        }
    }

    /// Occupied slots in row-major order.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.slots.iter().flatten()
    }

    pub fn cards_mut(&mut self) -> impl Iterator<Item = &mut Card> {
        self.slots.iter_mut().flatten()
    }

    pub fn position_of(&self, id: CardId) -> Option<Position> {
        self.cards().find(|card| card.id == id).map(Card::position)
    }

    /// In-bounds orthogonal neighbours of `pos`, in row-major order
    /// (up, left, right, down).
    pub fn neighbors(&self, pos: Position) -> ArrayVec<Position, 4> {
        let mut out = ArrayVec::new();
        if pos.row > 0 {
            out.push(Position::new(pos.row - 1, pos.col));
        }
        if pos.col > 0 {
            out.push(Position::new(pos.row, pos.col - 1));
        }
        if pos.col + 1 < self.cols {
            out.push(Position::new(pos.row, pos.col + 1));
        }
        if pos.row + 1 < self.rows {
            out.push(Position::new(pos.row + 1, pos.col));
        }
        out
    }

    /// Neighbours of `pos` that come after it in row-major order: right, then
    /// down. Visiting every cell this way covers each adjacent pair once.
    pub fn forward_neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        let index = self.index(pos);
        self.neighbors(pos)
            .into_iter()
            .filter(move |&other| self.index(other) > index)
    }

    /// True when every slot holds a live card.
    pub fn is_full(&self) -> bool {
        self.slots
            .iter()
            .all(|slot| slot.as_ref().is_some_and(Card::is_live))
    }

    /// Check the position invariant: every card sits where it says it does.
    pub fn is_consistent(&self) -> bool {
        self.slots.iter().enumerate().all(|(idx, slot)| match slot {
            Some(card) => self.index(card.position()) == Some(idx),
            None => true,
        })
    }

    /// Randomly permute the positions of all live cards (uniform permutation).
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let positions: Vec<Position> = self
            .cards()
            .filter(|card| card.is_live())
            .map(Card::position)
            .collect();

        let mut cards: Vec<Card> = positions
            .iter()
            .filter_map(|&pos| self.take(pos))
            .collect();
        cards.shuffle(rng);

        for (pos, card) in positions.into_iter().zip(cards) {
            self.place_at(pos, card);
        }
    }

    /// Reset every live card's transient flags (selection, hint).
    pub fn clear_highlights(&mut self) {
        for card in self.cards_mut() {
            card.is_hinted = false;
            if card.state == CardState::Selected {
                card.state = CardState::Normal;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TILE_SIZE;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_index_calculation() {
        let grid = Grid::new(3, 4);
        assert_eq!(grid.index(Position::new(0, 0)), Some(0));
        assert_eq!(grid.index(Position::new(0, 3)), Some(3));
        assert_eq!(grid.index(Position::new(1, 0)), Some(4));
        assert_eq!(grid.index(Position::new(2, 3)), Some(11));
        assert_eq!(grid.index(Position::new(3, 0)), None);
        assert_eq!(grid.index(Position::new(0, 4)), None);
    }

    #[test]
    fn test_from_kinds_is_row_major() {
        let grid = Grid::from_kinds(&[&[0, 1, 2], &[3, 4, 5]]);
        let ids: Vec<u64> = grid.cards().map(|c| c.id.raw()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(grid.kind_at(Position::new(1, 2)), Some(5));
        assert_eq!(grid.card_at(0, 1).map(|c| c.kind), Some(1));
        assert!(grid.card_at(2, 0).is_none());
        assert!(grid.is_full());
        assert!(grid.is_consistent());
    }

    #[test]
    fn test_swap_exchanges_positions_not_identity() {
        let mut grid = Grid::from_kinds(&[&[0, 1], &[2, 3]]);
        let a = Position::new(0, 0);
        let b = Position::new(0, 1);
        let id_a = grid.get(a).unwrap().id;
        let id_b = grid.get(b).unwrap().id;

        grid.swap(a, b);

        let now_b = grid.get(b).unwrap();
        assert_eq!(now_b.id, id_a);
        assert_eq!(now_b.kind, 0);
        assert_eq!((now_b.row, now_b.col), (0, 1));
        assert_eq!(now_b.left, TILE_SIZE);
        assert_eq!(grid.get(a).unwrap().id, id_b);
        assert!(grid.is_consistent());

        grid.swap(a, b);
        assert_eq!(grid, Grid::from_kinds(&[&[0, 1], &[2, 3]]));
    }

    #[test]
    fn test_neighbors_at_corner_and_center() {
        let grid = Grid::new(3, 3);
        let corner = grid.neighbors(Position::new(0, 0));
        assert_eq!(corner.len(), 2);
        assert!(corner.contains(&Position::new(1, 0)));
        assert!(corner.contains(&Position::new(0, 1)));

        assert_eq!(grid.neighbors(Position::new(1, 1)).len(), 4);
    }

    #[test]
    fn test_forward_neighbors_are_right_then_down() {
        let grid = Grid::new(3, 3);
        let center: Vec<Position> = grid.forward_neighbors(Position::new(1, 1)).collect();
        assert_eq!(center, vec![Position::new(1, 2), Position::new(2, 1)]);

        let edge: Vec<Position> = grid.forward_neighbors(Position::new(2, 2)).collect();
        assert!(edge.is_empty());
        let last_col: Vec<Position> = grid.forward_neighbors(Position::new(0, 2)).collect();
        assert_eq!(last_col, vec![Position::new(1, 2)]);
    }

    #[test]
    fn test_take_and_place() {
        let mut grid = Grid::from_kinds(&[&[0, 1, 2]]);
        let card = grid.take(Position::new(0, 0)).unwrap();
        assert!(!grid.is_full());
        assert!(grid.get(Position::new(0, 0)).is_none());

        grid.place_at(Position::new(0, 0), card);
        assert!(grid.is_full());
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut grid = Grid::from_kinds(&[&[0, 1, 2, 3], &[4, 5, 6, 7], &[8, 9, 10, 11]]);
        let mut before: Vec<CardId> = grid.cards().map(|c| c.id).collect();

        grid.shuffle(&mut rng);

        assert!(grid.is_full());
        assert!(grid.is_consistent());
        let mut after: Vec<CardId> = grid.cards().map(|c| c.id).collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn test_filled_grid_is_full_and_consistent() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut factory = CardFactory::new();
        let rules = SpawnRules {
            pool: 5,
            trap_rate: 0.0,
        };
        let grid = Grid::filled(6, 7, &mut factory, rules, &mut rng, 0);
        assert_eq!(grid.cards().count(), 42);
        assert!(grid.is_full());
        assert!(grid.is_consistent());
    }
}

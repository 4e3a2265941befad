//! Per-side rosters

use crate::types::{Color, PieceId};

/// Pieces owned by one side
///
/// The roster keeps live pieces in insertion order. Pieces removed from play move to
/// the captured list of the same side, so each piece is in exactly one of the two lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    color: Color,
    roster: Vec<PieceId>,
    captured: Vec<PieceId>,
}

impl Player {
    pub fn new(color: Color) -> Player {
        Player {
            color,
            roster: Vec::new(),
            captured: Vec::new(),
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Live pieces, in the order they were added
    pub fn roster(&self) -> &[PieceId] {
        &self.roster
    }

    pub fn captured(&self) -> &[PieceId] {
        &self.captured
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    /// Returns the live piece at roster position `index`
    pub fn get(&self, index: usize) -> Option<PieceId> {
        self.roster.get(index).copied()
    }

    pub fn contains(&self, id: PieceId) -> bool {
        self.roster.contains(&id)
    }

    pub fn position(&self, id: PieceId) -> Option<usize> {
        self.roster.iter().position(|&p| p == id)
    }

    pub(crate) fn add(&mut self, id: PieceId) {
        if !self.contains(id) {
            self.roster.push(id);
        }
    }

    /// Drops `id` from the roster without recording it as captured
    pub(crate) fn remove(&mut self, id: PieceId) -> Option<usize> {
        let index = self.position(id)?;
        self.roster.remove(index);
        Some(index)
    }

    /// Moves `id` from the roster to the captured list, returning its former roster position
    pub(crate) fn capture(&mut self, id: PieceId) -> Option<usize> {
        let index = self.remove(id)?;
        self.captured.push(id);
        Some(index)
    }

    /// Reverts [`Player::capture`], putting `id` back at roster position `index`
    pub(crate) fn revive(&mut self, id: PieceId, index: usize) {
        if let Some(pos) = self.captured.iter().rposition(|&p| p == id) {
            self.captured.remove(pos);
        }
        if !self.contains(id) {
            let index = index.min(self.roster.len());
            self.roster.insert(index, id);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.roster.clear();
        self.captured.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_revive() {
        let mut p = Player::new(Color::Black);
        for i in 0..4 {
            p.add(PieceId(i));
        }
        p.add(PieceId(2));
        assert_eq!(p.len(), 4);

        assert_eq!(p.capture(PieceId(1)), Some(1));
        assert_eq!(p.capture(PieceId(1)), None);
        assert_eq!(p.roster(), &[PieceId(0), PieceId(2), PieceId(3)]);
        assert_eq!(p.captured(), &[PieceId(1)]);
        assert_eq!(p.get(1), Some(PieceId(2)));
        assert_eq!(p.get(3), None);

        p.revive(PieceId(1), 1);
        assert_eq!(
            p.roster(),
            &[PieceId(0), PieceId(1), PieceId(2), PieceId(3)]
        );
        assert!(p.captured().is_empty());
    }

    #[test]
    fn test_remove() {
        let mut p = Player::new(Color::White);
        p.add(PieceId(5));
        p.add(PieceId(7));
        assert_eq!(p.remove(PieceId(5)), Some(0));
        assert!(p.captured().is_empty());
        assert!(!p.contains(PieceId(5)));
        assert_eq!(p.position(PieceId(7)), Some(0));
        p.clear();
        assert!(p.is_empty());
    }
}

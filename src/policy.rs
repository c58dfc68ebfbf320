use crate::moves::{CanonicalMove, NUM_MOVES};

pub const ILLEGAL: f32 = -1.0;
pub const LEGAL: f32 = 0.0;
pub const PLAYED: f32 = 1.0;

/// Move probability target over the canonical move space.
///
/// Illegal moves hold -1, legal moves 0 and the move actually played 1.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveProbabilities(Vec<f32>);

impl MoveProbabilities {
    pub fn build(legal_moves: &[CanonicalMove], played: &CanonicalMove) -> Self {
        let mut probabilities = vec![ILLEGAL; NUM_MOVES];

        for index in legal_moves.iter().filter_map(CanonicalMove::nn_index) {
            probabilities[index] = LEGAL;
        }

        if let Some(index) = played.nn_index() {
            probabilities[index] = PLAYED;
        }

        MoveProbabilities(probabilities)
    }

    pub fn from_vec(probabilities: Vec<f32>) -> Self {
        debug_assert_eq!(probabilities.len(), NUM_MOVES);
        MoveProbabilities(probabilities)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Index of the played move, if any
    pub fn played_index(&self) -> Option<usize> {
        self.0.iter().position(|p| *p == PLAYED)
    }

    /// Number of legal moves, the played one included
    pub fn legal_count(&self) -> usize {
        self.0.iter().filter(|p| **p != ILLEGAL).count()
    }
}

/// Whether the played move is part of the legal set.
/// Matching squares are not enough, the castling classification must agree too.
pub fn contains_move(legal_moves: &[CanonicalMove], played: &CanonicalMove) -> bool {
    legal_moves
        .iter()
        .any(|legal| legal.same_squares(played) && legal.castling == played.castling)
}

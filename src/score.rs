use once_cell::sync::Lazy;
use regex::Regex;
use shakmaty::Color;

/// Magnitude used for forced mates, large enough to saturate the outcome transform
pub const MATE_SCORE: f32 = 128.0;

/// `{+0.35/12 0.8s}`: pawn score followed by the search depth
static PAWN_SCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\{?\s*([+-]?\d+\.\d+)/").expect("valid score regex"));

/// `{#-3/10 0.1s}`: distance to mate followed by the search depth
static MATE_DISTANCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\{?\s*#([+-]?\d+)/").expect("valid mate regex"));

/// Engine assessment of a position, in pawns
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation(pub f32);

impl Evaluation {
    /// Evaluation of a move that delivers checkmate, given the side that played it.
    /// Reported from white's point of view: positive when white mates.
    pub fn mate_by(mover: Color) -> Self {
        match mover {
            Color::White => Evaluation(MATE_SCORE),
            Color::Black => Evaluation(-MATE_SCORE),
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

/// Extracts the engine evaluation from the comment attached to a move.
///
/// Returns `None` when the comment carries neither a pawn score nor a mate distance.
pub fn extract_evaluation(comment: &str) -> Option<Evaluation> {
    if let Some(captures) = PAWN_SCORE.captures(comment) {
        return captures[1].parse::<f32>().ok().map(Evaluation);
    }

    MATE_DISTANCE.captures(comment).map(|captures| {
        if captures[1].starts_with('-') {
            Evaluation(-MATE_SCORE)
        } else {
            Evaluation(MATE_SCORE)
        }
    })
}

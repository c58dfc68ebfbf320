use crate::error::SetupError;
use crate::outcome::GameResult;
use pgn_reader::SanPlus;
use shakmaty::{fen::Fen, CastlingMode, Chess, PositionError};
use std::fmt;

/// Annotation glyphs marking moves that should not be learned from:
/// poor (`?`), very poor (`??`), speculative (`!?`) and dubious (`?!`)
pub const EXCLUDED_NAGS: [u8; 4] = [2, 4, 5, 6];

/// A move as read from the game notation, with its annotations
#[derive(Debug, Clone)]
pub struct MoveToken {
    pub san: SanPlus,
    pub nags: Vec<u8>,
    pub comment: Option<String>,
}

impl MoveToken {
    pub fn new(san: SanPlus) -> Self {
        MoveToken {
            san,
            nags: Vec::new(),
            comment: None,
        }
    }

    /// Whether an annotation glyph excludes this move from the training data
    pub fn is_excluded(&self) -> bool {
        self.nags.iter().any(|nag| EXCLUDED_NAGS.contains(nag))
    }
}

/// One parsed game, consumed move by move by the processor
#[derive(Debug, Clone)]
pub struct Game {
    /// Input the game was read from
    pub source: String,
    /// 1-based position of the game in its input
    pub number: usize,
    pub fen: Option<String>,
    pub castling_mode: CastlingMode,
    pub result: GameResult,
    pub moves: Vec<MoveToken>,
}

impl Game {
    pub fn starting_position(&self) -> Result<Chess, SetupError> {
        let Some(fen) = &self.fen else {
            return Ok(Chess::default());
        };

        // move counters are optional
        let fen = Fen::from_ascii(fen.trim().as_bytes())?;

        fen.clone()
            .into_position(self.castling_mode)
            // castling rights may only make sense for a shuffled back rank
            .or_else(|err| fen.into_position(CastlingMode::Chess960).or(Err(err)))
            // stale castling fields are common in game databases
            .or_else(PositionError::ignore_invalid_castling_rights)
            .map_err(|err| SetupError::Position(err.to_string()))
    }

    /// Where the game comes from, for diagnostics
    pub fn origin(&self) -> GameOrigin<'_> {
        GameOrigin(self)
    }
}

pub struct GameOrigin<'a>(&'a Game);

impl fmt::Display for GameOrigin<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, game {}", self.0.source, self.0.number)
    }
}

use crate::game::{Game, MoveToken};
use crate::outcome::GameResult;
use pgn_reader::{Nag, RawComment, RawHeader, SanPlus, Skip, Visitor};
use shakmaty::{CastlingMode, Outcome};

/// Collects the movetext and annotations of each game, without interpreting the moves
pub struct GameVisitor {
    /// Name of the input, for diagnostics
    source: String,
    /// Games started so far in this input
    games: usize,

    // information about the current game
    fen: Option<String>,
    variant: String,
    result: Option<String>,
    outcome: Option<Outcome>,
    moves: Vec<MoveToken>,
}

impl GameVisitor {
    pub fn new(source: &str) -> Self {
        GameVisitor {
            source: source.to_string(),
            games: 0,

            fen: None,
            variant: "".to_string(),
            result: None,
            outcome: None,
            moves: Vec::new(),
        }
    }

    fn castling_mode(&self) -> CastlingMode {
        let variant = self.variant.to_ascii_lowercase();
        CastlingMode::from_chess960(variant.contains("960") || variant.contains("fischerandom"))
    }
}

impl Visitor for GameVisitor {
    type Result = Game;

    fn begin_game(&mut self) {
        self.games += 1;
        self.fen = None;
        self.variant = "".to_string();
        self.result = None;
        self.outcome = None;
        self.moves.clear();
    }

    fn header(&mut self, key: &[u8], value: RawHeader<'_>) {
        let key = String::from_utf8_lossy(key);
        let value = String::from_utf8_lossy(value.as_bytes());

        if key == "FEN" {
            self.fen = Some(value.to_string());
        } else if key == "Variant" {
            self.variant = value.to_string();
        } else if key == "Result" {
            self.result = Some(value.to_string());
        }
    }

    fn begin_variation(&mut self) -> Skip {
        Skip(true)
    }

    fn san(&mut self, san_plus: SanPlus) {
        self.moves.push(MoveToken::new(san_plus));
    }

    fn nag(&mut self, nag: Nag) {
        // glyphs before the first move have nothing to annotate
        if let Some(last) = self.moves.last_mut() {
            last.nags.push(nag.0);
        }
    }

    fn comment(&mut self, comment: RawComment<'_>) {
        // only the first comment after a move carries the engine output
        if let Some(last) = self.moves.last_mut() {
            if last.comment.is_none() {
                last.comment = Some(String::from_utf8_lossy(comment.as_bytes()).to_string());
            }
        }
    }

    fn outcome(&mut self, outcome: Option<Outcome>) {
        self.outcome = outcome;
    }

    fn end_game(&mut self) -> Self::Result {
        let result = match (&self.result, self.outcome) {
            (Some(result), _) => GameResult::from_pgn(result),
            (None, Some(outcome)) => GameResult::from(outcome),
            (None, None) => GameResult::Draw,
        };

        Game {
            source: self.source.clone(),
            number: self.games,
            fen: self.fen.take(),
            castling_mode: self.castling_mode(),
            result,
            moves: std::mem::take(&mut self.moves),
        }
    }
}

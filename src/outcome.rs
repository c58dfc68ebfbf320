use crate::score::Evaluation;
use shakmaty::Color;

/// Slope of the logistic curve mapping pawns to expected outcome
pub const OUTCOME_SLOPE: f32 = 0.4;

/// Maps an evaluation into an expected outcome in (-1, 1).
/// `2 / (1 + e^(-k * score)) - 1`, which is odd and monotonic.
pub fn expected_outcome(evaluation: Evaluation) -> f32 {
    2.0 / (1.0 + (-OUTCOME_SLOPE * evaluation.value()).exp()) - 1.0
}

/// Final result of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    WhiteWon,
    BlackWon,
    Draw,
}

impl GameResult {
    /// Parses a PGN result token. Anything that is not a decisive result counts as a draw.
    pub fn from_pgn(token: &str) -> Self {
        match token.trim() {
            "1-0" => GameResult::WhiteWon,
            "0-1" => GameResult::BlackWon,
            _ => GameResult::Draw,
        }
    }

    /// Result label from the point of view of `turn`: 1 win, -1 loss, 0 draw
    pub fn relative_to(self, turn: Color) -> i8 {
        match (self, turn) {
            (GameResult::Draw, _) => 0,
            (GameResult::WhiteWon, Color::White) | (GameResult::BlackWon, Color::Black) => 1,
            _ => -1,
        }
    }

    /// Draw confidence target: 1 for drawn games, 0 for decisive ones
    pub fn draw_value(self) -> f32 {
        match self {
            GameResult::Draw => 1.0,
            _ => 0.0,
        }
    }
}

impl From<shakmaty::Outcome> for GameResult {
    fn from(outcome: shakmaty::Outcome) -> Self {
        match outcome {
            shakmaty::Outcome::Decisive {
                winner: Color::White,
            } => GameResult::WhiteWon,
            shakmaty::Outcome::Decisive {
                winner: Color::Black,
            } => GameResult::BlackWon,
            shakmaty::Outcome::Draw => GameResult::Draw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(score: f32) -> f32 {
        expected_outcome(Evaluation(score))
    }

    #[test]
    fn bounded_and_odd() {
        assert_eq!(q(0.0), 0.0);

        for score in [0.01, 0.35, 1.0, 3.5, 12.0, 40.0, 127.0] {
            let positive = q(score);
            assert!(positive > 0.0 && positive <= 1.0, "{score} -> {positive}");
            assert!((q(-score) + positive).abs() < 1e-6);
        }
    }

    #[test]
    fn monotonic() {
        let mut last = -1.0;
        for step in -100..=100 {
            let value = q(step as f32 * 0.1);
            assert!(value > last);
            last = value;
        }
    }

    #[test]
    fn known_values() {
        // 2/(1+e^{-0.14}) - 1
        assert!((q(0.35) - 0.069_886).abs() < 1e-5);
        assert!((q(128.0) - 1.0).abs() < 1e-6);
        assert!((q(-128.0) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn results() {
        assert_eq!(GameResult::from_pgn("1-0"), GameResult::WhiteWon);
        assert_eq!(GameResult::from_pgn("0-1"), GameResult::BlackWon);
        assert_eq!(GameResult::from_pgn("1/2-1/2"), GameResult::Draw);
        assert_eq!(GameResult::from_pgn("*"), GameResult::Draw);

        assert_eq!(GameResult::WhiteWon.relative_to(Color::White), 1);
        assert_eq!(GameResult::WhiteWon.relative_to(Color::Black), -1);
        assert_eq!(GameResult::BlackWon.relative_to(Color::Black), 1);
        assert_eq!(GameResult::BlackWon.relative_to(Color::White), -1);
        assert_eq!(GameResult::Draw.relative_to(Color::Black), 0);

        assert_eq!(GameResult::Draw.draw_value(), 1.0);
        assert_eq!(GameResult::BlackWon.draw_value(), 0.0);
    }
}

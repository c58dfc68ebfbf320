use crate::error::ConvertError;
use crate::game::Game;
use crate::moves::CanonicalMove;
use crate::outcome::expected_outcome;
use crate::planes::{HistoryEncoder, PlaneEncoder};
use crate::policy::contains_move;
use crate::record::TrainingRecord;
use crate::score::{extract_evaluation, Evaluation};
use crate::writer::{GameCounter, RecordWriter, WriterFactory};
use log::{debug, warn};
use shakmaty::fen::Fen;
use shakmaty::{Chess, EnPassantMode, Position};
use std::io;

#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessorOptions {
    /// Every move must carry an evaluation comment; the game stops at the first one without
    pub strict: bool,
}

/// Why the conversion of a game ended before its last move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The starting position could not be set up
    InvalidSetup { fen: String },
    /// The move could not be resolved or is illegal in the current position
    IllegalMove { san: String, ply: usize },
    /// The comment carries no evaluation
    MissingEvaluation { ply: usize },
    /// Strict mode only: the move has no comment
    MissingComment { ply: usize },
}

/// What came out of one game
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameSummary {
    /// Id assigned to the game, only when at least one record was written
    pub game_id: Option<usize>,
    pub records: usize,
    /// Played moves that were not found in the legal move list
    pub moves_not_found: usize,
    pub stopped: Option<StopReason>,
}

impl GameSummary {
    pub fn written(&self) -> bool {
        self.game_id.is_some()
    }
}

/// Converts games into training records, one game at a time
pub struct GameProcessor<F: WriterFactory, E: PlaneEncoder = HistoryEncoder> {
    options: ProcessorOptions,
    encoder: E,
    factory: F,
}

impl<F: WriterFactory> GameProcessor<F> {
    pub fn new(options: ProcessorOptions, factory: F) -> Self {
        GameProcessor::with_encoder(options, HistoryEncoder, factory)
    }
}

impl<F: WriterFactory, E: PlaneEncoder> GameProcessor<F, E> {
    pub fn with_encoder(options: ProcessorOptions, encoder: E, factory: F) -> Self {
        GameProcessor {
            options,
            encoder,
            factory,
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Converts one game.
    ///
    /// The writer is opened when the first record is ready and finalized once the move loop
    /// is left, whatever the reason. Only then does the game consume an id from `counter`.
    pub fn process(
        &mut self,
        game: &Game,
        counter: &mut GameCounter,
    ) -> Result<GameSummary, ConvertError> {
        let mut writer = None;
        let mut summary = GameSummary::default();

        let converted = self.convert_moves(game, counter, &mut writer, &mut summary);

        let finalized = match writer {
            Some(writer) => {
                counter.advance();
                writer.finalize()
            }
            None => Ok(()),
        };

        match &summary.stopped {
            Some(reason) => debug!("Game end: {:?}", reason),
            None => debug!("Game end."),
        }

        converted?;
        finalized?;

        Ok(summary)
    }

    fn convert_moves(
        &mut self,
        game: &Game,
        counter: &GameCounter,
        writer: &mut Option<F::Writer>,
        summary: &mut GameSummary,
    ) -> io::Result<()> {
        let start = match game.starting_position() {
            Ok(position) => position,
            Err(err) => {
                warn!("{}: {}", game.origin(), err);
                summary.stopped = Some(StopReason::InvalidSetup {
                    fen: game.fen.clone().unwrap_or_default(),
                });
                return Ok(());
            }
        };

        debug!(
            "Started new game, starting FEN: '{}'",
            Fen(start.clone().into_setup(EnPassantMode::Legal))
        );
        debug!("Game result: {:?}", game.result);

        let mut history: Vec<Chess> = vec![start];

        for (ply, token) in game.moves.iter().enumerate() {
            let position = &history[history.len() - 1];
            let turn = position.turn();

            let mov = match token.san.san.to_move(position) {
                Ok(mov) => mov,
                Err(_) => {
                    warn!(
                        "illegal move \"{}\" at {}, ply {}",
                        token.san,
                        game.origin(),
                        ply + 1
                    );
                    summary.stopped = Some(StopReason::IllegalMove {
                        san: token.san.to_string(),
                        ply,
                    });
                    return Ok(());
                }
            };

            debug!("Read move: {}", token.san);
            if let Some(comment) = &token.comment {
                debug!("{} pgn comment: {}", token.san, comment);
            }

            let mut next = position.clone();
            next.play_unchecked(&mov);

            let evaluation = match &token.comment {
                // a mating move needs no engine score
                Some(_) if next.is_checkmate() => Some(Evaluation::mate_by(turn)),
                Some(comment) => match extract_evaluation(comment) {
                    Some(evaluation) => Some(evaluation),
                    None => {
                        summary.stopped = Some(StopReason::MissingEvaluation { ply });
                        return Ok(());
                    }
                },
                None if self.options.strict => {
                    summary.stopped = Some(StopReason::MissingComment { ply });
                    return Ok(());
                }
                None => None,
            };

            let played = CanonicalMove::translate(&mov, turn);
            let legal_moves: Vec<CanonicalMove> = position
                .legal_moves()
                .iter()
                .map(|m| CanonicalMove::translate(m, turn))
                .collect();

            let indexed = played.nn_index().is_some();
            if !indexed || !contains_move(&legal_moves, &played) {
                warn!(
                    "Move not found: {} ({}) at {}, ply {}",
                    token.san,
                    played,
                    game.origin(),
                    ply + 1
                );
                summary.moves_not_found += 1;
            }

            // a move outside the index space would leave the target without a played entry
            if let (Some(evaluation), false, true) = (evaluation, token.is_excluded(), indexed) {
                let record = TrainingRecord::assemble(
                    game.result,
                    &history,
                    &self.encoder,
                    &played,
                    &legal_moves,
                    expected_outcome(evaluation),
                );

                if writer.is_none() {
                    let game_id = counter.written();
                    *writer = Some(self.factory.create(game_id, counter.partition_of(game_id))?);
                    summary.game_id = Some(game_id);
                }
                if let Some(writer) = writer.as_mut() {
                    writer.append(record)?;
                    summary.records += 1;
                }
            }

            history.push(next);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::MoveToken;
    use crate::outcome::GameResult;
    use shakmaty::CastlingMode;

    #[derive(Default)]
    struct CountingFactory {
        created: Vec<(usize, usize)>,
    }

    struct CountingWriter;

    impl RecordWriter for CountingWriter {
        fn append(&mut self, _record: TrainingRecord) -> io::Result<()> {
            Ok(())
        }

        fn finalize(self) -> io::Result<()> {
            Ok(())
        }
    }

    impl WriterFactory for CountingFactory {
        type Writer = CountingWriter;

        fn create(&mut self, game_id: usize, partition: usize) -> io::Result<CountingWriter> {
            self.created.push((game_id, partition));
            Ok(CountingWriter)
        }
    }

    fn game(moves: &[(&str, Option<&str>)]) -> Game {
        Game {
            source: "unit".to_string(),
            number: 1,
            fen: None,
            castling_mode: CastlingMode::Standard,
            result: GameResult::Draw,
            moves: moves
                .iter()
                .map(|(san, comment)| {
                    let mut token = MoveToken::new(san.parse().unwrap());
                    token.comment = comment.map(str::to_string);
                    token
                })
                .collect(),
        }
    }

    #[test]
    fn lazily_opens_writer() {
        let mut processor = GameProcessor::new(ProcessorOptions::default(), CountingFactory::default());
        let mut counter = GameCounter::new(2);

        let summary = processor
            .process(&game(&[("e4", None), ("e5", Some("+0.1/5"))]), &mut counter)
            .unwrap();
        assert_eq!(summary.records, 1);
        assert_eq!(summary.game_id, Some(0));

        let summary = processor
            .process(&game(&[("e4", None), ("e5", None)]), &mut counter)
            .unwrap();
        assert!(!summary.written());
        assert_eq!(counter.written(), 1);

        for _ in 0..2 {
            processor
                .process(&game(&[("d4", Some("0.20/8"))]), &mut counter)
                .unwrap();
        }
        assert_eq!(processor.factory().created, vec![(0, 0), (1, 0), (2, 1)]);
        assert_eq!(counter.written(), 3);
    }

    #[test]
    fn unparseable_comment_stops_game() {
        let mut processor = GameProcessor::new(ProcessorOptions::default(), CountingFactory::default());
        let mut counter = GameCounter::new(10);

        let summary = processor
            .process(
                &game(&[("e4", Some("0.30/9")), ("e5", Some("book")), ("Nf3", Some("0.31/9"))]),
                &mut counter,
            )
            .unwrap();

        assert_eq!(summary.records, 1);
        assert_eq!(summary.stopped, Some(StopReason::MissingEvaluation { ply: 1 }));
        assert_eq!(counter.written(), 1);
    }

    #[test]
    fn castle_without_king_move_is_skipped() {
        let mut processor = GameProcessor::new(ProcessorOptions::default(), CountingFactory::default());
        let mut counter = GameCounter::new(10);

        // the king already stands on g1, castling only moves the rook
        let mut castle = game(&[("O-O", Some("+0.30/10")), ("a6", Some("-0.10/10"))]);
        castle.fen = Some("1k6/pppppppp/8/8/8/8/PPPPPPPP/6KR w H - 0 1".to_string());
        castle.castling_mode = CastlingMode::Chess960;

        let summary = processor.process(&castle, &mut counter).unwrap();
        assert_eq!(summary.moves_not_found, 1);
        assert_eq!(summary.records, 1);
        assert_eq!(summary.stopped, None);
    }

    #[test]
    fn invalid_setup() {
        let mut processor = GameProcessor::new(ProcessorOptions::default(), CountingFactory::default());
        let mut counter = GameCounter::new(10);

        let mut broken = game(&[("e4", Some("0.30/9"))]);
        broken.fen = Some("8/8/8/8/8/8/8/8 w - - 0 1".to_string());

        let summary = processor.process(&broken, &mut counter).unwrap();
        assert_eq!(
            summary.stopped,
            Some(StopReason::InvalidSetup {
                fen: "8/8/8/8/8/8/8/8 w - - 0 1".to_string(),
            })
        );
        assert_eq!(summary.records, 0);
        assert!(processor.factory().created.is_empty());
    }
}

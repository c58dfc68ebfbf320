#![allow(dead_code)]

use indicatif::ProgressBar;
use pgn_reader::BufferedReader;
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use trainingdata::convert::{convert_games, ConvertStats};
use trainingdata::game::Game;
use trainingdata::game_visitor::GameVisitor;
use trainingdata::processor::{GameProcessor, ProcessorOptions};
use trainingdata::record::TrainingRecord;
use trainingdata::writer::{GameCounter, RecordWriter, WriterFactory};

/// Output of one game kept in memory
#[derive(Debug, Clone)]
pub struct Shard {
    pub game_id: usize,
    pub partition: usize,
    pub records: Vec<TrainingRecord>,
    pub finalized: usize,
}

#[derive(Default, Clone)]
pub struct MemoryFactory {
    pub shards: Rc<RefCell<Vec<Shard>>>,
}

pub struct MemoryWriter {
    shards: Rc<RefCell<Vec<Shard>>>,
    index: usize,
}

impl WriterFactory for MemoryFactory {
    type Writer = MemoryWriter;

    fn create(&mut self, game_id: usize, partition: usize) -> io::Result<MemoryWriter> {
        let mut shards = self.shards.borrow_mut();
        shards.push(Shard {
            game_id,
            partition,
            records: Vec::new(),
            finalized: 0,
        });

        Ok(MemoryWriter {
            shards: self.shards.clone(),
            index: shards.len() - 1,
        })
    }
}

impl RecordWriter for MemoryWriter {
    fn append(&mut self, record: TrainingRecord) -> io::Result<()> {
        self.shards.borrow_mut()[self.index].records.push(record);
        Ok(())
    }

    fn finalize(self) -> io::Result<()> {
        self.shards.borrow_mut()[self.index].finalized += 1;
        Ok(())
    }
}

pub fn read_games(pgn: &str) -> Vec<Game> {
    let mut reader = BufferedReader::new(pgn.as_bytes());
    let mut visitor = GameVisitor::new("test.pgn");
    let mut games = Vec::new();

    while let Some(game) = reader.read_game(&mut visitor).unwrap() {
        games.push(game);
    }

    games
}

pub struct Run {
    pub shards: Vec<Shard>,
    pub stats: ConvertStats,
    pub counter: GameCounter,
}

pub fn run(pgn: &str, strict: bool, games_per_partition: usize, max_games: usize) -> Run {
    let factory = MemoryFactory::default();
    let mut processor = GameProcessor::new(ProcessorOptions { strict }, factory.clone());
    let mut counter = GameCounter::new(games_per_partition);

    let stats = convert_games(
        pgn.as_bytes(),
        "test.pgn",
        &mut processor,
        &mut counter,
        max_games,
        &ProgressBar::hidden(),
    )
    .unwrap();

    let shards = factory.shards.borrow().clone();
    Run {
        shards,
        stats,
        counter,
    }
}

/// Records of every game, in order
pub fn records(run: &Run) -> Vec<TrainingRecord> {
    run.shards
        .iter()
        .flat_map(|shard| shard.records.iter().cloned())
        .collect()
}

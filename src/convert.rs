use crate::error::ConvertError;
use crate::game_visitor::GameVisitor;
use crate::planes::PlaneEncoder;
use crate::processor::{GameProcessor, ProcessorOptions};
use crate::writer::{ChunkWriterFactory, GameCounter, WriterFactory};
use clap::Args;
use indicatif::{HumanCount, ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use pgn_reader::BufferedReader;
use std::error::Error;
use std::fs::File;
use std::io;
use std::path::Path;

#[derive(Args)]
pub struct ConvertCommand {
    /// PGN files to read games from (.pgn or .pgn.zst). Missing files are skipped
    #[arg(value_name = "input", required = true)]
    pub inputs: Vec<String>,

    /// Print every game and move while converting
    #[arg(short, long)]
    pub verbose: bool,

    /// Only accept games where every move carries an engine evaluation comment
    #[arg(long = "fishtest-mode")]
    pub fishtest_mode: bool,

    /// Maximum number of games in each output directory
    #[arg(long, value_name = "games-per-dir", default_value = "10000")]
    pub games_per_dir: usize,

    /// Stop after writing this many games
    #[arg(long, value_name = "max-games-to-convert", default_value = "10000000")]
    pub max_games_to_convert: usize,

    /// Directory where the `supervised-N` directories are created
    #[arg(long, value_name = "output-dir", default_value = ".")]
    pub output_dir: String,
}

/// Totals over one or more inputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertStats {
    pub games_read: usize,
    pub games_written: usize,
    pub records_written: usize,
}

impl ConvertStats {
    fn add(&mut self, other: ConvertStats) {
        self.games_read += other.games_read;
        self.games_written += other.games_written;
        self.records_written += other.records_written;
    }
}

pub fn convert(cmd: ConvertCommand) -> Result<(), Box<dyn Error>> {
    info!("Output directory: {}", cmd.output_dir);
    if cmd.fishtest_mode {
        info!("fishtest mode ON");
    }
    info!("Max games per directory set to: {}", cmd.games_per_dir);
    info!("Max games to convert set to: {}", cmd.max_games_to_convert);

    let options = ProcessorOptions {
        strict: cmd.fishtest_mode,
    };
    let mut processor = GameProcessor::new(options, ChunkWriterFactory::new(&cmd.output_dir));
    let mut counter = GameCounter::new(cmd.games_per_dir);
    let mut totals = ConvertStats::default();

    let bar_style = ProgressStyle::default_spinner()
        .template("{spinner:.green} [Elapsed {elapsed_precise}] [Games {human_pos} @ {per_sec}] {msg} {prefix}")?;

    for input in &cmd.inputs {
        if counter.written() >= cmd.max_games_to_convert {
            break;
        }

        if !Path::new(input).is_file() {
            debug!("Skipping '{}': not a file", input);
            continue;
        }

        let reader = match open_input(input) {
            Ok(reader) => reader,
            Err(err) => {
                warn!("{}", err);
                continue;
            }
        };

        info!("Opening '{}'", input);

        let bar = if cmd.verbose {
            // the spinner would garble the move trace
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
                .with_style(bar_style.clone())
                .with_prefix(input.clone())
        };

        let stats = convert_games(
            reader,
            input,
            &mut processor,
            &mut counter,
            cmd.max_games_to_convert,
            &bar,
        )?;
        bar.finish();

        info!(
            "'{}': {} games read, {} games written, {} records",
            input, stats.games_read, stats.games_written, stats.records_written
        );
        totals.add(stats);
    }

    info!(
        "Done. {} games read, {} games written, {} records",
        totals.games_read, totals.games_written, totals.records_written
    );

    Ok(())
}

/// Opens a PGN input, decompressing `.zst` files on the fly
pub fn open_input(path: &str) -> Result<Box<dyn io::Read>, ConvertError> {
    let open_error = |source| ConvertError::OpenInput {
        path: path.to_string(),
        source,
    };

    let file = File::open(path).map_err(open_error)?;

    if path.ends_with(".zst") {
        Ok(Box::new(zstd::Decoder::new(file).map_err(open_error)?))
    } else {
        Ok(Box::new(file))
    }
}

/// Converts every game of one input, stopping early once `max_games` games have been written
pub fn convert_games<R, F, E>(
    reader: R,
    source: &str,
    processor: &mut GameProcessor<F, E>,
    counter: &mut GameCounter,
    max_games: usize,
    bar: &ProgressBar,
) -> Result<ConvertStats, ConvertError>
where
    R: io::Read,
    F: WriterFactory,
    E: PlaneEncoder,
{
    let mut game_reader = BufferedReader::new(reader);
    let mut visitor = GameVisitor::new(source);
    let mut stats = ConvertStats::default();

    while counter.written() < max_games {
        let game = match game_reader.read_game(&mut visitor) {
            Ok(Some(game)) => game,
            Ok(None) => break,
            Err(err) => {
                warn!("{}: cannot read game: {}", source, err);
                break;
            }
        };

        let summary = processor.process(&game, counter)?;

        stats.games_read += 1;
        stats.records_written += summary.records;
        if summary.written() {
            stats.games_written += 1;
        }

        bar.inc(1);
        bar.set_message(format!(
            "[Written {}] [Records {}]",
            HumanCount(stats.games_written as u64),
            HumanCount(stats.records_written as u64)
        ));
    }

    Ok(stats)
}

use crate::record::TrainingRecord;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Receives the records of one game
pub trait RecordWriter {
    fn append(&mut self, record: TrainingRecord) -> io::Result<()>;

    /// Flushes and closes the output. Called exactly once per writer.
    fn finalize(self) -> io::Result<()>;
}

/// Opens one writer per converted game
pub trait WriterFactory {
    type Writer: RecordWriter;

    fn create(&mut self, game_id: usize, partition: usize) -> io::Result<Self::Writer>;
}

/// Counts the games that produced output and assigns them to partitions.
/// Games that produce no record do not consume an id.
#[derive(Debug, Clone)]
pub struct GameCounter {
    written: usize,
    games_per_partition: usize,
}

impl GameCounter {
    pub fn new(games_per_partition: usize) -> Self {
        GameCounter {
            written: 0,
            games_per_partition: games_per_partition.max(1),
        }
    }

    /// Games written so far, which is also the id of the next written game
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn partition_of(&self, game_id: usize) -> usize {
        game_id / self.games_per_partition
    }

    pub(crate) fn advance(&mut self) {
        self.written += 1;
    }
}

/// Writes each game to `<root>/supervised-<partition>/training.<game id>.gz`
pub struct ChunkWriterFactory {
    root: PathBuf,
}

impl ChunkWriterFactory {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        ChunkWriterFactory {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn chunk_path(&self, game_id: usize, partition: usize) -> PathBuf {
        self.root
            .join(format!("supervised-{}", partition))
            .join(format!("training.{}.gz", game_id))
    }
}

impl WriterFactory for ChunkWriterFactory {
    type Writer = ChunkWriter;

    fn create(&mut self, game_id: usize, partition: usize) -> io::Result<ChunkWriter> {
        ChunkWriter::create(self.chunk_path(game_id, partition))
    }
}

/// Gzip-compressed sequence of records
pub struct ChunkWriter {
    path: PathBuf,
    encoder: GzEncoder<BufWriter<File>>,
    records: usize,
}

impl ChunkWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(&path)?;

        Ok(ChunkWriter {
            path,
            encoder: GzEncoder::new(BufWriter::new(file), Compression::default()),
            records: 0,
        })
    }
}

impl RecordWriter for ChunkWriter {
    fn append(&mut self, record: TrainingRecord) -> io::Result<()> {
        record.write_to(&mut self.encoder)?;
        self.records += 1;
        Ok(())
    }

    fn finalize(self) -> io::Result<()> {
        let mut file = self.encoder.finish()?;
        file.flush()?;

        debug!("Wrote {} records to {}", self.records, self.path.display());
        Ok(())
    }
}

/// Reads back the records of a chunk file
pub struct ChunkReader<R: Read> {
    decoder: GzDecoder<BufReader<R>>,
}

impl ChunkReader<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(ChunkReader::new(File::open(path)?))
    }
}

impl<R: Read> ChunkReader<R> {
    pub fn new(read: R) -> Self {
        ChunkReader {
            decoder: GzDecoder::new(BufReader::new(read)),
        }
    }

    pub fn read_record(&mut self) -> io::Result<Option<TrainingRecord>> {
        TrainingRecord::read_from(&mut self.decoder)
    }
}

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Separator between the position and the result annotation in labelled EPD files.
const ANNOTATION_DELIMITER: &str = " c9 ";

/// Used when no corpus can be read.
pub const FALLBACK_POSITIONS: &[&str] = &[
    "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
    "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
    "rnbqkb1r/pp2pppp/3p1n2/2p5/4P3/2N2N2/PPPP1PPP/R1BQKB1R w KQkq - 0 4",
    "r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3",
    "rnbqkb1r/pppppppp/5n2/8/2PP4/8/PP2PPPP/RNBQKBNR b KQkq - 0 2",
];

pub const DEFAULT_CORPUS_NAME: &str = "quiet-labeled.epd";

/// Extracts the FEN from one EPD line, appending move counters when the
/// line only carries the four board fields.
pub fn parse_epd_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let fen = line
        .split(ANNOTATION_DELIMITER)
        .next()
        .unwrap_or(line)
        .trim();

    match fen.split_whitespace().count() {
        0 => None,
        4 => Some(format!("{} 0 1", fen)),
        _ => Some(fen.to_string()),
    }
}

/// Reads up to `limit` positions from an EPD file.
pub fn load_epd<P: AsRef<Path>>(path: P, limit: usize) -> std::io::Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut positions = Vec::new();

    for line in reader.lines().take(limit) {
        if let Some(fen) = parse_epd_line(&line?) {
            positions.push(fen);
        }
    }

    Ok(positions)
}

/// Where to look for a corpus when none is given explicitly: the working
/// directory, then `../tuner/` relative to the engine binary.
pub fn default_corpus_candidates(engine: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(DEFAULT_CORPUS_NAME)];
    if let Some(dir) = engine.parent() {
        candidates.push(dir.join("..").join("tuner").join(DEFAULT_CORPUS_NAME));
    }
    candidates
}

/// Loads the first readable, non-empty corpus among `candidates`, or the
/// built-in positions.
pub fn load_positions(candidates: &[PathBuf], limit: usize) -> Vec<String> {
    for path in candidates {
        if !path.exists() {
            continue;
        }

        log::info!("Loading positions from {}...", path.display());
        match load_epd(path, limit) {
            Ok(positions) if !positions.is_empty() => {
                log::info!("Loaded {} positions", positions.len());
                return positions;
            }
            Ok(_) => log::warn!("{} contains no positions", path.display()),
            Err(e) => log::warn!("Could not load EPD file {}: {}", path.display(), e),
        }
    }

    log::warn!(
        "No position corpus found, using {} built-in positions",
        FALLBACK_POSITIONS.len()
    );
    FALLBACK_POSITIONS.iter().map(|fen| fen.to_string()).collect()
}

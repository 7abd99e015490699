use crate::error::TunerError;
use crate::tuner::Configuration;
use crate::utils::process::{ProcessOutcome, run_with_timeout};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Mate scores are folded into this many centipawns.
pub const MATE_SCORE: i32 = 10_000;

/// Something that can report an engine's evaluation of a position under a
/// given option configuration.
pub trait EngineSession {
    /// Centipawn score from the side to move's view, or `None` if the engine
    /// gave no usable answer.
    fn evaluate(&mut self, config: &Configuration, fen: &str, depth: u32) -> Option<i32>;
}

/// A UCI engine binary, started fresh for every query.
pub struct UciEngine {
    path: PathBuf,
    timeout: Duration,
    score_re: Regex,
}

impl UciEngine {
    pub fn new(path: &Path, timeout: Duration) -> Result<Self, TunerError> {
        if !path.exists() {
            return Err(TunerError::EngineNotFound(path.to_path_buf()));
        }

        Ok(Self {
            path: path.to_path_buf(),
            timeout,
            score_re: score_regex(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn script(config: &Configuration, fen: &str, depth: u32) -> String {
        let mut lines = vec!["uci".to_string()];
        lines.extend(config.setoption_commands());
        lines.push("isready".to_string());
        lines.push(format!("position fen {}", fen));
        lines.push(format!("go depth {}", depth));
        lines.push("quit".to_string());

        let mut script = lines.join("\n");
        script.push('\n');
        script
    }
}

impl EngineSession for UciEngine {
    fn evaluate(&mut self, config: &Configuration, fen: &str, depth: u32) -> Option<i32> {
        let input = Self::script(config, fen, depth);
        log::trace!("-> {}", input.replace('\n', " | "));

        match run_with_timeout::<&str>(&self.path, &[], Some(&input), self.timeout) {
            ProcessOutcome::Completed(output) => {
                let score = parse_score(&self.score_re, &output);
                if score.is_none() {
                    log::warn!("No score in engine output for {}", fen);
                }
                score
            }
            ProcessOutcome::TimedOut => {
                log::warn!("Engine timed out after {:?} on {}", self.timeout, fen);
                None
            }
            ProcessOutcome::Failed(e) => {
                log::warn!("{}", e);
                None
            }
        }
    }
}

pub(crate) fn score_regex() -> Regex {
    Regex::new(r"score (cp|mate) (-?\d+)").unwrap_or_else(|e| unreachable!("{}", e))
}

/// Takes the last reported score, since deeper iterations come later. If that
/// line is unreadable there is no score; earlier depths are not used instead.
pub fn parse_score(re: &Regex, output: &str) -> Option<i32> {
    let cap = output.lines().rev().find_map(|line| re.captures(line))?;
    let value: i32 = cap[2].parse().ok()?;

    Some(match &cap[1] {
        "mate" if value > 0 => MATE_SCORE,
        "mate" => -MATE_SCORE,
        _ => value,
    })
}

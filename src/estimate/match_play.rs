use super::{Estimate, Scores};
use crate::error::TunerError;
use crate::tuner::Configuration;
use crate::utils::process::{ProcessOutcome, find_program, run_with_timeout};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Game counts from the plus engine's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchResult {
    pub wins_plus: u32,
    pub wins_minus: u32,
    pub draws: u32,
}

impl MatchResult {
    pub fn total(&self) -> u64 {
        self.wins_plus as u64 + self.wins_minus as u64 + self.draws as u64
    }

    /// Points per game for each side; neutral when no game finished.
    pub fn scores(&self) -> Scores {
        let total = self.total();
        if total == 0 {
            return Scores::NEUTRAL;
        }

        let total = total as f64;
        let half_draws = 0.5 * self.draws as f64;
        Scores::new(
            (self.wins_plus as f64 + half_draws) / total,
            (self.wins_minus as f64 + half_draws) / total,
        )
    }
}

/// Plays a batch of games between two configurations of the same engine.
pub trait MatchRunner {
    /// `None` if the batch timed out or its output could not be read.
    fn play(
        &mut self,
        plus: &Configuration,
        minus: &Configuration,
        games: u32,
    ) -> Option<MatchResult>;
}

#[derive(Debug, Clone)]
pub struct MatchSettings {
    pub engine: PathBuf,
    pub time_control: String,
    pub concurrency: u32,
    pub pgn_out: PathBuf,
    pub timeout: Duration,
}

/// Drives a cutechess-cli compatible match runner.
pub struct CutechessRunner {
    program: PathBuf,
    settings: MatchSettings,
    result_re: Regex,
}

impl CutechessRunner {
    pub fn new(program: &str, settings: MatchSettings) -> Result<Self, TunerError> {
        let program = find_program(program)
            .ok_or_else(|| TunerError::MatchRunnerUnavailable(program.to_string()))?;
        if !settings.engine.exists() {
            return Err(TunerError::EngineNotFound(settings.engine.clone()));
        }

        Ok(Self {
            program,
            settings,
            result_re: result_regex(),
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn arguments(
        &self,
        plus: &Configuration,
        minus: &Configuration,
        games: u32,
    ) -> Vec<String> {
        let half_games = (games / 2).to_string();
        let engine_cmd = format!("cmd={}", self.settings.engine.display());

        let mut args = vec!["-engine".to_string(), engine_cmd.clone()];
        args.extend(plus.option_overrides());
        args.push("name=Plus".to_string());

        args.push("-engine".to_string());
        args.push(engine_cmd);
        args.extend(minus.option_overrides());
        args.push("name=Minus".to_string());

        args.extend([
            "-each".to_string(),
            format!("tc={}", self.settings.time_control),
            "proto=uci".to_string(),
            "-games".to_string(),
            half_games.clone(),
            "-rounds".to_string(),
            half_games,
            "-concurrency".to_string(),
            self.settings.concurrency.to_string(),
            "-pgnout".to_string(),
            self.settings.pgn_out.display().to_string(),
            "-recover".to_string(),
            "-wait".to_string(),
            "100".to_string(),
        ]);

        args
    }
}

impl MatchRunner for CutechessRunner {
    fn play(
        &mut self,
        plus: &Configuration,
        minus: &Configuration,
        games: u32,
    ) -> Option<MatchResult> {
        let args = self.arguments(plus, minus, games);
        log::debug!("  {} {}", self.program.display(), args.join(" "));

        match run_with_timeout(&self.program, &args, None, self.settings.timeout) {
            ProcessOutcome::Completed(output) => {
                let result = parse_match_result(&self.result_re, &output);
                if result.is_none() {
                    log::warn!("Could not find a score line in match runner output");
                }
                result
            }
            ProcessOutcome::TimedOut => {
                log::warn!(
                    "Game timeout after {:?}, returning draw",
                    self.settings.timeout
                );
                None
            }
            ProcessOutcome::Failed(e) => {
                log::warn!("Error running games: {}", e);
                None
            }
        }
    }
}

pub(crate) fn result_regex() -> Regex {
    Regex::new(r"Score of Plus vs Minus:\s*(\d+)\s*-\s*(\d+)\s*-\s*(\d+)")
        .unwrap_or_else(|e| unreachable!("{}", e))
}

/// Reads `Score of Plus vs Minus: W - L - D [...]`; the first such line wins,
/// and a count that does not fit means no result.
pub fn parse_match_result(re: &Regex, output: &str) -> Option<MatchResult> {
    let cap = output.lines().find_map(|line| re.captures(line))?;

    Some(MatchResult {
        wins_plus: cap[1].parse().ok()?,
        wins_minus: cap[2].parse().ok()?,
        draws: cap[3].parse().ok()?,
    })
}

/// Ground-truth estimator: the score of an actual match.
pub struct MatchEstimator {
    runner: Box<dyn MatchRunner>,
    games: u32,
}

impl MatchEstimator {
    /// Odd game counts are rounded up so both colours are played equally.
    pub fn new(runner: Box<dyn MatchRunner>, games: u32) -> Self {
        Self {
            runner,
            // Round odd counts up without overflowing at u32::MAX
            games: games.max(2).saturating_add(1) & !1,
        }
    }

    pub fn games(&self) -> u32 {
        self.games
    }
}

impl Estimate for MatchEstimator {
    fn estimate(&mut self, plus: &Configuration, minus: &Configuration) -> Scores {
        log::debug!("  Running {} games...", self.games);

        match self.runner.play(plus, minus, self.games) {
            Some(result) => {
                log::debug!(
                    "  Plus {} - Minus {} - Draws {}",
                    result.wins_plus,
                    result.wins_minus,
                    result.draws
                );
                result.scores()
            }
            None => Scores::NEUTRAL,
        }
    }
}

use crate::error::TunerError;
use fxhash::FxHashMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Name -> value snapshot, as stored in the session log.
pub type Snapshot = BTreeMap<String, f64>;

// ============================================================================
// Tunable Parameter
// ============================================================================

/// A single engine option being tuned.
#[derive(Debug, Clone, PartialEq)]
pub struct TunableParameter {
    /// UCI option name.
    pub name: String,
    pub value: f64,
    pub min_val: f64,
    pub max_val: f64,
    /// Magnitude of the random displacement (SPSA `c`).
    pub perturbation: f64,
    /// Magnitude of the applied update (SPSA `a`).
    pub step: f64,
}

impl TunableParameter {
    /// Creates a parameter with the default scales: perturbation is 2% of the
    /// range (at least 1), step is 10% of the perturbation.
    pub fn new(name: &str, value: f64, min_val: f64, max_val: f64) -> Self {
        let perturbation = ((max_val - min_val) * 0.02).max(1.0);
        Self {
            name: name.to_string(),
            // Bounds are validated by ParameterSet, so no panicking clamp here
            value: value.max(min_val).min(max_val),
            min_val,
            max_val,
            perturbation,
            step: perturbation * 0.1,
        }
    }

    pub fn with_scales(mut self, perturbation: Option<f64>, step: Option<f64>) -> Self {
        if let Some(c) = perturbation {
            self.perturbation = c;
            self.step = c * 0.1;
        }
        if let Some(a) = step {
            self.step = a;
        }
        self
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min_val, self.max_val)
    }

    /// Value as sent to the engine; options are integers on the wire.
    pub fn as_int(&self) -> i64 {
        self.value as i64
    }
}

impl fmt::Display for TunableParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_int())
    }
}

// ============================================================================
// Parameter Set
// ============================================================================

/// Ordered, uniquely-named collection of tunable parameters.
#[derive(Debug, Clone)]
pub struct ParameterSet {
    params: Vec<TunableParameter>,
    index: FxHashMap<String, usize>,
}

impl ParameterSet {
    pub fn new(params: Vec<TunableParameter>) -> Result<Self, TunerError> {
        if params.is_empty() {
            return Err(TunerError::InvalidParameter(
                "no tunable parameters given".to_string(),
            ));
        }

        let mut index = FxHashMap::default();
        for (i, p) in params.iter().enumerate() {
            if p.name.trim().is_empty() {
                return Err(TunerError::InvalidParameter(format!(
                    "parameter #{} has an empty name",
                    i + 1
                )));
            }
            if !(p.min_val <= p.max_val) {
                return Err(TunerError::InvalidParameter(format!(
                    "{}: min {} is greater than max {}",
                    p.name, p.min_val, p.max_val
                )));
            }
            if !(p.perturbation > 0.0) || !(p.step >= 0.0) {
                return Err(TunerError::InvalidParameter(format!(
                    "{}: perturbation must be positive and step non-negative",
                    p.name
                )));
            }
            if index.insert(p.name.clone(), i).is_some() {
                return Err(TunerError::InvalidParameter(format!(
                    "duplicate parameter name {}",
                    p.name
                )));
            }
        }

        Ok(Self { params, index })
    }

    /// Loads a parameter table from a TOML file with `[[param]]` entries.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TunerError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, TunerError> {
        let file: ParamFile = toml::from_str(contents)?;

        let params = file
            .param
            .into_iter()
            .map(|entry| {
                if entry.value < entry.min || entry.value > entry.max {
                    log::warn!(
                        "{} = {} lies outside [{}, {}], clamping",
                        entry.name,
                        entry.value,
                        entry.min,
                        entry.max
                    );
                }
                TunableParameter::new(&entry.name, entry.value, entry.min, entry.max)
                    .with_scales(entry.perturbation, entry.step)
            })
            .collect();

        Self::new(params)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TunableParameter> {
        self.params.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TunableParameter> {
        self.params.iter_mut()
    }

    pub fn get(&self, name: &str) -> Option<&TunableParameter> {
        self.index.get(name).map(|&i| &self.params[i])
    }

    pub fn snapshot(&self) -> Snapshot {
        self.params
            .iter()
            .map(|p| (p.name.clone(), p.value))
            .collect()
    }
}

#[derive(Deserialize)]
struct ParamFile {
    #[serde(default)]
    param: Vec<ParamEntry>,
}

#[derive(Deserialize)]
struct ParamEntry {
    name: String,
    value: f64,
    min: f64,
    max: f64,
    perturbation: Option<f64>,
    step: Option<f64>,
}

// ============================================================================
// Candidate Configuration
// ============================================================================

/// A concrete set of option values handed to an engine, in parameter order.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    values: Vec<(String, f64)>,
}

impl Configuration {
    pub fn new(values: Vec<(String, f64)>) -> Self {
        Self { values }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| *value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `setoption` lines for a UCI engine.
    pub fn setoption_commands(&self) -> Vec<String> {
        self.iter()
            .map(|(name, value)| format!("setoption name {} value {}", name, value as i64))
            .collect()
    }

    /// `option.<Name>=<value>` overrides for the match runner.
    pub fn option_overrides(&self) -> Vec<String> {
        self.iter()
            .map(|(name, value)| format!("option.{}={}", name, value as i64))
            .collect()
    }
}

// ============================================================================
// Defaults
// ============================================================================

/// Evaluation terms exposed by the engine as UCI options: (name, value, min, max).
const DEFAULT_PARAMS: &[(&str, f64, f64, f64)] = &[
    // Material values (middlegame)
    ("PawnValueMG", 100.0, 70.0, 130.0),
    ("KnightValueMG", 320.0, 280.0, 360.0),
    ("BishopValueMG", 330.0, 290.0, 370.0),
    ("RookValueMG", 500.0, 450.0, 550.0),
    ("QueenValueMG", 950.0, 850.0, 1050.0),
    // Material values (endgame)
    ("PawnValueEG", 130.0, 100.0, 160.0),
    ("KnightValueEG", 340.0, 300.0, 380.0),
    ("BishopValueEG", 350.0, 310.0, 390.0),
    ("RookValueEG", 550.0, 500.0, 600.0),
    ("QueenValueEG", 1000.0, 900.0, 1100.0),
    // Piece activity (middlegame)
    ("BishopPairBonusMG", 30.0, 0.0, 60.0),
    ("RookOpenFileBonusMG", 25.0, 0.0, 50.0),
    ("RookSemiOpenFileBonusMG", 11.0, 0.0, 30.0),
    ("RookOnSeventhBonusMG", 20.0, 0.0, 50.0),
    ("KnightOutpostBonusMG", 25.0, 0.0, 50.0),
    // Piece activity (endgame)
    ("BishopPairBonusEG", 50.0, 20.0, 80.0),
    ("RookOpenFileBonusEG", 15.0, 0.0, 40.0),
    ("RookSemiOpenFileBonusEG", 3.0, 0.0, 20.0),
    ("RookOnSeventhBonusEG", 30.0, 0.0, 60.0),
    ("KnightOutpostBonusEG", 15.0, 0.0, 40.0),
    // Pawn structure (middlegame)
    ("IsolatedPawnPenaltyMG", -45.0, -70.0, -10.0),
    ("DoubledPawnPenaltyMG", -16.0, -40.0, 0.0),
    ("BackwardPawnPenaltyMG", -10.0, -30.0, 0.0),
    ("ConnectedPawnBonusMG", 5.0, 0.0, 20.0),
    ("PhalanxBonusMG", 10.0, 0.0, 25.0),
    // Pawn structure (endgame)
    ("IsolatedPawnPenaltyEG", -20.0, -50.0, 0.0),
    ("DoubledPawnPenaltyEG", -21.0, -50.0, 0.0),
    ("BackwardPawnPenaltyEG", -15.0, -35.0, 0.0),
    ("ConnectedPawnBonusEG", 2.0, 0.0, 15.0),
    ("PhalanxBonusEG", 8.0, 0.0, 20.0),
    // King safety
    ("KingSafetyWeight", 83.0, 50.0, 150.0),
];

impl Default for ParameterSet {
    fn default() -> Self {
        let params = DEFAULT_PARAMS
            .iter()
            .map(|&(name, value, min, max)| TunableParameter::new(name, value, min, max))
            .collect();

        // The table above is unique and well-formed
        Self::new(params).unwrap_or_else(|e| unreachable!("default parameter table: {}", e))
    }
}

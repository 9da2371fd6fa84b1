use std::fmt;
use serde::{Deserialize, Serialize};

/// Glyph shown in place of the hidden operand.
pub const UNKNOWN_GLYPH: &str = "🦁";

/// Largest integer an `f64` represents exactly (2^53 - 1).
pub const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_991.0;

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl Operation {
    /// All operations in canonical (sampling pool) order.
    pub const ALL: [Operation; 4] = [
        Operation::Addition,
        Operation::Subtraction,
        Operation::Multiplication,
        Operation::Division,
    ];

    /// Display symbol used in expressions and text.
    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Addition       => "+",
            Operation::Subtraction    => "−",
            Operation::Multiplication => "×",
            Operation::Division       => "÷",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

// ---------------------------------------------------------------------------
// Hidden-operand position
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownPosition {
    First,
    Second,
    #[default]
    Random,
}

impl UnknownPosition {
    /// Parse the persisted setting value. Anything unrecognised is `Random`.
    pub fn from_setting(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("first")  => UnknownPosition::First,
            Some("second") => UnknownPosition::Second,
            _              => UnknownPosition::Random,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnknownPosition::First  => "first",
            UnknownPosition::Second => "second",
            UnknownPosition::Random => "random",
        }
    }
}

impl fmt::Display for UnknownPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Raw settings (the persisted settings object)
// ---------------------------------------------------------------------------

/// Digit magnitude as stored by the settings form: usually a string ("1"),
/// sometimes a bare number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DigitsSetting {
    Number(i64),
    Text(String),
}

impl DigitsSetting {
    fn level(&self) -> Option<i64> {
        match self {
            DigitsSetting::Number(n) => Some(*n),
            DigitsSetting::Text(s)   => s.trim().parse().ok(),
        }
    }
}

/// `{ count, infinite }` pair used for both operand and example counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountSetting {
    pub count: Option<u32>,
    pub infinite: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Toggles {
    pub fractions: bool,
    pub round: bool,
    pub positive: bool,
    pub negative: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationToggles {
    pub addition: bool,
    pub subtraction: bool,
    pub multiplication: bool,
    pub division: bool,
}

impl OperationToggles {
    pub fn from_ops(ops: &[Operation]) -> Self {
        Self {
            addition:       ops.contains(&Operation::Addition),
            subtraction:    ops.contains(&Operation::Subtraction),
            multiplication: ops.contains(&Operation::Multiplication),
            division:       ops.contains(&Operation::Division),
        }
    }

    /// Enabled operations in canonical order.
    pub fn enabled(&self) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|op| match op {
                Operation::Addition       => self.addition,
                Operation::Subtraction    => self.subtraction,
                Operation::Multiplication => self.multiplication,
                Operation::Division       => self.division,
            })
            .collect()
    }
}

/// Trainer settings exactly as the settings screen persists them.
///
/// Every field is optional; [`GeneratorConfig::from`] resolves the defaults
/// once so the generator never looks at a missing field again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub digits: Option<DigitsSetting>,
    pub combine_levels: bool,
    pub actions: Option<CountSetting>,
    /// Legacy top-level operand count, consulted when `actions.count` is unset.
    pub actions_count: Option<u32>,
    pub examples: Option<CountSetting>,
    pub unknown_position: Option<String>,
    pub toggles: Toggles,
    pub fraction_decimals: Option<u32>,
    pub operations: Option<OperationToggles>,
}

impl Settings {
    pub fn with_digits(mut self, level: u8) -> Self {
        self.digits = Some(DigitsSetting::Text(level.to_string()));
        self
    }

    pub fn with_operand_count(mut self, count: u32) -> Self {
        let actions = self.actions.get_or_insert_with(CountSetting::default);
        actions.count = Some(count);
        actions.infinite = false;
        self
    }

    pub fn with_infinite_operands(mut self) -> Self {
        self.actions.get_or_insert_with(CountSetting::default).infinite = true;
        self
    }

    pub fn with_operations(mut self, ops: &[Operation]) -> Self {
        self.operations = Some(OperationToggles::from_ops(ops));
        self
    }

    pub fn with_unknown_position(mut self, position: UnknownPosition) -> Self {
        self.unknown_position = Some(position.as_str().to_string());
        self
    }

    pub fn with_fractions(mut self, decimals: u32) -> Self {
        self.toggles.fractions = true;
        self.fraction_decimals = Some(decimals);
        self
    }

    pub fn with_round_numbers(mut self) -> Self {
        self.toggles.round = true;
        self
    }

    pub fn with_negative_answer(mut self) -> Self {
        self.toggles.negative = true;
        self.toggles.positive = false;
        self
    }

    pub fn with_combined_levels(mut self) -> Self {
        self.combine_levels = true;
        self
    }

    pub fn with_examples(mut self, count: u32) -> Self {
        self.examples = Some(CountSetting { count: Some(count), infinite: false });
        self
    }

    pub fn with_infinite_examples(mut self) -> Self {
        self.examples = Some(CountSetting { count: None, infinite: true });
        self
    }
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandCount {
    Fixed(usize),
    /// Sampled uniformly in 2..=6 for every equation.
    Infinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExampleCount {
    Fixed(usize),
    Infinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSign {
    Any,
    Positive,
    Negative,
}

/// Integer vs fixed-decimal arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberMode {
    Integer,
    Fraction { decimals: u32 },
}

impl NumberMode {
    /// Smallest acceptable intermediate or final value.
    pub fn floor(self) -> f64 {
        match self {
            NumberMode::Integer        => 1.0,
            NumberMode::Fraction { .. } => 0.01,
        }
    }

    /// Round to the configured precision; identity in integer mode.
    pub fn round(self, value: f64) -> f64 {
        match self {
            NumberMode::Integer                => value,
            NumberMode::Fraction { decimals }  => crate::training_engine::numbers::round_to(value, decimals),
        }
    }

    /// Exact equality in integer mode; within half a unit of the configured
    /// precision in fraction mode.
    pub fn approx_eq(self, a: f64, b: f64) -> bool {
        match self {
            NumberMode::Integer               => a == b,
            NumberMode::Fraction { decimals } => (a - b).abs() <= 0.5 / 10f64.powi(decimals as i32) - 1e-12,
        }
    }
}

pub const DEFAULT_OPERAND_COUNT: usize = 2;
pub const DEFAULT_EXAMPLE_COUNT: usize = 10;
pub const DEFAULT_FRACTION_DECIMALS: u32 = 1;
pub const MAX_FRACTION_DECIMALS: u32 = 6;

/// Strongly-typed generator configuration resolved from [`Settings`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub digit_range: u32,
    pub combine_levels: bool,
    pub operand_count: OperandCount,
    pub unknown_position: UnknownPosition,
    pub operations: Vec<Operation>,
    pub fractions: bool,
    pub fraction_decimals: u32,
    pub round_numbers: bool,
    pub answer_sign: AnswerSign,
    pub examples: ExampleCount,
}

impl GeneratorConfig {
    pub fn mode(&self) -> NumberMode {
        if self.fractions {
            NumberMode::Fraction { decimals: self.fraction_decimals }
        } else {
            NumberMode::Integer
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig::from(&Settings::default())
    }
}

impl From<&Settings> for GeneratorConfig {
    fn from(s: &Settings) -> Self {
        let digit_range = s
            .digits
            .as_ref()
            .and_then(DigitsSetting::level)
            .filter(|&n| n > 0)
            .map_or(1, |n| n.clamp(1, 9) as u32);

        let actions = s.actions.clone().unwrap_or_default();
        let operand_count = if actions.infinite {
            OperandCount::Infinite
        } else {
            let n = actions
                .count
                .filter(|&c| c > 0)
                .or(s.actions_count.filter(|&c| c > 0))
                .map_or(DEFAULT_OPERAND_COUNT, |c| c as usize);
            OperandCount::Fixed(n.max(2))
        };

        let examples = match &s.examples {
            Some(e) if e.infinite => ExampleCount::Infinite,
            Some(CountSetting { count: Some(c), .. }) if *c > 0 => ExampleCount::Fixed(*c as usize),
            _ => ExampleCount::Fixed(DEFAULT_EXAMPLE_COUNT),
        };

        let operations = match &s.operations {
            Some(toggles) => toggles.enabled(),
            None => vec![Operation::Addition, Operation::Subtraction],
        };

        let answer_sign = match (s.toggles.negative, s.toggles.positive) {
            (true, _)      => AnswerSign::Negative,
            (false, true)  => AnswerSign::Positive,
            (false, false) => AnswerSign::Any,
        };

        GeneratorConfig {
            digit_range,
            combine_levels: s.combine_levels,
            operand_count,
            unknown_position: UnknownPosition::from_setting(s.unknown_position.as_deref()),
            operations,
            fractions: s.toggles.fractions,
            fraction_decimals: s
                .fraction_decimals
                .unwrap_or(DEFAULT_FRACTION_DECIMALS)
                .clamp(1, MAX_FRACTION_DECIMALS),
            round_numbers: s.toggles.round,
            answer_sign,
            examples,
        }
    }
}

// ---------------------------------------------------------------------------
// Generated equation
// ---------------------------------------------------------------------------

/// One display part of an equation's left-hand side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ExpressionPart {
    Number(f64),
    Operator(String),
    Unknown(String),
}

impl ExpressionPart {
    pub fn is_unknown(&self) -> bool {
        matches!(self, ExpressionPart::Unknown(_))
    }
}

impl fmt::Display for ExpressionPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionPart::Number(n)   => write!(f, "{}", crate::training_engine::helpers::format_number(*n)),
            ExpressionPart::Operator(s) => write!(f, "{s}"),
            ExpressionPart::Unknown(s)  => write!(f, "{s}"),
        }
    }
}

/// An equation with exactly one hidden operand.
///
/// `answer == numbers[unknown_index]`, and evaluating `numbers` left to right
/// with `ops` reproduces `result`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equation {
    pub text: String,
    pub result: f64,
    pub answer: f64,
    pub expression: Vec<ExpressionPart>,
    pub unknown_index: usize,
    pub numbers: Vec<f64>,
    pub ops: Vec<Operation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquationRequest {
    pub settings: Settings,
    pub rng_seed: Option<u64>,
}

impl EquationRequest {
    /// Entropy-seeded request for `settings`.
    pub fn new(settings: Settings) -> Self {
        Self { settings, rng_seed: None }
    }

    pub fn seeded(settings: Settings, seed: u64) -> Self {
        Self { settings, rng_seed: Some(seed) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(value: serde_json::Value) -> Settings {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_settings_resolve_to_defaults() {
        let cfg = GeneratorConfig::from(&settings(json!({})));
        assert_eq!(cfg.digit_range, 1);
        assert_eq!(cfg.operand_count, OperandCount::Fixed(2));
        assert_eq!(cfg.unknown_position, UnknownPosition::Random);
        assert_eq!(cfg.operations, vec![Operation::Addition, Operation::Subtraction]);
        assert!(!cfg.fractions && !cfg.round_numbers && !cfg.combine_levels);
        assert_eq!(cfg.answer_sign, AnswerSign::Any);
        assert_eq!(cfg.examples, ExampleCount::Fixed(DEFAULT_EXAMPLE_COUNT));
    }

    #[test]
    fn persisted_settings_shape_is_accepted() {
        let cfg = GeneratorConfig::from(&settings(json!({
            "digits": "3",
            "combineLevels": true,
            "actions": { "count": 4, "infinite": false },
            "examples": { "count": 5, "infinite": false },
            "toggles": { "fractions": true, "round": false, "positive": false, "negative": true },
            "fractionDecimals": 2,
            "operations": { "addition": false, "multiplication": true, "division": true },
            "unknownPosition": "second",
            "mode": "mental"
        })));
        assert_eq!(cfg.digit_range, 3);
        assert!(cfg.combine_levels);
        assert_eq!(cfg.operand_count, OperandCount::Fixed(4));
        assert_eq!(cfg.examples, ExampleCount::Fixed(5));
        assert_eq!(cfg.mode(), NumberMode::Fraction { decimals: 2 });
        assert_eq!(cfg.answer_sign, AnswerSign::Negative);
        assert_eq!(cfg.operations, vec![Operation::Multiplication, Operation::Division]);
        assert_eq!(cfg.unknown_position, UnknownPosition::Second);
    }

    #[test]
    fn operand_count_falls_back_to_legacy_field_and_floor_of_two() {
        let legacy = GeneratorConfig::from(&settings(json!({ "actions": { "count": 0 }, "actionsCount": 5 })));
        assert_eq!(legacy.operand_count, OperandCount::Fixed(5));

        let one = GeneratorConfig::from(&settings(json!({ "actions": { "count": 1 } })));
        assert_eq!(one.operand_count, OperandCount::Fixed(2));

        let inf = GeneratorConfig::from(&settings(json!({ "actions": { "count": 3, "infinite": true } })));
        assert_eq!(inf.operand_count, OperandCount::Infinite);
    }

    #[test]
    fn digits_accept_numbers_and_clamp() {
        assert_eq!(GeneratorConfig::from(&settings(json!({ "digits": 4 }))).digit_range, 4);
        assert_eq!(GeneratorConfig::from(&settings(json!({ "digits": "12" }))).digit_range, 9);
        assert_eq!(GeneratorConfig::from(&settings(json!({ "digits": "abc" }))).digit_range, 1);
        assert_eq!(GeneratorConfig::from(&settings(json!({ "digits": "0" }))).digit_range, 1);
    }

    #[test]
    fn unknown_position_strings_default_to_random() {
        assert_eq!(UnknownPosition::from_setting(Some("first")), UnknownPosition::First);
        assert_eq!(UnknownPosition::from_setting(Some("middle")), UnknownPosition::Random);
        assert_eq!(UnknownPosition::from_setting(None), UnknownPosition::Random);
    }

    #[test]
    fn fraction_decimals_are_clamped() {
        let cfg = GeneratorConfig::from(&Settings::default().with_fractions(0));
        assert_eq!(cfg.fraction_decimals, 1);
        let cfg = GeneratorConfig::from(&Settings::default().with_fractions(40));
        assert_eq!(cfg.fraction_decimals, MAX_FRACTION_DECIMALS);
    }

    #[test]
    fn equation_serializes_with_camel_case_and_typed_parts() {
        let eq = Equation {
            text: "🦁 + 2 = 5".into(),
            result: 5.0,
            answer: 3.0,
            expression: vec![
                ExpressionPart::Unknown(UNKNOWN_GLYPH.into()),
                ExpressionPart::Operator("+".into()),
                ExpressionPart::Number(2.0),
            ],
            unknown_index: 0,
            numbers: vec![3.0, 2.0],
            ops: vec![Operation::Addition],
        };
        let v = serde_json::to_value(&eq).unwrap();
        assert_eq!(v["unknownIndex"], 0);
        assert_eq!(v["ops"][0], "addition");
        assert_eq!(v["expression"][0]["type"], "unknown");
        assert_eq!(v["expression"][1]["value"], "+");
        assert_eq!(v["expression"][2]["type"], "number");
    }

    #[test]
    fn integer_mode_equality_is_exact_for_integers() {
        assert!(NumberMode::Integer.approx_eq(12.0, 12.0));
        assert!(!NumberMode::Integer.approx_eq(12.0, 13.0));
        let big = -123_456_789_012_345.0;
        assert!(!NumberMode::Integer.approx_eq(big + 1.0, big));
        assert!(!NumberMode::Integer.approx_eq(big + 1e6, big));
        let two = NumberMode::Fraction { decimals: 2 };
        assert!(two.approx_eq(0.1 + 0.2, 0.3));
        assert!(!two.approx_eq(0.31, 0.3));
    }
}

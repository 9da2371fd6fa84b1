use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, trace, warn};

use crate::training_engine::{
    evaluator::{evaluate_checked, evaluate_rounded, finalize_result, solve_for_unknown, Step},
    helpers::{equation, pick_operations, pick_unknown_index},
    models::{
        AnswerSign, Equation, EquationRequest, GeneratorConfig, NumberMode, OperandCount,
        Operation, Settings, UnknownPosition,
    },
    numbers::{round_granularity, sample_operand},
};

/// Attempts made before falling back to the simple addition equation.
pub const MAX_ATTEMPTS: usize = 200;

/// Largest operand count drawn when the operand count is "infinite".
pub const MAX_RANDOM_OPERANDS: usize = 6;

/// Run `attempt` up to `attempts` times and return the first success.
pub fn first_success<T>(attempts: usize, mut attempt: impl FnMut() -> Option<T>) -> Option<T> {
    (0..attempts).find_map(|_| attempt())
}

/// Produces equations for one training session.
///
/// Holds the resolved configuration and its own RNG; nothing is shared
/// between generators.
pub struct EquationGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl EquationGenerator {
    /// Entropy-seeded generator for `settings`.
    pub fn new(settings: &Settings) -> Self {
        Self::from_config(GeneratorConfig::from(settings), None)
    }

    /// Deterministic generator: the same seed yields the same equation sequence.
    pub fn with_seed(settings: &Settings, seed: u64) -> Self {
        Self::from_config(GeneratorConfig::from(settings), Some(seed))
    }

    pub fn from_config(config: GeneratorConfig, rng_seed: Option<u64>) -> Self {
        let rng = match rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        };
        Self { config, rng }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate one equation. Never fails: after [`MAX_ATTEMPTS`] rejected
    /// attempts the matching fallback equation is returned instead.
    pub fn generate(&mut self) -> Equation {
        let negative = self.config.answer_sign == AnswerSign::Negative;
        let found = first_success(MAX_ATTEMPTS, || {
            if negative {
                self.try_generate_negative()
            } else {
                self.try_generate()
            }
        });

        match found {
            Some(eq) => {
                debug!(target: "equation_drill_gen", text = %eq.text, answer = eq.answer, "generated equation");
                eq
            }
            None => {
                warn!(
                    target: "equation_drill_gen",
                    attempts = MAX_ATTEMPTS,
                    negative,
                    "no valid equation found, using fallback"
                );
                if negative {
                    self.fallback_negative()
                } else {
                    self.fallback()
                }
            }
        }
    }

    fn operand_count(&mut self) -> usize {
        match self.config.operand_count {
            OperandCount::Fixed(n) => n.max(2),
            OperandCount::Infinite => self.rng.gen_range(2..=MAX_RANDOM_OPERANDS),
        }
    }

    fn sample(&mut self) -> f64 {
        sample_operand(&mut self.rng, &self.config)
    }

    /// One forward attempt: sample operands and operations, evaluate left to
    /// right, then hide one operand. `None` if any step breaks the rules.
    pub fn try_generate(&mut self) -> Option<Equation> {
        if self.config.operations.is_empty() {
            return None;
        }
        let n = self.operand_count();
        let numbers: Vec<f64> = (0..n).map(|_| self.sample()).collect();
        let ops = pick_operations(&mut self.rng, &self.config.operations, n - 1)?;

        let mode = self.config.mode();
        let result = match evaluate_checked(mode, &numbers, &ops).and_then(|acc| finalize_result(mode, acc)) {
            Step::Valid(v) => v,
            Step::Rejected(reason) => {
                trace!(target: "equation_drill_gen", %reason, "attempt rejected");
                return None;
            }
        };

        let unknown_index = pick_unknown_index(&mut self.rng, self.config.unknown_position, n);
        Some(equation(numbers, ops, unknown_index, result))
    }

    /// One negative-answer attempt: sample the visible operands and a positive
    /// result, then reverse-solve the hidden operand and keep it only if it is
    /// strictly negative and representable in the current mode.
    pub fn try_generate_negative(&mut self) -> Option<Equation> {
        if self.config.operations.is_empty() {
            return None;
        }
        let n = self.operand_count();
        let unknown_index = pick_unknown_index(&mut self.rng, self.config.unknown_position, n);
        let mut numbers: Vec<f64> = (0..n)
            .map(|i| if i == unknown_index { 0.0 } else { self.sample() })
            .collect();
        let ops = pick_operations(&mut self.rng, &self.config.operations, n - 1)?;
        let result = self.sample();

        let mode = self.config.mode();
        let solved = solve_for_unknown(mode, &numbers, &ops, unknown_index, result)?;
        if !solved.is_finite() {
            return None;
        }
        let answer = mode.round(solved);
        if answer >= 0.0 {
            return None;
        }
        if mode == NumberMode::Integer && answer.fract() != 0.0 {
            return None;
        }
        if self.config.round_numbers && answer % round_granularity(self.config.digit_range) != 0.0 {
            return None;
        }

        numbers[unknown_index] = answer;
        // rounding in fraction mode can drift away from the sampled result
        let reproduced = match evaluate_rounded(mode, &numbers, &ops) {
            Step::Valid(v) => v,
            Step::Rejected(reason) => {
                trace!(target: "equation_drill_gen", %reason, "negative attempt rejected");
                return None;
            }
        };
        if !mode.approx_eq(reproduced, result) {
            return None;
        }
        Some(equation(numbers, ops, unknown_index, result))
    }

    /// `a + b = a+b` with freshly sampled operands. The hidden slot is the
    /// second one only when the policy asks for it, otherwise the first.
    pub fn fallback(&mut self) -> Equation {
        let a = self.sample();
        let b = self.sample();
        let result = self.config.mode().round(a + b);
        let unknown_index = match self.config.unknown_position {
            UnknownPosition::Second => 1,
            _ => 0,
        };
        equation(vec![a, b], vec![Operation::Addition], unknown_index, result)
    }

    /// `x + b = 1` with `b ≥ 2`, so the hidden first operand `1 − b` is negative.
    pub fn fallback_negative(&mut self) -> Equation {
        let result = 1.0;
        let b = self.sample().max(2.0);
        let answer = self.config.mode().round(result - b);
        equation(vec![answer, b], vec![Operation::Addition], 0, result)
    }
}

/// One-shot entry point: build a generator for the request and draw one equation.
pub fn generate_equation(request: EquationRequest) -> Equation {
    let mut generator = EquationGenerator::from_config(GeneratorConfig::from(&request.settings), request.rng_seed);
    generator.generate()
}

//! Training session state: one current equation, tallies, wrong attempts and
//! the summary handed to whoever listens for completion or exit.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::training_engine::{
    generator::EquationGenerator,
    helpers::format_number,
    models::{Equation, ExampleCount, GeneratorConfig, Settings},
};

/// Why a submitted answer was not accepted for checking.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnswerError {
    #[error("please enter a number")]
    Empty,
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("no equation is waiting for an answer")]
    NoCurrentEquation,
    #[error("the training session has already finished")]
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Done,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrongExample {
    pub equation: String,
    pub user_answer: f64,
    pub correct_answer: f64,
}

/// Sent when training completes (`done`) or the learner leaves early (`exit`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSummary {
    pub phase: SessionPhase,
    pub correct: usize,
    pub incorrect: usize,
    pub total: usize,
    pub wrong_examples: Vec<WrongExample>,
    /// Milliseconds; only reported when the session ran to completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub user_answer: f64,
    pub correct_answer: f64,
}

/// Accepts `-4`, `−4` (typographic minus) and `2,5` as well as `2.5`.
pub fn parse_answer(input: &str) -> Result<f64, AnswerError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AnswerError::Empty);
    }
    let normalized = trimmed.replace('−', "-").replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(AnswerError::NotANumber(trimmed.to_string())),
    }
}

pub struct TrainingSession {
    generator: EquationGenerator,
    total: ExampleCount,
    current: Option<Equation>,
    current_index: usize,
    correct: usize,
    incorrect: usize,
    wrong_examples: Vec<WrongExample>,
    started: Instant,
    finished: bool,
}

impl TrainingSession {
    pub fn new(settings: &Settings, rng_seed: Option<u64>) -> Self {
        let config = GeneratorConfig::from(settings);
        let total = config.examples;
        Self {
            generator: EquationGenerator::from_config(config, rng_seed),
            total,
            current: None,
            current_index: 0,
            correct: 0,
            incorrect: 0,
            wrong_examples: Vec::new(),
            started: Instant::now(),
            finished: false,
        }
    }

    /// Move to the next equation. `None` once every example has been answered
    /// or the session is finished; call [`finish`](Self::finish) then.
    pub fn next_equation(&mut self) -> Option<&Equation> {
        if self.finished || self.is_complete() {
            self.current = None;
            return None;
        }
        let eq = self.generator.generate();
        debug!(target: "equation_drill_gen", index = self.current_index, text = %eq.text, "next equation");
        self.current = Some(eq);
        self.current.as_ref()
    }

    pub fn current(&self) -> Option<&Equation> {
        self.current.as_ref()
    }

    /// Check `input` against the current equation's hidden operand.
    ///
    /// Validation errors leave the session untouched.
    pub fn submit_answer(&mut self, input: &str) -> Result<AnswerOutcome, AnswerError> {
        if self.finished {
            return Err(AnswerError::Finished);
        }
        let user_answer = parse_answer(input)?;
        let eq = self.current.take().ok_or(AnswerError::NoCurrentEquation)?;

        let mode = self.generator.config().mode();
        let is_correct = mode.approx_eq(user_answer, eq.answer);
        debug!(
            target: "equation_drill_gen",
            user_answer,
            correct_answer = eq.answer,
            is_correct,
            "answer submitted"
        );

        if is_correct {
            self.correct += 1;
        } else {
            self.incorrect += 1;
            self.wrong_examples.push(WrongExample {
                equation: eq.text.clone(),
                user_answer,
                correct_answer: eq.answer,
            });
        }
        self.current_index += 1;

        Ok(AnswerOutcome { is_correct, user_answer, correct_answer: eq.answer })
    }

    /// True once the configured number of examples has been answered.
    pub fn is_complete(&self) -> bool {
        match self.total {
            ExampleCount::Fixed(n) => self.current_index >= n,
            ExampleCount::Infinite => false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn total(&self) -> ExampleCount {
        self.total
    }

    pub fn answered(&self) -> usize {
        self.current_index
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    pub fn incorrect(&self) -> usize {
        self.incorrect
    }

    pub fn wrong_examples(&self) -> &[WrongExample] {
        &self.wrong_examples
    }

    /// Share of correct answers in percent, rounded; 0 before any answer.
    pub fn accuracy(&self) -> u32 {
        if self.current_index == 0 {
            return 0;
        }
        (self.correct as f64 / self.current_index as f64 * 100.0).round() as u32
    }

    /// Progress label: `"3 / 10"`, or just the count in infinite mode.
    pub fn progress_label(&self) -> String {
        match self.total {
            ExampleCount::Fixed(n) => format!("{} / {}", self.current_index, n),
            ExampleCount::Infinite => format!("{}", self.current_index),
        }
    }

    /// Finish normally; reports elapsed time.
    pub fn finish(&mut self) -> TrainingSummary {
        self.finished = true;
        self.current = None;
        let elapsed = self.started.elapsed().as_millis() as u64;
        info!(
            target: "equation_drill_gen",
            correct = self.correct,
            incorrect = self.incorrect,
            total = self.current_index,
            elapsed_ms = elapsed,
            "training finished"
        );
        self.summary(SessionPhase::Done, Some(elapsed))
    }

    /// Leave before the end; no elapsed time is reported.
    pub fn exit(&mut self) -> TrainingSummary {
        self.finished = true;
        self.current = None;
        info!(
            target: "equation_drill_gen",
            correct = self.correct,
            incorrect = self.incorrect,
            total = self.current_index,
            "training exited"
        );
        self.summary(SessionPhase::Exit, None)
    }

    fn summary(&self, phase: SessionPhase, elapsed_time: Option<u64>) -> TrainingSummary {
        TrainingSummary {
            phase,
            correct: self.correct,
            incorrect: self.incorrect,
            total: self.current_index,
            wrong_examples: self.wrong_examples.clone(),
            elapsed_time,
        }
    }
}

impl WrongExample {
    /// One-line review text, e.g. `"🦁 + 3 = 5: you said 1, answer 2"`.
    pub fn review_line(&self) -> String {
        format!(
            "{}: you said {}, answer {}",
            self.equation,
            format_number(self.user_answer),
            format_number(self.correct_answer)
        )
    }
}

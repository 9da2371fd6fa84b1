//! Core training engine — equation generation, evaluation and session state.
//!
//! ## Module overview
//!
//! | Module      | Purpose |
//! |-------------|---------|
//! | `models`    | Settings (persisted shape), resolved config, equation types |
//! | `numbers`   | Operand sampling by digit level, round and fraction rules |
//! | `evaluator` | Forward fold with per-step validity, reverse solver |
//! | `helpers`   | Expression/text builders shared by both generation paths |
//! | `generator` | `EquationGenerator` — bounded attempts plus fallbacks |
//! | `session`   | Training session: answers, tallies, completion summary |

pub mod evaluator;
pub mod generator;
pub mod helpers;
pub mod models;
pub mod numbers;
pub mod session;

// Re-export the public API surface so callers can use
// `training_engine::generate_equation` without reaching into sub-modules.
pub use generator::{generate_equation, EquationGenerator, MAX_ATTEMPTS};
pub use models::{
    Equation, EquationRequest, ExpressionPart, GeneratorConfig, NumberMode, Operation,
    Settings, UnknownPosition,
};
pub use session::{AnswerError, AnswerOutcome, SessionPhase, TrainingSession, TrainingSummary, WrongExample};

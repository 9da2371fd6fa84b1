//! # equation_drill_gen
//!
//! Arithmetic drills with one hidden operand.
//!
//! Each equation shows every operand except one, which is replaced by a
//! mascot glyph (🦁); the learner types the missing number. The generator
//! honours the trainer settings: digit level, operand count, enabled
//! operations, fraction and round-number modes, where the unknown sits, and
//! an optional mode in which the hidden number is always negative.
//!
//! ## How it works
//!
//! 1. Build [`Settings`] (or deserialize the persisted settings object).
//! 2. Create an [`EquationGenerator`] and call `generate()`. It samples
//!    operands and operations, evaluates left to right rejecting invalid
//!    steps, and hides one operand. After [`MAX_ATTEMPTS`] rejected attempts
//!    it returns a simple addition instead, so it never fails.
//! 3. Render the [`Equation`] (see [`render`]) and check answers through a
//!    [`TrainingSession`], which also produces the completion summary.
//!
//! ## Quick start
//!
//! ```rust
//! use equation_drill_gen::{EquationGenerator, Operation, Settings, UnknownPosition};
//!
//! let settings = Settings::default()
//!     .with_digits(2)
//!     .with_operand_count(3)
//!     .with_operations(&[Operation::Addition, Operation::Subtraction])
//!     .with_unknown_position(UnknownPosition::Random);
//!
//! let mut generator = EquationGenerator::with_seed(&settings, 42);
//! let eq = generator.generate();
//! println!("{}", eq.text);
//! assert_eq!(eq.answer, eq.numbers[eq.unknown_index]);
//! ```

pub mod config;
pub mod render;
pub mod telemetry;
pub mod training_engine;

pub use training_engine::{
    generate_equation, AnswerError, AnswerOutcome, Equation, EquationGenerator, EquationRequest,
    ExpressionPart, GeneratorConfig, NumberMode, Operation, SessionPhase, Settings,
    TrainingSession, TrainingSummary, UnknownPosition, WrongExample, MAX_ATTEMPTS,
};

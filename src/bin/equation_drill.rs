//! Console trainer for `equation_drill_gen`.
//!
//! Interactive by default: prints one equation at a time with the unknown
//! shown as 🦁, reads answers from stdin (`q` leaves early) and prints the
//! training summary as JSON at the end. `--batch N` prints N equations as
//! JSON lines instead.
//!
//! Settings come from `--config`, else from `EQUATION_SETTINGS_PATH`, else
//! defaults; command-line flags override them.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::info;

use equation_drill_gen::{
    config, render, telemetry, AnswerError, EquationGenerator, Operation, Settings,
    TrainingSession, UnknownPosition,
};
use equation_drill_gen::training_engine::{helpers::format_number, models::UNKNOWN_GLYPH};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OpArg {
    Add,
    Sub,
    Mul,
    Div,
}

impl From<OpArg> for Operation {
    fn from(op: OpArg) -> Self {
        match op {
            OpArg::Add => Operation::Addition,
            OpArg::Sub => Operation::Subtraction,
            OpArg::Mul => Operation::Multiplication,
            OpArg::Div => Operation::Division,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PositionArg {
    First,
    Second,
    Random,
}

impl From<PositionArg> for UnknownPosition {
    fn from(p: PositionArg) -> Self {
        match p {
            PositionArg::First  => UnknownPosition::First,
            PositionArg::Second => UnknownPosition::Second,
            PositionArg::Random => UnknownPosition::Random,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "equation_drill", version, about = "Arithmetic drills with one hidden operand")]
struct Cli {
    /// Settings file (.toml or .json)
    #[arg(long)]
    config: Option<PathBuf>,
    /// RNG seed for a reproducible sequence
    #[arg(long)]
    seed: Option<u64>,
    /// Digit level of operands (1-9)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=9))]
    digits: Option<u8>,
    /// Operands per equation
    #[arg(long)]
    count: Option<u32>,
    /// Random operand count (2-6) per equation
    #[arg(long)]
    infinite_count: bool,
    /// Enabled operations, comma separated
    #[arg(long, value_enum, value_delimiter = ',')]
    ops: Vec<OpArg>,
    /// Which operand is hidden
    #[arg(long, value_enum)]
    position: Option<PositionArg>,
    /// Fractional operands
    #[arg(long)]
    fractions: bool,
    /// Decimal places in fraction mode
    #[arg(long, default_value_t = 1)]
    decimals: u32,
    /// Round operands (10, 20, 300, ...)
    #[arg(long)]
    round: bool,
    /// Hidden operand is always negative
    #[arg(long)]
    negative: bool,
    /// Mix 1-3 digit operands within one equation
    #[arg(long)]
    combine: bool,
    /// Examples per session
    #[arg(long)]
    examples: Option<u32>,
    /// Print N equations as JSON lines and exit
    #[arg(long)]
    batch: Option<usize>,
}

impl Cli {
    fn settings(&self) -> Result<Settings, config::ConfigError> {
        let mut s = match &self.config {
            Some(path) => config::load_settings(path)?,
            None => config::load_settings_from_env().unwrap_or_default(),
        };
        if let Some(d) = self.digits {
            s = s.with_digits(d);
        }
        if let Some(c) = self.count {
            s = s.with_operand_count(c);
        }
        if self.infinite_count {
            s = s.with_infinite_operands();
        }
        if !self.ops.is_empty() {
            let ops: Vec<Operation> = self.ops.iter().map(|&o| o.into()).collect();
            s = s.with_operations(&ops);
        }
        if let Some(p) = self.position {
            s = s.with_unknown_position(p.into());
        }
        if self.fractions {
            s = s.with_fractions(self.decimals);
        }
        if self.round {
            s = s.with_round_numbers();
        }
        if self.negative {
            s = s.with_negative_answer();
        }
        if self.combine {
            s = s.with_combined_levels();
        }
        if let Some(n) = self.examples {
            s = s.with_examples(n);
        }
        Ok(s)
    }
}

fn run_batch(settings: &Settings, seed: Option<u64>, n: usize) -> Result<(), Box<dyn std::error::Error>> {
    let mut generator = match seed {
        Some(seed) => EquationGenerator::with_seed(settings, seed),
        None => EquationGenerator::new(settings),
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for _ in 0..n {
        let eq = generator.generate();
        writeln!(out, "{}", serde_json::to_string(&eq)?)?;
    }
    Ok(())
}

fn run_interactive(settings: &Settings, seed: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = TrainingSession::new(settings, seed);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let summary = 'session: loop {
        let line = match session.next_equation() {
            Some(eq) => render::to_console_line(eq, UNKNOWN_GLYPH),
            None => break 'session session.finish(),
        };
        println!("[{}] {line}", session.progress_label());

        loop {
            print!("{UNKNOWN_GLYPH} = ");
            io::stdout().flush()?;
            let Some(input) = lines.next().transpose()? else {
                break 'session session.exit();
            };
            if input.trim().eq_ignore_ascii_case("q") {
                break 'session session.exit();
            }
            match session.submit_answer(&input) {
                Ok(outcome) if outcome.is_correct => {
                    println!("  ✓");
                    break;
                }
                Ok(outcome) => {
                    println!("  ✗ answer: {}", format_number(outcome.correct_answer));
                    break;
                }
                Err(e @ (AnswerError::Empty | AnswerError::NotANumber(_))) => println!("  {e}"),
                Err(e) => return Err(e.into()),
            }
        }
    };

    info!(target: "equation_drill_gen", accuracy = session.accuracy(), "session summary ready");
    for wrong in &summary.wrong_examples {
        println!("  {}", wrong.review_line());
    }
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();
    let cli = Cli::parse();
    let settings = cli.settings()?;

    match cli.batch {
        Some(n) => run_batch(&settings, cli.seed, n),
        None => run_interactive(&settings, cli.seed),
    }
}

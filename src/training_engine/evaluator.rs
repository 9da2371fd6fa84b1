//! Left-to-right evaluation with per-step validity, and the reverse solver
//! used when the hidden operand has to come out negative.

use crate::training_engine::models::{NumberMode, Operation, MAX_EXACT_INTEGER};

/// Why an attempt was thrown away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NoOperands,
    BelowFloor,
    DivisionByZero,
    InexactDivision,
    NonInteger,
    OutOfRange,
    NotFinite,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Rejection::NoOperands      => "no operands",
            Rejection::BelowFloor      => "value below floor",
            Rejection::DivisionByZero  => "division by zero",
            Rejection::InexactDivision => "inexact division",
            Rejection::NonInteger      => "non-integer result",
            Rejection::OutOfRange      => "value out of exact range",
            Rejection::NotFinite       => "non-finite value",
        };
        write!(f, "{s}")
    }
}

/// Outcome of one evaluation step: a valid intermediate or a rejected attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Valid(f64),
    Rejected(Rejection),
}

impl Step {
    pub fn and_then(self, f: impl FnOnce(f64) -> Step) -> Step {
        match self {
            Step::Valid(v) => f(v),
            rejected       => rejected,
        }
    }
}

fn checked(mode: NumberMode, value: f64) -> Step {
    if !value.is_finite() {
        Step::Rejected(Rejection::NotFinite)
    } else if mode == NumberMode::Integer && value.abs() > MAX_EXACT_INTEGER {
        Step::Rejected(Rejection::OutOfRange)
    } else {
        Step::Valid(value)
    }
}

/// Apply `acc <op> operand` under the domain rules of `mode`.
///
/// - addition is always valid;
/// - subtraction must keep the running value at or above the floor;
/// - multiplication is always valid (rounded in fraction mode);
/// - division needs a non-zero divisor; integer mode also needs an exact
///   quotient of at least 1, fraction mode a rounded quotient of at least 0.01.
pub fn apply_step(mode: NumberMode, acc: f64, op: Operation, operand: f64) -> Step {
    let next = match op {
        Operation::Addition => acc + operand,
        Operation::Subtraction => {
            let v = mode.round(acc - operand);
            if v < mode.floor() {
                return Step::Rejected(Rejection::BelowFloor);
            }
            v
        }
        Operation::Multiplication => mode.round(acc * operand),
        Operation::Division => {
            if operand == 0.0 {
                return Step::Rejected(Rejection::DivisionByZero);
            }
            match mode {
                NumberMode::Fraction { .. } => {
                    let q = mode.round(acc / operand);
                    if q < mode.floor() {
                        return Step::Rejected(Rejection::BelowFloor);
                    }
                    q
                }
                NumberMode::Integer => {
                    if acc % operand != 0.0 {
                        return Step::Rejected(Rejection::InexactDivision);
                    }
                    let q = acc / operand;
                    if q < 1.0 {
                        return Step::Rejected(Rejection::BelowFloor);
                    }
                    q
                }
            }
        }
    };
    checked(mode, next)
}

/// Fold `numbers` left to right with `ops`, rejecting at the first invalid step.
pub fn evaluate_checked(mode: NumberMode, numbers: &[f64], ops: &[Operation]) -> Step {
    let Some((&first, rest)) = numbers.split_first() else {
        return Step::Rejected(Rejection::NoOperands);
    };
    ops.iter()
        .zip(rest)
        .fold(checked(mode, first), |step, (&op, &n)| {
            step.and_then(|acc| apply_step(mode, acc, op, n))
        })
}

/// Final gate on an evaluated value: positive integer ≥ 1, or a rounded
/// value ≥ 0.01 in fraction mode.
pub fn finalize_result(mode: NumberMode, value: f64) -> Step {
    match mode {
        NumberMode::Fraction { .. } => {
            let v = mode.round(value);
            if v < mode.floor() {
                Step::Rejected(Rejection::BelowFloor)
            } else {
                Step::Valid(v)
            }
        }
        NumberMode::Integer => {
            if value.fract() != 0.0 {
                Step::Rejected(Rejection::NonInteger)
            } else if value < 1.0 {
                Step::Rejected(Rejection::BelowFloor)
            } else {
                Step::Valid(value)
            }
        }
    }
}

/// Evaluate left to right with the same rounding the generator applies, but
/// without the floor rules: the hidden operand may be negative here. Only
/// values the mode cannot represent are rejected (out of exact range, zero or
/// inexact integer division). Used to confirm an equation reproduces its result.
pub fn evaluate_rounded(mode: NumberMode, numbers: &[f64], ops: &[Operation]) -> Step {
    let Some((&first, rest)) = numbers.split_first() else {
        return Step::Rejected(Rejection::NoOperands);
    };
    ops.iter()
        .zip(rest)
        .fold(checked(mode, first), |step, (&op, &n)| {
            step.and_then(|acc| checked(mode, n).and_then(|n| rounded_step(mode, acc, op, n)))
        })
        .and_then(|acc| checked(mode, mode.round(acc)))
}

fn rounded_step(mode: NumberMode, acc: f64, op: Operation, operand: f64) -> Step {
    let next = match op {
        Operation::Addition       => acc + operand,
        Operation::Subtraction    => mode.round(acc - operand),
        Operation::Multiplication => mode.round(acc * operand),
        Operation::Division => {
            if operand == 0.0 {
                return Step::Rejected(Rejection::DivisionByZero);
            }
            if mode == NumberMode::Integer && acc % operand != 0.0 {
                return Step::Rejected(Rejection::InexactDivision);
            }
            mode.round(acc / operand)
        }
    };
    checked(mode, next)
}

// ---------------------------------------------------------------------------
// Reverse solve
// ---------------------------------------------------------------------------

/// Undo `x <op> operand = target`, i.e. return `x`.
///
/// Used while walking back from the result over operands to the right of the
/// hidden one.
pub fn invert_step(target: f64, op: Operation, operand: f64) -> Option<f64> {
    match op {
        Operation::Addition       => Some(target - operand),
        Operation::Subtraction    => Some(target + operand),
        Operation::Multiplication => (operand != 0.0).then(|| target / operand),
        Operation::Division       => Some(target * operand),
    }
}

/// Solve `prefix <op> x = target` for `x`.
///
/// The hidden value is on the right of the operator here, so subtraction and
/// division are not simple inverses: `P − x = T` gives `x = P − T` and
/// `P ÷ x = T` gives `x = P ÷ T`.
pub fn solve_boundary(prefix: f64, op: Operation, target: f64) -> Option<f64> {
    match op {
        Operation::Addition       => Some(target - prefix),
        Operation::Subtraction    => Some(prefix - target),
        Operation::Multiplication => (prefix != 0.0).then(|| target / prefix),
        Operation::Division       => (target != 0.0).then(|| prefix / target),
    }
}

fn prefix_step(mode: NumberMode, acc: f64, op: Operation, operand: f64) -> Option<f64> {
    match op {
        Operation::Addition       => Some(acc + operand),
        Operation::Subtraction    => Some(mode.round(acc - operand)),
        Operation::Multiplication => Some(mode.round(acc * operand)),
        Operation::Division       => (operand != 0.0).then(|| mode.round(acc / operand)),
    }
}

/// Find the value of `numbers[unknown_index]` that makes
/// `numbers[0] ops[0] numbers[1] … = result` hold.
///
/// Two phases:
/// 1. fold from the right: invert every operation right of the hidden slot,
///    starting from `result`, giving the target `T` the left part must reach;
/// 2. fold from the left: evaluate the prefix `P` before the hidden slot, then
///    solve the single step `P <op> x = T`.
///
/// When the hidden slot is first, `T` is the answer. The value at
/// `numbers[unknown_index]` is ignored. Returns `None` on any zero divisor, on
/// mismatched lengths, or when an integer-mode value leaves the exact range.
pub fn solve_for_unknown(
    mode: NumberMode,
    numbers: &[f64],
    ops: &[Operation],
    unknown_index: usize,
    result: f64,
) -> Option<f64> {
    if numbers.len() != ops.len() + 1 || unknown_index >= numbers.len() {
        return None;
    }

    let exact = |v: f64| match checked(mode, v) {
        Step::Valid(v) => Some(v),
        Step::Rejected(_) => None,
    };

    let target = (unknown_index + 1..numbers.len())
        .rev()
        .try_fold(exact(result)?, |t, i| invert_step(t, ops[i - 1], numbers[i]).and_then(exact))?;

    if unknown_index == 0 {
        return Some(target);
    }

    let prefix = numbers[1..unknown_index]
        .iter()
        .zip(&ops[..unknown_index - 1])
        .try_fold(exact(numbers[0])?, |p, (&n, &op)| prefix_step(mode, p, op, n).and_then(exact))?;

    solve_boundary(prefix, ops[unknown_index - 1], target).and_then(exact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use Operation::*;

    const INT: NumberMode = NumberMode::Integer;
    const FRAC1: NumberMode = NumberMode::Fraction { decimals: 1 };

    #[test]
    fn forward_fold_evaluates_left_to_right() {
        // (2 + 3) × 4 − 5 = 15, not 2 + 12 − 5
        assert_eq!(
            evaluate_checked(INT, &[2.0, 3.0, 4.0, 5.0], &[Addition, Multiplication, Subtraction]),
            Step::Valid(15.0)
        );
    }

    #[test]
    fn subtraction_below_floor_is_rejected() {
        assert_eq!(apply_step(INT, 3.0, Subtraction, 3.0), Step::Rejected(Rejection::BelowFloor));
        assert_eq!(apply_step(INT, 4.0, Subtraction, 3.0), Step::Valid(1.0));
        assert_eq!(apply_step(FRAC1, 3.0, Subtraction, 3.0), Step::Rejected(Rejection::BelowFloor));
        assert_eq!(apply_step(FRAC1, 3.1, Subtraction, 3.0), Step::Valid(0.1));
    }

    #[test]
    fn integer_division_must_be_exact() {
        assert_eq!(apply_step(INT, 12.0, Division, 4.0), Step::Valid(3.0));
        assert_eq!(apply_step(INT, 12.0, Division, 5.0), Step::Rejected(Rejection::InexactDivision));
        assert_eq!(apply_step(INT, 12.0, Division, 0.0), Step::Rejected(Rejection::DivisionByZero));
    }

    #[test]
    fn fraction_division_is_rounded() {
        assert_eq!(apply_step(FRAC1, 10.0, Division, 3.0), Step::Valid(3.3));
        assert_eq!(apply_step(FRAC1, 0.1, Division, 9.0), Step::Rejected(Rejection::BelowFloor));
    }

    #[test]
    fn rejection_short_circuits_the_fold() {
        let step = evaluate_checked(INT, &[2.0, 5.0, 100.0], &[Subtraction, Addition]);
        assert_eq!(step, Step::Rejected(Rejection::BelowFloor));
    }

    #[test]
    fn huge_integer_products_are_rejected() {
        let big = 999_999_999.0;
        let step = evaluate_checked(INT, &[big, big, big], &[Multiplication, Multiplication]);
        assert_eq!(step, Step::Rejected(Rejection::OutOfRange));
    }

    #[test]
    fn final_gate_checks_integer_and_floor() {
        assert_eq!(finalize_result(INT, 4.0), Step::Valid(4.0));
        assert_eq!(finalize_result(INT, 0.0), Step::Rejected(Rejection::BelowFloor));
        assert_eq!(finalize_result(INT, 2.5), Step::Rejected(Rejection::NonInteger));
        assert_eq!(finalize_result(FRAC1, 2.46), Step::Valid(2.5));
    }

    #[test]
    fn inverse_table_undoes_each_operation() {
        for op in Operation::ALL {
            let x = 6.0;
            let operand = 3.0;
            let target = match op {
                Addition       => x + operand,
                Subtraction    => x - operand,
                Multiplication => x * operand,
                Division       => x / operand,
            };
            assert_eq!(invert_step(target, op, operand), Some(x), "{op:?}");
        }
        assert_eq!(invert_step(5.0, Multiplication, 0.0), None);
    }

    #[test]
    fn boundary_solve_handles_right_hand_unknown() {
        assert_eq!(solve_boundary(10.0, Addition, 4.0), Some(-6.0));       // 10 + x = 4
        assert_eq!(solve_boundary(10.0, Subtraction, 14.0), Some(-4.0));   // 10 − x = 14
        assert_eq!(solve_boundary(10.0, Multiplication, -20.0), Some(-2.0)); // 10 × x = −20
        assert_eq!(solve_boundary(10.0, Division, -5.0), Some(-2.0));      // 10 ÷ x = −5
        assert_eq!(solve_boundary(0.0, Multiplication, 3.0), None);
        assert_eq!(solve_boundary(3.0, Division, 0.0), None);
    }

    #[test]
    fn solves_unknown_in_first_position() {
        // x + 7 = 3
        assert_eq!(solve_for_unknown(INT, &[0.0, 7.0], &[Addition], 0, 3.0), Some(-4.0));
        // x × 2 − 4 = 6  →  x = 5
        assert_eq!(
            solve_for_unknown(INT, &[0.0, 2.0, 4.0], &[Multiplication, Subtraction], 0, 6.0),
            Some(5.0)
        );
    }

    #[test]
    fn solves_unknown_in_middle_position() {
        // 8 − x ÷ 2 = 7  → (8 − x) = 14 → x = −6
        let numbers = [8.0, 0.0, 2.0];
        let ops = [Subtraction, Division];
        let x = solve_for_unknown(INT, &numbers, &ops, 1, 7.0).unwrap();
        assert_eq!(x, -6.0);
        assert_eq!(evaluate_rounded(INT, &[8.0, x, 2.0], &ops), Step::Valid(7.0));
    }

    #[test]
    fn solves_unknown_in_last_position() {
        // 3 + 4 × x = 14 → 7 × x = 14 → x = 2
        assert_eq!(
            solve_for_unknown(INT, &[3.0, 4.0, 0.0], &[Addition, Multiplication], 2, 14.0),
            Some(2.0)
        );
    }

    #[test]
    fn reverse_solve_stays_in_exact_integer_range() {
        // 707274583 × 768019075 is far beyond 2^53, so the prefix cannot be exact
        let numbers = [707_274_583.0, 768_019_075.0, 0.0];
        let ops = [Multiplication, Addition];
        assert_eq!(solve_for_unknown(INT, &numbers, &ops, 2, 755_775_744.0), None);
        // a target beyond the range is rejected on the way back too
        assert_eq!(solve_for_unknown(INT, &[0.0, 999_999_999.0], &[Division], 0, 99_999_999.0), None);
        // fraction mode has no such bound
        assert!(solve_for_unknown(FRAC1, &numbers, &ops, 2, 755_775_744.0).is_some());
    }

    #[test]
    fn rounded_evaluation_allows_negatives_but_not_inexact_values() {
        assert_eq!(evaluate_rounded(INT, &[-4.0, 7.0], &[Addition]), Step::Valid(3.0));
        assert_eq!(evaluate_rounded(INT, &[7.0, 2.0], &[Division]), Step::Rejected(Rejection::InexactDivision));
        assert_eq!(evaluate_rounded(INT, &[7.0, 0.0], &[Division]), Step::Rejected(Rejection::DivisionByZero));
        assert_eq!(
            evaluate_rounded(INT, &[707_274_583.0, 768_019_075.0, -1.0], &[Multiplication, Addition]),
            Step::Rejected(Rejection::OutOfRange)
        );
        assert_eq!(evaluate_rounded(FRAC1, &[10.0, 3.0], &[Division]), Step::Valid(3.3));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        assert_eq!(solve_for_unknown(INT, &[1.0, 2.0], &[], 0, 3.0), None);
        assert_eq!(solve_for_unknown(INT, &[1.0, 2.0], &[Addition], 2, 3.0), None);
    }
}

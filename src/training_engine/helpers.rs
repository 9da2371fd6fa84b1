//! Shared builder functions used by both generation paths.
//!
//! Both the forward path and the negative-answer path end the same way: pick
//! operations, pick the hidden slot, turn numbers into display parts and text,
//! and assemble the [`Equation`]. Those steps live here so `generator` only
//! deals with sampling and validity.

use rand::Rng;
use crate::training_engine::models::{Equation, ExpressionPart, Operation, UnknownPosition, UNKNOWN_GLYPH};

/// Format an operand or result the way it is shown to the learner:
/// integers without a decimal point, fractions in shortest form.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // avoids "-0"
        "0".to_string()
    } else {
        format!("{value}")
    }
}

/// Sample `count` operations uniformly, with replacement, from `pool`.
///
/// Returns `None` when the pool is empty.
pub fn pick_operations<R: Rng>(rng: &mut R, pool: &[Operation], count: usize) -> Option<Vec<Operation>> {
    if pool.is_empty() {
        return None;
    }
    Some((0..count).map(|_| pool[rng.gen_range(0..pool.len())]).collect())
}

/// Index of the hidden operand among `total` operands.
pub fn pick_unknown_index<R: Rng>(rng: &mut R, position: UnknownPosition, total: usize) -> usize {
    match position {
        UnknownPosition::First  => 0,
        UnknownPosition::Second => 1.min(total.saturating_sub(1)),
        UnknownPosition::Random => rng.gen_range(0..total.max(1)),
    }
}

/// Alternate operand and operator parts, with the hidden operand replaced by
/// the unknown marker.
pub fn build_expression(numbers: &[f64], ops: &[Operation], unknown_index: usize) -> Vec<ExpressionPart> {
    let mut parts = Vec::with_capacity(numbers.len() * 2);
    for (i, &n) in numbers.iter().enumerate() {
        if i > 0 {
            parts.push(ExpressionPart::Operator(ops[i - 1].symbol().to_string()));
        }
        parts.push(if i == unknown_index {
            ExpressionPart::Unknown(UNKNOWN_GLYPH.to_string())
        } else {
            ExpressionPart::Number(n)
        });
    }
    parts
}

/// `"<parts joined by spaces> = <result>"`, e.g. `"12 + 🦁 = 20"`.
pub fn build_text(expression: &[ExpressionPart], result: f64) -> String {
    let lhs = expression.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(" ");
    format!("{lhs} = {}", format_number(result))
}

/// Assemble the final [`Equation`]; the answer is the hidden operand itself.
pub fn equation(numbers: Vec<f64>, ops: Vec<Operation>, unknown_index: usize, result: f64) -> Equation {
    let expression = build_expression(&numbers, &ops, unknown_index);
    let text = build_text(&expression, result);
    Equation {
        text,
        result,
        answer: numbers[unknown_index],
        expression,
        unknown_index,
        numbers,
        ops,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn numbers_format_without_trailing_zeroes() {
        assert_eq!(format_number(12.0), "12");
        assert_eq!(format_number(-4.0), "-4");
        assert_eq!(format_number(3.25), "3.25");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn text_joins_parts_and_result() {
        let eq = equation(
            vec![12.0, 8.0, 2.0],
            vec![Operation::Addition, Operation::Division],
            1,
            10.0,
        );
        assert_eq!(eq.text, "12 + 🦁 ÷ 2 = 10");
        assert_eq!(eq.answer, 8.0);
        assert_eq!(eq.expression.len(), 5);
        assert_eq!(eq.expression.iter().filter(|p| p.is_unknown()).count(), 1);
    }

    #[test]
    fn position_policy_maps_to_index() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pick_unknown_index(&mut rng, UnknownPosition::First, 5), 0);
        assert_eq!(pick_unknown_index(&mut rng, UnknownPosition::Second, 5), 1);
        assert_eq!(pick_unknown_index(&mut rng, UnknownPosition::Second, 1), 0);
        for _ in 0..100 {
            assert!(pick_unknown_index(&mut rng, UnknownPosition::Random, 4) < 4);
        }
    }

    #[test]
    fn operations_are_drawn_from_pool_only() {
        let mut rng = StdRng::seed_from_u64(2);
        assert!(pick_operations(&mut rng, &[], 3).is_none());
        let pool = [Operation::Multiplication, Operation::Division];
        let ops = pick_operations(&mut rng, &pool, 50).unwrap();
        assert_eq!(ops.len(), 50);
        assert!(ops.iter().all(|op| pool.contains(op)));
    }
}

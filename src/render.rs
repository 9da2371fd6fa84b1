use serde_json::{json, Value};
use crate::training_engine::{
    helpers::format_number,
    models::{Equation, ExpressionPart},
};

/// Build one part entry for the client view.
fn view_part(index: usize, part: &ExpressionPart) -> Value {
    match part {
        ExpressionPart::Number(n) => json!({
            "id": index,
            "kind": "number",
            "display": format_number(*n),
            "placeholder": false
        }),
        ExpressionPart::Operator(symbol) => json!({
            "id": index,
            "kind": "operator",
            "display": symbol,
            "placeholder": false
        }),
        ExpressionPart::Unknown(glyph) => json!({
            "id": index,
            "kind": "unknown",
            "display": glyph,
            "placeholder": true
        }),
    }
}

/// Map an [`Equation`] to the JSON view model the trainer screen renders.
///
/// The hidden operand's value is not included; only the placeholder is.
pub fn to_view_model(equation: &Equation) -> Value {
    let parts: Vec<Value> = equation
        .expression
        .iter()
        .enumerate()
        .map(|(i, p)| view_part(i, p))
        .collect();

    json!({
        "parts": parts,
        "equals": "=",
        "result": format_number(equation.result),
        "operandCount": equation.numbers.len(),
        "unknownIndex": equation.unknown_index
    })
}

/// Plain one-line rendering with `glyph` in place of the hidden operand.
pub fn to_console_line(equation: &Equation, glyph: &str) -> String {
    let lhs = equation
        .expression
        .iter()
        .map(|p| match p {
            ExpressionPart::Unknown(_) => glyph.to_string(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!("{lhs} = {}", format_number(equation.result))
}

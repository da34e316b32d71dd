//! Polish-notation (postfix) expression evaluation.
//!
//! Expressions are space-separated tokens evaluated on a stack:
//!
//! - a token starting with a digit is a number (`2`, `0.5`)
//! - `$k` is the `k`-th variable
//! - `+ - * /` pop two operands, `sin cos ln exp sqrt` pop one
//!
//! ```
//! use u_evolve::fitness::polish;
//!
//! // (x + 1) * 2 at x = 3
//! let y = polish::evaluate("$0 1 + 2 *", &[3.0]).unwrap();
//! assert_eq!(y, 8.0);
//! ```

use crate::error::GeneticError;

/// Evaluates `expression` with the given variable values.
///
/// Arithmetic follows IEEE rules, so division by zero gives an infinity and
/// `ln` of a negative number gives NaN; neither is an error here.
///
/// # Errors
///
/// [`GeneticError::Expression`] for an empty or malformed token, an unknown
/// function, a variable index out of range, a missing operand, or an
/// expression that does not reduce to exactly one value.
pub fn evaluate(expression: &str, variables: &[f64]) -> Result<f64, GeneticError> {
    let mut stack: Vec<f64> = Vec::new();

    for token in expression.trim().split(' ') {
        let first = token
            .chars()
            .next()
            .ok_or_else(|| GeneticError::Expression("empty token".into()))?;

        if first.is_ascii_digit() {
            let number = token
                .parse::<f64>()
                .map_err(|_| GeneticError::Expression(format!("malformed number: {token}")))?;
            stack.push(number);
        } else if let Some(index) = token.strip_prefix('$') {
            let value = index
                .parse::<usize>()
                .ok()
                .and_then(|i| variables.get(i))
                .ok_or_else(|| GeneticError::Expression(format!("unknown variable: {token}")))?;
            stack.push(*value);
        } else {
            let v = pop(&mut stack, token)?;
            let result = match token {
                "+" => pop(&mut stack, token)? + v,
                "-" => pop(&mut stack, token)? - v,
                "*" => pop(&mut stack, token)? * v,
                "/" => pop(&mut stack, token)? / v,
                "sin" => v.sin(),
                "cos" => v.cos(),
                "ln" => v.ln(),
                "exp" => v.exp(),
                "sqrt" => v.sqrt(),
                _ => {
                    return Err(GeneticError::Expression(format!(
                        "undefined function: {token}"
                    )))
                }
            };
            stack.push(result);
        }
    }

    match stack.as_slice() {
        [value] => Ok(*value),
        _ => Err(GeneticError::Expression(format!(
            "expression left {} values on the stack",
            stack.len()
        ))),
    }
}

fn pop(stack: &mut Vec<f64>, token: &str) -> Result<f64, GeneticError> {
    stack
        .pop()
        .ok_or_else(|| GeneticError::Expression(format!("missing operand for {token}")))
}

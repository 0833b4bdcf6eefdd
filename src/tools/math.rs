//! Math tools: arithmetic, roots and powers, trigonometry
//!
//! Each tool takes a free-text `expression` and pulls the numbers out of it,
//! so both "5 + 3" and "what is 5 plus 3?" work.

use std::sync::LazyLock;

use regex::Regex;

use crate::tools::tool::{Tool, ToolArgs};

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("number pattern is valid"));

fn numbers(text: &str) -> Vec<f64> {
    NUMBER
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// Whole numbers print bare, everything else with two decimals
fn format_result(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

fn expression(args: &ToolArgs) -> Result<String, String> {
    args.get("expression")
        .map(|e| e.trim().to_lowercase())
        .ok_or_else(|| "missing expression".to_string())
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(*w))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    fn detect(text: &str) -> Option<Self> {
        if contains_any(text, &["+", "plus", "add"]) {
            Some(Self::Add)
        } else if contains_any(text, &["*", "×", "times", "multipl"]) {
            Some(Self::Multiply)
        } else if contains_any(text, &["/", "÷", "divide"]) {
            Some(Self::Divide)
        } else if contains_any(text, &["-", "minus", "subtract"]) {
            Some(Self::Subtract)
        } else {
            None
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }
}

/// Two-operand arithmetic
pub fn calculator() -> Tool {
    Tool::builder(
        "calculator",
        "Performs basic arithmetic on two numbers: addition, subtraction, multiplication, division",
    )
    .param("expression", "Math expression such as '5 + 3' or '8 divided by 4'")
    .keywords([
        "+", "*", "/", "×", "÷", "-", "plus", "minus", "times", "multiply", "multiplied",
        "divide", "divided", "add", "subtract",
    ])
    .handler(|args| {
        let expr = expression(args)?;
        let nums = numbers(&expr);
        if nums.len() < 2 {
            return Err("need two numbers".to_string());
        }
        let (a, b) = (nums[0], nums[1]);

        let op = Operator::detect(&expr)
            .ok_or_else(|| "no supported operator (+, -, *, /)".to_string())?;

        let result = match op {
            Operator::Add => a + b,
            Operator::Subtract => a - b,
            Operator::Multiply => a * b,
            Operator::Divide => {
                if b == 0.0 {
                    return Ok("Error: cannot divide by zero".to_string());
                }
                a / b
            }
        };

        Ok(format!("{} {} {} = {}", a, op.symbol(), b, format_result(result)))
    })
}

/// Square roots and powers
pub fn advanced_math() -> Tool {
    Tool::builder(
        "advanced_math",
        "Computes square roots and powers",
    )
    .param("expression", "Operation such as 'square root of 16' or '2 power 3'")
    .keywords(["square root", "sqrt", "power", "^", "squared", "cubed", "exponent"])
    .handler(|args| {
        let expr = expression(args)?;
        let nums = numbers(&expr);

        if expr.contains("square root") || expr.contains("sqrt") {
            let n = *nums.first().ok_or_else(|| "no number to take the root of".to_string())?;
            return Ok(format!("√{} = {}", n, format_result(n.sqrt())));
        }

        if expr.contains("squared") {
            let n = *nums.first().ok_or_else(|| "no number to square".to_string())?;
            return Ok(format!("{}^2 = {}", n, format_result(n.powi(2))));
        }

        if expr.contains("cubed") {
            let n = *nums.first().ok_or_else(|| "no number to cube".to_string())?;
            return Ok(format!("{}^3 = {}", n, format_result(n.powi(3))));
        }

        if expr.contains("power") || expr.contains('^') || expr.contains("exponent") {
            if nums.len() < 2 {
                return Err("need a base and an exponent".to_string());
            }
            let (base, exp) = (nums[0], nums[1]);
            return Ok(format!("{}^{} = {}", base, exp, format_result(base.powf(exp))));
        }

        Err("unsupported operation, try 'square root of 16' or '2 power 3'".to_string())
    })
}

/// sin, cos and tan of an angle in degrees
pub fn trigonometry() -> Tool {
    Tool::builder(
        "trigonometry",
        "Calculates sin, cos or tan of an angle given in degrees",
    )
    .param("expression", "Expression such as 'sin of 30' or 'cos 45'")
    .keywords(["sin", "cos", "tan", "sine", "cosine", "tangent"])
    .handler(|args| {
        let expr = expression(args)?;
        let angle = *numbers(&expr)
            .first()
            .ok_or_else(|| "no angle found".to_string())?;
        let radians = angle.to_radians();

        // "cos"/"tan" before "sin" so "cosine" is never read as "sine"
        let (name, value) = if expr.contains("cos") {
            ("cos", radians.cos())
        } else if expr.contains("tan") {
            ("tan", radians.tan())
        } else if expr.contains("sin") {
            ("sin", radians.sin())
        } else {
            return Err("unsupported function, try sin, cos or tan".to_string());
        };

        Ok(format!("{}({}°) = {:.2}", name, angle, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ParleyError;

    fn run(tool: &Tool, expression: &str) -> crate::core::Result<String> {
        let mut args = ToolArgs::new();
        args.insert("expression".to_string(), expression.to_string());
        tool.invoke(&args)
    }

    #[test]
    fn test_calculator_symbols_and_words() {
        let calc = calculator();
        assert_eq!(run(&calc, "5+3").unwrap(), "5 + 3 = 8");
        assert_eq!(run(&calc, "What is 5 + 3?").unwrap(), "5 + 3 = 8");
        assert_eq!(run(&calc, "8 plus 4").unwrap(), "8 + 4 = 12");
        assert_eq!(run(&calc, "10 * 2").unwrap(), "10 * 2 = 20");
        assert_eq!(run(&calc, "9 minus 4").unwrap(), "9 - 4 = 5");
        assert_eq!(run(&calc, "1 / 3").unwrap(), "1 / 3 = 0.33");
        assert_eq!(run(&calc, "2.5 times 2").unwrap(), "2.5 * 2 = 5");
    }

    #[test]
    fn test_calculator_division_by_zero() {
        assert_eq!(
            run(&calculator(), "4 / 0").unwrap(),
            "Error: cannot divide by zero"
        );
    }

    #[test]
    fn test_calculator_rejects_single_number() {
        let err = run(&calculator(), "what is 5").unwrap_err();
        assert!(matches!(err, ParleyError::InvalidToolArguments { .. }));
    }

    #[test]
    fn test_advanced_math() {
        let tool = advanced_math();
        assert_eq!(run(&tool, "square root of 16").unwrap(), "√16 = 4");
        assert_eq!(run(&tool, "2 to the power of 3").unwrap(), "2^3 = 8");
        assert_eq!(run(&tool, "7 squared").unwrap(), "7^2 = 49");
        assert!(run(&tool, "log of 10").is_err());
    }

    #[test]
    fn test_trigonometry() {
        let tool = trigonometry();
        assert_eq!(run(&tool, "sin of 30").unwrap(), "sin(30°) = 0.50");
        assert_eq!(run(&tool, "cosine of 60").unwrap(), "cos(60°) = 0.50");
        assert_eq!(run(&tool, "tan 45").unwrap(), "tan(45°) = 1.00");
        assert!(run(&tool, "sin").is_err());
    }

    #[test]
    fn test_keyword_routing_between_math_tools() {
        assert!(calculator().matches("What is 5 + 3?"));
        assert!(!calculator().matches("What is the sine of 30?"));
        assert!(trigonometry().matches("What is the sine of 30?"));
        assert!(advanced_math().matches("square root of 16"));
        assert!(!trigonometry().matches("square root of 16"));
    }
}

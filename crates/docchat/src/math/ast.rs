//! Symbolic evaluation stage
//!
//! Tokenizes and parses an expression into an AST, then evaluates it with
//! exact integer/rational arithmetic wherever possible, falling back to
//! floating point only for functions and non-integer powers. Results are
//! reported at 10 significant digits in float form.

use super::MathError;

const MAX_DEPTH: usize = 100;
const MAX_EXACT_EXPONENT: i128 = 4096;

/// Binary and unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MathOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Neg,
}

/// Built-in functions; `Log` is base 10
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MathFn {
    Sqrt,
    Log,
    Sin,
    Cos,
    Tan,
}

impl MathFn {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "sqrt" => Some(Self::Sqrt),
            "log" => Some(Self::Log),
            "sin" => Some(Self::Sin),
            "cos" => Some(Self::Cos),
            "tan" => Some(Self::Tan),
            _ => None,
        }
    }

    fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sqrt => x.sqrt(),
            Self::Log => x.log10(),
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
        }
    }
}

/// Expression tree
#[derive(Debug, Clone)]
enum Expr {
    Number { num: i128, den: i128 },
    BinOp {
        op: MathOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    UnaryOp {
        op: MathOp,
        operand: Box<Expr>,
    },
    Function { func: MathFn, arg: Box<Expr> },
}

/// Evaluated value: exact rational while possible, f64 afterwards
#[derive(Debug, Clone, Copy)]
enum Value {
    Exact { num: i128, den: i128 },
    Approx(f64),
}

impl Value {
    fn to_f64(self) -> f64 {
        match self {
            Self::Exact { num, den } => num as f64 / den as f64,
            Self::Approx(v) => v,
        }
    }

    fn exact(num: i128, den: i128) -> Result<Self, MathError> {
        if den == 0 {
            return Err(MathError::DivisionByZero);
        }
        let sign = if (num < 0) != (den < 0) && num != 0 { -1 } else { 1 };
        let (num, den) = (num.abs(), den.abs());
        let divisor = gcd(num, den);
        Ok(Self::Exact {
            num: sign * num / divisor,
            den: den / divisor,
        })
    }

    /// Integer exponent when this value is an exact integer
    fn as_integer(self) -> Option<i128> {
        match self {
            Self::Exact { num, den } if den == 1 => Some(num),
            _ => None,
        }
    }
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number { num: i128, den: i128 },
    Op(char),
    LParen,
    RParen,
    Func(MathFn),
}

fn tokenize(input: &str) -> Result<Vec<Token>, MathError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '0'..='9' | '.' => {
                let mut whole: i128 = 0;
                let mut frac: i128 = 0;
                let mut den: i128 = 1;
                let mut seen_dot = false;
                let mut seen_digit = false;

                while let Some(&d) = chars.peek() {
                    match d {
                        '0'..='9' => {
                            let digit = (d as u8 - b'0') as i128;
                            if seen_dot {
                                frac = frac
                                    .checked_mul(10)
                                    .and_then(|f| f.checked_add(digit))
                                    .ok_or(MathError::Overflow)?;
                                den = den.checked_mul(10).ok_or(MathError::Overflow)?;
                            } else {
                                whole = whole
                                    .checked_mul(10)
                                    .and_then(|w| w.checked_add(digit))
                                    .ok_or(MathError::Overflow)?;
                            }
                            seen_digit = true;
                            chars.next();
                        }
                        '.' => {
                            if seen_dot {
                                return Err(MathError::Parse(
                                    "multiple decimal points in number".to_string(),
                                ));
                            }
                            seen_dot = true;
                            chars.next();
                        }
                        _ => break,
                    }
                }

                if !seen_digit {
                    return Err(MathError::Parse("bare decimal point".to_string()));
                }

                let num = whole
                    .checked_mul(den)
                    .and_then(|w| w.checked_add(frac))
                    .ok_or(MathError::Overflow)?;
                tokens.push(Token::Number { num, den });
            }
            '+' | '-' | '*' | '/' | '^' => {
                tokens.push(Token::Op(c));
                chars.next();
            }
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            c if c.is_alphabetic() => {
                let mut name = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_alphabetic() {
                        name.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let func = MathFn::from_name(&name)
                    .ok_or_else(|| MathError::Parse(format!("unknown function '{}'", name)))?;
                tokens.push(Token::Func(func));
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            other => {
                return Err(MathError::Parse(format!("unexpected character '{}'", other)));
            }
        }
    }

    if tokens.is_empty() {
        return Err(MathError::Parse("empty expression".to_string()));
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// expr := term (('+' | '-') term)*
    fn parse_expr(&mut self, depth: usize) -> Result<Expr, MathError> {
        if depth > MAX_DEPTH {
            return Err(MathError::TooDeep);
        }

        let mut left = self.parse_term(depth + 1)?;

        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek() {
            let op = if *op == '+' { MathOp::Add } else { MathOp::Sub };
            self.advance();
            let right = self.parse_term(depth + 1)?;
            left = Expr::BinOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// term := factor (('*' | '/') factor)*
    fn parse_term(&mut self, depth: usize) -> Result<Expr, MathError> {
        if depth > MAX_DEPTH {
            return Err(MathError::TooDeep);
        }

        let mut left = self.parse_factor(depth + 1)?;

        while let Some(Token::Op(op @ ('*' | '/'))) = self.peek() {
            let op = if *op == '*' { MathOp::Mul } else { MathOp::Div };
            self.advance();
            let right = self.parse_factor(depth + 1)?;
            left = Expr::BinOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// factor := ('+' | '-') factor | primary ('^' factor)?
    ///
    /// Exponentiation is right-associative and binds tighter than unary
    /// minus, so -2^2 evaluates to -4.
    fn parse_factor(&mut self, depth: usize) -> Result<Expr, MathError> {
        if depth > MAX_DEPTH {
            return Err(MathError::TooDeep);
        }

        match self.peek() {
            Some(Token::Op('-')) => {
                self.advance();
                let operand = self.parse_factor(depth + 1)?;
                return Ok(Expr::UnaryOp {
                    op: MathOp::Neg,
                    operand: Box::new(operand),
                });
            }
            Some(Token::Op('+')) => {
                self.advance();
                return self.parse_factor(depth + 1);
            }
            _ => {}
        }

        let base = self.parse_primary(depth + 1)?;

        if let Some(Token::Op('^')) = self.peek() {
            self.advance();
            let exponent = self.parse_factor(depth + 1)?;
            return Ok(Expr::BinOp {
                op: MathOp::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }

        Ok(base)
    }

    /// primary := Number | Func '(' expr ')' | '(' expr ')'
    fn parse_primary(&mut self, depth: usize) -> Result<Expr, MathError> {
        if depth > MAX_DEPTH {
            return Err(MathError::TooDeep);
        }

        match self.advance() {
            Some(Token::Number { num, den }) => Ok(Expr::Number { num, den }),
            Some(Token::LParen) => {
                let inner = self.parse_expr(depth + 1)?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(MathError::Parse("unbalanced parentheses".to_string())),
                }
            }
            Some(Token::Func(func)) => {
                match self.advance() {
                    Some(Token::LParen) => {}
                    _ => {
                        return Err(MathError::Parse(
                            "function call requires parentheses".to_string(),
                        ))
                    }
                }
                let arg = self.parse_expr(depth + 1)?;
                match self.advance() {
                    Some(Token::RParen) => Ok(Expr::Function {
                        func,
                        arg: Box::new(arg),
                    }),
                    _ => Err(MathError::Parse("unbalanced parentheses".to_string())),
                }
            }
            other => Err(MathError::Parse(format!("unexpected token {:?}", other))),
        }
    }
}

fn eval(expr: &Expr, depth: usize) -> Result<Value, MathError> {
    if depth > MAX_DEPTH {
        return Err(MathError::TooDeep);
    }

    match expr {
        Expr::Number { num, den } => Value::exact(*num, *den),
        Expr::UnaryOp { op: MathOp::Neg, operand } => {
            match eval(operand, depth + 1)? {
                Value::Exact { num, den } => Value::exact(-num, den),
                Value::Approx(v) => Ok(Value::Approx(-v)),
            }
        }
        Expr::UnaryOp { op, .. } => {
            Err(MathError::Parse(format!("invalid unary operator {:?}", op)))
        }
        Expr::Function { func, arg } => {
            let arg = eval(arg, depth + 1)?;
            Ok(Value::Approx(func.apply(arg.to_f64())))
        }
        Expr::BinOp { op, left, right } => {
            let left = eval(left, depth + 1)?;
            let right = eval(right, depth + 1)?;
            apply_binop(*op, left, right)
        }
    }
}

fn apply_binop(op: MathOp, left: Value, right: Value) -> Result<Value, MathError> {
    use Value::{Approx, Exact};

    match (op, left, right) {
        (MathOp::Add, Exact { num: a, den: b }, Exact { num: c, den: d }) => {
            let num = a
                .checked_mul(d)
                .and_then(|ad| c.checked_mul(b).and_then(|cb| ad.checked_add(cb)))
                .ok_or(MathError::Overflow)?;
            let den = b.checked_mul(d).ok_or(MathError::Overflow)?;
            Value::exact(num, den)
        }
        (MathOp::Sub, Exact { num: a, den: b }, Exact { num: c, den: d }) => {
            let num = a
                .checked_mul(d)
                .and_then(|ad| c.checked_mul(b).and_then(|cb| ad.checked_sub(cb)))
                .ok_or(MathError::Overflow)?;
            let den = b.checked_mul(d).ok_or(MathError::Overflow)?;
            Value::exact(num, den)
        }
        (MathOp::Mul, Exact { num: a, den: b }, Exact { num: c, den: d }) => {
            let num = a.checked_mul(c).ok_or(MathError::Overflow)?;
            let den = b.checked_mul(d).ok_or(MathError::Overflow)?;
            Value::exact(num, den)
        }
        (MathOp::Div, Exact { num: a, den: b }, Exact { num: c, den: d }) => {
            if c == 0 {
                return Err(MathError::DivisionByZero);
            }
            let num = a.checked_mul(d).ok_or(MathError::Overflow)?;
            let den = b.checked_mul(c).ok_or(MathError::Overflow)?;
            Value::exact(num, den)
        }
        (MathOp::Pow, base, exponent) => apply_pow(base, exponent),
        (MathOp::Add, l, r) => Ok(Approx(l.to_f64() + r.to_f64())),
        (MathOp::Sub, l, r) => Ok(Approx(l.to_f64() - r.to_f64())),
        (MathOp::Mul, l, r) => Ok(Approx(l.to_f64() * r.to_f64())),
        (MathOp::Div, l, r) => Ok(Approx(l.to_f64() / r.to_f64())),
        (op, _, _) => Err(MathError::Parse(format!("invalid binary operator {:?}", op))),
    }
}

fn apply_pow(base: Value, exponent: Value) -> Result<Value, MathError> {
    // Exact power only for integer exponents of bounded magnitude
    if let (Value::Exact { num, den }, Some(exp)) = (base, exponent.as_integer()) {
        if exp.abs() <= MAX_EXACT_EXPONENT {
            let magnitude = exp.unsigned_abs() as u32;
            let pow_num = num.checked_pow(magnitude).ok_or(MathError::Overflow)?;
            let pow_den = den.checked_pow(magnitude).ok_or(MathError::Overflow)?;

            return if exp >= 0 {
                Value::exact(pow_num, pow_den)
            } else {
                if pow_num == 0 {
                    return Err(MathError::DivisionByZero);
                }
                Value::exact(pow_den, pow_num)
            };
        }
    }

    Ok(Value::Approx(base.to_f64().powf(exponent.to_f64())))
}

/// Round to the given number of significant digits
fn round_significant(value: f64, digits: i32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let magnitude = value.abs().log10().floor() as i32;
    let factor = 10f64.powi(digits - 1 - magnitude);
    if !factor.is_finite() || factor == 0.0 {
        return value;
    }
    (value * factor).round() / factor
}

/// Evaluate an expression symbolically, reporting 10 significant digits
pub(super) fn evaluate(expression: &str) -> Result<String, MathError> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser { tokens, pos: 0 };

    let expr = parser.parse_expr(0)?;
    if parser.pos != parser.tokens.len() {
        return Err(MathError::Parse("unexpected trailing input".to_string()));
    }

    let value = eval(&expr, 0)?;
    let approx = round_significant(value.to_f64(), 10);
    if !approx.is_finite() {
        return Err(MathError::NonFinite);
    }

    Ok(format!("{:?}", approx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(evaluate("2+3").unwrap(), "5.0");
        assert_eq!(evaluate("10-4").unwrap(), "6.0");
        assert_eq!(evaluate("3*4").unwrap(), "12.0");
        assert_eq!(evaluate("10/2").unwrap(), "5.0");
    }

    #[test]
    fn test_power() {
        assert_eq!(evaluate("2^3").unwrap(), "8.0");
        assert_eq!(evaluate("2^10").unwrap(), "1024.0");
        assert_eq!(evaluate("2^-2").unwrap(), "0.25");
    }

    #[test]
    fn test_power_right_associative() {
        // 2^(3^2) = 512, not (2^3)^2 = 64
        assert_eq!(evaluate("2^3^2").unwrap(), "512.0");
    }

    #[test]
    fn test_unary_minus_binds_looser_than_power() {
        assert_eq!(evaluate("-2^2").unwrap(), "-4.0");
        assert_eq!(evaluate("(-2)^2").unwrap(), "4.0");
    }

    #[test]
    fn test_precedence() {
        assert_eq!(evaluate("2+3*4").unwrap(), "14.0");
        assert_eq!(evaluate("(2+3)*4").unwrap(), "20.0");
    }

    #[test]
    fn test_exact_fraction_at_ten_digits() {
        assert_eq!(evaluate("1/3").unwrap(), "0.3333333333");
        assert_eq!(evaluate("2/4").unwrap(), "0.5");
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(evaluate("sqrt(16)").unwrap(), "4.0");
        assert_eq!(evaluate("sqrt(2)").unwrap(), "1.414213562");
    }

    #[test]
    fn test_log_is_base_ten() {
        assert_eq!(evaluate("log(100)").unwrap(), "2.0");
        assert_ne!(evaluate("log(2.718281828)").unwrap(), "1.0");
    }

    #[test]
    fn test_trig() {
        assert_eq!(evaluate("sin(0)").unwrap(), "0.0");
        assert_eq!(evaluate("cos(0)").unwrap(), "1.0");
    }

    #[test]
    fn test_decimals() {
        assert_eq!(evaluate("3.14*2").unwrap(), "6.28");
        assert_eq!(evaluate("0.1+0.2").unwrap(), "0.3");
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(evaluate("1/0"), Err(MathError::DivisionByZero)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(evaluate("").is_err());
        assert!(evaluate("2+").is_err());
        assert!(evaluate("(2+3").is_err());
        assert!(evaluate("2..5").is_err());
        assert!(evaluate("frob(3)").is_err());
    }

    #[test]
    fn test_sqrt_of_negative_fails() {
        assert!(matches!(
            evaluate("sqrt(0-4)"),
            Err(MathError::NonFinite)
        ));
    }
}

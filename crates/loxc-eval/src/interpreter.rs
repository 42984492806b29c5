use loxc_par::{BinOp, Expr, Literal, ParseEvent, UnOp};
use loxc_util::Handler;

use crate::error::{RuntimeError, RuntimeErrorAt};
use crate::scope::{ExecutionContext, VariableHandle};
use crate::value::Value;

/// Best-effort source line for an expression node, used to attribute a
/// runtime error to a location. Leaves with no token of their own (plain
/// literals, an empty group) fall back to `0`; every error variant that can
/// actually surface from those positions is either unreachable or reported
/// against an enclosing node that does carry a line.
fn line_of(expr: &Expr) -> u32 {
    match expr {
        Expr::Literal(_) => 0,
        Expr::Grouping(Some(inner)) => line_of(inner),
        Expr::Grouping(None) => 0,
        Expr::Identifier(tok) => tok.line,
        Expr::Unary { op_token, .. } => op_token.line,
        Expr::Binary { op_token, .. } => op_token.line,
        Expr::Assign { target, .. } => line_of(target),
        Expr::Print(tok, _) => tok.line,
        Expr::Var(tok, _) => tok.line,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Nil, Value::Nil) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (l, r) if l.is_number() && r.is_number() => l.as_f64() == r.as_f64(),
        _ => false,
    }
}

fn numeric_add(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(x + y),
        _ => Value::Float(a.as_f64().unwrap_or(0.0) + b.as_f64().unwrap_or(0.0)),
    }
}

fn numeric_sub(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(x - y),
        _ => Value::Float(a.as_f64().unwrap_or(0.0) - b.as_f64().unwrap_or(0.0)),
    }
}

fn numeric_mul(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(x * y),
        _ => Value::Float(a.as_f64().unwrap_or(0.0) * b.as_f64().unwrap_or(0.0)),
    }
}

/// `left / right` under the custom contract: an evenly-divisible pair
/// yields an integer quotient, anything else yields a float quotient. Both
/// operands are coerced through `f64` to decide, matching the grounding
/// source's observable numeric behavior rather than Rust's integer `/`.
fn numeric_div(a: &Value, b: &Value) -> Value {
    let l = a.as_f64().unwrap_or(0.0);
    let r = b.as_f64().unwrap_or(0.0);
    let q = l / r;
    if l % r == 0.0 {
        Value::Int(q as i64)
    } else {
        Value::Float(q)
    }
}

/// Walks the expression tree produced by `loxc_par::Parser`, driving an
/// [`ExecutionContext`] in lockstep with the parser's `PushScope`/
/// `PopScope` events.
pub struct Interpreter<'a> {
    ctx: ExecutionContext,
    handler: &'a Handler,
}

impl<'a> Interpreter<'a> {
    pub fn new(handler: &'a Handler) -> Self {
        Self { ctx: ExecutionContext::new(), handler }
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    /// Consumes a stream of parser events, evaluating each statement in
    /// order. Stops at the first runtime error without evaluating the
    /// remaining events, matching the single top-level abort policy.
    pub fn run<I>(&mut self, events: I) -> Result<Vec<Value>, RuntimeErrorAt>
    where
        I: IntoIterator<Item = ParseEvent>,
    {
        let mut results = Vec::new();
        for event in events {
            match event {
                ParseEvent::PushScope => self.ctx.push(),
                ParseEvent::PopScope => {
                    self.ctx.pop().map_err(|error| RuntimeErrorAt::new(error, 0))?;
                }
                ParseEvent::Statement(expr) => {
                    tracing::trace!("evaluating statement");
                    results.push(self.evaluate(&expr)?);
                }
            }
        }
        Ok(results)
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeErrorAt> {
        match expr {
            Expr::Literal(lit) => Ok(self.evaluate_literal(lit)),
            Expr::Grouping(Some(inner)) => self.evaluate(inner),
            Expr::Grouping(None) => Ok(Value::Nil),
            Expr::Identifier(tok) => {
                let handle = self
                    .ctx
                    .current()
                    .lookup(loxc_util::Symbol::intern(&tok.lexeme))
                    .ok_or_else(|| {
                        RuntimeErrorAt::new(
                            RuntimeError::UndefinedVariable(tok.lexeme.clone()),
                            tok.line,
                        )
                    })?;
                Ok(handle.borrow().value.clone())
            }
            Expr::Unary { op, op_token, right } => self.evaluate_unary(*op, op_token.line, right),
            Expr::Binary { op, op_token, left, right } => {
                self.evaluate_binary(*op, op_token.line, left, right)
            }
            Expr::Assign { target, value } => self.evaluate_assign(target, value),
            Expr::Print(_, inner) => {
                let value = self.evaluate(inner)?;
                println!("{value}");
                Ok(value)
            }
            Expr::Var(tok, inner) => self.evaluate_var(tok.line, inner),
        }
    }

    fn evaluate_literal(&self, lit: &Literal) -> Value {
        match lit {
            Literal::Number(lexeme) => {
                if lexeme.contains('.') {
                    Value::Float(lexeme.parse().unwrap_or(0.0))
                } else {
                    Value::Int(lexeme.parse().unwrap_or(0))
                }
            }
            Literal::String(s) => Value::Str(s.as_str().into()),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Nil => Value::Nil,
        }
    }

    fn evaluate_unary(&mut self, op: UnOp, line: u32, right: &Expr) -> Result<Value, RuntimeErrorAt> {
        let value = self.evaluate(right)?;
        match op {
            UnOp::Neg => match value {
                Value::Int(i) => Ok(Value::Int(-i)),
                Value::Float(f) => Ok(Value::Float(-f)),
                _ => Err(RuntimeErrorAt::new(RuntimeError::OperandMustBeNumber, line)),
            },
            UnOp::Not => Ok(Value::Bool(!value.is_truthy())),
        }
    }

    fn evaluate_binary(
        &mut self,
        op: BinOp,
        line: u32,
        left: &Expr,
        right: &Expr,
    ) -> Result<Value, RuntimeErrorAt> {
        // `and`/`or` short-circuit and must not evaluate the right operand
        // unconditionally.
        if matches!(op, BinOp::And | BinOp::Or) {
            let l = self.evaluate(left)?;
            return match (op, l.is_truthy()) {
                (BinOp::And, false) => Ok(l),
                (BinOp::Or, true) => Ok(l),
                _ => self.evaluate(right),
            };
        }

        let l = self.evaluate(left)?;
        let r = self.evaluate(right)?;
        match op {
            BinOp::Add => match (&l, &r) {
                (a, b) if a.is_number() && b.is_number() => Ok(numeric_add(a, b)),
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}").into())),
                (a, b) if a.is_number() != b.is_number() => {
                    Err(RuntimeErrorAt::new(RuntimeError::OperandsMismatch, line))
                }
                _ => Err(RuntimeErrorAt::new(RuntimeError::OperandMustBeNumber, line)),
            },
            BinOp::Sub => numeric_binop(&l, &r, line, numeric_sub),
            BinOp::Mul => numeric_binop(&l, &r, line, numeric_mul),
            BinOp::Div => numeric_binop(&l, &r, line, numeric_div),
            BinOp::Lt => numeric_cmp(&l, &r, line, |a, b| a < b),
            BinOp::Le => numeric_cmp(&l, &r, line, |a, b| a <= b),
            BinOp::Gt => numeric_cmp(&l, &r, line, |a, b| a > b),
            BinOp::Ge => numeric_cmp(&l, &r, line, |a, b| a >= b),
            BinOp::Eq => Ok(Value::Bool(values_equal(&l, &r))),
            BinOp::Ne => Ok(Value::Bool(!values_equal(&l, &r))),
            BinOp::And | BinOp::Or => unreachable!("short-circuit handled above"),
        }
    }

    fn evaluate_assign(&mut self, target: &Expr, value: &Expr) -> Result<Value, RuntimeErrorAt> {
        let handle = self.left_value(target)?;
        let evaluated = self.evaluate(value)?;
        handle.borrow_mut().value = evaluated.clone();
        Ok(evaluated)
    }

    /// `var NAME` (no initializer): declares `NAME` as `nil` and returns
    /// `nil`. `var NAME = EXPR` is represented as `Var(keyword,
    /// Assign{target: Identifier, value: EXPR})`: the initializer is
    /// evaluated and the fresh variable is declared with that value.
    /// Anything else nested under `var` is malformed.
    fn evaluate_var(&mut self, line: u32, inner: &Expr) -> Result<Value, RuntimeErrorAt> {
        match inner {
            Expr::Identifier(tok) => {
                self.ctx.current().create(loxc_util::Symbol::intern(&tok.lexeme));
                Ok(Value::Nil)
            }
            Expr::Assign { target, value } => match target.as_ref() {
                Expr::Identifier(tok) => {
                    let evaluated = self.evaluate(value)?;
                    let handle = self.ctx.current().create(loxc_util::Symbol::intern(&tok.lexeme));
                    handle.borrow_mut().value = evaluated.clone();
                    Ok(evaluated)
                }
                _ => Err(RuntimeErrorAt::new(RuntimeError::General, line)),
            },
            _ => Err(RuntimeErrorAt::new(RuntimeError::General, line)),
        }
    }

    /// Resolves an assignment target to the variable it binds to. An
    /// `Identifier` target must already exist; a `Var` target declares (or
    /// re-declares) in the current scope.
    fn left_value(&mut self, expr: &Expr) -> Result<VariableHandle, RuntimeErrorAt> {
        match expr {
            Expr::Identifier(tok) => self
                .ctx
                .current()
                .lookup(loxc_util::Symbol::intern(&tok.lexeme))
                .ok_or_else(|| {
                    RuntimeErrorAt::new(RuntimeError::UndefinedVariable(tok.lexeme.clone()), tok.line)
                }),
            Expr::Var(tok, inner) => match inner.as_ref() {
                Expr::Identifier(name) => {
                    Ok(self.ctx.current().create(loxc_util::Symbol::intern(&name.lexeme)))
                }
                Expr::Assign { target, .. } => match target.as_ref() {
                    Expr::Identifier(name) => {
                        Ok(self.ctx.current().create(loxc_util::Symbol::intern(&name.lexeme)))
                    }
                    _ => Err(RuntimeErrorAt::new(RuntimeError::General, tok.line)),
                },
                _ => Err(RuntimeErrorAt::new(RuntimeError::General, tok.line)),
            },
            other => Err(RuntimeErrorAt::new(RuntimeError::General, line_of(other))),
        }
    }
}

fn numeric_binop(
    l: &Value,
    r: &Value,
    line: u32,
    f: impl Fn(&Value, &Value) -> Value,
) -> Result<Value, RuntimeErrorAt> {
    if l.is_number() && r.is_number() {
        Ok(f(l, r))
    } else {
        Err(RuntimeErrorAt::new(RuntimeError::OperandMustBeNumber, line))
    }
}

fn numeric_cmp(
    l: &Value,
    r: &Value,
    line: u32,
    f: impl Fn(f64, f64) -> bool,
) -> Result<Value, RuntimeErrorAt> {
    match (l.as_f64(), r.as_f64()) {
        (Some(a), Some(b)) => Ok(Value::Bool(f(a, b))),
        _ => Err(RuntimeErrorAt::new(RuntimeError::OperandMustBeNumber, line)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loxc_lex::Lexer;
    use loxc_par::Parser;
    use loxc_util::Handler;

    fn run_source(source: &str) -> (Vec<Value>, Handler) {
        let handler = Handler::new();
        let tokens: Vec<_> = Lexer::new(source, &handler).collect();
        let events = Parser::new(tokens, &handler).parse();
        let mut interp = Interpreter::new(&handler);
        let values = interp.run(events).expect("evaluation should succeed");
        (values, handler)
    }

    #[test]
    fn arithmetic_precedence_matches_math() {
        let (values, _) = run_source("1 + 2 * 3;");
        assert_eq!(values, vec![Value::Int(7)]);
    }

    #[test]
    fn division_is_integer_when_evenly_divisible() {
        let (values, _) = run_source("6 / 3;");
        assert_eq!(values, vec![Value::Int(2)]);
    }

    #[test]
    fn division_is_float_otherwise() {
        let (values, _) = run_source("7 / 2;");
        assert_eq!(values, vec![Value::Float(3.5)]);
    }

    #[test]
    fn string_concatenation_via_plus() {
        let (values, _) = run_source(r#""a" + "b";"#);
        assert_eq!(values, vec![Value::Str("ab".into())]);
    }

    #[test]
    fn mixed_string_and_number_is_a_mismatch_error() {
        let handler = Handler::new();
        let tokens: Vec<_> = Lexer::new(r#""a" + 1;"#, &handler).collect();
        let events = Parser::new(tokens, &handler).parse();
        let mut interp = Interpreter::new(&handler);
        let err = interp.run(events).unwrap_err();
        assert_eq!(err.error, RuntimeError::OperandsMismatch);
    }

    #[test]
    fn var_declaration_and_lookup() {
        let (values, _) = run_source("var x = 2; x + 1;");
        assert_eq!(values, vec![Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn bare_var_declaration_is_nil() {
        let (values, _) = run_source("var x; x;");
        assert_eq!(values, vec![Value::Nil, Value::Nil]);
    }

    #[test]
    fn assigning_undeclared_identifier_is_undefined_variable() {
        let handler = Handler::new();
        let tokens: Vec<_> = Lexer::new("x = 1;", &handler).collect();
        let events = Parser::new(tokens, &handler).parse();
        let mut interp = Interpreter::new(&handler);
        let err = interp.run(events).unwrap_err();
        assert_eq!(err.error, RuntimeError::UndefinedVariable("x".to_string()));
    }

    #[test]
    fn chained_assignment_is_right_associative() {
        let (values, _) = run_source("var x = 1; var y = x = 2; x + y;");
        assert_eq!(values, vec![Value::Int(1), Value::Int(2), Value::Int(4)]);
    }

    #[test]
    fn and_or_short_circuit_and_return_operand_values() {
        let (values, _) = run_source(r#"nil and 1; 2 or 3;"#);
        assert_eq!(values, vec![Value::Nil, Value::Int(2)]);
    }

    #[test]
    fn shadowing_in_block_is_undone_on_exit() {
        let (values, _) = run_source("var x = 1; { var x = 2; x; } x;");
        assert_eq!(values, vec![Value::Int(1), Value::Int(2), Value::Int(1)]);
    }

    #[test]
    fn equality_treats_int_and_float_as_numerically_equal() {
        let (values, _) = run_source("2 == 2.0;");
        assert_eq!(values, vec![Value::Bool(true)]);
    }

    proptest::proptest! {
        /// Well-typed integer addition/multiplication evaluates to exactly
        /// the corresponding math expression, for any two small integers.
        #[test]
        fn arithmetic_matches_the_math_it_denotes(a in 0i64..10_000, b in 0i64..10_000) {
            let (values, _) = run_source(&format!("{a} + {b} * 2;"));
            proptest::prop_assert_eq!(values, vec![Value::Int(a + b * 2)]);
        }
    }
}

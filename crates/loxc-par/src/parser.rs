use loxc_lex::{Token, TokenKind};
use loxc_util::{Handler, Phase};

use crate::ast::{BinOp, Expr, Literal, UnOp};

/// Binding-power table driving the Pratt parser below. The levels mirror
/// the precedence table in the top-level design: higher binds tighter.
/// This is the binding-power encoding of the same table the grounding
/// source expresses as per-class `@precedence(...)` decorators and an
/// in-tree rotation; Pratt parsing over this table produces identical
/// trees for every input.
pub mod bp {
    pub const MIN: u8 = 0;
    pub const EQUALITY: u8 = 1;
    pub const COMPARISON: u8 = 2;
    pub const ADDITIVE: u8 = 3;
    pub const MULTIPLICATIVE: u8 = 4;
    pub const UNARY: u8 = 5;
}

fn infix_binding_power(kind: TokenKind) -> Option<(BinOp, u8, bool /* right_assoc */)> {
    Some(match kind {
        TokenKind::And => (BinOp::And, bp::MIN, false),
        TokenKind::Or => (BinOp::Or, bp::MIN, false),
        TokenKind::EqualEqual => (BinOp::Eq, bp::EQUALITY, false),
        TokenKind::BangEqual => (BinOp::Ne, bp::EQUALITY, false),
        TokenKind::Less => (BinOp::Lt, bp::COMPARISON, false),
        TokenKind::LessEqual => (BinOp::Le, bp::COMPARISON, false),
        TokenKind::Greater => (BinOp::Gt, bp::COMPARISON, false),
        TokenKind::GreaterEqual => (BinOp::Ge, bp::COMPARISON, false),
        TokenKind::Plus => (BinOp::Add, bp::ADDITIVE, false),
        TokenKind::Minus => (BinOp::Sub, bp::ADDITIVE, false),
        TokenKind::Star => (BinOp::Mul, bp::MULTIPLICATIVE, false),
        TokenKind::Slash => (BinOp::Div, bp::MULTIPLICATIVE, false),
        _ => return None,
    })
}

/// One unit of parser output. Brace handling is reported as scope events
/// rather than as `Expr` nodes so this crate never needs to know about the
/// runtime scope representation that lives in `loxc-eval`; the caller (the
/// interpreter) pushes/pops its own scope stack in lockstep with these.
#[derive(Debug, Clone)]
pub enum ParseEvent {
    Statement(Expr),
    PushScope,
    PopScope,
}

/// Assembles expression trees from a token stream.
///
/// Tokens are materialized up front (there are never more than a few
/// thousand in a source file) so the Pratt parser can freely peek the
/// current token kind while recursing.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    handler: &'a Handler,
    scope_depth: i32,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, handler: &'a Handler) -> Self {
        debug_assert!(tokens.last().map(|t| t.kind) == Some(TokenKind::Eof) || tokens.is_empty());
        Self {
            tokens,
            pos: 0,
            handler,
            scope_depth: 0,
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        tok
    }

    /// Top-level driver: control tokens (`;`, `{`, `}`, EOF) are handled
    /// directly; everything else feeds the Pratt expression parser via
    /// `parse_operand`, extending the current partial expression.
    ///
    /// Stops at the first parse error, per the grounding source's
    /// `self_error` abort policy -- everything parsed up to that point is
    /// still returned.
    pub fn parse(&mut self) -> Vec<ParseEvent> {
        let mut events = Vec::new();
        let mut current: Option<Expr> = None;

        loop {
            if self.is_at_end() {
                break;
            }
            match self.peek().kind {
                TokenKind::Semicolon => {
                    self.advance();
                    if let Some(expr) = current.take() {
                        events.push(ParseEvent::Statement(expr));
                    }
                }
                TokenKind::LeftBrace => {
                    self.advance();
                    self.scope_depth += 1;
                    events.push(ParseEvent::PushScope);
                }
                TokenKind::RightBrace => {
                    self.advance();
                    self.scope_depth -= 1;
                    events.push(ParseEvent::PopScope);
                }
                _ => match self.extend(current.take()) {
                    Ok(expr) => current = Some(expr),
                    Err(()) => return events,
                },
            }
        }

        if let Some(expr) = current.take() {
            events.push(ParseEvent::Statement(expr));
        }

        if self.scope_depth != 0 {
            let line = self.tokens.last().map(|t| t.line).unwrap_or(1);
            self.handler.report(Phase::Parse, line, "Error at end: Expect '{' .");
        }

        events
    }

    /// Feeds one more token into the current partial expression.
    ///
    /// If `current` is a statement head (`print`/`var`), the token extends
    /// its operand instead of starting a new top-level expression, exactly
    /// the "statement-head extension" rule: `var x = 1;` parses `var`,
    /// then rebuilds `var`'s operand across the `x`, `=`, and `1` tokens
    /// that follow.
    fn extend(&mut self, current: Option<Expr>) -> Result<Expr, ()> {
        match current {
            Some(Expr::Print(keyword, inner)) => {
                let next = self.parse_operand(Some(*inner))?;
                Ok(Expr::Print(keyword, Box::new(next)))
            }
            Some(Expr::Var(keyword, inner)) => {
                let next = self.parse_operand(Some(*inner))?;
                Ok(Expr::Var(keyword, Box::new(next)))
            }
            other => self.parse_operand(other),
        }
    }

    /// Reads one token and folds it into `prev`, which may be `None` for a
    /// fresh leaf/prefix position or `Some` when extending/binding into an
    /// existing partial expression (the Pratt equivalent of the rotation
    /// insertion algorithm).
    fn parse_operand(&mut self, prev: Option<Expr>) -> Result<Expr, ()> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number => Ok(Expr::Literal(Literal::Number(token.lexeme))),
            TokenKind::String => Ok(Expr::Literal(Literal::String(token.literal))),
            TokenKind::True => Ok(Expr::Literal(Literal::Bool(true))),
            TokenKind::False => Ok(Expr::Literal(Literal::Bool(false))),
            TokenKind::Nil => Ok(Expr::Literal(Literal::Nil)),
            TokenKind::Identifier => Ok(Expr::Identifier(token)),
            TokenKind::LeftParen => self.parse_group(),
            TokenKind::Print => {
                let right = self.parse_unary_operand()?;
                Ok(Expr::Print(token, Box::new(right)))
            }
            TokenKind::Var => {
                let right = self.parse_unary_operand()?;
                Ok(Expr::Var(token, Box::new(right)))
            }
            TokenKind::Bang => self.parse_prefix_unary(UnOp::Not, token, prev),
            TokenKind::Minus if prev.is_none() => self.parse_prefix_unary(UnOp::Neg, token, prev),
            TokenKind::Minus | TokenKind::Plus | TokenKind::Star | TokenKind::Slash
            | TokenKind::And | TokenKind::Or | TokenKind::EqualEqual | TokenKind::BangEqual
            | TokenKind::Less | TokenKind::LessEqual | TokenKind::Greater | TokenKind::GreaterEqual => {
                self.parse_binary(token, prev)
            }
            TokenKind::Equal => self.parse_assign(token, prev),
            _ => {
                self.error_expect_expression(&token);
                Err(())
            }
        }
    }

    /// Prefix operators read exactly one further token for their operand,
    /// matching the grounding source's single-token `from_iter` read
    /// (rather than a full-precedence sub-parse).
    fn parse_unary_operand(&mut self) -> Result<Expr, ()> {
        self.parse_operand(None)
    }

    fn parse_prefix_unary(&mut self, op: UnOp, op_token: Token, prev: Option<Expr>) -> Result<Expr, ()> {
        let right = self.parse_unary_operand()?;
        let node = Expr::Unary { op, op_token: op_token.clone(), right: Box::new(right) };

        // Same-operator chained prefix unaries nest instead of replacing
        // the previous partial expression: `!!x` with a prior partial
        // expression `E` whose right-most unary chain ends in the same
        // operator nests the new unary one level deeper rather than
        // discarding `E`.
        if let Some(mut prev_expr) = prev {
            if let Some(slot) = rightmost_same_unary(&mut prev_expr, &op_token) {
                *slot = node;
                return Ok(prev_expr);
            }
            // No matching chain to nest into: the new unary simply becomes
            // the new partial expression, matching a fresh prefix position.
            return Ok(node);
        }
        Ok(node)
    }

    fn parse_group(&mut self) -> Result<Expr, ()> {
        let mut inner: Option<Expr> = None;
        loop {
            if self.is_at_end() {
                self.error_expect_expression(self.peek());
                return Err(());
            }
            if self.peek().kind == TokenKind::RightParen {
                self.advance();
                break;
            }
            inner = Some(self.parse_operand(inner.take())?);
        }
        Ok(Expr::Grouping(inner.map(Box::new)))
    }

    /// Binary-insertion in Pratt form: `left` must already exist; the new
    /// operator's right operand is parsed at `min_bp = left_bp + 1` (or
    /// `left_bp` for the right-associative case, which this table never
    /// hits for arithmetic/comparison operators).
    fn parse_binary(&mut self, op_token: Token, prev: Option<Expr>) -> Result<Expr, ()> {
        let Some(left) = prev else {
            self.error_expect_expression(&op_token);
            return Err(());
        };
        let (op, left_bp, right_assoc) = infix_binding_power(op_token.kind).expect("binary token");
        let min_bp = if right_assoc { left_bp } else { left_bp + 1 };
        let right = self.parse_expr_bp(min_bp)?;
        Ok(self.insert_binary(op, op_token, left, right))
    }

    fn parse_assign(&mut self, op_token: Token, prev: Option<Expr>) -> Result<Expr, ()> {
        let Some(target) = prev else {
            self.error_expect_expression(&op_token);
            return Err(());
        };
        let value = self.parse_expr_bp(bp::MIN)?;
        Ok(Expr::Assign { target: Box::new(target), value: Box::new(value) })
    }

    /// Reads a single right-hand operand, continuing to fold in further
    /// binary operators of at least `min_bp` -- the Pratt "climb" loop,
    /// used for right-hand sub-expressions of binary/assign operators.
    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ()> {
        let mut lhs = self.parse_operand(None)?;
        loop {
            if self.is_at_end() {
                return Ok(lhs);
            }
            let kind = self.peek().kind;
            if matches!(kind, TokenKind::Semicolon | TokenKind::RightParen | TokenKind::RightBrace | TokenKind::LeftBrace) {
                return Ok(lhs);
            }
            if kind == TokenKind::Equal {
                if bp::MIN < min_bp {
                    return Ok(lhs);
                }
                let op_token = self.advance();
                lhs = self.parse_assign(op_token, Some(lhs))?;
                continue;
            }
            let Some((_, left_bp, _)) = infix_binding_power(kind) else {
                return Ok(lhs);
            };
            if left_bp < min_bp {
                return Ok(lhs);
            }
            let op_token = self.advance();
            lhs = self.parse_binary(op_token, Some(lhs))?;
        }
    }

    /// Folds a new binary node into the existing tree, reproducing the
    /// rotation algorithm's precedence/associativity outcome. Since this
    /// parser always parses the right operand at the correct binding power
    /// up front (`parse_expr_bp`), the insertion here never needs to
    /// rotate -- the recursive `parse_expr_bp` call already placed lower
    /// precedence operators above and higher ones below, so inserting is
    /// just constructing the node.
    fn insert_binary(&self, op: BinOp, op_token: Token, left: Expr, right: Expr) -> Expr {
        Expr::Binary { op, op_token, left: Box::new(left), right: Box::new(right) }
    }

    fn error_expect_expression(&self, token: &Token) {
        let line = token.line;
        if token.kind == TokenKind::Eof {
            self.handler.report(Phase::Parse, line, "Error at end: Expect expression.");
        } else {
            self.handler
                .report(Phase::Parse, line, format!("Error at '{}': Expect expression.", token.lexeme));
        }
    }
}

/// Walks `expr`'s right-hand chain looking for the deepest `Unary` node
/// whose operator token equals `op_token` by lexeme (see `Token`'s
/// lexeme-only equality). Returns a mutable slot to that node's `right`
/// field's owner... in practice we splice by returning a mutable reference
/// to the box contents one level up, via recursion that assigns in place.
fn rightmost_same_unary<'e>(expr: &'e mut Expr, op_token: &Token) -> Option<&'e mut Expr> {
    match expr {
        Expr::Unary { op_token: this_op, right, .. } => {
            if let Some(slot) = rightmost_same_unary(right, op_token) {
                Some(slot)
            } else if this_op == op_token {
                Some(right)
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render;
    use loxc_lex::Lexer;

    fn parse_events(src: &str) -> (Vec<ParseEvent>, bool) {
        let handler = Handler::new();
        let tokens: Vec<Token> = Lexer::new(src, &handler).collect();
        let mut parser = Parser::new(tokens, &handler);
        let events = parser.parse();
        (events, handler.has_errors())
    }

    fn render_events(src: &str) -> Vec<String> {
        let (events, errored) = parse_events(src);
        assert!(!errored, "unexpected parse error for {src:?}");
        events
            .into_iter()
            .filter_map(|e| match e {
                ParseEvent::Statement(expr) => Some(render(&expr)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn precedence_binds_multiplication_tighter_than_addition() {
        let rendered = render_events("1 + 2 * 3;");
        assert_eq!(rendered, vec!["(+ 1.0 (* 2.0 3.0))"]);
    }

    #[test]
    fn grouping_and_unary_render_matches_canonical_example() {
        let rendered = render_events("(1 + 2) * -3;");
        assert_eq!(rendered, vec!["(* (group (+ 1.0 2.0)) (- 3.0))"]);
    }

    #[test]
    fn comparison_binds_looser_than_additive() {
        let rendered = render_events("1 + 2 < 3 + 4;");
        assert_eq!(rendered, vec!["(< (+ 1.0 2.0) (+ 3.0 4.0))"]);
    }

    #[test]
    fn chained_same_kind_unary_nests() {
        let rendered = render_events("!!true;");
        assert_eq!(rendered, vec!["(! (! true))"]);
    }

    #[test]
    fn braces_emit_scope_events() {
        let (events, errored) = parse_events("{ print 1; }");
        assert!(!errored);
        assert!(matches!(events[0], ParseEvent::PushScope));
        assert!(matches!(events[1], ParseEvent::Statement(Expr::Print(_, _))));
        assert!(matches!(events[2], ParseEvent::PopScope));
    }

    #[test]
    fn var_with_initializer_wraps_assign() {
        let rendered = render_events("var x = 1;");
        assert_eq!(rendered, vec!["(var (= (Identifier x) 1.0))"]);
    }

    #[test]
    fn var_bare_declaration() {
        let rendered = render_events("var x;");
        assert_eq!(rendered, vec!["(var (Identifier x))"]);
    }

    #[test]
    fn unclosed_brace_is_a_parse_error() {
        let (events, errored) = parse_events("{ print 1;");
        assert!(errored);
        assert!(events.iter().any(|e| matches!(e, ParseEvent::PushScope)));
    }

    #[test]
    fn missing_operand_after_binary_operator_is_a_parse_error() {
        let (_, errored) = parse_events("1 + ;");
        assert!(errored);
    }

    proptest::proptest! {
        /// Left-associative addition/multiplication chains render with
        /// `*` binding tighter than `+`, regardless of the operand values.
        #[test]
        fn additive_multiplicative_precedence_holds(a in 0i64..1000, b in 0i64..1000, c in 0i64..1000) {
            let source = format!("{a} + {b} * {c};");
            let rendered = render_events(&source);
            proptest::prop_assert_eq!(
                rendered,
                vec![format!("(+ {a}.0 (* {b}.0 {c}.0))")]
            );
        }

        /// A chain of additions nests to the left, regardless of operand
        /// values: `a + b + c` renders as `(+ (+ a b) c)`, never `(+ a (+ b c))`.
        #[test]
        fn chained_addition_is_left_associative(a in 0i64..1000, b in 0i64..1000, c in 0i64..1000) {
            let source = format!("{a} + {b} + {c};");
            let rendered = render_events(&source);
            proptest::prop_assert_eq!(
                rendered,
                vec![format!("(+ (+ {a}.0 {b}.0) {c}.0)")]
            );
        }
    }
}

use crate::ast::{Expr, Literal};

/// Renders an expression tree in fully-parenthesized prefix form, the
/// format the `parse` subcommand prints and the format every invariant in
/// this crate's tests re-parses to check tree equivalence.
pub fn render(expr: &Expr) -> String {
    match expr {
        Expr::Literal(lit) => render_literal(lit),
        Expr::Grouping(Some(inner)) => format!("(group {})", render(inner)),
        Expr::Grouping(None) => "(group )".to_string(),
        Expr::Identifier(tok) => format!("(Identifier {})", tok.lexeme),
        Expr::Unary { op_token, right, .. } => format!("({} {})", op_token.lexeme, render(right)),
        Expr::Binary { op_token, left, right, .. } => {
            format!("({} {} {})", op_token.lexeme, render(left), render(right))
        }
        Expr::Assign { target, value } => format!("(= {} {})", render(target), render(value)),
        Expr::Print(_, inner) => format!("(print {})", render(inner)),
        Expr::Var(_, inner) => format!("(var {})", render(inner)),
    }
}

fn render_literal(lit: &Literal) -> String {
    match lit {
        Literal::Number(lexeme) => {
            let value: f64 = lexeme.parse().unwrap_or(0.0);
            if value.fract() == 0.0 {
                format!("{value:.1}")
            } else {
                value.to_string()
            }
        }
        Literal::String(s) => s.clone(),
        Literal::Bool(b) => b.to_string(),
        Literal::Nil => "nil".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loxc_lex::{Token, TokenKind};

    #[test]
    fn renders_grouped_arithmetic() {
        let group = Expr::Grouping(Some(Box::new(Expr::Binary {
            op: crate::ast::BinOp::Add,
            op_token: Token::new(TokenKind::Plus, "+", "null", 1),
            left: Box::new(Expr::Literal(Literal::Number("1".into()))),
            right: Box::new(Expr::Literal(Literal::Number("2".into()))),
        })));
        let negate = Expr::Unary {
            op: crate::ast::UnOp::Neg,
            op_token: Token::new(TokenKind::Minus, "-", "null", 1),
            right: Box::new(Expr::Literal(Literal::Number("3".into()))),
        };
        let mul = Expr::Binary {
            op: crate::ast::BinOp::Mul,
            op_token: Token::new(TokenKind::Star, "*", "null", 1),
            left: Box::new(group),
            right: Box::new(negate),
        };
        assert_eq!(render(&mul), "(* (group (+ 1.0 2.0)) (- 3.0))");
    }

    #[test]
    fn renders_empty_group() {
        assert_eq!(render(&Expr::Grouping(None)), "(group )");
    }
}

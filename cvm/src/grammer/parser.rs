use super::ast::{BinaryOp, Expr, ExprKind, For, Func, LogicalOp, Stmt, StmtKind, UnaryOp, Var, AST};
use super::parsercore::Parser;
use super::token::{Token, TokenKind::*};
use super::types::Type;
use crate::error::Error;
use crate::{check, expect, optional, repeat};

impl<'a> Parser<'a> {
    pub fn parse(mut self) -> Result<AST<'a>, Error> {
        let mut items = Vec::new();
        while !self.is_eof() {
            items.push(self.parse_item()?);
        }
        Ok(AST(items))
    }
}

impl<'a> Parser<'a> {
    /// item = decl | stmt
    fn parse_item(&mut self) -> Result<Stmt<'a>, Error> {
        if self.check_if(|token| Parser::is_type(&token.kind)) {
            self.parse_decl()
        } else {
            self.parse_stmt()
        }
    }

    /// type = ( "int" | "char" | "void" ) [ "*" ]
    fn parse_type(&mut self) -> Result<Type, Error> {
        let token = expect!(self, KwInt | KwChar | KwVoid, "type")?;
        let ty = match token.kind {
            KwInt => Type::Int,
            KwChar => Type::Char,
            _ => Type::Void,
        };
        match optional!(self, Star) {
            Some(star) => {
                if check!(self, Star) {
                    return Err(Error::UnsupportedType(star.pos.into(), format!("{ty}**")));
                }
                ty.pointer()
                    .ok_or_else(|| Error::UnsupportedType(star.pos.into(), format!("{ty}*")))
            }
            None => Ok(ty),
        }
    }

    /// decl = [ "const" ] type ident decl-tail
    /// decl-tail = "[" num-lit "]" ";" | "=" expr ";" | ";" | "(" params ")" ( stmt | ";" )
    fn parse_decl(&mut self) -> Result<Stmt<'a>, Error> {
        let Some(pos) = self.peek().map(|token| token.pos) else {
            return Err(self.eof("declaration"));
        };
        let constant = optional!(self, KwConst).is_some();
        let ty = self.parse_type()?;
        let name = expect!(self, Ident, "identifier")?.text;

        let Some(token) = self.peek().cloned() else {
            return Err(self.eof("`[`, `=`, `;` or `(`"));
        };
        match token.kind {
            // Array declaration: "[" num-lit "]" ";"
            LBracket => {
                expect!(self, LBracket)?;
                let size = expect!(self, Number(_), "array size")?;
                let count = match size.kind {
                    Number(n) if n > 0 => n as usize,
                    _ => return Err(Error::InvalidArraySize(size.pos.into(), name)),
                };
                expect!(self, RBracket)?;
                let Some(ty) = ty.array(count) else {
                    return Err(Error::VoidArray(pos.into(), name));
                };
                if let Some(eq) = optional!(self, Equal) {
                    return Err(Error::ArrayInitializer(eq.pos.into(), name));
                }
                expect!(self, Semicolon)?;
                let var = Var {
                    name,
                    ty,
                    constant,
                    init: None,
                };
                Ok(Stmt::new(StmtKind::Var(var), pos))
            }

            // Scalar with initializer: "=" expr ";"
            Equal => {
                if ty.is_void() {
                    return Err(Error::VoidVariable(pos.into(), name));
                }
                expect!(self, Equal)?;
                let init = self.parse_expr()?;
                expect!(self, Semicolon)?;
                let var = Var {
                    name,
                    ty,
                    constant,
                    init: Some(init),
                };
                Ok(Stmt::new(StmtKind::Var(var), pos))
            }

            // Bare scalar: ";"
            Semicolon => {
                if ty.is_void() {
                    return Err(Error::VoidVariable(pos.into(), name));
                }
                expect!(self, Semicolon)?;
                let var = Var {
                    name,
                    ty,
                    constant,
                    init: None,
                };
                Ok(Stmt::new(StmtKind::Var(var), pos))
            }

            // Function: "(" params ")" ( stmt | ";" )
            LParen => {
                let params = self.parse_params()?;
                let body = match optional!(self, Semicolon) {
                    Some(_) => None,
                    None => Some(Box::new(self.parse_stmt()?)),
                };
                let func = Func {
                    name,
                    ret: ty,
                    params,
                    body,
                };
                Ok(Stmt::new(StmtKind::Func(func), pos))
            }

            _ => Err(self.unexpected(&token, "`[`, `=`, `;` or `(`")),
        }
    }

    /// params = "(" "void" ")" | "(" [ param { "," param } ] ")"
    fn parse_params(&mut self) -> Result<Vec<(String, Type)>, Error> {
        expect!(self, LParen)?;
        if check!(self, KwVoid) && matches!(self.peek_nth(1), Some(Token { kind: RParen, .. })) {
            expect!(self, KwVoid)?;
            expect!(self, RParen)?;
            return Ok(Vec::new());
        }
        let params = repeat!(self, self.parse_param(), Comma, RParen);
        expect!(self, RParen)?;
        Ok(params)
    }

    /// param = type ident
    fn parse_param(&mut self) -> Result<(String, Type), Error> {
        let Some(pos) = self.peek().map(|token| token.pos) else {
            return Err(self.eof("parameter"));
        };
        let ty = self.parse_type()?;
        let name = expect!(self, Ident, "identifier")?.text;
        if ty.is_void() {
            return Err(Error::VoidParameter(pos.into(), name));
        }
        if check!(self, LBracket) {
            return Err(Error::ArrayParameter(pos.into(), name));
        }
        Ok((name, ty))
    }

    /// stmt = block | if-stmt | while-stmt | for-stmt | return-stmt | expr-stmt
    fn parse_stmt(&mut self) -> Result<Stmt<'a>, Error> {
        let Some((kind, pos)) = self.peek().map(|token| (token.kind.clone(), token.pos)) else {
            return Err(self.eof("statement"));
        };
        match kind {
            // Block statement: "{" { decl | stmt } "}"
            LCurly => {
                expect!(self, LCurly)?;
                let items = repeat!(self, self.parse_item(), RCurly);
                expect!(self, RCurly)?;
                Ok(Stmt::new(StmtKind::Block(items), pos))
            }

            // Conditional statement: "if" "(" expr ")" stmt [ "else" stmt ]
            KwIf => {
                expect!(self, KwIf)?;
                expect!(self, LParen)?;
                let cond = self.parse_expr()?;
                expect!(self, RParen)?;
                let tstmt = Box::new(self.parse_stmt()?);
                let fstmt = optional!(self, KwElse, Box::new(self.parse_stmt()?));
                Ok(Stmt::new(StmtKind::If(cond, tstmt, fstmt), pos))
            }

            // Loop statement: "while" "(" expr ")" stmt
            KwWhile => {
                expect!(self, KwWhile)?;
                expect!(self, LParen)?;
                let cond = self.parse_expr()?;
                expect!(self, RParen)?;
                let body = Box::new(self.parse_stmt()?);
                Ok(Stmt::new(StmtKind::While(cond, body), pos))
            }

            // Loop statement: "for" "(" [ expr ] ";" [ expr ] ";" [ expr ] ")" stmt
            KwFor => {
                expect!(self, KwFor)?;
                expect!(self, LParen)?;
                let init = self.parse_opt_expr(|parser| check!(parser, Semicolon))?;
                expect!(self, Semicolon)?;
                let cond = self.parse_opt_expr(|parser| check!(parser, Semicolon))?;
                expect!(self, Semicolon)?;
                let step = self.parse_opt_expr(|parser| check!(parser, RParen))?;
                expect!(self, RParen)?;
                let body = Box::new(self.parse_stmt()?);
                let stmt = For {
                    init,
                    cond,
                    step,
                    body,
                };
                Ok(Stmt::new(StmtKind::For(stmt), pos))
            }

            // Return statement: "return" [ expr ] ";"
            KwReturn => {
                expect!(self, KwReturn)?;
                let expr = self.parse_opt_expr(|parser| check!(parser, Semicolon))?;
                expect!(self, Semicolon)?;
                Ok(Stmt::new(StmtKind::Return(expr), pos))
            }

            // Expression statement: expr ";"
            _ => {
                let expr = self.parse_expr()?;
                expect!(self, Semicolon)?;
                Ok(Stmt::new(StmtKind::Expr(expr), pos))
            }
        }
    }

    /// Expression unless the terminator is next
    fn parse_opt_expr<F: Fn(&Self) -> bool>(
        &mut self,
        terminated: F,
    ) -> Result<Option<Expr<'a>>, Error> {
        if terminated(&*self) {
            Ok(None)
        } else {
            Ok(Some(self.parse_expr()?))
        }
    }

    /// expr = assign-expr
    fn parse_expr(&mut self) -> Result<Expr<'a>, Error> {
        self.parse_assign_expr()
    }

    /// assign-expr = or-expr [ "=" assign-expr ]
    fn parse_assign_expr(&mut self) -> Result<Expr<'a>, Error> {
        let lhs = self.parse_or_expr()?;
        if check!(self, Equal) {
            expect!(self, Equal)?;
            let rhs = self.parse_assign_expr()?;
            let pos = lhs.pos;
            return Ok(Expr::new(ExprKind::Assign(Box::new(lhs), Box::new(rhs)), pos));
        }
        Ok(lhs)
    }

    /// or-expr = and-expr { "||" and-expr }
    fn parse_or_expr(&mut self) -> Result<Expr<'a>, Error> {
        let first = self.parse_and_expr()?;
        if !check!(self, PipePipe) {
            return Ok(first);
        }
        let pos = first.pos;
        let mut operands = vec![first];
        while optional!(self, PipePipe).is_some() {
            operands.push(self.parse_and_expr()?);
        }
        Ok(Expr::new(ExprKind::Logical(LogicalOp::Or, operands), pos))
    }

    /// and-expr = eq-expr { "&&" eq-expr }
    fn parse_and_expr(&mut self) -> Result<Expr<'a>, Error> {
        let first = self.parse_eq_expr()?;
        if !check!(self, AmpasandAmp) {
            return Ok(first);
        }
        let pos = first.pos;
        let mut operands = vec![first];
        while optional!(self, AmpasandAmp).is_some() {
            operands.push(self.parse_eq_expr()?);
        }
        Ok(Expr::new(ExprKind::Logical(LogicalOp::And, operands), pos))
    }

    /// eq-expr = relat-expr { ( "==" | "!=" ) relat-expr }
    fn parse_eq_expr(&mut self) -> Result<Expr<'a>, Error> {
        let mut lhs = self.parse_relat_expr()?;
        loop {
            let op = match self.peek().map(|token| &token.kind) {
                Some(EqualEqual) => BinaryOp::Eq,
                Some(ExclEqual) => BinaryOp::Ne,
                _ => return Ok(lhs),
            };
            self.next();
            let rhs = self.parse_relat_expr()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    /// relat-expr = add-expr { ( "<" | "<=" | ">" | ">=" ) add-expr }
    fn parse_relat_expr(&mut self) -> Result<Expr<'a>, Error> {
        let mut lhs = self.parse_add_expr()?;
        loop {
            let op = match self.peek().map(|token| &token.kind) {
                Some(LAngle) => BinaryOp::Lt,
                Some(LAngleEqual) => BinaryOp::Le,
                Some(RAngle) => BinaryOp::Gt,
                Some(RAngleEqual) => BinaryOp::Ge,
                _ => return Ok(lhs),
            };
            self.next();
            let rhs = self.parse_add_expr()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    /// add-expr = mul-expr { ( "+" | "-" ) mul-expr }
    fn parse_add_expr(&mut self) -> Result<Expr<'a>, Error> {
        let mut lhs = self.parse_mul_expr()?;
        loop {
            let op = match self.peek().map(|token| &token.kind) {
                Some(Plus) => BinaryOp::Add,
                Some(Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.next();
            let rhs = self.parse_mul_expr()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    /// mul-expr = unary-expr { ( "*" | "/" ) unary-expr }
    fn parse_mul_expr(&mut self) -> Result<Expr<'a>, Error> {
        let mut lhs = self.parse_unary_expr()?;
        loop {
            let op = match self.peek().map(|token| &token.kind) {
                Some(Star) => BinaryOp::Mul,
                Some(Slash) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.next();
            let rhs = self.parse_unary_expr()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    /// unary-expr = ( "!" | "-" | "*" ) unary-expr | call-expr
    fn parse_unary_expr(&mut self) -> Result<Expr<'a>, Error> {
        let Some((kind, pos)) = self.peek().map(|token| (token.kind.clone(), token.pos)) else {
            return Err(self.eof("expression"));
        };
        let op = match kind {
            Excl => UnaryOp::Not,
            Minus => UnaryOp::Neg,
            Star => UnaryOp::Deref,
            _ => return self.parse_call_expr(),
        };
        self.next();
        let operand = self.parse_unary_expr()?;
        Ok(Expr::new(ExprKind::Unary(op, Box::new(operand)), pos))
    }

    /// call-expr = prim-expr { "(" [ expr { "," expr } ] ")" }
    fn parse_call_expr(&mut self) -> Result<Expr<'a>, Error> {
        let mut expr = self.parse_prim_expr()?;
        while check!(self, LParen) {
            expect!(self, LParen)?;
            let args = repeat!(self, self.parse_expr(), Comma, RParen);
            expect!(self, RParen)?;
            let pos = expr.pos;
            expr = Expr::new(ExprKind::Call(Box::new(expr), args), pos);
        }
        Ok(expr)
    }

    /// prim-expr = ident | num-lit | string-lit | char-lit | "true" | "false" | "(" expr ")"
    fn parse_prim_expr(&mut self) -> Result<Expr<'a>, Error> {
        let Some(token) = self.next() else {
            return Err(self.eof("expression"));
        };
        let kind = match token.kind {
            Ident => ExprKind::Ident(token.text),
            Number(n) => ExprKind::NumberLit(n),
            Text => ExprKind::StringLit(token.text),
            Char(c) => ExprKind::CharLit(c),
            KwTrue => ExprKind::BoolLit(true),
            KwFalse => ExprKind::BoolLit(false),
            LParen => {
                let inner = self.parse_expr()?;
                expect!(self, RParen)?;
                return Ok(inner);
            }
            _ => return Err(self.unexpected(&token, "expression")),
        };
        Ok(Expr::new(kind, token.pos))
    }
}

fn binary<'a>(op: BinaryOp, lhs: Expr<'a>, rhs: Expr<'a>) -> Expr<'a> {
    let pos = lhs.pos;
    Expr::new(ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)), pos)
}

use super::token::Pos;
use super::types::Type;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AST<'a>(pub Vec<Stmt<'a>>); // program = { decl | stmt }

#[derive(Debug, Clone, Serialize)]
pub struct Stmt<'a> {
    pub kind: StmtKind<'a>,
    pub pos: Pos<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub enum StmtKind<'a> {
    Var(Var<'a>),                    // [ "const" ] type ident [ "[" num "]" ] [ "=" expr ] ";"
    Func(Func<'a>),                  // type ident "(" params ")" ( stmt | ";" )
    Block(Vec<Stmt<'a>>),            // "{" { decl | stmt } "}"
    Expr(Expr<'a>),                  // expr ";"
    If(Expr<'a>, Box<Stmt<'a>>, Option<Box<Stmt<'a>>>), // "if" "(" expr ")" stmt [ "else" stmt ]
    While(Expr<'a>, Box<Stmt<'a>>),  // "while" "(" expr ")" stmt
    For(For<'a>),                    // "for" "(" [ expr ] ";" [ expr ] ";" [ expr ] ")" stmt
    Return(Option<Expr<'a>>),        // "return" [ expr ] ";"
}

#[derive(Debug, Clone, Serialize)]
pub struct Var<'a> {
    pub name: String,
    pub ty: Type,
    pub constant: bool,
    pub init: Option<Expr<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Func<'a> {
    pub name: String,
    pub ret: Type,
    pub params: Vec<(String, Type)>,
    pub body: Option<Box<Stmt<'a>>>, // None for a prototype
}

#[derive(Debug, Clone, Serialize)]
pub struct For<'a> {
    pub init: Option<Expr<'a>>,
    pub cond: Option<Expr<'a>>,
    pub step: Option<Expr<'a>>,
    pub body: Box<Stmt<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Expr<'a> {
    pub kind: ExprKind<'a>,
    pub pos: Pos<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub enum ExprKind<'a> {
    Assign(Box<Expr<'a>>, Box<Expr<'a>>),            // expr "=" expr
    Logical(LogicalOp, Vec<Expr<'a>>),               // expr { ( "&&" | "||" ) expr }
    Binary(BinaryOp, Box<Expr<'a>>, Box<Expr<'a>>),  // expr (binop) expr
    Unary(UnaryOp, Box<Expr<'a>>),                   // ( "!" | "-" | "*" ) expr
    Call(Box<Expr<'a>>, Vec<Expr<'a>>),              // expr "(" [ expr { "," expr } ] ")"
    Ident(String),                                   // ident
    NumberLit(u16),                                  // num-lit
    StringLit(String),                               // string-lit
    CharLit(u16),                                    // char-lit
    BoolLit(bool),                                   // "true" | "false"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogicalOp {
    And, // "&&"
    Or,  // "||"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Not,   // "!"
    Neg,   // "-"
    Deref, // "*"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add, // "+"
    Sub, // "-"
    Mul, // "*"
    Div, // "/"
    Eq,  // "=="
    Ne,  // "!="
    Lt,  // "<"
    Le,  // "<="
    Gt,  // ">"
    Ge,  // ">="
}

impl<'a> Expr<'a> {
    pub fn new(kind: ExprKind<'a>, pos: Pos<'a>) -> Self {
        Expr { kind, pos }
    }
}

impl<'a> Stmt<'a> {
    pub fn new(kind: StmtKind<'a>, pos: Pos<'a>) -> Self {
        Stmt { kind, pos }
    }
}

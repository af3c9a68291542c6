use super::{
    regs::RegPool,
    symbols::{Symbol, Symbols},
    Code, Line,
};
use crate::{
    error::Error,
    grammer::{
        ast::{BinaryOp, Expr, ExprKind, For, Func, LogicalOp, Stmt, StmtKind, UnaryOp, Var, AST},
        token::Pos,
        types::WORD,
    },
};
use arch::{
    flag::Flag,
    inst::{Addr, Inst, Operand},
    reg::Reg,
};

/// Lower a whole program to assembly
pub fn generate(file: &str, ast: &AST) -> Result<Code, Error> {
    let mut generator = Generator::new();
    for stmt in &ast.0 {
        generator.stmt(stmt)?;
    }
    Ok(generator.finish(file))
}

/// State of the function currently being generated
struct Frame {
    name: String,       // function being generated
    words: usize,       // stack words reserved for locals so far
    reserve_at: usize,  // line index where the reservation goes
}

impl Frame {
    /// Bytes reserved so far, bounded by the reach of `sf - N`
    fn bytes(&self, pos: &Pos) -> Result<u16, Error> {
        u16::try_from(WORD * self.words)
            .ok()
            .filter(|bytes| *bytes <= i16::MIN.unsigned_abs())
            .ok_or_else(|| Error::FrameTooLarge(pos.into(), self.name.clone()))
    }
}

/// One code generation session
struct Generator {
    lines: Vec<Line>,
    regs: RegPool,
    symbols: Symbols,
    labels: usize,
    frame: Option<Frame>,
    strings: Vec<String>,
}

impl Generator {
    fn new() -> Self {
        Generator {
            lines: Vec::new(),
            regs: RegPool::new(),
            symbols: Symbols::new(),
            labels: 0,
            frame: None,
            strings: Vec::new(),
        }
    }

    /// Append the data section: globals first, then string literals
    fn finish(mut self, file: &str) -> Code {
        let statics: Vec<(String, usize)> = self
            .symbols
            .statics()
            .map(|(name, ty)| (name.to_string(), ty.size()))
            .collect();
        for (name, size) in statics {
            self.lines.push(Line::Label(name));
            self.lines.push(Line::Reserve(size));
        }
        for (idx, text) in std::mem::take(&mut self.strings).into_iter().enumerate() {
            self.lines.push(Line::Label(format!("S{idx}")));
            self.lines.push(Line::Str(text));
        }
        Code {
            source: file.to_string(),
            lines: self.lines,
        }
    }

    fn emit(&mut self, inst: Inst) {
        self.lines.push(Line::Inst(inst));
    }

    fn emit_label(&mut self, name: &str) {
        self.lines.push(Line::Label(name.to_string()));
    }

    /// Fresh control-flow label `L<n>`
    fn label(&mut self) -> String {
        let label = format!("L{}", self.labels);
        self.labels += 1;
        label
    }

    fn epilogue(&mut self) {
        self.emit(Inst::MOV(Reg::SP.into(), Reg::SF.into()));
        self.emit(Inst::POP(Reg::SF));
        self.emit(Inst::RET());
    }
}

// ----------------------------------------------------------------------------
// Statements
// ----------------------------------------------------------------------------

impl Generator {
    fn stmt(&mut self, stmt: &Stmt) -> Result<(), Error> {
        match &stmt.kind {
            StmtKind::Var(var) => self.var(var, &stmt.pos)?,
            StmtKind::Func(func) => self.func(func, &stmt.pos)?,
            StmtKind::Block(items) => {
                // File-scope blocks declare globals
                let scoped = self.frame.is_some();
                if scoped {
                    self.symbols.push_scope();
                }
                for item in items {
                    self.stmt(item)?;
                }
                if scoped {
                    self.symbols.pop_scope();
                }
            }
            StmtKind::Expr(expr) => {
                let reg = self.expr(expr)?;
                self.regs.free(reg);
            }
            StmtKind::If(cond, tstmt, fstmt) => self.if_stmt(cond, tstmt, fstmt.as_deref())?,
            StmtKind::While(cond, body) => self.loop_stmt(Some(cond), None, body)?,
            StmtKind::For(For {
                init,
                cond,
                step,
                body,
            }) => {
                if let Some(init) = init {
                    let reg = self.expr(init)?;
                    self.regs.free(reg);
                }
                self.loop_stmt(cond.as_ref(), step.as_ref(), body)?;
            }
            StmtKind::Return(expr) => {
                if self.frame.is_none() {
                    return Err(Error::ReturnOutsideFunction(stmt.pos.into()));
                }
                if let Some(expr) = expr {
                    let reg = self.expr(expr)?;
                    self.emit(Inst::MOV(Reg::RV.into(), reg.into()));
                    self.regs.free(reg);
                }
                self.epilogue();
            }
        }
        debug_assert_eq!(self.regs.live(), 0, "register leaked at {}", stmt.pos);
        Ok(())
    }

    fn var(&mut self, var: &Var, pos: &Pos) -> Result<(), Error> {
        // The initializer cannot see the name being declared
        let init = match &var.init {
            Some(expr) => Some(self.expr(expr)?),
            None => None,
        };
        let symbol = match &mut self.frame {
            Some(frame) => {
                frame.words += var.ty.words();
                let bytes = frame.bytes(pos)?;
                Symbol::Stack {
                    offset: 0i16.wrapping_sub_unsigned(bytes),
                    ty: var.ty,
                    constant: var.constant,
                }
            }
            None => Symbol::Static {
                ty: var.ty,
                constant: var.constant,
            },
        };
        self.symbols.declare(&var.name, symbol.clone(), pos)?;
        if let Some(reg) = init {
            self.store(&var.name, &symbol, reg, pos)?;
            self.regs.free(reg);
        }
        Ok(())
    }

    fn func(&mut self, func: &Func, pos: &Pos) -> Result<(), Error> {
        if self.frame.is_some() {
            return Err(Error::NestedFunction(pos.into(), func.name.clone()));
        }
        let symbol = Symbol::Func {
            params: func.params.len(),
            defined: func.body.is_some(),
        };
        self.symbols.declare(&func.name, symbol, pos)?;
        let Some(body) = &func.body else {
            return Ok(());
        };

        // Prologue
        self.emit_label(&func.name);
        self.emit(Inst::PUSH(Reg::SF));
        self.emit(Inst::MOV(Reg::SF.into(), Reg::SP.into()));
        self.frame = Some(Frame {
            name: func.name.clone(),
            words: 0,
            reserve_at: self.lines.len(),
        });

        // Arguments are pushed left to right: sf +0 saved sf, sf +2 return address
        self.symbols.push_scope();
        let count = func.params.len();
        for (idx, (name, ty)) in func.params.iter().enumerate() {
            let offset = i16::try_from(WORD * (count - idx) + WORD)
                .map_err(|_| Error::FrameTooLarge(pos.into(), func.name.clone()))?;
            let symbol = Symbol::Stack {
                offset,
                ty: *ty,
                constant: false,
            };
            self.symbols.declare(name, symbol, pos)?;
        }

        // The outermost block shares the parameter scope
        match &body.kind {
            StmtKind::Block(items) => {
                for item in items {
                    self.stmt(item)?;
                }
            }
            _ => self.stmt(body)?,
        }
        self.epilogue();
        self.symbols.clear_scopes();

        if let Some(frame) = self.frame.take() {
            if frame.words > 0 {
                let bytes = frame.bytes(pos)?;
                let reserve = Inst::SUB(Reg::SP, Operand::Imm(bytes));
                self.lines.insert(frame.reserve_at, Line::Inst(reserve));
            }
        }
        Ok(())
    }

    fn if_stmt(&mut self, cond: &Expr, tstmt: &Stmt, fstmt: Option<&Stmt>) -> Result<(), Error> {
        let ok = self.label();
        let end = self.label();
        let endelse = fstmt.map(|_| self.label());

        let reg = self.expr(cond)?;
        self.emit(Inst::JNZ(reg, ok.clone()));
        self.regs.free(reg);
        self.emit(Inst::JMP(end.clone()));

        self.emit_label(&ok);
        self.stmt(tstmt)?;
        if let Some(endelse) = &endelse {
            self.emit(Inst::JMP(endelse.clone()));
        }
        self.emit_label(&end);

        if let (Some(fstmt), Some(endelse)) = (fstmt, endelse) {
            self.stmt(fstmt)?;
            self.emit_label(&endelse);
        }
        Ok(())
    }

    /// `while` and `for`: the condition is tested before every iteration,
    /// the step runs after every body
    fn loop_stmt(
        &mut self,
        cond: Option<&Expr>,
        step: Option<&Expr>,
        body: &Stmt,
    ) -> Result<(), Error> {
        let top = self.label();
        let end = self.label();

        self.emit_label(&top);
        if let Some(cond) = cond {
            let ok = self.label();
            let reg = self.expr(cond)?;
            self.emit(Inst::JNZ(reg, ok.clone()));
            self.regs.free(reg);
            self.emit(Inst::JMP(end.clone()));
            self.emit_label(&ok);
        }
        self.stmt(body)?;
        if let Some(step) = step {
            let reg = self.expr(step)?;
            self.regs.free(reg);
        }
        self.emit(Inst::JMP(top));
        self.emit_label(&end);
        Ok(())
    }

    fn store(&mut self, name: &str, symbol: &Symbol, reg: Reg, pos: &Pos) -> Result<(), Error> {
        let addr = match symbol {
            Symbol::Stack { ty, .. } | Symbol::Static { ty, .. } if ty.is_array() => {
                return Err(Error::InvalidLValue(pos.into()))
            }
            Symbol::Stack { offset, .. } => Addr::Frame(*offset),
            Symbol::Static { .. } => Addr::Label(name.to_string()),
            Symbol::Func { .. } => return Err(Error::InvalidLValue(pos.into())),
        };
        self.emit(Inst::MOV(addr.into(), reg.into()));
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Expressions
// ----------------------------------------------------------------------------

impl Generator {
    /// Evaluate into a fresh register owned by the caller
    fn expr(&mut self, expr: &Expr) -> Result<Reg, Error> {
        let pos = &expr.pos;
        match &expr.kind {
            ExprKind::NumberLit(value) | ExprKind::CharLit(value) => self.imm(*value, pos),
            ExprKind::BoolLit(value) => self.imm(*value as u16, pos),
            ExprKind::StringLit(text) => {
                let label = format!("S{}", self.strings.len());
                self.strings.push(text.clone());
                let reg = self.regs.alloc(pos)?;
                self.emit(Inst::MOV(reg.into(), Operand::Label(label)));
                Ok(reg)
            }
            ExprKind::Ident(name) => self.ident(name, pos),
            ExprKind::Assign(lhs, rhs) => self.assign(lhs, rhs),
            ExprKind::Logical(op, operands) => self.logical(*op, operands, pos),
            ExprKind::Binary(op, lhs, rhs) => self.binary(*op, lhs, rhs),
            ExprKind::Unary(op, operand) => self.unary(*op, operand, pos),
            ExprKind::Call(callee, args) => self.call(callee, args, pos),
        }
    }

    fn imm(&mut self, value: u16, pos: &Pos) -> Result<Reg, Error> {
        let reg = self.regs.alloc(pos)?;
        self.emit(Inst::MOV(reg.into(), Operand::Imm(value)));
        Ok(reg)
    }

    /// Scalars load their value, arrays and functions yield their address
    fn ident(&mut self, name: &str, pos: &Pos) -> Result<Reg, Error> {
        let symbol = self
            .symbols
            .lookup(name)
            .cloned()
            .ok_or_else(|| Error::UndefinedVariable(pos.into(), name.to_string()))?;
        let reg = self.regs.alloc(pos)?;
        match symbol {
            Symbol::Stack { offset, ty, .. } if ty.is_array() => {
                self.emit(Inst::MOV(reg.into(), Reg::SF.into()));
                if offset < 0 {
                    self.emit(Inst::SUB(reg, Operand::Imm(offset.unsigned_abs())));
                } else {
                    self.emit(Inst::ADD(reg, Operand::Imm(offset.unsigned_abs())));
                }
            }
            Symbol::Stack { offset, .. } => {
                self.emit(Inst::MOV(reg.into(), Addr::Frame(offset).into()));
            }
            Symbol::Static { ty, .. } if ty.is_array() => {
                self.emit(Inst::MOV(reg.into(), Operand::Label(name.to_string())));
            }
            Symbol::Static { .. } => {
                self.emit(Inst::MOV(reg.into(), Addr::Label(name.to_string()).into()));
            }
            Symbol::Func { .. } => {
                self.emit(Inst::MOV(reg.into(), Operand::Label(name.to_string())));
            }
        }
        Ok(reg)
    }

    /// `x = e` or `*p = e`; the value of the assignment is the stored register
    fn assign(&mut self, lhs: &Expr, rhs: &Expr) -> Result<Reg, Error> {
        match &lhs.kind {
            ExprKind::Ident(name) => {
                let symbol = self
                    .symbols
                    .lookup(name)
                    .cloned()
                    .ok_or_else(|| Error::UndefinedVariable((&lhs.pos).into(), name.clone()))?;
                if symbol.is_constant() {
                    return Err(Error::AssignToConst((&lhs.pos).into(), name.clone()));
                }
                let reg = self.expr(rhs)?;
                self.store(name, &symbol, reg, &lhs.pos)?;
                Ok(reg)
            }
            ExprKind::Unary(UnaryOp::Deref, target)
                if matches!(target.kind, ExprKind::Ident(_)) =>
            {
                let addr = self.expr(target)?;
                let reg = self.expr(rhs)?;
                self.emit(Inst::MOV(Addr::Reg(addr).into(), reg.into()));
                self.regs.free(addr);
                Ok(reg)
            }
            _ => Err(Error::InvalidLValue((&lhs.pos).into())),
        }
    }

    /// Short-circuit `&&` / `||` over all chained operands
    fn logical(&mut self, op: LogicalOp, operands: &[Expr], pos: &Pos) -> Result<Reg, Error> {
        let end = self.label();
        let res = self.regs.alloc(pos)?;
        match op {
            LogicalOp::Or => {
                self.emit(Inst::MOV(res.into(), Operand::Imm(1)));
                for operand in operands {
                    let reg = self.expr(operand)?;
                    self.emit(Inst::JNZ(reg, end.clone()));
                    self.regs.free(reg);
                }
                self.emit(Inst::MOV(res.into(), Operand::Imm(0)));
            }
            LogicalOp::And => {
                self.emit(Inst::MOV(res.into(), Operand::Imm(0)));
                for operand in operands {
                    let ok = self.label();
                    let reg = self.expr(operand)?;
                    self.emit(Inst::JNZ(reg, ok.clone()));
                    self.regs.free(reg);
                    self.emit(Inst::JMP(end.clone()));
                    self.emit_label(&ok);
                }
                self.emit(Inst::MOV(res.into(), Operand::Imm(1)));
            }
        }
        self.emit_label(&end);
        Ok(res)
    }

    /// The result replaces the left operand; the right one is released
    fn binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<Reg, Error> {
        let rl = self.expr(lhs)?;
        let rr = self.expr(rhs)?;
        match op {
            BinaryOp::Add => self.emit(Inst::ADD(rl, rr.into())),
            BinaryOp::Sub => self.emit(Inst::SUB(rl, rr.into())),
            BinaryOp::Mul => self.emit(Inst::MUL(rl, rr)),
            BinaryOp::Div => self.emit(Inst::DIV(rl, rr)),
            BinaryOp::Eq => self.compare(rl, rl, rr, Flag::Equal),
            BinaryOp::Le => self.compare(rl, rl, rr, Flag::LessEq),
            BinaryOp::Ge => self.compare(rl, rr, rl, Flag::LessEq),
            BinaryOp::Ne => {
                self.compare(rl, rl, rr, Flag::Equal);
                self.negate(rl, rr);
            }
            // l < r  <=>  !(r <= l)
            BinaryOp::Lt => {
                self.compare(rl, rr, rl, Flag::LessEq);
                self.negate(rl, rr);
            }
            // l > r  <=>  !(l <= r)
            BinaryOp::Gt => {
                self.compare(rl, rl, rr, Flag::LessEq);
                self.negate(rl, rr);
            }
        }
        self.regs.free(rr);
        Ok(rl)
    }

    /// `cmp a, b` then materialize the flag into `dst`
    fn compare(&mut self, dst: Reg, a: Reg, b: Reg, flag: Flag) {
        self.emit(Inst::CMP(a, b));
        self.emit(Inst::FLG(dst, flag));
    }

    /// Logical not of a boolean in `reg`, clobbering `scratch`
    fn negate(&mut self, reg: Reg, scratch: Reg) {
        self.emit(Inst::MOV(scratch.into(), Operand::Imm(0)));
        self.emit(Inst::CMP(reg, scratch));
        self.emit(Inst::FLG(reg, Flag::Equal));
    }

    fn unary(&mut self, op: UnaryOp, operand: &Expr, pos: &Pos) -> Result<Reg, Error> {
        let src = self.expr(operand)?;
        match op {
            UnaryOp::Not => {
                let zero = self.regs.alloc(pos)?;
                self.negate(src, zero);
                self.regs.free(zero);
                Ok(src)
            }
            UnaryOp::Neg => {
                let dst = self.regs.alloc(pos)?;
                self.emit(Inst::MOV(dst.into(), Operand::Imm(0)));
                self.emit(Inst::SUB(dst, src.into()));
                self.regs.free(src);
                Ok(dst)
            }
            UnaryOp::Deref => {
                let dst = self.regs.alloc(pos)?;
                self.emit(Inst::MOV(dst.into(), Addr::Reg(src).into()));
                self.regs.free(src);
                Ok(dst)
            }
        }
    }

    /// Live registers survive the call on the stack
    fn call(&mut self, callee: &Expr, args: &[Expr], pos: &Pos) -> Result<Reg, Error> {
        let saved = self.regs.live_regs();
        for reg in &saved {
            self.emit(Inst::PUSH(*reg));
        }

        let target = self.expr(callee)?;
        for arg in args {
            let reg = self.expr(arg)?;
            self.emit(Inst::PUSH(reg));
            self.regs.free(reg);
        }
        self.emit(Inst::CALL(target));
        self.regs.free(target);
        if !args.is_empty() {
            let bytes = (WORD * args.len()) as u16;
            self.emit(Inst::ADD(Reg::SP, Operand::Imm(bytes)));
        }

        for reg in saved.iter().rev() {
            self.emit(Inst::POP(*reg));
        }
        let dst = self.regs.alloc(pos)?;
        self.emit(Inst::MOV(dst.into(), Reg::RV.into()));
        Ok(dst)
    }
}

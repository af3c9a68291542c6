use crate::{
    error::Error,
    grammer::{token::Pos, types::Type},
};
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    /// Frame-relative slot: positive for parameters, negative for locals
    Stack {
        offset: i16,
        ty: Type,
        constant: bool,
    },
    /// File-scope data addressed by its label
    Static { ty: Type, constant: bool },
    Func { params: usize, defined: bool },
}

impl Symbol {
    pub fn is_constant(&self) -> bool {
        match self {
            Symbol::Stack { constant, .. } | Symbol::Static { constant, .. } => *constant,
            Symbol::Func { .. } => false,
        }
    }
}

/// File-scope names plus a stack of block scopes for the function being generated.
#[derive(Debug, Default)]
pub struct Symbols {
    globals: IndexMap<String, Symbol>,
    scopes: Vec<IndexMap<String, Symbol>>,
}

impl Symbols {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(IndexMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Drop every function-local binding
    pub fn clear_scopes(&mut self) {
        self.scopes.clear();
    }

    /// Declare in the innermost scope. A function prototype may be
    /// completed by exactly one definition; anything else is a redeclaration.
    pub fn declare(&mut self, name: &str, symbol: Symbol, pos: &Pos) -> Result<(), Error> {
        let scope = match self.scopes.last_mut() {
            Some(scope) => scope,
            None if is_generated_label(name) => {
                return Err(Error::ReservedName(pos.into(), name.to_string()))
            }
            None => &mut self.globals,
        };
        let symbol = match (scope.get(name), symbol) {
            (None, symbol) => symbol,
            (
                Some(Symbol::Func {
                    params, defined, ..
                }),
                Symbol::Func {
                    params: n,
                    defined: d,
                },
            ) if *params == n && !(*defined && d) => Symbol::Func {
                params: n,
                defined: *defined || d,
            },
            (Some(_), _) => return Err(Error::Redeclared(pos.into(), name.to_string())),
        };
        scope.insert(name.to_string(), symbol);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .or_else(|| self.globals.get(name))
    }

    /// File-scope data in declaration order
    pub fn statics(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.globals.iter().filter_map(|(name, symbol)| match symbol {
            Symbol::Static { ty, .. } => Some((name.as_str(), ty)),
            _ => None,
        })
    }
}

/// File-scope names become labels, so `L<n>` and `S<n>` are taken
fn is_generated_label(name: &str) -> bool {
    match name.strip_prefix('L').or_else(|| name.strip_prefix('S')) {
        Some(digits) => !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POS: Pos = Pos {
        file: "test.c",
        row: 3,
        col: 5,
    };

    fn int(offset: i16) -> Symbol {
        Symbol::Stack {
            offset,
            ty: Type::Int,
            constant: false,
        }
    }

    fn func(params: usize, defined: bool) -> Symbol {
        Symbol::Func { params, defined }
    }

    #[test]
    fn shadowing() {
        let mut symbols = Symbols::new();
        let global = Symbol::Static {
            ty: Type::Int,
            constant: false,
        };
        symbols.declare("x", global.clone(), &POS).unwrap();
        symbols.push_scope();
        symbols.declare("x", int(-2), &POS).unwrap();
        assert_eq!(symbols.lookup("x"), Some(&int(-2)));
        symbols.push_scope();
        symbols.declare("x", int(-4), &POS).unwrap();
        assert_eq!(symbols.lookup("x"), Some(&int(-4)));
        symbols.pop_scope();
        assert_eq!(symbols.lookup("x"), Some(&int(-2)));
        symbols.clear_scopes();
        assert_eq!(symbols.lookup("x"), Some(&global));
    }

    #[test]
    fn redeclared() {
        let mut symbols = Symbols::new();
        symbols.push_scope();
        symbols.declare("a", int(4), &POS).unwrap();
        match symbols.declare("a", int(-2), &POS) {
            Err(Error::Redeclared(loc, name)) => {
                assert_eq!((loc.row, loc.col), (3, 5));
                assert_eq!(name, "a");
            }
            other => panic!("expected redeclaration, got {:?}", other),
        }
    }

    #[test]
    fn prototype() {
        let mut symbols = Symbols::new();
        symbols.declare("f", func(1, false), &POS).unwrap();
        symbols.declare("f", func(1, true), &POS).unwrap();
        assert_eq!(symbols.lookup("f"), Some(&func(1, true)));
        assert!(symbols.declare("f", func(1, true), &POS).is_err());
        assert!(symbols.declare("g", func(0, true), &POS).is_ok());
        assert!(symbols.declare("g", func(2, false), &POS).is_err());
    }

    #[test]
    fn reserved_labels() {
        let mut symbols = Symbols::new();
        for name in ["L0", "L12", "S3"] {
            match symbols.declare(name, func(0, true), &POS) {
                Err(Error::ReservedName(_, found)) => assert_eq!(found, name),
                other => panic!("expected reserved name, got {:?}", other),
            }
        }
        for name in ["L", "S", "Lx", "L0a", "l0", "SL0"] {
            assert!(symbols.declare(name, func(0, true), &POS).is_ok(), "{name}");
        }
        symbols.push_scope();
        assert!(symbols.declare("L0", int(-2), &POS).is_ok());
    }

    #[test]
    fn statics_in_order() {
        let mut symbols = Symbols::new();
        for name in ["b", "a", "c"] {
            let ty = Type::Char;
            symbols
                .declare(name, Symbol::Static { ty, constant: false }, &POS)
                .unwrap();
        }
        symbols.declare("main", func(0, true), &POS).unwrap();
        let names: Vec<_> = symbols.statics().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }
}

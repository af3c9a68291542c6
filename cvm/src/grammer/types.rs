use serde::Serialize;
use std::fmt;

/// Word size of the target machine in bytes
pub const WORD: usize = 2;

/// Pointee of a pointer type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Base {
    Void,
    Int,
    Char,
}

/// Element of an array type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Elem {
    Int,
    Char,
    Ptr(Base),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Type {
    Void,
    Int,
    Char,
    Ptr(Base),
    Array(Elem, usize),
}

impl Type {
    pub fn size(&self) -> usize {
        match self {
            Type::Void => 0,
            Type::Char => 1,
            Type::Int | Type::Ptr(_) => WORD,
            Type::Array(elem, count) => elem.size() * count,
        }
    }

    /// Number of stack words the type occupies
    pub fn words(&self) -> usize {
        self.size().div_ceil(WORD).max(1)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_, _))
    }

    /// `T` -> `T*`; only one level of indirection exists
    pub fn pointer(self) -> Option<Type> {
        match self {
            Type::Void => Some(Type::Ptr(Base::Void)),
            Type::Int => Some(Type::Ptr(Base::Int)),
            Type::Char => Some(Type::Ptr(Base::Char)),
            Type::Ptr(_) | Type::Array(_, _) => None,
        }
    }

    /// `T` -> `T[count]`; void has no array form
    pub fn array(self, count: usize) -> Option<Type> {
        let elem = match self {
            Type::Int => Elem::Int,
            Type::Char => Elem::Char,
            Type::Ptr(base) => Elem::Ptr(base),
            Type::Void | Type::Array(_, _) => return None,
        };
        Some(Type::Array(elem, count))
    }
}

impl Elem {
    pub fn size(&self) -> usize {
        match self {
            Elem::Char => 1,
            Elem::Int | Elem::Ptr(_) => WORD,
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Base::Void => write!(f, "void"),
            Base::Int => write!(f, "int"),
            Base::Char => write!(f, "char"),
        }
    }
}

impl fmt::Display for Elem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Elem::Int => write!(f, "int"),
            Elem::Char => write!(f, "char"),
            Elem::Ptr(base) => write!(f, "{}*", base),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Int => write!(f, "int"),
            Type::Char => write!(f, "char"),
            Type::Ptr(base) => write!(f, "{}*", base),
            Type::Array(elem, count) => write!(f, "{}[{}]", elem, count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_size() {
        assert_eq!(Type::Void.size(), 0);
        assert_eq!(Type::Char.size(), 1);
        assert_eq!(Type::Int.size(), 2);
        assert_eq!(Type::Ptr(Base::Void).size(), 2);
        assert_eq!(Type::Ptr(Base::Char).size(), 2);
    }

    #[test]
    fn array_size() {
        for n in [1, 2, 7, 100] {
            assert_eq!(Type::Int.array(n).map(|t| t.size()), Some(2 * n));
            assert_eq!(Type::Char.array(n).map(|t| t.size()), Some(n));
            assert_eq!(Type::Ptr(Base::Int).array(n).map(|t| t.size()), Some(2 * n));
        }
    }

    #[test]
    fn words() {
        assert_eq!(Type::Int.words(), 1);
        assert_eq!(Type::Char.words(), 1);
        assert_eq!(Type::Array(Elem::Char, 3).words(), 2);
        assert_eq!(Type::Array(Elem::Int, 3).words(), 3);
    }

    #[test]
    fn derivation() {
        assert_eq!(Type::Void.array(4), None);
        assert_eq!(Type::Int.pointer(), Some(Type::Ptr(Base::Int)));
        assert_eq!(Type::Ptr(Base::Int).pointer(), None);
        assert_eq!(
            Type::Ptr(Base::Void).array(2),
            Some(Type::Array(Elem::Ptr(Base::Void), 2))
        );
    }

    #[test]
    fn display() {
        assert_eq!(Type::Ptr(Base::Char).to_string(), "char*");
        assert_eq!(Type::Array(Elem::Ptr(Base::Int), 3).to_string(), "int*[3]");
    }
}

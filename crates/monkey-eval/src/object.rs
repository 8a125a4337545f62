//! Runtime values of the Monkey language.

use crate::env::ScopeRef;
use crate::error::EvalResult;
use crate::output::Output;
use monkey_ast::ast::{BlockStatement, Identifier};
use std::fmt;
use std::rc::Rc;

/// Type tag of a runtime value, used for dispatch and in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Integer,
    Boolean,
    Null,
    String,
    Array,
    Function,
    Builtin,
    ReturnValue,
    Error,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Boolean => "BOOLEAN",
            Self::Null => "NULL",
            Self::String => "STRING",
            Self::Array => "ARRAY",
            Self::Function => "FUNCTION",
            Self::Builtin => "BUILTIN",
            Self::ReturnValue => "RETURN_VALUE",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A runtime value.
///
/// Strings, arrays and functions are reference-counted: cloning an `Object`
/// shares the payload, and that sharing is what `==` observes for them
/// (see [`Object::same_object`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    Null,
    String(Rc<str>),
    Array(Rc<Vec<Object>>),
    Function(Rc<Function>),
    Builtin(Builtin),
}

impl Object {
    pub const TRUE: Object = Object::Boolean(true);
    pub const FALSE: Object = Object::Boolean(false);
    pub const NULL: Object = Object::Null;

    /// Map a native bool onto one of the two boolean constants.
    pub fn from_bool(value: bool) -> Object {
        if value {
            Self::TRUE
        } else {
            Self::FALSE
        }
    }

    pub fn string(text: impl Into<Rc<str>>) -> Object {
        Object::String(text.into())
    }

    pub fn array(elements: Vec<Object>) -> Object {
        Object::Array(Rc::new(elements))
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Integer(_) => ObjectType::Integer,
            Self::Boolean(_) => ObjectType::Boolean,
            Self::Null => ObjectType::Null,
            Self::String(_) => ObjectType::String,
            Self::Array(_) => ObjectType::Array,
            Self::Function(_) => ObjectType::Function,
            Self::Builtin(_) => ObjectType::Builtin,
        }
    }

    /// Null and `false` are falsy; everything else, including `0`, `""` and
    /// `[]`, is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Null | Self::Boolean(false))
    }

    /// Identity comparison used by `==` and `!=` on non-integers.
    ///
    /// Booleans and null compare by value since only one instance of each
    /// exists. Strings, arrays and functions compare by allocation, so two
    /// equal strings built separately are *not* the same object. Integers are
    /// never identical here; integer equality is handled before this rule.
    pub fn same_object(&self, other: &Object) -> bool {
        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Null, Self::Null) => true,
            (Self::String(a), Self::String(b)) => Rc::ptr_eq(a, b),
            (Self::Array(a), Self::Array(b)) => Rc::ptr_eq(a, b),
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Builtin(a), Self::Builtin(b)) => a.name == b.name,
            _ => false,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Null => f.write_str("null"),
            Self::String(s) => f.write_str(s),
            Self::Array(elements) => {
                f.write_str("[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str("]")
            }
            Self::Function(func) => write!(f, "{func}"),
            Self::Builtin(_) => f.write_str("builtin function"),
        }
    }
}

/// A closure: parameters and body of a function literal plus the scope that
/// was active when the literal was evaluated. Holding the function keeps
/// that scope alive.
#[derive(Debug, PartialEq)]
pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: Rc<BlockStatement>,
    pub scope: ScopeRef,
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<&str> = self.parameters.iter().map(|p| p.name.as_str()).collect();
        write!(f, "fn({}) {{\n{}\n}}", params.join(", "), self.body)
    }
}

/// Signature shared by every native function.
pub type BuiltinFn = fn(&[Object], &mut Output) -> EvalResult<Object>;

/// A native function registered under a fixed name.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl Builtin {
    pub fn call(&self, args: &[Object], output: &mut Output) -> EvalResult<Object> {
        (self.func)(args, output)
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags() {
        assert_eq!(Object::Integer(1).object_type().to_string(), "INTEGER");
        assert_eq!(Object::TRUE.object_type().to_string(), "BOOLEAN");
        assert_eq!(Object::NULL.object_type().to_string(), "NULL");
        assert_eq!(Object::string("a").object_type().to_string(), "STRING");
        assert_eq!(Object::array(vec![]).object_type().to_string(), "ARRAY");
        assert_eq!(ObjectType::ReturnValue.to_string(), "RETURN_VALUE");
        assert_eq!(ObjectType::Error.to_string(), "ERROR");
    }

    #[test]
    fn test_display() {
        assert_eq!(Object::Integer(-7).to_string(), "-7");
        assert_eq!(Object::FALSE.to_string(), "false");
        assert_eq!(Object::NULL.to_string(), "null");
        assert_eq!(Object::string("hi there").to_string(), "hi there");
        let nested = Object::array(vec![
            Object::Integer(1),
            Object::string("a"),
            Object::array(vec![Object::TRUE]),
        ]);
        assert_eq!(nested.to_string(), "[1, a, [true]]");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Object::NULL.is_truthy());
        assert!(!Object::FALSE.is_truthy());
        assert!(Object::TRUE.is_truthy());
        assert!(Object::Integer(0).is_truthy());
        assert!(Object::string("").is_truthy());
        assert!(Object::array(vec![]).is_truthy());
    }

    #[test]
    fn test_from_bool_yields_constants() {
        assert_eq!(Object::from_bool(true), Object::TRUE);
        assert_eq!(Object::from_bool(false), Object::FALSE);
    }

    #[test]
    fn test_same_object_is_identity_for_shared_payloads() {
        let s = Object::string("abc");
        assert!(s.same_object(&s.clone()));
        assert!(!s.same_object(&Object::string("abc")));

        let a = Object::array(vec![Object::Integer(1)]);
        assert!(a.same_object(&a.clone()));
        assert!(!a.same_object(&Object::array(vec![Object::Integer(1)])));

        assert!(Object::TRUE.same_object(&Object::from_bool(true)));
        assert!(!Object::TRUE.same_object(&Object::FALSE));
        assert!(Object::NULL.same_object(&Object::NULL));
        assert!(!Object::Integer(1).same_object(&Object::Integer(1)));
    }
}

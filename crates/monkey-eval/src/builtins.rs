//! Native functions available to every Monkey program.
//!
//! The registry is built once per interpreter and never changes afterwards.
//! Array builtins never mutate their input; `rest` and `push` always return
//! a freshly allocated array.

use crate::error::{EvalError, EvalResult};
use crate::object::{Builtin, BuiltinFn, Object, ObjectType};
use crate::output::Output;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Fixed table of builtins, keyed by the name programs call them with.
#[derive(Debug, Clone)]
pub struct Builtins {
    table: BTreeMap<&'static str, Builtin>,
}

impl Builtins {
    pub fn new() -> Self {
        const ENTRIES: [(&str, BuiltinFn); 6] = [
            ("len", builtin_len),
            ("first", builtin_first),
            ("last", builtin_last),
            ("rest", builtin_rest),
            ("push", builtin_push),
            ("puts", builtin_puts),
        ];
        let table = ENTRIES
            .into_iter()
            .map(|(name, func)| (name, Builtin { name, func }))
            .collect();
        Self { table }
    }

    pub fn get(&self, name: &str) -> Option<Builtin> {
        self.table.get(name).copied()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.table.keys().copied()
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new()
    }
}

fn check_arity(args: &[Object], want: usize) -> EvalResult<()> {
    if args.len() != want {
        return Err(EvalError::WrongArgumentCount {
            got: args.len(),
            want,
        });
    }
    Ok(())
}

fn expect_array<'a>(builtin: &'static str, arg: &'a Object) -> EvalResult<&'a Rc<Vec<Object>>> {
    match arg {
        Object::Array(elements) => Ok(elements),
        other => Err(EvalError::ArgumentMustBe {
            builtin,
            expected: ObjectType::Array,
            got: other.object_type(),
        }),
    }
}

fn builtin_len(args: &[Object], _: &mut Output) -> EvalResult<Object> {
    check_arity(args, 1)?;
    match &args[0] {
        Object::String(s) => Ok(Object::Integer(s.chars().count() as i64)),
        Object::Array(elements) => Ok(Object::Integer(elements.len() as i64)),
        other => Err(EvalError::UnsupportedArgument {
            builtin: "len",
            got: other.object_type(),
        }),
    }
}

fn builtin_first(args: &[Object], _: &mut Output) -> EvalResult<Object> {
    check_arity(args, 1)?;
    let elements = expect_array("first", &args[0])?;
    Ok(elements.first().cloned().unwrap_or(Object::NULL))
}

fn builtin_last(args: &[Object], _: &mut Output) -> EvalResult<Object> {
    check_arity(args, 1)?;
    let elements = expect_array("last", &args[0])?;
    Ok(elements.last().cloned().unwrap_or(Object::NULL))
}

fn builtin_rest(args: &[Object], _: &mut Output) -> EvalResult<Object> {
    check_arity(args, 1)?;
    let elements = expect_array("rest", &args[0])?;
    match elements.split_first() {
        Some((_, tail)) => Ok(Object::array(tail.to_vec())),
        None => Ok(Object::NULL),
    }
}

fn builtin_push(args: &[Object], _: &mut Output) -> EvalResult<Object> {
    check_arity(args, 2)?;
    let elements = expect_array("push", &args[0])?;
    let mut pushed = Vec::with_capacity(elements.len() + 1);
    pushed.extend(elements.iter().cloned());
    pushed.push(args[1].clone());
    Ok(Object::array(pushed))
}

fn builtin_puts(args: &[Object], output: &mut Output) -> EvalResult<Object> {
    for arg in args {
        output.println(&arg.to_string());
    }
    Ok(Object::NULL)
}

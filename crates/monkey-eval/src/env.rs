//! Lexically scoped variable environment for the Monkey evaluator.
//!
//! Scopes live in an arena owned by one [`Environment`]. Everything that
//! needs a scope to stay alive holds a [`ScopeRef`]: closures, child scopes
//! and the call frame currently running in it. A call scope nobody else
//! holds is freed as soon as the call returns. Scopes kept alive only by
//! reference cycles (a closure stored in the scope it captured) are found
//! by [`Environment::collect`].

use crate::error::{EvalError, EvalResult};
use crate::object::{Function, Object};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};

/// Arena size below which cycle collection is not triggered by a call.
const MIN_COLLECTION_THRESHOLD: usize = 64;

struct ScopeKey {
    /// Identity of the owning arena.
    arena: Weak<()>,
    index: usize,
}

/// Counted handle on a scope in an [`Environment`].
///
/// The scope stays allocated while any handle to it exists. Handles compare
/// by identity.
#[derive(Clone)]
pub struct ScopeRef {
    key: Rc<ScopeKey>,
}

impl ScopeRef {
    fn new(arena: &Rc<()>, index: usize) -> Self {
        Self {
            key: Rc::new(ScopeKey {
                arena: Rc::downgrade(arena),
                index,
            }),
        }
    }

    pub(crate) fn index(&self) -> usize {
        self.key.index
    }
}

impl PartialEq for ScopeRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.key, &other.key)
    }
}

impl fmt::Debug for ScopeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeRef({})", self.key.index)
    }
}

/// A single scope level.
#[derive(Debug)]
struct Scope {
    bindings: BTreeMap<String, Object>,
    parent: Option<ScopeRef>,
    /// Dead once the last handle is dropped.
    key: Weak<ScopeKey>,
}

impl Scope {
    fn new(parent: Option<ScopeRef>, handle: &ScopeRef) -> Self {
        Self {
            bindings: BTreeMap::new(),
            parent,
            key: Rc::downgrade(&handle.key),
        }
    }

    fn is_dead(&self) -> bool {
        self.key.strong_count() == 0
    }
}

/// Something in the arena graph that can hold a [`ScopeRef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Node {
    Scope(usize),
    Function(*const Function),
    Array(*const Vec<Object>),
}

fn object_node(value: &Object) -> Option<Node> {
    match value {
        Object::Function(func) => Some(Node::Function(Rc::as_ptr(func))),
        Object::Array(items) => Some(Node::Array(Rc::as_ptr(items))),
        _ => None,
    }
}

/// Arena of scopes linked to their enclosing scope.
///
/// Lookups walk from a scope outward through its parents.
/// `set` only ever writes to the scope it is given; a child never mutates
/// its parent. Freed slots go on a free list and are reused.
#[derive(Debug)]
pub struct Environment {
    tag: Rc<()>,
    root: ScopeRef,
    scopes: Vec<Option<Scope>>,
    free: Vec<usize>,
    live: usize,
    next_collection: usize,
}

impl Environment {
    /// Create an environment holding only the root scope.
    pub fn new() -> Self {
        let tag = Rc::new(());
        let root = ScopeRef::new(&tag, 0);
        let scopes = vec![Some(Scope::new(None, &root))];
        Self {
            tag,
            root,
            scopes,
            free: Vec::new(),
            live: 1,
            next_collection: MIN_COLLECTION_THRESHOLD,
        }
    }

    /// The global scope, alive as long as the environment.
    pub fn root(&self) -> ScopeRef {
        self.root.clone()
    }

    /// True if `scope` was allocated by this environment.
    pub fn owns(&self, scope: &ScopeRef) -> bool {
        std::ptr::eq(scope.key.arena.as_ptr(), Rc::as_ptr(&self.tag))
    }

    /// Fail with [`EvalError::ForeignScope`] unless `scope` is ours.
    pub fn check(&self, scope: &ScopeRef) -> EvalResult<()> {
        if self.owns(scope) {
            Ok(())
        } else {
            Err(EvalError::ForeignScope)
        }
    }

    fn slot(&self, scope: &ScopeRef) -> Option<&Scope> {
        if !self.owns(scope) {
            return None;
        }
        self.scopes.get(scope.index())?.as_ref()
    }

    /// Allocate a child scope enclosed by `parent`.
    pub fn new_enclosed(&mut self, parent: &ScopeRef) -> EvalResult<ScopeRef> {
        self.check(parent)?;
        let index = self.free.pop().unwrap_or(self.scopes.len());
        let handle = ScopeRef::new(&self.tag, index);
        let scope = Scope::new(Some(parent.clone()), &handle);
        if index == self.scopes.len() {
            self.scopes.push(Some(scope));
        } else {
            self.scopes[index] = Some(scope);
        }
        self.live += 1;
        tracing::trace!(scope = index, parent = parent.index(), "scope allocated");
        Ok(handle)
    }

    /// Look up a name in `scope`, then in each enclosing scope.
    ///
    /// A scope from another environment binds nothing.
    pub fn get(&self, scope: &ScopeRef, name: &str) -> Option<Object> {
        let mut current = self.slot(scope);
        while let Some(scope) = current {
            if let Some(value) = scope.bindings.get(name) {
                return Some(value.clone());
            }
            current = scope.parent.as_ref().and_then(|parent| self.slot(parent));
        }
        None
    }

    /// Bind `name` in `scope` itself, overwriting any local binding and
    /// hiding any outer one.
    pub fn set(&mut self, scope: &ScopeRef, name: &str, value: Object) -> EvalResult<()> {
        self.check(scope)?;
        let slot = self
            .scopes
            .get_mut(scope.index())
            .and_then(Option::as_mut)
            .ok_or(EvalError::ForeignScope)?;
        slot.bindings.insert(name.to_string(), value);
        Ok(())
    }

    /// Hand back a finished call scope.
    ///
    /// If `scope` was the last handle, the scope is freed at once along with
    /// anything that only it kept alive. Otherwise a closure still holds it
    /// and a cycle collection may run once the arena has grown enough.
    pub fn release(&mut self, scope: ScopeRef) {
        if !self.owns(&scope) || scope == self.root {
            return;
        }
        let index = scope.index();
        let unshared = Rc::strong_count(&scope.key) == 1;
        drop(scope);
        if unshared {
            self.free_dead(index);
        } else if self.live >= self.next_collection {
            self.collect();
        }
    }

    /// Free the dead scope at `index`, then every scope that dies with it.
    fn free_dead(&mut self, index: usize) {
        let mut pending = vec![index];
        while let Some(index) = pending.pop() {
            let dead = matches!(self.scopes.get(index), Some(Some(scope)) if scope.is_dead());
            if !dead {
                continue;
            }
            let Some(scope) = self.scopes[index].take() else {
                continue;
            };
            self.free.push(index);
            self.live -= 1;
            tracing::trace!(scope = index, "scope released");

            if let Some(parent) = &scope.parent {
                pending.push(parent.index());
            }
            let mut values: Vec<&Object> = scope.bindings.values().collect();
            while let Some(value) = values.pop() {
                match value {
                    Object::Function(func) if self.owns(&func.scope) => {
                        pending.push(func.scope.index())
                    }
                    Object::Array(items) => values.extend(items.iter()),
                    _ => {}
                }
            }
            // Dropping the scope releases its handles before `pending` is checked.
            drop(values);
            drop(scope);
        }
    }

    /// Free every scope unreachable from the root or from a handle held
    /// outside the arena. Returns the number of scopes freed.
    pub fn collect(&mut self) -> usize {
        let garbage = self.unreachable_scopes();
        let mut freed = Vec::with_capacity(garbage.len());
        for index in garbage {
            if let Some(scope) = self.scopes[index].take() {
                freed.push(scope);
                self.free.push(index);
            }
        }
        self.live -= freed.len();
        let count = freed.len();
        drop(freed);

        self.next_collection = (self.live * 2).max(MIN_COLLECTION_THRESHOLD);
        tracing::debug!(freed = count, live = self.live, "scopes collected");
        count
    }

    /// Trial deletion: count the handles each node receives from inside the
    /// arena; a node with more handles than that is held from outside and
    /// roots a mark pass.
    fn unreachable_scopes(&self) -> Vec<usize> {
        let mut objects: HashMap<Node, &Object> = HashMap::new();
        let mut refs: HashMap<Node, usize> = HashMap::new();
        let mut values: Vec<&Object> = Vec::new();
        for (index, slot) in self.scopes.iter().enumerate() {
            if let Some(scope) = slot {
                refs.insert(Node::Scope(index), scope.key.strong_count());
                values.extend(scope.bindings.values());
            }
        }
        while let Some(value) = values.pop() {
            let Some(node) = object_node(value) else {
                continue;
            };
            if objects.insert(node, value).is_some() {
                continue;
            }
            match value {
                Object::Function(func) => {
                    refs.insert(node, Rc::strong_count(func));
                }
                Object::Array(items) => {
                    refs.insert(node, Rc::strong_count(items));
                    values.extend(items.iter());
                }
                _ => {}
            }
        }

        let mut targets = Vec::new();
        for node in refs.keys() {
            self.edges(*node, &objects, &mut targets);
        }
        for target in &targets {
            if let Some(count) = refs.get_mut(target) {
                *count = count.saturating_sub(1);
            }
        }

        let mut pending: Vec<Node> = refs
            .iter()
            .filter(|(node, count)| **count > 0 || **node == Node::Scope(0))
            .map(|(node, _)| *node)
            .collect();
        let mut marked = HashSet::new();
        while let Some(node) = pending.pop() {
            if !marked.insert(node) {
                continue;
            }
            targets.clear();
            self.edges(node, &objects, &mut targets);
            pending.append(&mut targets);
        }

        self.scopes
            .iter()
            .enumerate()
            .filter(|(index, slot)| slot.is_some() && !marked.contains(&Node::Scope(*index)))
            .map(|(index, _)| index)
            .collect()
    }

    /// Nodes `node` holds a counted reference to.
    fn edges(&self, node: Node, objects: &HashMap<Node, &Object>, out: &mut Vec<Node>) {
        match node {
            Node::Scope(index) => {
                if let Some(Some(scope)) = self.scopes.get(index) {
                    if let Some(parent) = &scope.parent {
                        out.push(Node::Scope(parent.index()));
                    }
                    out.extend(scope.bindings.values().filter_map(object_node));
                }
            }
            Node::Function(_) | Node::Array(_) => match objects.get(&node) {
                Some(Object::Function(func)) if self.owns(&func.scope) => {
                    out.push(Node::Scope(func.scope.index()))
                }
                Some(Object::Array(items)) => out.extend(items.iter().filter_map(object_node)),
                _ => {}
            },
        }
    }

    /// Number of allocated scopes, the root included.
    pub fn live_scopes(&self) -> usize {
        self.live
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

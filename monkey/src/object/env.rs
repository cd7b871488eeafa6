//! Environment for variable bindings
//!
//! Frames are shared through `Rc<RefCell<_>>` and a closure keeps its
//! defining frame alive, so a frame that binds one of its own closures would
//! own itself. Two rules keep frames collectable:
//! - A function bound in the very frame it closes over is stored without its
//!   environment link and gets it back on lookup.
//! - [`release_frame`] clears a finished frame that is reachable only through
//!   its own bindings (closures parked in arrays, hashes or child frames).

use super::{Function, Object};
use crate::ast::Block;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Shared reference to an environment
pub type EnvRef = Rc<RefCell<Environment>>;

/// What a name is bound to
#[derive(Debug)]
enum Slot {
    Value(Object),
    /// Function closed over the environment holding this slot
    OwnClosure { params: Rc<[String]>, body: Rc<Block> },
}

/// Environment holding variable bindings
#[derive(Debug, Default)]
pub struct Environment {
    /// Variable bindings in this scope
    bindings: FxHashMap<String, Slot>,
    /// Enclosing environment for lexical scoping
    parent: Option<EnvRef>,
    /// The `Rc` this environment lives in, set by `into_ref`
    this: Weak<RefCell<Environment>>,
}

impl Environment {
    /// Create a new top-level environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new environment enclosed by `parent`
    pub fn with_parent(parent: EnvRef) -> Self {
        Environment {
            parent: Some(parent),
            ..Self::default()
        }
    }

    /// Wrap in Rc<RefCell<>>
    pub fn into_ref(self) -> EnvRef {
        Rc::new_cyclic(|this| {
            let mut env = self;
            env.this = this.clone();
            RefCell::new(env)
        })
    }

    /// Bind a name in the current scope, replacing any previous binding
    pub fn define(&mut self, name: String, value: Object) {
        let slot = match value {
            Object::Function(func) if self.is(&func.env) => Slot::OwnClosure {
                params: Rc::clone(&func.params),
                body: Rc::clone(&func.body),
            },
            other => Slot::Value(other),
        };
        self.bindings.insert(name, slot);
    }

    /// Whether `env` is the reference this environment lives in
    fn is(&self, env: &EnvRef) -> bool {
        std::ptr::eq(Rc::as_ptr(env), self.this.as_ptr())
    }

    /// Look up a name, walking outward through enclosing scopes
    pub fn get(&self, name: &str) -> Option<Object> {
        match self.bindings.get(name) {
            Some(slot) => self.load(slot),
            None => self.parent.as_ref()?.borrow().get(name),
        }
    }

    fn load(&self, slot: &Slot) -> Option<Object> {
        match slot {
            Slot::Value(value) => Some(value.clone()),
            Slot::OwnClosure { params, body } => self.this.upgrade().map(|env| {
                Object::Function(Rc::new(Function {
                    params: Rc::clone(params),
                    body: Rc::clone(body),
                    env,
                }))
            }),
        }
    }

    /// Copy every binding of `other`'s own scope into this scope
    pub fn merge(&mut self, other: &Environment) {
        for (name, slot) in &other.bindings {
            if let Some(value) = other.load(slot) {
                self.define(name.clone(), value);
            }
        }
    }

    /// Number of bindings in this scope alone
    pub fn local_count(&self) -> usize {
        self.bindings.len()
    }
}

/// Create a child environment from a parent reference
pub fn child_env(parent: &EnvRef) -> EnvRef {
    Environment::with_parent(Rc::clone(parent)).into_ref()
}

/// Drop the bindings of a finished frame when nothing outside the frame's
/// own reference graph still reaches it. `frame` is the caller's last handle.
pub fn release_frame(frame: &EnvRef) {
    if Rc::strong_count(frame) == 1 {
        return;
    }
    let mut graph = Graph::default();
    graph.visit_env(frame, frame);
    for env in graph.into_garbage(frame) {
        let bindings = std::mem::take(&mut env.borrow_mut().bindings);
        drop(bindings);
    }
}

fn addr<T: ?Sized>(rc: &Rc<T>) -> usize {
    Rc::as_ptr(rc) as *const () as usize
}

/// Whether `env` is `root` or nested inside it
fn within(root: &EnvRef, env: &EnvRef) -> bool {
    let mut current = Some(Rc::clone(env));
    while let Some(env) = current {
        if Rc::ptr_eq(&env, root) {
            return true;
        }
        current = env.borrow().parent.clone();
    }
    false
}

struct Node {
    /// Strong count seen on first visit
    strong: usize,
    /// References held by other nodes of the graph
    internal: usize,
    edges: Vec<usize>,
    env: Option<EnvRef>,
}

/// Shared values reachable from a frame, for trial deletion
#[derive(Default)]
struct Graph {
    nodes: FxHashMap<usize, Node>,
}

impl Graph {
    /// Record a node; false if it was already seen
    fn enter(&mut self, id: usize, strong: usize) -> bool {
        if self.nodes.contains_key(&id) {
            return false;
        }
        let node = Node {
            strong,
            internal: 0,
            edges: Vec::new(),
            env: None,
        };
        self.nodes.insert(id, node);
        true
    }

    fn finish(&mut self, id: usize, edges: Vec<usize>, env: Option<EnvRef>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.edges = edges;
            node.env = env;
        }
    }

    fn visit_env(&mut self, root: &EnvRef, env: &EnvRef) -> usize {
        let id = addr(env);
        if self.enter(id, Rc::strong_count(env)) {
            let mut edges = Vec::new();
            {
                let scope = env.borrow();
                // the root's own parent lies outside the graph
                if let Some(parent) = scope.parent.as_ref().filter(|_| !Rc::ptr_eq(env, root)) {
                    if within(root, parent) {
                        edges.push(self.visit_env(root, parent));
                    }
                }
                for slot in scope.bindings.values() {
                    if let Slot::Value(value) = slot {
                        self.visit_value(root, value, &mut edges);
                    }
                }
            }
            self.finish(id, edges, Some(Rc::clone(env)));
        }
        id
    }

    fn visit_value(&mut self, root: &EnvRef, value: &Object, edges: &mut Vec<usize>) {
        let mut inner = Vec::new();
        let id = match value {
            Object::Array(elements) => {
                let id = addr(elements);
                if self.enter(id, Rc::strong_count(elements)) {
                    for element in elements.iter() {
                        self.visit_value(root, element, &mut inner);
                    }
                }
                id
            }
            Object::Hash(hash) => {
                let id = addr(hash);
                if self.enter(id, Rc::strong_count(hash)) {
                    for pair in hash.pairs() {
                        self.visit_value(root, &pair.value, &mut inner);
                    }
                }
                id
            }
            Object::Function(func) => {
                let id = addr(func);
                if self.enter(id, Rc::strong_count(func)) && within(root, &func.env) {
                    inner.push(self.visit_env(root, &func.env));
                }
                id
            }
            _ => return,
        };
        if !inner.is_empty() {
            self.finish(id, inner, None);
        }
        edges.push(id);
    }

    /// Environments of the graph that no outside reference keeps alive,
    /// or nothing when the root itself is still reachable
    fn into_garbage(mut self, root: &EnvRef) -> Vec<EnvRef> {
        let targets: Vec<usize> = self.nodes.values().flat_map(|n| n.edges.iter().copied()).collect();
        for id in targets {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.internal += 1;
            }
        }

        let root_id = addr(root);
        let mut pending: Vec<usize> = self
            .nodes
            .iter()
            .filter(|&(&id, node)| node.strong > node.internal + usize::from(id == root_id))
            .map(|(&id, _)| id)
            .collect();
        let mut reached = FxHashSet::default();
        while let Some(id) = pending.pop() {
            if reached.insert(id) {
                if let Some(node) = self.nodes.get(&id) {
                    pending.extend(node.edges.iter().copied());
                }
            }
        }

        if reached.contains(&root_id) {
            return Vec::new();
        }
        self.nodes
            .into_iter()
            .filter(|(id, _)| !reached.contains(id))
            .filter_map(|(_, node)| node.env)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::TRUE;

    fn closure(env: &EnvRef, captured: &str) -> Object {
        let body = crate::parser::parse_source(captured).0;
        Object::Function(Rc::new(Function {
            params: Rc::from(Vec::<String>::new()),
            body: Rc::new(Block {
                statements: body.statements,
            }),
            env: Rc::clone(env),
        }))
    }

    #[test]
    fn test_define_and_get() {
        let mut env = Environment::new();
        env.define("x".to_string(), Object::Integer(42));
        assert_eq!(env.get("x"), Some(Object::Integer(42)));
        assert_eq!(env.get("y"), None);
    }

    #[test]
    fn test_scope_chain() {
        let parent = Environment::new().into_ref();
        parent.borrow_mut().define("x".to_string(), Object::Integer(1));

        let child = child_env(&parent);
        child.borrow_mut().define("y".to_string(), Object::Integer(2));

        assert_eq!(child.borrow().get("x"), Some(Object::Integer(1)));
        assert_eq!(child.borrow().get("y"), Some(Object::Integer(2)));
        assert_eq!(parent.borrow().get("y"), None);
    }

    #[test]
    fn test_shadowing() {
        let parent = Environment::new().into_ref();
        parent.borrow_mut().define("x".to_string(), Object::Integer(1));

        let child = child_env(&parent);
        child.borrow_mut().define("x".to_string(), Object::Integer(2));

        assert_eq!(child.borrow().get("x"), Some(Object::Integer(2)));
        assert_eq!(parent.borrow().get("x"), Some(Object::Integer(1)));
    }

    #[test]
    fn test_child_sees_later_parent_bindings() {
        let parent = Environment::new().into_ref();
        let child = child_env(&parent);
        parent.borrow_mut().define("late".to_string(), TRUE);
        assert_eq!(child.borrow().get("late"), Some(TRUE));
    }

    #[test]
    fn test_lookup_through_grandparent() {
        let grandparent = Environment::new().into_ref();
        grandparent.borrow_mut().define("a".to_string(), Object::Integer(1));
        let child = child_env(&child_env(&grandparent));
        assert_eq!(child.borrow().get("a"), Some(Object::Integer(1)));
        assert_eq!(child.borrow().get("b"), None);
    }

    #[test]
    fn test_merge_overwrites_and_adds() {
        let mut dst = Environment::new();
        dst.define("x".to_string(), Object::Integer(1));
        dst.define("keep".to_string(), Object::Integer(0));

        let mut src = Environment::new();
        src.define("x".to_string(), Object::Integer(10));
        src.define("y".to_string(), Object::Integer(20));

        dst.merge(&src);
        assert_eq!(dst.get("x"), Some(Object::Integer(10)));
        assert_eq!(dst.get("y"), Some(Object::Integer(20)));
        assert_eq!(dst.get("keep"), Some(Object::Integer(0)));
        assert_eq!(dst.local_count(), 3);
    }

    #[test]
    fn test_merge_copies_only_own_scope() {
        let outer = Environment::new().into_ref();
        outer.borrow_mut().define("hidden".to_string(), TRUE);
        let src = child_env(&outer);
        src.borrow_mut().define("shown".to_string(), TRUE);

        let mut dst = Environment::new();
        dst.merge(&src.borrow());
        assert_eq!(dst.get("shown"), Some(TRUE));
        assert_eq!(dst.get("hidden"), None);
        assert_eq!(src.borrow().local_count(), 1);
    }

    #[test]
    fn test_own_closure_does_not_hold_its_frame() {
        let env = Environment::new().into_ref();
        let f = closure(&env, "1");
        env.borrow_mut().define("f".to_string(), f);
        assert_eq!(Rc::strong_count(&env), 1);

        let Some(Object::Function(found)) = env.borrow().get("f") else {
            panic!("expected a function");
        };
        assert!(Rc::ptr_eq(&found.env, &env));
    }

    #[test]
    fn test_merged_closure_keeps_module_frame() {
        let module = Environment::new().into_ref();
        module.borrow_mut().define("secret".to_string(), Object::Integer(7));
        let f = closure(&module, "secret");
        module.borrow_mut().define("f".to_string(), f);

        let caller = Environment::new().into_ref();
        caller.borrow_mut().merge(&module.borrow());
        drop(module);

        let Some(Object::Function(found)) = caller.borrow().get("f") else {
            panic!("expected a function");
        };
        assert_eq!(found.env.borrow().get("secret"), Some(Object::Integer(7)));
    }

    #[test]
    fn test_release_frame_breaks_cycle_through_array() {
        let payload = Rc::new(vec![Object::Integer(1)]);
        let frame = Environment::new().into_ref();
        let parked = Object::array(vec![closure(&frame, "1")]);
        frame.borrow_mut().define("fs".to_string(), parked);
        frame.borrow_mut().define("payload".to_string(), Object::Array(Rc::clone(&payload)));
        assert_eq!(Rc::strong_count(&frame), 2);

        release_frame(&frame);
        assert_eq!(frame.borrow().local_count(), 0);
        drop(frame);
        assert_eq!(Rc::strong_count(&payload), 1);
    }

    #[test]
    fn test_release_frame_keeps_escaped_closure() {
        let frame = Environment::new().into_ref();
        frame.borrow_mut().define("x".to_string(), Object::Integer(5));
        let escaped = closure(&frame, "x");
        frame.borrow_mut().define("fs".to_string(), Object::array(vec![escaped.clone()]));

        release_frame(&frame);
        assert_eq!(frame.borrow().local_count(), 2);
        let Object::Function(func) = escaped else {
            unreachable!()
        };
        assert_eq!(func.env.borrow().get("x"), Some(Object::Integer(5)));
    }
}

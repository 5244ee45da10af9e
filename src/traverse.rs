use serde_json::Value;
use tracing::debug;

use crate::ancestry::Ancestry;
use crate::error::WalkError;

/// Stop signal, fresh for every `walk` and `moonwalk` call.
#[derive(Debug, Default)]
pub struct WalkControl {
    stopped: bool,
}

impl WalkControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop_walking(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

pub struct Cursor<'w, 'a> {
    ancestry: &'w Ancestry<'a>,
    control: &'w mut WalkControl,
}

impl<'w, 'a> Cursor<'w, 'a> {
    pub fn stop_walking(&mut self) {
        self.control.stop_walking();
    }

    pub fn is_stopped(&self) -> bool {
        self.control.is_stopped()
    }

    pub fn parent(&self, node: &Value) -> Option<&'a Value> {
        self.ancestry.parent_of(node)
    }

    // Own stop control; stopping it leaves the enclosing walk running.
    pub fn moonwalk<F>(&self, node: &'a Value, visitor: F) -> Result<(), WalkError>
    where
        F: FnMut(&'a Value, &mut WalkControl),
    {
        self.ancestry.moonwalk(node, visitor)
    }
}

// JavaScript truthiness
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

struct Traversal<'a> {
    ancestry: Ancestry<'a>,
    control: WalkControl,
    visited: usize,
}

impl<'a> Traversal<'a> {
    fn link(&mut self, child: &'a Value, parent: &'a Value) {
        // Scalars have nowhere to keep a parent.
        if is_container(child) {
            self.ancestry.set_parent(child, parent);
        }
    }

    fn traverse<F>(&mut self, node: &'a Value, visitor: &mut F)
    where
        F: FnMut(&'a Value, &mut Cursor<'_, 'a>),
    {
        if self.control.is_stopped() {
            return;
        }

        match node {
            Value::Array(items) => {
                for item in items {
                    if item.is_null() {
                        continue;
                    }
                    self.link(item, node);
                    self.traverse(item, visitor);
                }
            }
            Value::Object(fields) => {
                self.visited += 1;
                let mut cursor = Cursor {
                    ancestry: &self.ancestry,
                    control: &mut self.control,
                };
                visitor(node, &mut cursor);

                for (key, value) in fields {
                    // The back-link field, if the tree carries one, is not a child.
                    if key == "parent" || !is_truthy(value) {
                        continue;
                    }
                    self.link(value, node);
                    self.traverse(value, visitor);
                }
            }
            _ => {}
        }
    }
}

/// Pre-order walk from `root`, returning the parents it recorded.
///
/// Stop is checked on entry to every element and field, so after a stop the
/// remaining direct children of the current node are linked but not visited.
pub fn walk<'a, F>(root: &'a Value, mut visitor: F) -> Ancestry<'a>
where
    F: FnMut(&'a Value, &mut Cursor<'_, 'a>),
{
    let mut traversal = Traversal {
        ancestry: Ancestry::new(),
        control: WalkControl::new(),
        visited: 0,
    };
    traversal.traverse(root, &mut visitor);

    debug!(
        visited = traversal.visited,
        linked = traversal.ancestry.len(),
        stopped = traversal.control.is_stopped(),
        "walk finished"
    );
    traversal.ancestry
}

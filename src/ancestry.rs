use serde_json::Value;
use std::collections::HashMap;
use tracing::trace;

use crate::error::WalkError;
use crate::traverse::WalkControl;

fn key(value: &Value) -> usize {
    value as *const Value as usize
}

/// Parents recorded by a forward walk, keyed by node identity.
#[derive(Debug, Default)]
pub struct Ancestry<'a> {
    parents: HashMap<usize, &'a Value>,
}

impl<'a> Ancestry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_parent(&mut self, child: &'a Value, parent: &'a Value) {
        self.parents.insert(key(child), parent);
    }

    pub fn parent_of(&self, node: &Value) -> Option<&'a Value> {
        self.parents.get(&key(node)).copied()
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Walks upward from `node` to the root. A sequence parent hands all of
    /// its elements to the visitor before the walk moves past it.
    pub fn moonwalk<F>(&self, node: &'a Value, mut visitor: F) -> Result<(), WalkError>
    where
        F: FnMut(&'a Value, &mut WalkControl),
    {
        if !(node.is_object() || node.is_array()) {
            return Err(WalkError::InvalidArgument(format!(
                "node must be an object or array, got {node}"
            )));
        }

        let mut control = WalkControl::new();
        let mut current = node;
        while !control.is_stopped() {
            let Some(parent) = self.parent_of(current) else {
                break;
            };
            match parent {
                Value::Array(items) => {
                    trace!(len = items.len(), "moonwalk: sequence ancestor");
                    for item in items {
                        visitor(item, &mut control);
                    }
                }
                _ => {
                    trace!("moonwalk: node ancestor");
                    visitor(parent, &mut control);
                }
            }
            current = parent;
        }
        Ok(())
    }
}

//! Typed constructors, typed getters, navigation, mutation, and deep copy
//! over a [`Node`]. This is the only place list-homogeneity and
//! compound-key presence are enforced; the decoder and encoder don't call
//! through here, they build/walk the tree directly since the bytes they
//! see are already known-consistent with the shape they're
//! producing/consuming.

use crate::error::Error;
use crate::kind::Kind;
use crate::tag::{Node, Value};

impl Node {
    // ---- typed constructors -------------------------------------------

    pub fn new_byte(key: impl Into<String>, value: i8) -> Node {
        Node::new(Some(key.into()), Value::Byte(value))
    }

    pub fn new_short(key: impl Into<String>, value: i16) -> Node {
        Node::new(Some(key.into()), Value::Short(value))
    }

    pub fn new_int(key: impl Into<String>, value: i32) -> Node {
        Node::new(Some(key.into()), Value::Int(value))
    }

    pub fn new_long(key: impl Into<String>, value: i64) -> Node {
        Node::new(Some(key.into()), Value::Long(value))
    }

    pub fn new_float(key: impl Into<String>, value: f32) -> Node {
        Node::new(Some(key.into()), Value::Float(value))
    }

    pub fn new_double(key: impl Into<String>, value: f64) -> Node {
        Node::new(Some(key.into()), Value::Double(value))
    }

    pub fn new_string(key: impl Into<String>, value: impl Into<String>) -> Node {
        Node::new(Some(key.into()), Value::String(value.into()))
    }

    pub fn new_byte_array(key: impl Into<String>, value: &[u8]) -> Node {
        Node::new(Some(key.into()), Value::ByteArray(value.to_vec()))
    }

    pub fn new_int_array(key: impl Into<String>, value: &[i32]) -> Node {
        Node::new(Some(key.into()), Value::IntArray(value.to_vec()))
    }

    pub fn new_long_array(key: impl Into<String>, value: &[i64]) -> Node {
        Node::new(Some(key.into()), Value::LongArray(value.to_vec()))
    }

    pub fn new_compound(key: impl Into<String>) -> Node {
        Node::new(Some(key.into()), Value::Compound { children: Vec::new() })
    }

    /// A new empty list. Its element-kind is recorded as `Kind::End` until
    /// the first child is inserted.
    pub fn new_list(key: impl Into<String>) -> Node {
        Node::new(
            Some(key.into()),
            Value::List { elem_kind: Kind::End, children: Vec::new() },
        )
    }

    // ---- typed getters ---------------------------------------------------
    // Each returns `None` on a kind mismatch rather than coercing.

    pub fn as_byte(&self) -> Option<i8> {
        match &self.value {
            Value::Byte(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_short(&self) -> Option<i16> {
        match &self.value {
            Value::Short(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match &self.value {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match &self.value {
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match &self.value {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match &self.value {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match &self.value {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_byte_array(&self) -> Option<&[u8]> {
        match &self.value {
            Value::ByteArray(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_int_array(&self) -> Option<&[i32]> {
        match &self.value {
            Value::IntArray(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_long_array(&self) -> Option<&[i64]> {
        match &self.value {
            Value::LongArray(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// The element-kind of a list node, or `None` if this isn't a list.
    pub fn list_elem_kind(&self) -> Option<Kind> {
        match &self.value {
            Value::List { elem_kind, .. } => Some(*elem_kind),
            _ => None,
        }
    }

    // ---- navigation -----------------------------------------------------

    fn children(&self) -> Option<&[Node]> {
        match &self.value {
            Value::List { children, .. } => Some(children),
            Value::Compound { children } => Some(children),
            _ => None,
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.value {
            Value::List { children, .. } => Some(children),
            Value::Compound { children } => Some(children),
            _ => None,
        }
    }

    pub fn child_count(&self) -> usize {
        self.children().map_or(0, |c| c.len())
    }

    pub fn child_at(&self, index: usize) -> Option<&Node> {
        self.children()?.get(index)
    }

    pub fn child_by_key(&self, key: &str) -> Option<&Node> {
        self.children()?
            .iter()
            .find(|child| child.key() == Some(key))
    }

    // ---- insertion --------------------------------------------------------
    // Permitted only on list or compound parents (`self`). Inserted nodes
    // must be orphan roots (plain owned values); violations fail without
    // mutating the tree.

    pub fn prepend(&mut self, child: Node) -> Result<(), Error> {
        self.insert_at(0, child)
    }

    pub fn append(&mut self, child: Node) -> Result<(), Error> {
        let index = self.child_count();
        self.insert_at(index, child)
    }

    pub fn insert_before(&mut self, sibling_index: usize, child: Node) -> Result<(), Error> {
        self.insert_at(sibling_index, child)
    }

    pub fn insert_after(&mut self, sibling_index: usize, child: Node) -> Result<(), Error> {
        self.insert_at(sibling_index + 1, child)
    }

    fn insert_at(&mut self, index: usize, child: Node) -> Result<(), Error> {
        match &mut self.value {
            Value::Compound { children } => {
                if index > children.len() {
                    return Err(Error::Internal("insertion index out of bounds"));
                }
                children.insert(index, child);
                Ok(())
            }
            Value::List { elem_kind, children } => {
                if index > children.len() {
                    return Err(Error::Internal("insertion index out of bounds"));
                }
                if children.is_empty() && *elem_kind == Kind::End {
                    // Promotion point: an untyped empty list adopts the
                    // kind of the first node ever inserted into it.
                    *elem_kind = child.kind();
                } else if child.kind() != *elem_kind {
                    return Err(Error::invalid_data(
                        0,
                        format!(
                            "cannot insert a {} into a list of {}",
                            child.kind(),
                            elem_kind
                        ),
                    ));
                }
                children.insert(index, child);
                Ok(())
            }
            _ => Err(Error::Internal("insertion is only valid on list or compound nodes")),
        }
    }

    // ---- removal ----------------------------------------------------------

    pub fn remove_at(&mut self, index: usize) -> Option<Node> {
        let children = self.children_mut()?;
        if index >= children.len() {
            return None;
        }
        Some(children.remove(index))
    }

    pub fn remove_by_key(&mut self, key: &str) -> Option<Node> {
        let children = self.children_mut()?;
        let position = children.iter().position(|child| child.key() == Some(key))?;
        Some(children.remove(position))
    }

    // ---- key ops ------------------------------------------------------

    /// Renames the key of the child at `index`. Only valid when `self` is a
    /// compound: a list's children are unkeyed on the wire, so renaming one
    /// is rejected rather than silently accepted.
    pub fn rename_child_key(&mut self, index: usize, new_key: impl Into<String>) -> Result<(), Error> {
        match &mut self.value {
            Value::Compound { children } => {
                let child = children
                    .get_mut(index)
                    .ok_or(Error::Internal("rename_child_key index out of bounds"))?;
                child.key = Some(new_key.into());
                Ok(())
            }
            Value::List { .. } => Err(Error::Internal(
                "cannot reset the key of a list child: list elements are unkeyed",
            )),
            _ => Err(Error::Internal("rename_child_key is only valid on list or compound nodes")),
        }
    }

    // ---- deep copy ----------------------------------------------------

    /// Recursively duplicates this subtree into a new orphan root with
    /// independent buffers. Implemented directly on top of `#[derive(Clone)]`:
    /// every `Value` variant either copies by value or owns a `Vec`/`String`
    /// whose `Clone` impl already allocates fresh storage, so there is no
    /// separate "duplicate buffers" step to hand-write.
    pub fn deep_copy(&self) -> Node {
        self.clone()
    }
}

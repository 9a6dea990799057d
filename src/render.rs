//! Human- and Graphviz-readable views of a tree.
//!
//! All three renderings walk the tree iteratively in preorder and never
//! splay, so they can be taken between operations without disturbing the
//! shape being inspected.

use std::fmt::{Debug, Display, Write as _};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::arena::NodeId;
use crate::tree::SplayTree;
use crate::types::{SplayError, DOT_BGCOLOR, DOT_NODE_STYLE};

/// Quote a label for DOT's double-quoted string syntax.
fn dot_quote(label: &str) -> String {
    let mut out = String::with_capacity(label.len() + 2);
    out.push('"');
    for c in label.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

impl<K: Display, S> SplayTree<K, S> {
    /// Write the tree in DOT (Graphviz) format.
    ///
    /// Each node is a box labelled with its key.  A node with exactly one
    /// child also gets an invisible sibling on the empty side, so `dot`
    /// still draws the real child to the left or right where it belongs.
    pub fn write_dot<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "digraph {{")?;
        writeln!(out, "  bgcolor={};", DOT_BGCOLOR)?;

        let mut phantoms = 0usize;
        let mut stack: Vec<(NodeId, Option<NodeId>)> =
            self.root.map(|r| (r, None)).into_iter().collect();
        while let Some((id, parent)) = stack.pop() {
            let node = self.arena.node(id);
            let label = dot_quote(&node.key.to_string());
            match parent {
                None => writeln!(out, "  n{} {};", id, with_label(&label))?,
                Some(p) => {
                    let up = self.arena.node(p);
                    if up.left.is_none() {
                        write_phantom(out, p, &mut phantoms)?;
                    }
                    writeln!(out, "  n{} {};", id, with_label(&label))?;
                    writeln!(out, "  n{} -> n{};", p, id)?;
                    if up.right.is_none() {
                        write_phantom(out, p, &mut phantoms)?;
                    }
                }
            }
            if let Some(r) = node.right {
                stack.push((r, Some(id)));
            }
            if let Some(l) = node.left {
                stack.push((l, Some(id)));
            }
        }

        writeln!(out, "}}")?;
        out.flush()
    }

    /// Write the DOT rendering to a file, creating or truncating it.
    pub fn save_dot<P: AsRef<Path>>(&self, path: P) -> Result<(), SplayError> {
        let file = File::create(path.as_ref())?;
        let mut out = BufWriter::new(file);
        self.write_dot(&mut out)?;
        out.into_inner()
            .map_err(|e| SplayError::Io(e.into_error()))?
            .sync_all()?;
        Ok(())
    }

    /// Compact preorder rendering: `(key left right)`, `.` for a missing
    /// child, a bare key for a leaf.
    pub fn sketch(&self) -> String {
        enum Item {
            Visit(Option<NodeId>),
            Text(&'static str),
        }

        let mut out = String::new();
        let mut stack = vec![Item::Visit(self.root)];
        while let Some(item) = stack.pop() {
            match item {
                Item::Text(t) => out.push_str(t),
                Item::Visit(None) => out.push('.'),
                Item::Visit(Some(id)) => {
                    let node = self.arena.node(id);
                    if node.left.is_none() && node.right.is_none() {
                        let _ = write!(out, "{}", node.key);
                    } else {
                        let _ = write!(out, "({} ", node.key);
                        stack.push(Item::Text(")"));
                        stack.push(Item::Visit(node.right));
                        stack.push(Item::Text(" "));
                        stack.push(Item::Visit(node.left));
                    }
                }
            }
        }
        out
    }
}

fn with_label(label: &str) -> String {
    format!("[label={};{}]", label, DOT_NODE_STYLE)
}

fn write_phantom<W: Write>(out: &mut W, parent: NodeId, phantoms: &mut usize) -> std::io::Result<()> {
    let id = *phantoms;
    *phantoms += 1;
    writeln!(out, "  p{} [style=invis];", id)?;
    writeln!(out, "  n{} -> p{} [style=invis];", parent, id)
}

impl<K: Debug, S> SplayTree<K, S> {
    /// Free-form dump: the size, then one line per node in preorder,
    /// indented by depth, naming the node and its children by arena id.
    pub fn write_debug<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "Tree size: {}", self.len)?;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|r| (r, 0)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            let node = self.arena.node(id);
            writeln!(
                out,
                "{:indent$}Node n{} has key {:?}, left {}, right {}",
                "",
                id,
                node.key,
                link(node.left),
                link(node.right),
                indent = depth
            )?;
            if let Some(r) = node.right {
                stack.push((r, depth + 1));
            }
            if let Some(l) = node.left {
                stack.push((l, depth + 1));
            }
        }
        Ok(())
    }
}

fn link(child: Option<NodeId>) -> String {
    match child {
        Some(id) => format!("n{}", id),
        None => "nil".to_string(),
    }
}

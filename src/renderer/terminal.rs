//! Differential terminal host.
//!
//! Keeps the tree in a [`MemoryHost`] and paints it as text lines on
//! request. Painting compares the new lines to the previous paint and only
//! rewrites lines that changed.
//!
//! # Line layout
//!
//! Text flows inline. Block types (`div`, `p`, `li`, headings, ...) start a
//! new line before and after their content. `b` and `strong` render bold.
//!
//! # Algorithm
//!
//! 1. Wrap output in a synchronized update
//! 2. For each line: skip it if equal to the previous paint, else move to
//!    it, clear it and print its spans
//! 3. Clear lines left over from a longer previous paint
//! 4. Flush the writer and keep the lines for the next comparison

use std::io;

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate};
use tracing::trace;

use super::{Host, MemoryHost, NodeId};
use crate::element::{NODE_VALUE, Props, TEXT_ELEMENT};
use crate::error::HostError;
use crate::types::Tag;

const BLOCK_TYPES: &[&str] = &["div", "p", "li", "ul", "ol", "section", "h1", "h2", "h3", "line"];
const BOLD_TYPES: &[&str] = &["b", "strong"];

/// A run of text with one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

/// One painted line.
pub type Line = Vec<Span>;

/// A host painted to a terminal writer.
pub struct TerminalHost<W: io::Write> {
    tree: MemoryHost,
    out: W,
    previous: Vec<Line>,
}

impl<W: io::Write> TerminalHost<W> {
    pub fn new(out: W) -> Self {
        Self {
            tree: MemoryHost::new(),
            out,
            previous: Vec::new(),
        }
    }

    /// The underlying tree.
    pub fn inner(&self) -> &MemoryHost {
        &self.tree
    }

    pub fn inner_mut(&mut self) -> &mut MemoryHost {
        &mut self.tree
    }

    pub fn into_writer(self) -> W {
        self.out
    }

    /// Lay the attached tree out as lines.
    pub fn lines(&self) -> Vec<Line> {
        let mut layout = LineLayout::default();
        for &id in self.tree.root_children() {
            layout.node(&self.tree, id, false);
        }
        layout.finish()
    }

    /// Paint lines that changed since the previous paint.
    ///
    /// Returns the number of rows written.
    pub fn paint(&mut self) -> io::Result<usize> {
        let lines = self.lines();
        let mut written = 0;

        queue!(self.out, BeginSynchronizedUpdate)?;
        for (row, line) in lines.iter().enumerate() {
            if self.previous.get(row) == Some(line) {
                continue;
            }
            queue!(self.out, MoveTo(0, to_row(row)), Clear(ClearType::CurrentLine))?;
            for span in line {
                if span.bold {
                    queue!(
                        self.out,
                        SetAttribute(Attribute::Bold),
                        Print(&span.text),
                        SetAttribute(Attribute::Reset)
                    )?;
                } else {
                    queue!(self.out, Print(&span.text))?;
                }
            }
            written += 1;
        }
        for row in lines.len()..self.previous.len() {
            queue!(self.out, MoveTo(0, to_row(row)), Clear(ClearType::CurrentLine))?;
            written += 1;
        }
        queue!(self.out, EndSynchronizedUpdate)?;
        self.out.flush()?;

        trace!(rows = written, total = lines.len(), "painted");
        self.previous = lines;
        Ok(written)
    }

    /// Forget the previous paint so the next one rewrites every line.
    pub fn invalidate(&mut self) {
        self.previous.clear();
    }
}

fn to_row(row: usize) -> u16 {
    u16::try_from(row).unwrap_or(u16::MAX)
}

impl<W: io::Write> Host for TerminalHost<W> {
    type Instance = NodeId;

    fn create_instance(&mut self, tag: Tag, ty: &str, props: &Props) -> Option<NodeId> {
        self.tree.create_instance(tag, ty, props)
    }

    fn append_child(&mut self, parent: Option<&NodeId>, child: &NodeId) -> Result<(), HostError> {
        self.tree.append_child(parent, child)
    }

    fn insert_before(&mut self, parent: Option<&NodeId>, child: &NodeId, before: &NodeId) -> Result<(), HostError> {
        self.tree.insert_before(parent, child, before)
    }

    fn remove_child(&mut self, parent: Option<&NodeId>, child: &NodeId) -> Result<(), HostError> {
        self.tree.remove_child(parent, child)
    }

    fn commit_update(&mut self, instance: &NodeId, old: &Props, new: &Props) -> Result<(), HostError> {
        self.tree.commit_update(instance, old, new)
    }

    fn clear(&mut self) {
        self.tree.clear();
    }
}

// =============================================================================
// Line layout
// =============================================================================

#[derive(Default)]
struct LineLayout {
    lines: Vec<Line>,
    current: Line,
}

impl LineLayout {
    fn node(&mut self, tree: &MemoryHost, id: NodeId, bold: bool) {
        let Some(ty) = tree.ty(id) else {
            return;
        };
        if ty == TEXT_ELEMENT {
            if let Some(value) = tree.attr(id, NODE_VALUE) {
                self.push(value.to_string(), bold);
            }
            return;
        }

        let block = BLOCK_TYPES.contains(&ty);
        let bold = bold || BOLD_TYPES.contains(&ty);
        if block {
            self.break_line();
        }
        for &child in tree.children_of(id) {
            self.node(tree, child, bold);
        }
        if block {
            self.break_line();
        }
    }

    fn push(&mut self, text: String, bold: bool) {
        if text.is_empty() {
            return;
        }
        match self.current.last_mut() {
            Some(last) if last.bold == bold => last.text.push_str(&text),
            _ => self.current.push(Span { text, bold }),
        }
    }

    fn break_line(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
    }

    fn finish(mut self) -> Vec<Line> {
        self.break_line();
        self.lines
    }
}

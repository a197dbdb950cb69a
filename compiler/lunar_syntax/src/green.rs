//! Green tree: immutable, position-independent syntax elements.
//!
//! Green nodes know their width but not their offset or parent, so the same
//! `Arc` can be shared between trees and across threads. Positions and
//! parents come from the red layer in [`crate::red`].
//!
//! "Changing" an element (adding a diagnostic, prepending trivia) builds a
//! new element that shares every untouched child.

use std::sync::Arc;

use bitflags::bitflags;
use lunar_diagnostic::Diagnostic;

use crate::kind::SyntaxKind;
use crate::span::text_width;
use crate::trivia::{long_bracket_level, Trivia, TriviaList};
use crate::value::TokenValue;

bitflags! {
    /// Pre-computed element properties, set once at construction.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ElementFlags: u8 {
        /// The element's own diagnostic list is non-empty.
        const HAS_DIAGNOSTICS = 1 << 0;
        /// The element, a descendant, or structured trivia has diagnostics.
        const CONTAINS_DIAGNOSTICS = 1 << 1;
        /// Zero-width placeholder synthesized by the parser.
        const MISSING = 1 << 2;
    }
}

// === Tokens ===

#[derive(Clone, Debug, PartialEq)]
pub struct GreenToken {
    kind: SyntaxKind,
    text: Box<str>,
    value: TokenValue,
    leading: TriviaList,
    trailing: TriviaList,
    diagnostics: Box<[Diagnostic]>,
    full_width: u32,
    flags: ElementFlags,
}

impl GreenToken {
    pub fn new(
        kind: SyntaxKind,
        text: impl Into<Box<str>>,
        value: TokenValue,
        leading: TriviaList,
        trailing: TriviaList,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        debug_assert!(kind.is_token(), "{kind:?} is not a token kind");
        let text = text.into();
        let full_width = trivia_width(&leading) + text_width(&text) + trivia_width(&trailing);
        let flags = token_flags(&leading, &trailing, &diagnostics);
        GreenToken {
            kind,
            text,
            value,
            leading,
            trailing,
            diagnostics: diagnostics.into_boxed_slice(),
            full_width,
            flags,
        }
    }

    /// Token with fixed text and no trivia, value or diagnostics.
    pub fn simple(kind: SyntaxKind) -> Self {
        let text = kind.fixed_text().unwrap_or("");
        GreenToken::new(
            kind,
            text,
            TokenValue::None,
            TriviaList::new(),
            TriviaList::new(),
            Vec::new(),
        )
    }

    /// A zero-width placeholder for a token the parser expected but did not
    /// find.
    pub fn missing(kind: SyntaxKind, diagnostics: Vec<Diagnostic>) -> Self {
        GreenToken::missing_with_leading(kind, TriviaList::new(), diagnostics)
    }

    /// A missing token that still owns leading trivia, used when the
    /// input ends inside a construct and the end-of-file trivia has to land
    /// somewhere.
    pub fn missing_with_leading(
        kind: SyntaxKind,
        leading: TriviaList,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        let mut token = GreenToken::new(
            kind,
            "",
            TokenValue::None,
            leading,
            TriviaList::new(),
            diagnostics,
        );
        token.flags |= ElementFlags::MISSING;
        token
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn value(&self) -> &TokenValue {
        &self.value
    }

    pub fn leading_trivia(&self) -> &[Trivia] {
        &self.leading
    }

    pub fn trailing_trivia(&self) -> &[Trivia] {
        &self.trailing
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Width of the token text alone.
    #[inline]
    pub fn width(&self) -> u32 {
        text_width(&self.text)
    }

    /// Width including leading and trailing trivia.
    #[inline]
    pub fn full_width(&self) -> u32 {
        self.full_width
    }

    pub fn leading_width(&self) -> u32 {
        trivia_width(&self.leading)
    }

    pub fn trailing_width(&self) -> u32 {
        trivia_width(&self.trailing)
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        self.flags.contains(ElementFlags::MISSING)
    }

    #[inline]
    pub fn has_diagnostics(&self) -> bool {
        self.flags.contains(ElementFlags::HAS_DIAGNOSTICS)
    }

    #[inline]
    pub fn contains_diagnostics(&self) -> bool {
        self.flags.contains(ElementFlags::CONTAINS_DIAGNOSTICS)
    }

    /// Nesting level of a long-bracket string token.
    pub fn long_bracket_level(&self) -> Option<u32> {
        if self.kind == SyntaxKind::StringLiteral {
            long_bracket_level(&self.text)
        } else {
            None
        }
    }

    /// Copy of this token with one more diagnostic.
    #[must_use]
    pub fn with_diagnostic(&self, diagnostic: Diagnostic) -> GreenToken {
        let mut diagnostics = self.diagnostics.to_vec();
        diagnostics.push(diagnostic);
        self.rebuild(self.leading.clone(), diagnostics)
    }

    /// Copy of this token with `trivia` inserted before its existing leading
    /// trivia. Diagnostics move right by the inserted width so they keep
    /// pointing at the same text.
    #[must_use]
    pub fn with_leading_prefix(&self, trivia: Trivia) -> GreenToken {
        let delta = trivia.width();
        let mut leading = TriviaList::with_capacity(self.leading.len() + 1);
        leading.push(trivia);
        leading.extend(self.leading.iter().cloned());
        let diagnostics = self
            .diagnostics
            .iter()
            .cloned()
            .map(|d| d.shifted(delta))
            .collect();
        self.rebuild(leading, diagnostics)
    }

    fn rebuild(&self, leading: TriviaList, diagnostics: Vec<Diagnostic>) -> GreenToken {
        let mut token = GreenToken::new(
            self.kind,
            self.text.clone(),
            self.value.clone(),
            leading,
            self.trailing.clone(),
            diagnostics,
        );
        token.flags |= self.flags & ElementFlags::MISSING;
        token
    }

    pub fn write_full_text(&self, out: &mut String) {
        for trivia in &self.leading {
            out.push_str(trivia.text());
        }
        out.push_str(&self.text);
        for trivia in &self.trailing {
            out.push_str(trivia.text());
        }
    }

    pub fn full_text(&self) -> String {
        let mut out = String::with_capacity(self.full_width as usize);
        self.write_full_text(&mut out);
        out
    }
}

fn trivia_width(list: &[Trivia]) -> u32 {
    list.iter().map(Trivia::width).sum()
}

fn token_flags(
    leading: &[Trivia],
    trailing: &[Trivia],
    diagnostics: &[Diagnostic],
) -> ElementFlags {
    let mut flags = ElementFlags::empty();
    if !diagnostics.is_empty() {
        flags |= ElementFlags::HAS_DIAGNOSTICS | ElementFlags::CONTAINS_DIAGNOSTICS;
    }
    if leading
        .iter()
        .chain(trailing)
        .any(Trivia::contains_diagnostics)
    {
        flags |= ElementFlags::CONTAINS_DIAGNOSTICS;
    }
    flags
}

// === Nodes ===

/// A child of a green node.
#[derive(Clone, Debug, PartialEq)]
pub enum GreenElement {
    Node(Arc<GreenNode>),
    Token(Arc<GreenToken>),
}

impl GreenElement {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            GreenElement::Node(n) => n.kind(),
            GreenElement::Token(t) => t.kind(),
        }
    }

    pub fn full_width(&self) -> u32 {
        match self {
            GreenElement::Node(n) => n.full_width(),
            GreenElement::Token(t) => t.full_width(),
        }
    }

    pub fn contains_diagnostics(&self) -> bool {
        match self {
            GreenElement::Node(n) => n.contains_diagnostics(),
            GreenElement::Token(t) => t.contains_diagnostics(),
        }
    }

    pub fn as_node(&self) -> Option<&Arc<GreenNode>> {
        match self {
            GreenElement::Node(n) => Some(n),
            GreenElement::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&Arc<GreenToken>> {
        match self {
            GreenElement::Token(t) => Some(t),
            GreenElement::Node(_) => None,
        }
    }
}

impl From<Arc<GreenNode>> for GreenElement {
    fn from(node: Arc<GreenNode>) -> Self {
        GreenElement::Node(node)
    }
}

impl From<Arc<GreenToken>> for GreenElement {
    fn from(token: Arc<GreenToken>) -> Self {
        GreenElement::Token(token)
    }
}

impl From<GreenNode> for GreenElement {
    fn from(node: GreenNode) -> Self {
        GreenElement::Node(Arc::new(node))
    }
}

impl From<GreenToken> for GreenElement {
    fn from(token: GreenToken) -> Self {
        GreenElement::Token(Arc::new(token))
    }
}

/// Interior node. Slots are positional: an absent optional child is `None`
/// so each kind keeps a fixed shape.
#[derive(Clone, Debug, PartialEq)]
pub struct GreenNode {
    kind: SyntaxKind,
    slots: Box<[Option<GreenElement>]>,
    diagnostics: Box<[Diagnostic]>,
    full_width: u32,
    flags: ElementFlags,
}

impl GreenNode {
    pub fn new(kind: SyntaxKind, slots: Vec<Option<GreenElement>>) -> Self {
        GreenNode::with_diagnostics(kind, slots, Vec::new())
    }

    pub fn with_diagnostics(
        kind: SyntaxKind,
        slots: Vec<Option<GreenElement>>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        debug_assert!(kind.is_node(), "{kind:?} is not a node kind");
        let full_width = slots.iter().flatten().map(GreenElement::full_width).sum();
        let mut flags = ElementFlags::empty();
        if !diagnostics.is_empty() {
            flags |= ElementFlags::HAS_DIAGNOSTICS | ElementFlags::CONTAINS_DIAGNOSTICS;
        }
        if slots.iter().flatten().any(GreenElement::contains_diagnostics) {
            flags |= ElementFlags::CONTAINS_DIAGNOSTICS;
        }
        GreenNode {
            kind,
            slots: slots.into_boxed_slice(),
            diagnostics: diagnostics.into_boxed_slice(),
            full_width,
            flags,
        }
    }

    /// Copy of this node with one more diagnostic.
    #[must_use]
    pub fn with_diagnostic(&self, diagnostic: Diagnostic) -> GreenNode {
        let mut diagnostics = self.diagnostics.to_vec();
        diagnostics.push(diagnostic);
        GreenNode::with_diagnostics(self.kind, self.slots.to_vec(), diagnostics)
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn slots(&self) -> &[Option<GreenElement>] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&GreenElement> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Present children, in order.
    pub fn children(&self) -> impl Iterator<Item = &GreenElement> {
        self.slots.iter().flatten()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[inline]
    pub fn full_width(&self) -> u32 {
        self.full_width
    }

    #[inline]
    pub fn has_diagnostics(&self) -> bool {
        self.flags.contains(ElementFlags::HAS_DIAGNOSTICS)
    }

    #[inline]
    pub fn contains_diagnostics(&self) -> bool {
        self.flags.contains(ElementFlags::CONTAINS_DIAGNOSTICS)
    }

    /// First token in document order, missing tokens included.
    pub fn first_token(&self) -> Option<&Arc<GreenToken>> {
        let mut node = self;
        loop {
            match node.children().next()? {
                GreenElement::Token(t) => return Some(t),
                GreenElement::Node(n) => node = n,
            }
        }
    }

    /// Last token in document order, missing tokens included.
    pub fn last_token(&self) -> Option<&Arc<GreenToken>> {
        let mut node = self;
        loop {
            match node.slots.iter().rev().flatten().next()? {
                GreenElement::Token(t) => return Some(t),
                GreenElement::Node(n) => node = n,
            }
        }
    }

    /// Append the exact source text covered by this node.
    pub fn write_full_text(&self, out: &mut String) {
        let mut stack: Vec<&GreenElement> = self.slots.iter().rev().flatten().collect();
        while let Some(element) = stack.pop() {
            match element {
                GreenElement::Token(t) => t.write_full_text(out),
                GreenElement::Node(n) => stack.extend(n.slots.iter().rev().flatten()),
            }
        }
    }

    pub fn full_text(&self) -> String {
        let mut out = String::with_capacity(self.full_width as usize);
        self.write_full_text(&mut out);
        out
    }
}

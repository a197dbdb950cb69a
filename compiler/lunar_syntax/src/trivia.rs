//! Trivia: the text between tokens.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::green::GreenNode;
use crate::span::text_width;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TriviaKind {
    Whitespace,
    EndOfLine,
    SingleLineComment,
    MultiLineComment,
    /// `#!` line at the very start of a file.
    Shebang,
    /// A preprocessor directive line; always structured.
    Directive,
    /// Tokens the parser could not place; always structured.
    SkippedTokens,
    /// Source lines inside an inactive conditional branch.
    DisabledText,
    /// Free text after `#region`, `#error` and friends.
    PreprocessingMessage,
}

/// One trivia run.
///
/// Structured trivia (directives, skipped tokens) keep their parsed node;
/// the text is then the node's full text.
#[derive(Clone, Debug, PartialEq)]
pub struct Trivia {
    kind: TriviaKind,
    text: Box<str>,
    structure: Option<Arc<GreenNode>>,
}

pub type TriviaList = SmallVec<[Trivia; 2]>;

impl Trivia {
    pub fn new(kind: TriviaKind, text: impl Into<Box<str>>) -> Self {
        Trivia {
            kind,
            text: text.into(),
            structure: None,
        }
    }

    pub fn structured(kind: TriviaKind, node: Arc<GreenNode>) -> Self {
        Trivia {
            kind,
            text: node.full_text().into_boxed_str(),
            structure: Some(node),
        }
    }

    pub fn kind(&self) -> TriviaKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn width(&self) -> u32 {
        text_width(&self.text)
    }

    pub fn structure(&self) -> Option<&Arc<GreenNode>> {
        self.structure.as_ref()
    }

    pub fn is_comment(&self) -> bool {
        matches!(
            self.kind,
            TriviaKind::SingleLineComment | TriviaKind::MultiLineComment
        )
    }

    pub fn contains_diagnostics(&self) -> bool {
        self.structure
            .as_ref()
            .is_some_and(|node| node.contains_diagnostics())
    }

    /// Nesting level of a long-bracket comment: the number of `=` between
    /// the brackets of `--[==[`.
    pub fn long_bracket_level(&self) -> Option<u32> {
        if self.kind != TriviaKind::MultiLineComment {
            return None;
        }
        self.text.strip_prefix("--").and_then(long_bracket_level)
    }
}

/// Level of a long-bracket opener at the start of `text` (`[[` is 0,
/// `[==[` is 2). `None` when `text` does not start with an opener.
pub fn long_bracket_level(text: &str) -> Option<u32> {
    let rest = text.strip_prefix('[')?;
    let equals = rest.bytes().take_while(|&b| b == b'=').count();
    if rest.as_bytes().get(equals) == Some(&b'[') {
        u32::try_from(equals).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracket_levels() {
        assert_eq!(long_bracket_level("[[x]]"), Some(0));
        assert_eq!(long_bracket_level("[==[x]==]"), Some(2));
        assert_eq!(long_bracket_level("[=a=["), None);
        assert_eq!(long_bracket_level("[x"), None);
        assert_eq!(long_bracket_level("x"), None);
    }

    #[test]
    fn comment_level_requires_block_comment() {
        let block = Trivia::new(TriviaKind::MultiLineComment, "--[=[ c ]=]");
        assert_eq!(block.long_bracket_level(), Some(1));
        assert!(block.is_comment());

        let line = Trivia::new(TriviaKind::SingleLineComment, "--[=a=[ c");
        assert_eq!(line.long_bracket_level(), None);
    }
}

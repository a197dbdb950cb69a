//! Token and node kinds.
//!
//! One closed enum covers every token and node. Token kinds come first and
//! stay below [`SyntaxKind::FIRST_NODE`] so that token sets fit in a `u128`.

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    // === Special tokens ===
    EndOfFile,
    BadToken,
    Identifier,
    NumericLiteral,
    StringLiteral,
    InterpolatedStringStart,
    InterpolatedStringText,
    InterpolationStart,
    InterpolationEnd,
    InterpolatedStringEnd,
    EndOfDirective,

    // === Punctuation ===
    Plus,
    PlusEquals,
    Minus,
    MinusEquals,
    Star,
    StarEquals,
    Slash,
    SlashEquals,
    SlashSlash,
    SlashSlashEquals,
    Percent,
    PercentEquals,
    Caret,
    CaretEquals,
    Hash,
    Ampersand,
    AmpersandEquals,
    Tilde,
    TildeEquals,
    Pipe,
    PipeEquals,
    LessThan,
    LessThanEquals,
    LessThanLessThan,
    LessThanLessThanEquals,
    GreaterThan,
    GreaterThanEquals,
    GreaterThanGreaterThan,
    GreaterThanGreaterThanEquals,
    Equals,
    EqualsEquals,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Semicolon,
    Colon,
    ColonColon,
    Comma,
    Dot,
    DotDot,
    DotDotEquals,
    DotDotDot,

    // === MoonScript punctuation ===
    Bang,
    BangEquals,
    At,
    AtAt,
    Backslash,
    MinusGreaterThan,
    EqualsGreaterThan,

    // === Keywords ===
    AndKeyword,
    BreakKeyword,
    DoKeyword,
    ElseKeyword,
    ElseIfKeyword,
    EndKeyword,
    FalseKeyword,
    ForKeyword,
    FunctionKeyword,
    GotoKeyword,
    IfKeyword,
    InKeyword,
    LocalKeyword,
    NilKeyword,
    NotKeyword,
    OrKeyword,
    RepeatKeyword,
    ReturnKeyword,
    ThenKeyword,
    TrueKeyword,
    UntilKeyword,
    WhileKeyword,
    AndEquals,
    OrEquals,

    // === Directive keywords ===
    DefineKeyword,
    UndefKeyword,
    RegionKeyword,
    EndRegionKeyword,
    ErrorKeyword,
    WarningKeyword,

    // === Nodes ===
    CompilationUnit,
    Block,
    StatementList,

    EmptyStatement,
    LocalVariableDeclarationStatement,
    LocalFunctionDeclarationStatement,
    FunctionDeclarationStatement,
    AssignmentStatement,
    CompoundAssignmentStatement,
    ExpressionStatement,
    DoStatement,
    WhileStatement,
    RepeatUntilStatement,
    IfStatement,
    ElseIfClauseList,
    ElseIfClause,
    ElseClause,
    NumericForStatement,
    GenericForStatement,
    ReturnStatement,
    BreakStatement,
    GotoStatement,
    GotoLabelStatement,

    LocalDeclarationNameList,
    LocalDeclarationName,
    VariableAttribute,
    IdentifierList,
    ExpressionList,
    EqualsValuesClause,

    SimpleFunctionName,
    MemberFunctionName,
    MethodFunctionName,
    ParameterList,
    NamedParameter,
    VarArgParameter,

    IdentifierName,
    NilLiteralExpression,
    TrueLiteralExpression,
    FalseLiteralExpression,
    NumericalLiteralExpression,
    StringLiteralExpression,
    VarArgExpression,
    InterpolatedStringExpression,
    InterpolatedStringSegment,
    Interpolation,
    ParenthesizedExpression,
    UnaryExpression,
    BinaryExpression,
    MemberAccessExpression,
    ElementAccessExpression,
    FunctionCallExpression,
    MethodCallExpression,
    AnonymousFunctionExpression,
    TableConstructorExpression,
    TableFieldList,
    IdentifierKeyedTableField,
    ExpressionKeyedTableField,
    UnkeyedTableField,

    ParenthesizedArgumentList,
    StringFunctionArgument,
    TableConstructorFunctionArgument,

    // === Structured trivia ===
    SkippedTokensTrivia,
    IfDirectiveTrivia,
    ElseIfDirectiveTrivia,
    ElseDirectiveTrivia,
    EndIfDirectiveTrivia,
    DefineDirectiveTrivia,
    UndefDirectiveTrivia,
    RegionDirectiveTrivia,
    EndRegionDirectiveTrivia,
    ErrorDirectiveTrivia,
    WarningDirectiveTrivia,
    BadDirectiveTrivia,
}

// Token sets are `u128` bitmasks over token kinds.
const _: () = assert!((SyntaxKind::CompilationUnit as u16) <= 128);

impl SyntaxKind {
    /// The first node kind. Every kind below it is a token.
    pub const FIRST_NODE: SyntaxKind = SyntaxKind::CompilationUnit;

    /// Discriminant index, used by bit sets.
    #[inline]
    pub const fn index(self) -> u16 {
        self as u16
    }

    #[inline]
    pub const fn is_token(self) -> bool {
        (self as u16) < (SyntaxKind::FIRST_NODE as u16)
    }

    #[inline]
    pub const fn is_node(self) -> bool {
        !self.is_token()
    }

    pub const fn is_keyword(self) -> bool {
        (self as u16) >= (SyntaxKind::AndKeyword as u16)
            && (self as u16) <= (SyntaxKind::WarningKeyword as u16)
    }

    pub const fn is_directive_trivia(self) -> bool {
        (self as u16) >= (SyntaxKind::IfDirectiveTrivia as u16)
            && (self as u16) <= (SyntaxKind::BadDirectiveTrivia as u16)
    }

    /// Compound assignment operators (`+=`, `..=`, `and=`, ...).
    pub const fn is_compound_assignment_operator(self) -> bool {
        matches!(
            self,
            SyntaxKind::PlusEquals
                | SyntaxKind::MinusEquals
                | SyntaxKind::StarEquals
                | SyntaxKind::SlashEquals
                | SyntaxKind::SlashSlashEquals
                | SyntaxKind::PercentEquals
                | SyntaxKind::CaretEquals
                | SyntaxKind::AmpersandEquals
                | SyntaxKind::PipeEquals
                | SyntaxKind::LessThanLessThanEquals
                | SyntaxKind::GreaterThanGreaterThanEquals
                | SyntaxKind::DotDotEquals
                | SyntaxKind::AndEquals
                | SyntaxKind::OrEquals
        )
    }

    /// The fixed text of punctuation and keyword tokens.
    pub fn fixed_text(self) -> Option<&'static str> {
        use SyntaxKind::*;
        let text = match self {
            Plus => "+",
            PlusEquals => "+=",
            Minus => "-",
            MinusEquals => "-=",
            Star => "*",
            StarEquals => "*=",
            Slash => "/",
            SlashEquals => "/=",
            SlashSlash => "//",
            SlashSlashEquals => "//=",
            Percent => "%",
            PercentEquals => "%=",
            Caret => "^",
            CaretEquals => "^=",
            Hash => "#",
            Ampersand => "&",
            AmpersandEquals => "&=",
            Tilde => "~",
            TildeEquals => "~=",
            Pipe => "|",
            PipeEquals => "|=",
            LessThan => "<",
            LessThanEquals => "<=",
            LessThanLessThan => "<<",
            LessThanLessThanEquals => "<<=",
            GreaterThan => ">",
            GreaterThanEquals => ">=",
            GreaterThanGreaterThan => ">>",
            GreaterThanGreaterThanEquals => ">>=",
            Equals => "=",
            EqualsEquals => "==",
            OpenParen => "(",
            CloseParen => ")",
            OpenBrace => "{",
            CloseBrace => "}",
            OpenBracket => "[",
            CloseBracket => "]",
            Semicolon => ";",
            Colon => ":",
            ColonColon => "::",
            Comma => ",",
            Dot => ".",
            DotDot => "..",
            DotDotEquals => "..=",
            DotDotDot => "...",
            Bang => "!",
            BangEquals => "!=",
            At => "@",
            AtAt => "@@",
            Backslash => "\\",
            MinusGreaterThan => "->",
            EqualsGreaterThan => "=>",
            AndKeyword => "and",
            BreakKeyword => "break",
            DoKeyword => "do",
            ElseKeyword => "else",
            ElseIfKeyword => "elseif",
            EndKeyword => "end",
            FalseKeyword => "false",
            ForKeyword => "for",
            FunctionKeyword => "function",
            GotoKeyword => "goto",
            IfKeyword => "if",
            InKeyword => "in",
            LocalKeyword => "local",
            NilKeyword => "nil",
            NotKeyword => "not",
            OrKeyword => "or",
            RepeatKeyword => "repeat",
            ReturnKeyword => "return",
            ThenKeyword => "then",
            TrueKeyword => "true",
            UntilKeyword => "until",
            WhileKeyword => "while",
            AndEquals => "and=",
            OrEquals => "or=",
            DefineKeyword => "define",
            UndefKeyword => "undef",
            RegionKeyword => "region",
            EndRegionKeyword => "endregion",
            ErrorKeyword => "error",
            WarningKeyword => "warning",
            InterpolationStart => "#{",
            InterpolationEnd => "}",
            _ => return None,
        };
        Some(text)
    }

    /// Human-readable name used in "expected" diagnostics.
    pub fn display_name(self) -> &'static str {
        if let Some(text) = self.fixed_text() {
            return text;
        }
        match self {
            SyntaxKind::EndOfFile => "end of file",
            SyntaxKind::Identifier => "identifier",
            SyntaxKind::NumericLiteral => "number",
            SyntaxKind::StringLiteral => "string",
            SyntaxKind::InterpolatedStringStart | SyntaxKind::InterpolatedStringEnd => "\"",
            SyntaxKind::EndOfDirective => "end of line",
            _ => "token",
        }
    }

    /// Reserved words of the base grammar. `goto` is contextual and handled
    /// by the lexer according to the language version.
    pub fn keyword(text: &str) -> Option<SyntaxKind> {
        let kind = match text {
            "and" => SyntaxKind::AndKeyword,
            "break" => SyntaxKind::BreakKeyword,
            "do" => SyntaxKind::DoKeyword,
            "else" => SyntaxKind::ElseKeyword,
            "elseif" => SyntaxKind::ElseIfKeyword,
            "end" => SyntaxKind::EndKeyword,
            "false" => SyntaxKind::FalseKeyword,
            "for" => SyntaxKind::ForKeyword,
            "function" => SyntaxKind::FunctionKeyword,
            "if" => SyntaxKind::IfKeyword,
            "in" => SyntaxKind::InKeyword,
            "local" => SyntaxKind::LocalKeyword,
            "nil" => SyntaxKind::NilKeyword,
            "not" => SyntaxKind::NotKeyword,
            "or" => SyntaxKind::OrKeyword,
            "repeat" => SyntaxKind::RepeatKeyword,
            "return" => SyntaxKind::ReturnKeyword,
            "then" => SyntaxKind::ThenKeyword,
            "true" => SyntaxKind::TrueKeyword,
            "until" => SyntaxKind::UntilKeyword,
            "while" => SyntaxKind::WhileKeyword,
            _ => return None,
        };
        Some(kind)
    }

    /// Keywords recognized after `#` on a directive line.
    pub fn directive_keyword(text: &str) -> Option<SyntaxKind> {
        let kind = match text {
            "if" => SyntaxKind::IfKeyword,
            "elseif" => SyntaxKind::ElseIfKeyword,
            "else" => SyntaxKind::ElseKeyword,
            "end" => SyntaxKind::EndKeyword,
            "define" => SyntaxKind::DefineKeyword,
            "undef" => SyntaxKind::UndefKeyword,
            "region" => SyntaxKind::RegionKeyword,
            "endregion" => SyntaxKind::EndRegionKeyword,
            "error" => SyntaxKind::ErrorKeyword,
            "warning" => SyntaxKind::WarningKeyword,
            "not" => SyntaxKind::NotKeyword,
            "and" => SyntaxKind::AndKeyword,
            "or" => SyntaxKind::OrKeyword,
            "true" => SyntaxKind::TrueKeyword,
            "false" => SyntaxKind::FalseKeyword,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

use std::fmt;

/// Error codes for every diagnostic the front end can attach to a tree.
///
/// Format: E#### where the first digits indicate the phase:
/// - E00xx: Lexer errors
/// - E05xx / W05xx: Preprocessor directive errors and warnings
/// - E1xxx: Parser errors
/// - E2xxx: Language feature gating
/// - E9xxx: Internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexer Errors (E00xx)
    /// Unterminated string literal
    E0001,
    /// Unexpected character in source
    E0002,
    /// Malformed numeric literal
    E0003,
    /// Unterminated block comment
    E0004,
    /// Invalid escape sequence
    E0005,
    /// Unterminated string interpolation
    E0006,
    /// Invalid long string delimiter
    E0007,
    /// Unterminated long string
    E0008,
    /// Decimal escape value too large
    E0009,
    /// Unicode escape out of range
    E0010,

    // Directive Errors (E05xx)
    /// Unknown preprocessor directive
    E0501,
    /// End of line expected after directive
    E0502,
    /// Conditional directive without matching `#if`
    E0503,
    /// `#end` expected before end of file
    E0504,
    /// User `#error` directive
    E0505,
    /// `#endregion` without matching `#region`
    E0506,
    /// `#endregion` expected before end of file
    E0507,
    /// Invalid preprocessor expression
    E0508,

    // Parser Errors (E1xxx)
    /// Expected a specific token
    E1001,
    /// Expected expression
    E1002,
    /// Expected identifier
    E1003,
    /// Too many identifiers in numeric `for`
    E1004,
    /// `return` must be the last statement of a block
    E1005,
    /// `elseif` without a preceding `if`
    E1006,
    /// Invalid assignment target
    E1007,
    /// Invalid table field value
    E1008,
    /// Only assignments and calls can be statements
    E1009,
    /// Unknown local variable attribute
    E1010,
    /// Compound assignment takes exactly one target
    E1011,
    /// Method name cannot be qualified further
    E1012,
    /// Varargs must be the last parameter
    E1013,

    // Feature Errors (E2xxx)
    /// Feature not available in the selected language version
    E2001,
    /// Preview feature used without preview mode
    E2002,

    // Internal Errors (E9xxx)
    /// Internal front end error
    E9001,

    // Directive Warnings (W05xx)
    /// User `#warning` directive
    W0501,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexer
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E0005 => "E0005",
            ErrorCode::E0006 => "E0006",
            ErrorCode::E0007 => "E0007",
            ErrorCode::E0008 => "E0008",
            ErrorCode::E0009 => "E0009",
            ErrorCode::E0010 => "E0010",
            // Directives
            ErrorCode::E0501 => "E0501",
            ErrorCode::E0502 => "E0502",
            ErrorCode::E0503 => "E0503",
            ErrorCode::E0504 => "E0504",
            ErrorCode::E0505 => "E0505",
            ErrorCode::E0506 => "E0506",
            ErrorCode::E0507 => "E0507",
            ErrorCode::E0508 => "E0508",
            // Parser
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E1009 => "E1009",
            ErrorCode::E1010 => "E1010",
            ErrorCode::E1011 => "E1011",
            ErrorCode::E1012 => "E1012",
            ErrorCode::E1013 => "E1013",
            // Features
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            // Internal
            ErrorCode::E9001 => "E9001",
            // Warnings
            ErrorCode::W0501 => "W0501",
        }
    }

    /// Message template. `{0}`, `{1}`, ... are replaced by the diagnostic's
    /// arguments when it is rendered.
    pub fn message_template(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "unterminated string literal",
            ErrorCode::E0002 => "unexpected character `{0}`",
            ErrorCode::E0003 => "malformed number `{0}`",
            ErrorCode::E0004 => "unterminated block comment",
            ErrorCode::E0005 => "invalid escape sequence `{0}`",
            ErrorCode::E0006 => "unterminated string interpolation, `}` expected",
            ErrorCode::E0007 => "invalid long string delimiter",
            ErrorCode::E0008 => "unterminated long string",
            ErrorCode::E0009 => "decimal escape `{0}` is too large",
            ErrorCode::E0010 => "unicode escape `{0}` is out of range",
            ErrorCode::E0501 => "preprocessor directive expected",
            ErrorCode::E0502 => "end of line expected after directive",
            ErrorCode::E0503 => "`#{0}` without matching `#if`",
            ErrorCode::E0504 => "`#end` directive expected",
            ErrorCode::E0505 => "#error: {0}",
            ErrorCode::E0506 => "`#endregion` without matching `#region`",
            ErrorCode::E0507 => "`#endregion` directive expected",
            ErrorCode::E0508 => "invalid preprocessor expression",
            ErrorCode::E1001 => "`{0}` expected",
            ErrorCode::E1002 => "expression expected",
            ErrorCode::E1003 => "identifier expected",
            ErrorCode::E1004 => "too many identifiers in numeric `for` loop",
            ErrorCode::E1005 => "`return` must be the last statement of a block",
            ErrorCode::E1006 => "`elseif` without a preceding `if`",
            ErrorCode::E1007 => "invalid assignment target",
            ErrorCode::E1008 => "invalid table field value",
            ErrorCode::E1009 => "only assignments and calls can be used as statements",
            ErrorCode::E1010 => "unknown attribute `{0}`",
            ErrorCode::E1011 => "compound assignment `{0}` takes exactly one target",
            ErrorCode::E1012 => "method name cannot be qualified after `:`",
            ErrorCode::E1013 => "`...` must be the last parameter",
            ErrorCode::E2001 => "{0} is not available in {1}; use {2} or later",
            ErrorCode::E2002 => "{0} is a preview feature in {1}; enable preview mode",
            ErrorCode::E9001 => "internal error: {0}",
            ErrorCode::W0501 => "#warning: {0}",
        }
    }

    pub fn is_lexer_error(&self) -> bool {
        self.as_str().starts_with("E00")
    }

    pub fn is_directive_error(&self) -> bool {
        self.as_str()[1..].starts_with("05")
    }

    pub fn is_parser_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E1001.to_string(), "E1001");
        assert_eq!(ErrorCode::W0501.as_str(), "W0501");
    }

    #[test]
    fn test_phase_classification() {
        assert!(ErrorCode::E0003.is_lexer_error());
        assert!(!ErrorCode::E0501.is_lexer_error());
        assert!(ErrorCode::E0501.is_directive_error());
        assert!(ErrorCode::W0501.is_directive_error());
        assert!(ErrorCode::E1009.is_parser_error());
        assert!(ErrorCode::W0501.is_warning());
        assert!(!ErrorCode::E2001.is_warning());
    }
}

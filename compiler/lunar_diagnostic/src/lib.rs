//! Diagnostics for the Lunar front end.
//!
//! Diagnostics are plain data attached to syntax elements:
//! - Error codes for searchability (see [`ErrorCode`])
//! - A message template filled from positional arguments
//! - An offset and width relative to the owning element
//!
//! The lexer and parser never fail; every problem they detect becomes a
//! [`Diagnostic`] on the narrowest element that covers it.

mod bag;
mod diagnostic;
mod error_code;

pub use bag::DiagnosticBag;
pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn message_substitutes_arguments_in_order() {
        let diag = Diagnostic::new(ErrorCode::E2001, 0, 2)
            .with_arg("floor division")
            .with_arg("Lua 5.1")
            .with_arg("Lua 5.3");
        assert_eq!(
            diag.message(),
            "floor division is not available in Lua 5.1; use Lua 5.3 or later"
        );
        assert_eq!(
            diag.to_string(),
            "error[E2001]: floor division is not available in Lua 5.1; use Lua 5.3 or later"
        );
    }

    #[test]
    fn message_keeps_literal_braces() {
        let diag = Diagnostic::new(ErrorCode::E0006, 0, 0);
        assert_eq!(
            diag.message(),
            "unterminated string interpolation, `}` expected"
        );
    }

    #[test]
    fn message_with_missing_argument_is_blank() {
        let diag = Diagnostic::new(ErrorCode::E1001, 0, 0);
        assert_eq!(diag.message(), "`` expected");
    }

    #[test]
    fn shifted_moves_offset_only() {
        let diag = Diagnostic::new(ErrorCode::E0001, 2, 5).shifted(3);
        assert_eq!((diag.offset, diag.width), (5, 5));
    }

    #[test]
    fn warning_codes_default_to_warning_severity() {
        assert_eq!(Diagnostic::new(ErrorCode::W0501, 0, 0).severity, Severity::Warning);
        assert_eq!(Diagnostic::new(ErrorCode::E0505, 0, 0).severity, Severity::Error);
    }
}

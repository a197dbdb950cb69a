//! Parse options and language feature gating.
//!
//! Version-dependent syntax is always recognized. When the selected
//! version lacks the feature, the construct still produces its normal
//! tokens and nodes and carries a feature-unavailable diagnostic, so the
//! tree shape never depends on the options.

use std::fmt;
use std::str::FromStr;

use lunar_diagnostic::{Diagnostic, ErrorCode};
use rustc_hash::FxHashSet;
use thiserror::Error;

/// Language version or dialect being parsed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum LanguageVersion {
    Lua51,
    Lua52,
    Lua53,
    #[default]
    Lua54,
    LuaJit,
    /// The MoonScript dialect: Lua 5.1 lexical rules plus string
    /// interpolation, multi-line strings and compound assignment.
    MoonScript,
}

impl LanguageVersion {
    pub fn display_name(self) -> &'static str {
        match self {
            LanguageVersion::Lua51 => "Lua 5.1",
            LanguageVersion::Lua52 => "Lua 5.2",
            LanguageVersion::Lua53 => "Lua 5.3",
            LanguageVersion::Lua54 => "Lua 5.4",
            LanguageVersion::LuaJit => "LuaJIT",
            LanguageVersion::MoonScript => "MoonScript",
        }
    }

    pub fn is_moonscript(self) -> bool {
        self == LanguageVersion::MoonScript
    }
}

impl fmt::Display for LanguageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A language version name that [`LanguageVersion::from_str`] does not know.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown language version `{0}` (expected one of: 5.1, 5.2, 5.3, 5.4, luajit, moonscript)")]
pub struct UnknownLanguageVersion(pub String);

impl FromStr for LanguageVersion {
    type Err = UnknownLanguageVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let version = match normalized.trim_start_matches("lua").trim_start() {
            "5.1" | "51" => LanguageVersion::Lua51,
            "5.2" | "52" => LanguageVersion::Lua52,
            "5.3" | "53" => LanguageVersion::Lua53,
            "5.4" | "54" => LanguageVersion::Lua54,
            "jit" | "-jit" | "_jit" => LanguageVersion::LuaJit,
            _ => match normalized.as_str() {
                "moonscript" | "moon" => LanguageVersion::MoonScript,
                _ => return Err(UnknownLanguageVersion(s.to_string())),
            },
        };
        Ok(version)
    }
}

/// Syntax whose availability depends on the language version.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Feature {
    Goto,
    HexEscapes,
    WhitespaceEscapes,
    UnicodeEscapes,
    HexFloats,
    BitwiseOperators,
    FloorDivision,
    LocalAttributes,
    /// `+=`, `-=`, `*=`, `/=`, `%=`, `^=`, `..=`
    CompoundAssignment,
    /// `&=`, `|=`, `<<=`, `>>=`
    BitwiseCompoundAssignment,
    /// `//=`
    FloorDivisionAssignment,
    /// `and=`, `or=`
    LogicalCompoundAssignment,
    StringInterpolation,
    MultilineStrings,
    Directives,
}

impl Feature {
    pub fn name(self) -> &'static str {
        match self {
            Feature::Goto => "goto",
            Feature::HexEscapes => "hexadecimal escapes",
            Feature::WhitespaceEscapes => "`\\z` escapes",
            Feature::UnicodeEscapes => "unicode escapes",
            Feature::HexFloats => "hexadecimal floats",
            Feature::BitwiseOperators => "bitwise operators",
            Feature::FloorDivision => "floor division",
            Feature::LocalAttributes => "local variable attributes",
            Feature::CompoundAssignment => "compound assignment",
            Feature::BitwiseCompoundAssignment => "bitwise compound assignment",
            Feature::FloorDivisionAssignment => "floor division assignment",
            Feature::LogicalCompoundAssignment => "logical compound assignment",
            Feature::StringInterpolation => "string interpolation",
            Feature::MultilineStrings => "multi-line strings",
            Feature::Directives => "preprocessor directives",
        }
    }

    /// Whether the feature is part of `version` without preview mode.
    pub fn is_available_in(self, version: LanguageVersion) -> bool {
        use LanguageVersion::{Lua52, Lua53, Lua54, LuaJit, MoonScript};
        match self {
            Feature::Goto | Feature::HexFloats | Feature::WhitespaceEscapes => {
                matches!(version, Lua52 | Lua53 | Lua54 | LuaJit)
            }
            Feature::HexEscapes => matches!(version, Lua52 | Lua53 | Lua54 | LuaJit | MoonScript),
            Feature::UnicodeEscapes => matches!(version, Lua53 | Lua54 | LuaJit),
            Feature::BitwiseOperators | Feature::FloorDivision => matches!(version, Lua53 | Lua54),
            Feature::LocalAttributes => version == Lua54,
            Feature::CompoundAssignment
            | Feature::LogicalCompoundAssignment
            | Feature::StringInterpolation
            | Feature::MultilineStrings => version == MoonScript,
            Feature::BitwiseCompoundAssignment
            | Feature::FloorDivisionAssignment
            | Feature::Directives => false,
        }
    }

    /// Whether preview mode turns the feature on for every version.
    pub fn is_preview(self) -> bool {
        matches!(
            self,
            Feature::CompoundAssignment
                | Feature::BitwiseCompoundAssignment
                | Feature::FloorDivisionAssignment
                | Feature::LogicalCompoundAssignment
                | Feature::Directives
        )
    }

    /// The first Lua release that has the feature, for diagnostics.
    pub fn minimum_version(self) -> Option<LanguageVersion> {
        match self {
            Feature::Goto
            | Feature::HexEscapes
            | Feature::WhitespaceEscapes
            | Feature::HexFloats => Some(LanguageVersion::Lua52),
            Feature::UnicodeEscapes | Feature::BitwiseOperators | Feature::FloorDivision => {
                Some(LanguageVersion::Lua53)
            }
            Feature::LocalAttributes => Some(LanguageVersion::Lua54),
            Feature::StringInterpolation | Feature::MultilineStrings => {
                Some(LanguageVersion::MoonScript)
            }
            _ => None,
        }
    }
}

/// Options that shape lexing and parsing.
#[derive(Clone, Debug, Default)]
pub struct ParseOptions {
    version: LanguageVersion,
    preview: bool,
    symbols: FxHashSet<String>,
}

impl ParseOptions {
    pub fn new(version: LanguageVersion) -> Self {
        ParseOptions {
            version,
            ..ParseOptions::default()
        }
    }

    #[must_use]
    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    /// Define a preprocessor symbol for `#if` directives.
    #[must_use]
    pub fn with_symbol(mut self, name: impl Into<String>) -> Self {
        self.symbols.insert(name.into());
        self
    }

    pub fn version(&self) -> LanguageVersion {
        self.version
    }

    pub fn preview(&self) -> bool {
        self.preview
    }

    pub fn symbols(&self) -> &FxHashSet<String> {
        &self.symbols
    }

    pub fn is_available(&self, feature: Feature) -> bool {
        feature.is_available_in(self.version) || (self.preview && feature.is_preview())
    }

    /// `None` when `feature` is usable; otherwise the diagnostic to attach
    /// to the construct at `offset..offset + width` of its owning element.
    pub fn feature_diagnostic(
        &self,
        feature: Feature,
        offset: u32,
        width: u32,
    ) -> Option<Diagnostic> {
        if self.is_available(feature) {
            return None;
        }
        let diagnostic = match feature.minimum_version() {
            Some(required) if !feature.is_preview() => {
                Diagnostic::new(ErrorCode::E2001, offset, width)
                    .with_arg(feature.name())
                    .with_arg(self.version.display_name())
                    .with_arg(required.display_name())
            }
            _ => Diagnostic::new(ErrorCode::E2002, offset, width)
                .with_arg(feature.name())
                .with_arg(self.version.display_name()),
        };
        Some(diagnostic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_version_names() {
        assert_eq!("5.1".parse::<LanguageVersion>(), Ok(LanguageVersion::Lua51));
        assert_eq!("Lua5.3".parse::<LanguageVersion>(), Ok(LanguageVersion::Lua53));
        assert_eq!("lua 5.4".parse::<LanguageVersion>(), Ok(LanguageVersion::Lua54));
        assert_eq!("LuaJIT".parse::<LanguageVersion>(), Ok(LanguageVersion::LuaJit));
        assert_eq!("moon".parse::<LanguageVersion>(), Ok(LanguageVersion::MoonScript));
        assert_eq!(
            "5.9".parse::<LanguageVersion>(),
            Err(UnknownLanguageVersion("5.9".to_string()))
        );
    }

    #[test]
    fn version_gated_feature_reports_required_version() {
        let options = ParseOptions::new(LanguageVersion::Lua51);
        let diag = options.feature_diagnostic(Feature::FloorDivision, 2, 2);
        assert_eq!(
            diag.map(|d| d.message()),
            Some("floor division is not available in Lua 5.1; use Lua 5.3 or later".to_string())
        );
        assert!(ParseOptions::new(LanguageVersion::Lua53)
            .feature_diagnostic(Feature::FloorDivision, 0, 2)
            .is_none());
    }

    #[test]
    fn preview_enables_compound_assignment() {
        let plain = ParseOptions::new(LanguageVersion::Lua54);
        assert_eq!(
            plain
                .feature_diagnostic(Feature::CompoundAssignment, 0, 2)
                .map(|d| d.code),
            Some(ErrorCode::E2002)
        );
        let preview = plain.with_preview(true);
        assert!(preview.is_available(Feature::CompoundAssignment));
        assert!(preview.is_available(Feature::FloorDivisionAssignment));
        assert!(!preview.is_available(Feature::StringInterpolation));
    }

    #[test]
    fn moonscript_has_interpolation_but_no_goto() {
        let moon = ParseOptions::new(LanguageVersion::MoonScript);
        assert!(moon.is_available(Feature::StringInterpolation));
        assert!(moon.is_available(Feature::CompoundAssignment));
        assert!(!moon.is_available(Feature::Goto));
    }

    #[test]
    fn symbols_are_recorded() {
        let options = ParseOptions::default().with_symbol("DEBUG");
        assert!(options.symbols().contains("DEBUG"));
        assert_eq!(options.version(), LanguageVersion::Lua54);
    }
}

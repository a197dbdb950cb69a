/// Decoded value of a literal token.
///
/// Strings are byte strings: decimal and hexadecimal escapes can produce
/// bytes that are not valid UTF-8 on their own.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum TokenValue {
    #[default]
    None,
    Integer(i64),
    /// Only produced for the decimal literal `9223372036854775808` (2^63),
    /// which is the magnitude of `i64::MIN` and must survive a later
    /// negation.
    UnsignedInteger(u64),
    Float(f64),
    String(Box<[u8]>),
}

impl TokenValue {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            TokenValue::String(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The string value, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            TokenValue::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            TokenValue::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, TokenValue::None)
    }
}

impl From<&str> for TokenValue {
    fn from(s: &str) -> Self {
        TokenValue::String(s.as_bytes().into())
    }
}

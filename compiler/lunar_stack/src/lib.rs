//! Stack growth for recursive descent.
//!
//! Expressions, nested blocks and directive conditions are parsed
//! recursively, and source text controls how deep that goes. Every
//! recursive entry point runs its body through [`ensure_sufficient_stack`],
//! which switches to a freshly allocated segment when the current one runs
//! low.
//!
//! On `wasm32` the call is a plain passthrough.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first moving to a new stack segment if the current one is
/// nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Nesting depth of a parenthesized chain like `((((x))))`.
    fn depth(text: &[u8]) -> usize {
        ensure_sufficient_stack(|| match text.split_first() {
            Some((b'(', rest)) => {
                1 + depth(rest.get(..rest.len().saturating_sub(1)).unwrap_or(&[]))
            }
            _ => 0,
        })
    }

    #[test]
    fn shallow_nesting() {
        assert_eq!(depth(b"((x))"), 2);
        assert_eq!(depth(b"x"), 0);
    }

    #[test]
    fn deep_nesting_does_not_overflow() {
        let n = 200_000;
        let text = format!("{}x{}", "(".repeat(n), ")".repeat(n));
        assert_eq!(depth(text.as_bytes()), n);
    }

    #[test]
    fn passes_result_through() {
        assert_eq!(ensure_sufficient_stack(|| "lunar"), "lunar");
    }
}

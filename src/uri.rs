//! URI well-formedness predicate used for authority and redirect validation.

// self
use crate::_prelude::*;

/// Returns `true` when `value` parses as an absolute URI.
///
/// Never panics; malformed, relative, and empty inputs simply return `false`.
pub fn is_well_formed_uri(value: &str) -> bool {
	!value.trim().is_empty() && Url::parse(value).is_ok()
}

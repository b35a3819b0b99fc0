//! Output formatting
//!
//! The compiler produces compact JSON. Pretty output re-indents that buffer
//! with one tab per nesting level, keeping key order.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::{MappingError, Result};

const INDENT: &[u8] = b"\t";

/// Re-indent a compact JSON buffer.
///
/// Failure means the buffer was not valid JSON, which the compiler never
/// produces; it is reported as [`MappingError::Formatting`].
pub fn indent(compact: &[u8]) -> Result<Vec<u8>> {
    let value: serde_json::Value =
        serde_json::from_slice(compact).map_err(MappingError::Formatting)?;

    let mut out = Vec::with_capacity(compact.len() * 2);
    let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut ser).map_err(MappingError::Formatting)?;
    Ok(out)
}

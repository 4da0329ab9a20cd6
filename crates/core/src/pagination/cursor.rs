//! Opaque pagination cursor codec.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::{PaginationError, PaginationResult};

/// Structural marker prefixing every cursor payload.
pub const CURSOR_MARKER: &str = "C";

/// Field delimiter of the cursor payload.
///
/// The payload is delimiter-joined without escaping: an id or type value
/// containing `|` would corrupt parsing. Ids are numeric and type tags are
/// fixed names, so encoding asserts the constraint instead of escaping.
pub const CURSOR_DELIMITER: char = '|';

/// A decoded pagination cursor.
///
/// A cursor is only valid for the entity type it was issued for; decoding
/// with a mismatched type fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    /// The id of the entity the cursor points at.
    pub id: String,
    /// The entity type tag.
    pub type_name: String,
    /// 1-based position of the entity in the full result set.
    pub index: u64,
}

/// Encode a pagination cursor for entity `id` of type `type_name` at
/// 1-based position `index`.
pub fn encode_cursor(id: &str, type_name: &str, index: u64) -> String {
    debug_assert!(
        !id.contains(CURSOR_DELIMITER) && !type_name.contains(CURSOR_DELIMITER),
        "cursor id/type must not contain the delimiter"
    );
    BASE64.encode(format!("{CURSOR_MARKER}|{type_name}|{id}|{index}"))
}

/// Decode a pagination cursor, checking it was issued for `expected_type`.
///
/// # Errors
///
/// - [`PaginationError::InvalidCursor`] if the input is not base64, the
///   payload does not have exactly four fields, the structural marker is
///   not `C`, or the index is not a number.
/// - [`PaginationError::InvalidCursorType`] if the embedded type differs
///   from `expected_type`.
pub fn decode_cursor(cursor: &str, expected_type: &str) -> PaginationResult<Cursor> {
    let bytes = BASE64
        .decode(cursor)
        .map_err(|_| PaginationError::InvalidCursor)?;
    let payload = String::from_utf8(bytes).map_err(|_| PaginationError::InvalidCursor)?;

    let mut fields = payload.split(CURSOR_DELIMITER);
    let (marker, type_name, id, index) = match (
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
    ) {
        (Some(marker), Some(type_name), Some(id), Some(index), None) => {
            (marker, type_name, id, index)
        }
        _ => return Err(PaginationError::InvalidCursor),
    };

    if marker != CURSOR_MARKER {
        return Err(PaginationError::InvalidCursor);
    }
    if type_name != expected_type {
        return Err(PaginationError::InvalidCursorType {
            expected: expected_type.to_string(),
            actual: type_name.to_string(),
        });
    }

    let index: u64 = index.parse().map_err(|_| PaginationError::InvalidCursor)?;

    Ok(Cursor {
        id: id.to_string(),
        type_name: type_name.to_string(),
        index,
    })
}

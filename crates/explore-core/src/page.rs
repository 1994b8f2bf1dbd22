//! Keyset page assembly shared by every backend.
//!
//! Backends fetch one row more than the page size. If that extra row comes
//! back there is another page, and the cursor is built from the last row
//! that is actually returned.

use crate::{Result, cursor::Cursor, decision::Liker};

/// Page size used when a caller asks for zero rows.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Replace a zero limit with [`DEFAULT_PAGE_SIZE`].
pub fn effective_limit(limit: usize) -> usize {
  if limit == 0 { DEFAULT_PAGE_SIZE } else { limit }
}

/// One page of likers plus the position to resume from, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikerPage {
  pub likers:      Vec<Liker>,
  pub next_cursor: Option<Cursor>,
}

impl LikerPage {
  /// Build a page from up to `limit + 1` rows in listing order.
  pub fn from_overfetched(mut rows: Vec<Liker>, limit: usize) -> Result<Self> {
    if rows.len() <= limit {
      return Ok(Self { likers: rows, next_cursor: None });
    }

    rows.truncate(limit);
    let next_cursor = match rows.last() {
      Some(last) => Some(Cursor::after(last)?),
      None => None,
    };
    Ok(Self { likers: rows, next_cursor })
  }

  pub fn is_last(&self) -> bool { self.next_cursor.is_none() }
}

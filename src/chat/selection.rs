//! Parsing of numbered menu choices.

use crate::error::{Error, Result};

/// The outcome of reading a numbered choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// A valid zero-based index.
    Index(usize),
    /// The user backed out with blank input, `q` or `quit`.
    Cancel,
}

/// Parses `input` as a choice among `count` entries.
///
/// Blank input, `q` and `quit` (any case) cancel.  Anything else must be a base-10
/// integer in `[0, count)`.
pub fn parse_selection(input: &str, count: usize) -> Result<Selection> {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit") {
        return Ok(Selection::Cancel);
    }
    let index: i64 = input.parse().map_err(|_| Error::invalid_choice(input))?;
    match usize::try_from(index) {
        Ok(index) if index < count => Ok(Selection::Index(index)),
        _ => Err(Error::choice_out_of_range(index, count)),
    }
}

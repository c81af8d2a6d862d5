//! Raw `x,y,z` triplet decoding
//!
//! Finds the first run of three comma-separated signed decimal numbers
//! anywhere in the line. Whitespace is allowed around the commas, and any
//! surrounding text is ignored.

use super::Coordinate;

/// Scan `line` for `<num> , <num> , <num>`
pub(super) fn find_triplet(line: &str) -> Option<Coordinate> {
    let bytes = line.as_bytes();
    (0..bytes.len()).find_map(|start| match_triplet_at(line, start))
}

fn match_triplet_at(line: &str, start: usize) -> Option<Coordinate> {
    let bytes = line.as_bytes();

    let (x, pos) = number_at(line, start)?;
    let pos = separator_at(bytes, pos)?;
    let (y, pos) = number_at(line, pos)?;
    let pos = separator_at(bytes, pos)?;
    let (z, _) = number_at(line, pos)?;

    Some(Coordinate {
        x: Some(x),
        y: Some(y),
        z: Some(z),
    })
}

/// Optional whitespace, a comma, optional whitespace
fn separator_at(bytes: &[u8], pos: usize) -> Option<usize> {
    let pos = skip_whitespace(bytes, pos);
    if bytes.get(pos) != Some(&b',') {
        return None;
    }
    Some(skip_whitespace(bytes, pos + 1))
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos).is_some_and(|b| *b == b' ' || *b == b'\t') {
        pos += 1;
    }
    pos
}

/// Match `[+-]? digits ('.' digits)?` or `[+-]? '.' digits` at `start`
///
/// Returns the value and the index just past the number.
fn number_at(line: &str, start: usize) -> Option<(f64, usize)> {
    let bytes = line.as_bytes();
    let mut pos = start;

    if matches!(bytes.get(pos), Some(b'+' | b'-')) {
        pos += 1;
    }

    let int_start = pos;
    while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
        pos += 1;
    }
    let has_int = pos > int_start;

    if bytes.get(pos) == Some(&b'.') && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit) {
        pos += 1;
        while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
            pos += 1;
        }
    } else if !has_int {
        return None;
    }

    let value = line.get(start..pos)?.parse::<f64>().ok()?;
    Some((value, pos))
}

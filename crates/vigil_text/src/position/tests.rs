use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_line_count_follows_source_semantics() {
    assert_eq!(PositionMap::new("").line_count(), 0);
    assert_eq!(PositionMap::new("abc").line_count(), 1);
    assert_eq!(PositionMap::new("abc\n").line_count(), 1);
    assert_eq!(PositionMap::new("abc\nd").line_count(), 2);
    assert_eq!(PositionMap::new("\n").line_count(), 1);
    assert_eq!(PositionMap::new("abc\nefg\n\n").line_count(), 3);
}

#[test]
fn test_line_start_offsets() {
    let map = PositionMap::new("abc\nefg\n\nhij");
    assert_eq!(map.line_start_offset(0), Some(0));
    assert_eq!(map.line_start_offset(1), Some(4));
    assert_eq!(map.line_start_offset(2), Some(8));
    assert_eq!(map.line_start_offset(3), Some(9));
    assert_eq!(map.line_start_offset(4), None);
}

#[test]
fn test_synthetic_trailing_line_has_a_start() {
    let map = PositionMap::new("abc\n");
    assert_eq!(map.line_start_offset(1), Some(4));
    assert_eq!(map.line_length(1), Some(0));
}

#[test]
fn test_line_length_excludes_terminator() {
    let map = PositionMap::new("abc\r\nxy\n");
    // `\r` is ordinary line content.
    assert_eq!(map.line_length(0), Some(4));
    assert_eq!(map.line_length(1), Some(2));
}

#[test]
fn test_line_validity() {
    let empty = PositionMap::new("");
    assert!(empty.is_line_valid(0));
    assert!(!empty.is_line_valid(1));

    let trailing = PositionMap::new("abc\n");
    assert!(trailing.is_line_valid(0));
    assert!(trailing.is_line_valid(1));
    assert!(!trailing.is_line_valid(2));

    let plain = PositionMap::new("abc\ndef");
    assert!(plain.is_line_valid(1));
    assert!(!plain.is_line_valid(2));
}

#[test]
fn test_column_validity() {
    let map = PositionMap::new("abc\nde");
    assert!(map.is_column_valid(0, 3));
    assert!(!map.is_column_valid(0, 4));
    assert!(map.is_column_valid(1, 2));
    assert!(!map.is_column_valid(2, 0));
}

#[test]
fn test_offset_of_clamps_character_to_line_end() {
    let map = PositionMap::new("abc\ndef");
    assert_eq!(map.offset_of(Position::new(0, 1)), Some(1));
    assert_eq!(map.offset_of(Position::new(0, 99)), Some(3));
    assert_eq!(map.offset_of(Position::new(1, 3)), Some(7));
    assert_eq!(map.offset_of(Position::new(2, 0)), None);
}

#[test]
fn test_clamped_offset_clamps_line() {
    let map = PositionMap::new("abc\ndef");
    assert_eq!(map.clamped_offset(Position::new(9, 0)), 4);
    assert_eq!(map.clamped_offset(Position::new(9, 9)), 7);
}

#[test]
fn test_position_of() {
    let map = PositionMap::new("line1\nline2\nline3");
    assert_eq!(map.position_of(0), Position::new(0, 0));
    assert_eq!(map.position_of(4), Position::new(0, 4));
    assert_eq!(map.position_of(5), Position::new(0, 5));
    assert_eq!(map.position_of(6), Position::new(1, 0));
    assert_eq!(map.position_of(12), Position::new(2, 0));
    assert_eq!(map.position_of(1000), Position::new(2, 5));
}

#[test]
fn test_utf16_columns() {
    let source = "A \u{1F680} B";
    let map = PositionMap::new(source);

    // The rocket is 4 bytes and 2 UTF-16 units.
    assert_eq!(map.position_of(2).character, 2);
    assert_eq!(map.position_of(7).character, 5);
    assert_eq!(map.offset_of(Position::new(0, 5)), Some(7));
    // A character inside the surrogate pair resolves before the rocket.
    assert_eq!(map.offset_of(Position::new(0, 3)), Some(2));
}

#[test]
fn test_position_of_inside_multibyte_char() {
    let map = PositionMap::new("\u{e9}x");
    assert_eq!(map.position_of(1), Position::new(0, 0));
}

#[test]
fn test_zero_based_to_one_based() {
    let map = PositionMap::new("abc\ndef\n");
    assert_eq!(zero_based_line_to_one_based_line(0, &map), Some(1));
    assert_eq!(zero_based_line_to_one_based_line(1, &map), Some(2));
    // Synthetic trailing line clamps onto the last real line.
    assert_eq!(zero_based_line_to_one_based_line(2, &map), Some(2));
    assert_eq!(zero_based_line_to_one_based_line(3, &map), None);

    let empty = PositionMap::new("");
    assert_eq!(zero_based_line_to_one_based_line(0, &empty), Some(1));
    assert_eq!(zero_based_line_to_one_based_line(1, &empty), None);

    let no_newline = PositionMap::new("abc");
    assert_eq!(zero_based_line_to_one_based_line(1, &no_newline), None);
}

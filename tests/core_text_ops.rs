use kumo::IndexOrigin;
use kumo::core::{char_len, delete, insert, slice};

#[test]
fn test_one_based_insert_appends() {
    let offset = IndexOrigin::OneBased.offset();
    assert_eq!(insert("hello", " world", 6, offset), "hello world");
    assert_eq!(insert("world", ">", 1, offset), ">world");
}

#[test]
fn test_zero_based_insert() {
    assert_eq!(insert("ac", "b", 1, IndexOrigin::ZeroBased.offset()), "abc");
}

#[test]
fn test_insert_clamps_past_the_end() {
    assert_eq!(insert("ab", "c", 99, -1), "abc");
    assert_eq!(insert("", "x", 1, -1), "x");
}

#[test]
fn test_negative_index_counts_from_the_end() {
    assert_eq!(insert("abc", "X", -1, 0), "abXc");
    assert_eq!(insert("abc", "X", -10, 0), "Xabc");
}

#[test]
fn test_one_based_delete() {
    let offset = IndexOrigin::OneBased.offset();
    assert_eq!(delete("hello world", 1, 6, offset), "world");
    assert_eq!(delete("hello", 5, 5, offset), "hell");
}

#[test]
fn test_positions_count_code_points() {
    assert_eq!(delete("héllo", 2, 3, -1), "hlo");
    assert_eq!(insert("😀b", "a", 2, -1), "😀ab");
    assert_eq!(char_len("😀a"), 2);
}

#[test]
fn test_inverted_delete_keeps_slice_semantics() {
    // The head runs past the tail, so the overlap appears twice.
    assert_eq!(delete("abcdef", 5, 2, 0), "abcdecdef");
}

#[test]
fn test_slice() {
    assert_eq!(slice("héllo", 1, 3), "él");
    assert_eq!(slice("hello", 3, 1), "");
    assert_eq!(slice("hello", 2, 99), "llo");
}

use kumo::core::{char_len, delete, insert};
use proptest::prelude::*;
mod proptest_config;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(proptest_config::cases()))]
    #[test]
    fn prop_empty_insert_is_identity(text in "\\PC{0,24}", index in -40i64..40, offset in -1i64..=0) {
        prop_assert_eq!(insert(&text, "", index, offset), text);
    }

    #[test]
    fn prop_insert_adds_its_length(
        text in "\\PC{0,24}",
        new in "\\PC{0,8}",
        index in -40i64..40,
        offset in -1i64..=0
    ) {
        let result = insert(&text, &new, index, offset);
        prop_assert_eq!(char_len(&result), char_len(&text) + char_len(&new));
    }

    #[test]
    fn prop_one_based_delete_removes_the_range(
        text in "\\PC{1,24}",
        a in any::<prop::sample::Index>(),
        b in any::<prop::sample::Index>()
    ) {
        let len = char_len(&text) as usize;
        let (x, y) = (a.index(len) + 1, b.index(len) + 1);
        let (start, end) = (x.min(y) as i64, x.max(y) as i64);

        let result = delete(&text, start, end, -1);

        let expected: String = text
            .chars()
            .enumerate()
            .filter(|(i, _)| (*i as i64) < start - 1 || (*i as i64) >= end)
            .map(|(_, c)| c)
            .collect();
        prop_assert_eq!(char_len(&result), char_len(&text) - (end - start + 1));
        prop_assert_eq!(result, expected);
    }

    #[test]
    fn prop_delete_length_is_bounded(
        text in "\\PC{0,24}",
        start in -40i64..40,
        end in -40i64..40
    ) {
        let result = delete(&text, start, end, -1);
        prop_assert!(char_len(&result) <= 2 * char_len(&text));
    }
}

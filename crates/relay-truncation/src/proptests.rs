//! Property checks for the slot contract and the truncation search

use std::collections::BTreeSet;

use futures::executor::block_on;
use proptest::prelude::*;

use crate::error::TruncatePromptError;
use crate::estimate::{estimate_discarded_count, LinearHistory};
use crate::fixtures::{SlotPrompt, WordTokenizer};
use crate::prompt::TruncatablePrompt;
use crate::truncate::{compute_discarded_messages, truncate_prompt};

fn word() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

fn text() -> impl Strategy<Value = String> {
    prop::collection::vec(word(), 1..4).prop_map(|words| words.join(" "))
}

fn prompt() -> impl Strategy<Value = SlotPrompt> {
    (
        prop::option::of(text()),
        prop::collection::vec(text(), 1..9),
        any::<bool>(),
    )
        .prop_map(|(system, messages, paired)| SlotPrompt {
            system,
            messages,
            paired,
        })
}

fn words_after_skipping(prompt: &SlotPrompt, count: usize) -> usize {
    prompt
        .skip_messages(count)
        .texts()
        .iter()
        .map(|text| text.split_whitespace().count())
        .sum()
}

/// A prompt plus a selection that always keeps the last slot.
fn prompt_and_selection() -> impl Strategy<Value = (SlotPrompt, BTreeSet<usize>)> {
    prompt().prop_flat_map(|prompt| {
        let len = prompt.len();
        let picks = prop::collection::btree_set(0..len, 0..len);
        (Just(prompt), picks).prop_map(move |(prompt, mut picks)| {
            picks.insert(len - 1);
            (prompt, picks)
        })
    })
}

proptest! {
    #[test]
    fn partition_covers_every_slot(prompt in prompt()) {
        prop_assert_eq!(prompt.partition().iter().sum::<usize>(), prompt.len());
        prop_assert!(prompt.is_required(prompt.len() - 1));
    }

    #[test]
    fn select_keeps_order_and_size((prompt, picks) in prompt_and_selection()) {
        let selected = prompt.select(&picks).unwrap();
        let texts = prompt.texts();
        let expected: Vec<&str> = picks.iter().map(|&index| texts[index]).collect();

        prop_assert_eq!(selected.len(), picks.len());
        prop_assert_eq!(selected.texts(), expected);
    }

    #[test]
    fn double_omit_equals_select((prompt, picks) in prompt_and_selection()) {
        let complement: BTreeSet<usize> =
            (0..prompt.len()).filter(|index| !picks.contains(index)).collect();

        prop_assert_eq!(prompt.omit(&complement).unwrap(), prompt.select(&picks).unwrap());
    }

    #[test]
    fn discarded_slots_are_sorted_optional_and_in_range(
        prompt in prompt(),
        limit in 1usize..30,
    ) {
        let tokenizer = WordTokenizer::new();
        let outcome = block_on(compute_discarded_messages(&prompt, &tokenizer, None, Some(limit)))
            .unwrap();

        if let Ok(discarded) = outcome {
            prop_assert!(discarded.windows(2).all(|pair| pair[0] < pair[1]));
            prop_assert!(discarded.iter().all(|&index| index < prompt.len()));
            prop_assert!(discarded.iter().all(|&index| !prompt.is_required(index)));
        }
    }

    #[test]
    fn truncation_is_idempotent(prompt in prompt(), limit in 1usize..30) {
        let tokenizer = WordTokenizer::new();

        if let Ok((_, truncated)) =
            block_on(truncate_prompt(&prompt, &tokenizer, None, Some(limit)))
        {
            let (again, retruncated) =
                block_on(truncate_prompt(&truncated, &tokenizer, None, Some(limit))).unwrap();
            prop_assert!(again.is_empty());
            prop_assert_eq!(retruncated, truncated);
        }
    }

    #[test]
    fn no_limits_never_discard(prompt in prompt()) {
        let tokenizer = WordTokenizer::new();
        let discarded = block_on(compute_discarded_messages(&prompt, &tokenizer, None, None))
            .unwrap()
            .unwrap();

        prop_assert!(discarded.is_empty());
    }

    #[test]
    fn estimated_discard_count_is_the_smallest_fitting_pair_count(
        prompt in prompt(),
        limit in 1usize..30,
    ) {
        let tokenizer = WordTokenizer::new();
        let count = prompt.message_count();
        let max_discard = count.saturating_sub(1) / 2 * 2;

        match block_on(estimate_discarded_count(&prompt, &tokenizer, limit)).unwrap() {
            Ok(discard) => {
                prop_assert_eq!(discard % 2, 0);
                prop_assert!(discard <= max_discard);
                prop_assert!(words_after_skipping(&prompt, discard) <= limit);
                if discard >= 2 {
                    prop_assert!(words_after_skipping(&prompt, discard - 2) > limit);
                }
            }
            Err(TruncatePromptError::UserLimitOverflow { user_limit, token_count }) => {
                prop_assert_eq!(user_limit, limit);
                prop_assert!(words_after_skipping(&prompt, max_discard) > limit);
                prop_assert!(token_count > limit);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}

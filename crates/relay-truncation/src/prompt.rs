//! The slot contract every model-specific prompt implements

use std::collections::BTreeSet;

use crate::error::PromptError;

/// An ordered sequence of logical message slots that can be narrowed down.
///
/// A slot is usually one chat message, but a system instruction kept apart
/// from the message list still counts as a slot of its own.
///
/// Implementations must uphold:
/// - `partition()` sums to `len()`
/// - the last slot is always required
/// - `select` and `omit` leave the receiver untouched
pub trait TruncatablePrompt: Sized {
    /// Number of slots
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the slot must survive truncation.
    fn is_required(&self, index: usize) -> bool;

    /// Block sizes defining the keep/discard granularity.
    fn partition(&self) -> Vec<usize>;

    /// A new prompt holding only the slots at `indices`, in their original order.
    ///
    /// Fails when the last slot is not among `indices`.
    fn select(&self, indices: &BTreeSet<usize>) -> Result<Self, PromptError>;

    /// A new prompt without the slots at `indices`.
    fn omit(&self, indices: &BTreeSet<usize>) -> Result<Self, PromptError> {
        let kept = (0..self.len())
            .filter(|index| !indices.contains(index))
            .collect();
        self.select(&kept)
    }
}

/// Checks a selection against a prompt of `len` slots.
pub fn check_selection(len: usize, indices: &BTreeSet<usize>) -> Result<(), PromptError> {
    if len == 0 {
        return Err(PromptError::Empty);
    }
    if let Some(&index) = indices.iter().next_back().filter(|&&index| index >= len) {
        return Err(PromptError::IndexOutOfRange { index, len });
    }
    if !indices.contains(&(len - 1)) {
        return Err(PromptError::MissingLastSlot);
    }
    Ok(())
}

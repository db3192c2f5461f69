//! The decode cursor.

use crate::error::{BufferUnderrunError, DecodingError};
use abi_primitives::{SELECTOR_SIZE, WORD_SIZE};
use alloy_primitives::{Selector, B256};

/// A read cursor over ABI encoded data.
///
/// The cursor keeps a stack of scopes: the base offsets against which relative pointers read
/// from the data resolve to absolute offsets. A set pushes a scope at its start before reading
/// its members and pops it once done.
///
/// Offsets may point to content that was already read, so the cursor also counts the words
/// decoded, to bound the work against the length of the input.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    offset: usize,
    scopes: Vec<usize>,
    selector: Option<Selector>,
    spent: usize,
}

impl<'a> Cursor<'a> {
    /// Returns a new [`Cursor`] positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0, scopes: vec![0], selector: None, spent: 0 }
    }

    /// Returns a new [`Cursor`] over call data: the first 4 bytes are stripped and recorded as
    /// the selector.
    pub fn with_selector(data: &'a [u8]) -> Result<Self, BufferUnderrunError> {
        if data.len() < SELECTOR_SIZE {
            return Err(BufferUnderrunError {
                offset: 0,
                requested: SELECTOR_SIZE,
                available: data.len(),
            })
        }
        let (selector, data) = data.split_at(SELECTOR_SIZE);
        Ok(Self { selector: Some(Selector::from_slice(selector)), ..Self::new(data) })
    }

    /// Returns the selector stripped at construction, if any.
    pub const fn selector(&self) -> Option<Selector> {
        self.selector
    }

    /// Returns the current read offset.
    pub const fn position(&self) -> usize {
        self.offset
    }

    /// Returns the length of the data, selector excluded.
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the data is empty.
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of bytes left after the read offset.
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Moves the read offset to the absolute `offset`.
    pub fn seek(&mut self, offset: usize) -> Result<(), BufferUnderrunError> {
        if offset > self.data.len() {
            return Err(self.underrun(offset, 0))
        }
        self.offset = offset;
        Ok(())
    }

    /// Reads the next word and advances the cursor.
    pub fn pop_word(&mut self) -> Result<B256, BufferUnderrunError> {
        self.pop_words(1).map(B256::from_slice)
    }

    /// Reads the next `n` words and advances the cursor.
    pub fn pop_words(&mut self, n: usize) -> Result<&'a [u8], BufferUnderrunError> {
        let size = n.checked_mul(WORD_SIZE).ok_or_else(|| self.underrun(self.offset, usize::MAX))?;
        let bytes = self.read_bytes(self.offset, self.offset.saturating_add(size))?;
        self.offset += size;
        Ok(bytes)
    }

    /// Reads the bytes in `[from, to)` without moving the cursor.
    pub fn read_bytes(&self, from: usize, to: usize) -> Result<&'a [u8], BufferUnderrunError> {
        let data = self.data;
        data.get(from..to).ok_or_else(|| self.underrun(from, to.saturating_sub(from)))
    }

    /// Returns the number of words charged so far.
    pub const fn spent(&self) -> usize {
        self.spent
    }

    /// Charges `words` of decoding work. The budget is `factor` words per word of input, plus
    /// `factor` words. A zero `factor` disables the budget.
    pub fn charge(&mut self, words: usize, factor: usize) -> Result<(), DecodingError> {
        self.spent = self.spent.saturating_add(words);
        let budget = factor.saturating_mul(self.data.len() / WORD_SIZE + 1);
        if factor != 0 && self.spent > budget {
            return Err(DecodingError::BudgetExceeded { budget, input: self.data.len() })
        }
        Ok(())
    }

    /// Pushes the current offset as base for relative offsets.
    pub fn start_scope(&mut self) {
        self.scopes.push(self.offset);
    }

    /// Pops the innermost scope. The root scope is never popped.
    pub fn end_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Returns the base offset of the innermost scope.
    pub fn scope_base(&self) -> usize {
        self.scopes.last().copied().unwrap_or_default()
    }

    /// Converts an offset relative to the innermost scope into an absolute offset. Returns
    /// [`None`] on overflow.
    pub fn to_absolute_offset(&self, relative: usize) -> Option<usize> {
        self.scope_base().checked_add(relative)
    }

    fn underrun(&self, offset: usize, requested: usize) -> BufferUnderrunError {
        BufferUnderrunError { offset, requested, available: self.data.len() }
    }
}

//! Pairwise byte swapping
//!
//! Swaps `bytes[i]` with `bytes[i - 1]` for every odd `i`. Combined with the
//! endianness of the final read this produces the word-swapped orders
//! (`CDAB`, `BADC` and their 8-byte analogues). The swap is applied across
//! the whole buffer regardless of the value width; a trailing unpaired byte
//! stays where it is.

/// Swap adjacent byte pairs in place
///
/// Mutates `bytes`. Callers that do not own the buffer should use
/// [`permute`] instead.
#[inline]
pub fn permute_in_place(bytes: &mut [u8]) {
    for pair in bytes.chunks_exact_mut(2) {
        pair.swap(0, 1);
    }
}

/// Return a permuted copy of `bytes`, leaving the input untouched
///
/// When `word_swap` is false the copy is identical to the input.
pub fn permute(bytes: &[u8], word_swap: bool) -> Vec<u8> {
    let mut out = bytes.to_vec();
    if word_swap {
        permute_in_place(&mut out);
    }
    out
}

//! Backtracking enumeration of fragment combinations.
//!
//! One call walks a builder's selector list depth-first and returns every
//! admissible ordered fragment-index sequence, each packed into the fixed
//! 32-slot signature used throughout the pipeline. Branch paths that
//! converge on the same signature are merged into a single combination.
//! The walk is a pure function of its input: no state survives between
//! calls, and independent selector lists may be enumerated concurrently.

use crate::admission::{Admission, admit};
use hashbrown::HashMap;
use smelt_common::formats::{SIGNATURE_SLOTS, ShaderFragmentSelector};

/// One enumerated fragment sequence plus the flag state that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Combination {
    /// Zero-terminated fragment indices in selector-list order.
    pub signature: [u8; SIGNATURE_SLOTS],
    /// OR of the `flags` of every selector admitted into this sequence.
    pub flags: u32,
}

/// Enumerate every valid combination for one selector list.
///
/// Each [`Admission::Branch`] selector doubles the explored paths, so the
/// walk visits at most 2^branches sequences; exclusion and requirement
/// gates are re-evaluated at every step against the incrementally
/// accumulated flags, so no returned sequence embeds a selector whose gate
/// would have failed under the flags preceding it. Recursion depth is
/// bounded by the selector count (tens in practice).
///
/// Returned signatures are distinct: branch paths that converge on the
/// same fragment sequence (a branching selector with fragment index 0, or
/// one excluded again further down its include path) collapse into one
/// combination carrying the OR of the converging paths' flags.
pub fn enumerate(selectors: &[ShaderFragmentSelector]) -> Vec<Combination> {
    let mut visited = Vec::new();
    let mut signature = [0u8; SIGNATURE_SLOTS];
    walk(selectors, 0, 0, 0, &mut signature, &mut visited);

    // Merge duplicate signatures, keeping first-visit order.
    let mut index_of: HashMap<[u8; SIGNATURE_SLOTS], usize> = HashMap::new();
    let mut results: Vec<Combination> = Vec::with_capacity(visited.len());
    for combination in visited {
        match index_of.get(&combination.signature) {
            Some(&at) => results[at].flags |= combination.flags,
            None => {
                index_of.insert(combination.signature, results.len());
                results.push(combination);
            }
        }
    }

    tracing::debug!(
        selectors = selectors.len(),
        combinations = results.len(),
        "enumerated selector list"
    );
    results
}

fn walk(
    selectors: &[ShaderFragmentSelector],
    index: usize,
    out: usize,
    flags: u32,
    signature: &mut [u8; SIGNATURE_SLOTS],
    results: &mut Vec<Combination>,
) {
    let Some(selector) = selectors.get(index) else {
        // Zero-terminate the unused slots (slot value 0 is the "no
        // fragment" sentinel) and record a copy.
        for slot in signature[out..].iter_mut() {
            *slot = 0;
        }
        results.push(Combination {
            signature: *signature,
            flags,
        });
        return;
    };

    match admit(selector, flags) {
        Admission::Skip => walk(selectors, index + 1, out, flags, signature, results),
        Admission::Include => {
            include(selectors, index, out, flags, signature, results);
        }
        Admission::Branch => {
            walk(selectors, index + 1, out, flags, signature, results);
            include(selectors, index, out, flags, signature, results);
        }
    }
}

fn include(
    selectors: &[ShaderFragmentSelector],
    index: usize,
    out: usize,
    flags: u32,
    signature: &mut [u8; SIGNATURE_SLOTS],
    results: &mut Vec<Combination>,
) {
    let selector = &selectors[index];
    let mut out = out;
    if selector.fragment_index != 0 && out < SIGNATURE_SLOTS {
        signature[out] = selector.fragment_index;
        out += 1;
    }
    walk(
        selectors,
        index + 1,
        out,
        flags | selector.flags,
        signature,
        results,
    );
}

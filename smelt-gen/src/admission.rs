//! Selector admission against the accumulated flag state.

use smelt_common::formats::{CheckKind, ShaderFragmentSelector};

/// What one selector does when the enumeration reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Never contributes here; flags unchanged.
    Skip,
    /// Always contributes when reached.
    Include,
    /// Runtime-dependent: both the included and the skipped continuation
    /// are valid, so the enumeration explores both.
    Branch,
}

/// Evaluate one selector's admission predicate.
///
/// The flag gates are static (they depend only on what earlier selectors
/// contributed); vertex-element usage and non-trivial check kinds depend on
/// live render data the build doesn't have, which is what makes a selector
/// a [`Admission::Branch`].
pub fn admit(selector: &ShaderFragmentSelector, accumulated_flags: u32) -> Admission {
    if selector.excluded_flags & accumulated_flags != 0 {
        return Admission::Skip;
    }
    if selector.required_flags != 0 && selector.required_flags & accumulated_flags == 0 {
        return Admission::Skip;
    }
    if selector.vertex_usage_flags == 0 && selector.check_kind == CheckKind::Unconditional {
        return Admission::Include;
    }
    Admission::Branch
}

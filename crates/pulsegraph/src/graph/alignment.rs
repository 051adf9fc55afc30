//! Alignment policies governing the relative ordering of a graph's children.

/// The strategy controlling how the direct children of a program graph are
/// ordered and timed.
///
/// The policy itself is opaque to this crate: an external sequencing pass
/// turns it into precedence edges and an external scheduling pass turns it
/// into absolute times. The IR only needs to know which policies are
/// degenerate with a single child (see [`Alignment::collapses_single`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// Children start as early as possible.
    Left,
    /// Children end as late as possible.
    Right,
    /// Children run one after the other, in insertion order.
    Sequential,
    /// Children are spread evenly over the given duration.
    Equispaced { duration: u64 },
    /// Children are positioned by an externally registered callback,
    /// identified by name, over the given duration.
    Func { duration: u64, name: String },
}

impl Alignment {
    /// Whether this policy is sequential.
    pub fn is_sequential(&self) -> bool {
        matches!(self, Alignment::Sequential)
    }

    /// Whether this policy is a no-op for a graph with a single child.
    ///
    /// Left, right, and sequential alignment place a lone child identically;
    /// equispaced and callback alignments are position-dependent and are
    /// never treated as degenerate.
    pub fn collapses_single(&self) -> bool {
        matches!(
            self,
            Alignment::Left | Alignment::Right | Alignment::Sequential
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_alignments_collapse_a_single_child() {
        assert!(Alignment::Left.collapses_single());
        assert!(Alignment::Right.collapses_single());
        assert!(Alignment::Sequential.collapses_single());
        assert!(!Alignment::Equispaced { duration: 1000 }.collapses_single());
        assert!(!Alignment::Func {
            duration: 1000,
            name: "identity".into()
        }
        .collapses_single());
    }
}

/// What a state machine operation did.
///
/// Operations never fail. A caller that does not care can ignore the outcome;
/// one that does can tell a satisfied no-op from a bad id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The block list or focus changed
    Applied,
    /// No block has the given id
    NotFound,
    /// The operation would break a structural rule (removing the last block,
    /// merging the first block, moving past either end)
    Refused,
}

impl EditOutcome {
    pub fn is_applied(self) -> bool {
        self == EditOutcome::Applied
    }
}

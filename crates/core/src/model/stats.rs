/// Average shown for a subject nobody has attempted yet.
pub const FALLBACK_AVERAGE_SCORE: u32 = 70;

/// Derived per-subject dashboard figures.
///
/// Recomputed from raw result and activity records on every request; never
/// persisted or incrementally maintained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateStats {
    pub total_questions: usize,
    pub total_users: usize,
    pub average_score: u32,
    pub active_users: usize,
}

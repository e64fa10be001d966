use crate::models::Recommendation;

/// Hard cap on generation attempts per call
pub const MAX_ATTEMPTS: u8 = 2;

const STRICT_SUFFIX: &str = " (STRICT MATCH ONLY - IGNORE ALL OTHER CATEGORIES)";

/// When a validated first attempt is weak enough to try again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retry when fewer than this many candidates survive validation...
    pub min_filtered: usize,
    /// ...and the model produced more than this many raw candidates
    pub min_raw_for_retry: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            min_filtered: 2,
            min_raw_for_retry: 3,
        }
    }
}

impl RetryPolicy {
    /// A short raw list is how some tools always answer; only a long list that
    /// validation gutted suggests stricter matching would help
    pub fn wants_retry(&self, raw_count: usize, filtered_count: usize) -> bool {
        filtered_count < self.min_filtered && raw_count > self.min_raw_for_retry
    }
}

/// What one attempt produced
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// The model returned no candidates
    Empty,
    /// Candidates came back and were run through the validator
    Scored {
        raw_count: usize,
        filtered: Vec<Recommendation>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttemptState {
    Initial,
    RetryStrict {
        query: String,
        /// Validated output of the first attempt, if it had any candidates
        previous: Option<Vec<Recommendation>>,
    },
    FallbackMock,
    Done(Vec<Recommendation>),
}

pub fn strict_query(query: &str) -> String {
    format!("{}{}", query, STRICT_SUFFIX)
}

/// Next state after `attempt` produced `outcome`
///
/// `base_query` is the query the first attempt ran with. Never yields another
/// generation state once `attempt` reaches [`MAX_ATTEMPTS`].
pub fn next_state(
    attempt: u8,
    outcome: AttemptOutcome,
    policy: &RetryPolicy,
    base_query: &str,
    previous: Option<Vec<Recommendation>>,
) -> AttemptState {
    let can_retry = attempt < MAX_ATTEMPTS;

    match outcome {
        AttemptOutcome::Empty if can_retry => AttemptState::RetryStrict {
            query: strict_query(base_query),
            previous: None,
        },
        AttemptOutcome::Empty => match previous {
            Some(previous) => AttemptState::Done(previous),
            None => AttemptState::FallbackMock,
        },
        AttemptOutcome::Scored {
            raw_count,
            filtered,
        } => {
            if can_retry && policy.wants_retry(raw_count, filtered.len()) {
                AttemptState::RetryStrict {
                    query: strict_query(base_query),
                    previous: Some(filtered),
                }
            } else {
                AttemptState::Done(filtered)
            }
        }
    }
}

/// Where a strict retry that failed hard leaves the call
///
/// The first attempt already succeeded, so its validated list wins; without one
/// the mock is served instead of surfacing the error.
pub fn after_failed_retry(previous: Option<Vec<Recommendation>>) -> AttemptState {
    match previous {
        Some(previous) => AttemptState::Done(previous),
        None => AttemptState::FallbackMock,
    }
}

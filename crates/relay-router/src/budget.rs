//! The replan retry counter.

/// Remaining plan revisions for one pipeline run.
///
/// Not `Clone`: the budget is moved from stage to stage inside a
/// [`PipelineRun`](crate::PipelineRun), and only the reflecting stage spends
/// it. The count only goes up.
#[derive(Debug, PartialEq, Eq)]
pub struct ReplanBudget {
    used: u32,
    max: u32,
}

impl ReplanBudget {
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { used: 0, max }
    }

    #[must_use]
    pub const fn used(&self) -> u32 {
        self.used
    }

    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.max.saturating_sub(self.used)
    }

    /// Spend one revision. An exhausted budget comes back unchanged as `Err`.
    pub(crate) const fn spend(self) -> Result<Self, Self> {
        if self.used >= self.max {
            return Err(self);
        }
        Ok(Self {
            used: self.used + 1,
            max: self.max,
        })
    }
}

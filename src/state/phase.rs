//! Crawl lifecycle definitions
//!
//! A crawl moves `Idle -> Running -> {BudgetReached | FrontierExhausted |
//! ExternalStop} -> Closed`. Every terminal state goes through `Closed`,
//! which is where the summary is produced.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the current phase of the crawl controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Controller built, crawl not started
    Idle,

    /// Main loop is dispatching and processing pages
    Running,

    /// Page budget spent
    BudgetReached,

    /// No pending work and nothing in flight
    FrontierExhausted,

    /// Stop signal observed
    ExternalStop,

    /// Crawl finalized, summary emitted
    Closed,
}

impl CrawlPhase {
    /// Returns true if this is one of the three stop states
    pub fn is_stopping(&self) -> bool {
        matches!(
            self,
            Self::BudgetReached | Self::FrontierExhausted | Self::ExternalStop
        )
    }

    /// Returns true if moving from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        match (self, next) {
            (Self::Idle, Self::Running) => true,
            (Self::Running, n) => n.is_stopping(),
            (s, Self::Closed) => s.is_stopping(),
            _ => false,
        }
    }

    /// Returns the stop reason for a stop state
    pub fn stop_reason(&self) -> Option<StopReason> {
        match self {
            Self::BudgetReached => Some(StopReason::BudgetReached),
            Self::FrontierExhausted => Some(StopReason::FrontierExhausted),
            Self::ExternalStop => Some(StopReason::ExternalStop),
            _ => None,
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::BudgetReached => "budget_reached",
            Self::FrontierExhausted => "frontier_exhausted",
            Self::ExternalStop => "external_stop",
            Self::Closed => "closed",
        };
        write!(f, "{}", name)
    }
}

/// Why a crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The configured page budget was reached
    BudgetReached,
    /// Every reachable page was visited
    FrontierExhausted,
    /// The crawl was interrupted
    ExternalStop,
}

impl StopReason {
    /// Returns the matching controller phase
    pub fn phase(&self) -> CrawlPhase {
        match self {
            Self::BudgetReached => CrawlPhase::BudgetReached,
            Self::FrontierExhausted => CrawlPhase::FrontierExhausted,
            Self::ExternalStop => CrawlPhase::ExternalStop,
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::BudgetReached => "page budget reached",
            Self::FrontierExhausted => "frontier exhausted",
            Self::ExternalStop => "stopped by signal",
        };
        write!(f, "{}", text)
    }
}

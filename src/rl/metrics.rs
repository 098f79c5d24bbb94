//! Statistics reported by the learner and the simulation driver.

use std::fmt;

/// Snapshot of the shared learner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearnerStats {
    /// Distinct encoded states with at least one stored value.
    pub total_states: usize,
    /// Stored (state, action) values.
    pub total_actions: usize,
    /// Current exploration rate.
    pub epsilon: f64,
    pub learning_rate: f64,
}

impl fmt::Display for LearnerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Learner ===")?;
        writeln!(f, "  States:         {}", self.total_states)?;
        writeln!(f, "  Actions:        {}", self.total_actions)?;
        writeln!(f, "  Epsilon:        {:.4}", self.epsilon)?;
        writeln!(f, "  Learning rate:  {:.2}", self.learning_rate)
    }
}

/// Running counters of a simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationStats {
    pub tick: u64,
    /// Agents currently on the map.
    pub active: usize,
    pub eliminated: u32,
    pub successful: u32,
    pub structures: usize,
    pub score: i64,
    pub epsilon: f64,
}

impl fmt::Display for SimulationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick {:>6} | active {:>3} | eliminated {:>4} | reached {:>4} | structures {:>3} | score {:>6} | eps {:.3}",
            self.tick,
            self.active,
            self.eliminated,
            self.successful,
            self.structures,
            self.score,
            self.epsilon
        )
    }
}

/// Summary of a finished (or interrupted) simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalStats {
    pub eliminated: u32,
    pub successful: u32,
    /// Percentage of finished agents that were eliminated.
    pub defense_efficiency: f64,
    /// Mean age in ticks of finished agents.
    pub mean_survival_ticks: f64,
    pub final_score: i64,
    pub ticks: u64,
}

impl FinalStats {
    /// Aggregates the outcome counters and the ages of every finished agent.
    pub fn new(
        eliminated: u32,
        successful: u32,
        survival_ticks: &[u64],
        final_score: i64,
        ticks: u64,
    ) -> Self {
        let finished = eliminated + successful;
        let defense_efficiency = if finished > 0 {
            eliminated as f64 / finished as f64 * 100.0
        } else {
            0.0
        };
        let mean_survival_ticks = if survival_ticks.is_empty() {
            0.0
        } else {
            survival_ticks.iter().sum::<u64>() as f64 / survival_ticks.len() as f64
        };
        Self {
            eliminated,
            successful,
            defense_efficiency,
            mean_survival_ticks,
            final_score,
            ticks,
        }
    }
}

impl fmt::Display for FinalStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Final Stats ({} ticks) ===", self.ticks)?;
        writeln!(f, "  Eliminated:          {}", self.eliminated)?;
        writeln!(f, "  Reached goal:        {}", self.successful)?;
        writeln!(f, "  Defense efficiency:  {:.1}%", self.defense_efficiency)?;
        writeln!(f, "  Mean survival:       {:.1} ticks", self.mean_survival_ticks)?;
        writeln!(f, "  Final score:         {}", self.final_score)
    }
}

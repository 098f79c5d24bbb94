//! Simulation driver.
//!
//! Runs the tick loop: spawn → tick every agent → remove finished agents → decay
//! exploration → check for game over.

#[cfg(feature = "serde")]
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::config::{ConfigError, SimulationConfig};
use super::controller::{AgentController, TickOutcome};
use super::learner::QLearner;
use super::metrics::{FinalStats, SimulationStats};
#[cfg(feature = "serde")]
use super::persistence::PersistenceError;
use crate::grid::{CellType, GridEnvironment, GridMap, Position};
use crate::{generate_id, Id};

/// Score awarded per eliminated agent.
pub const ELIMINATION_SCORE: i64 = 5;
/// Score awarded per damaging hit.
pub const HIT_SCORE: i64 = 1;
/// Score lost per agent reaching the goal.
pub const BREACH_SCORE: i64 = -10;

/// Result of a single simulation step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepResult {
    /// Tick number after the step.
    pub tick: u64,
    /// Agent spawned this step, if any.
    pub spawned: Option<Id>,
    /// Agents removed as eliminated this step.
    pub eliminated: Vec<Id>,
    /// Agents removed for reaching the goal this step.
    pub reached_end: Vec<Id>,
    /// Agents whose move this step was a tactical retreat.
    pub retreating: usize,
    pub game_over: bool,
}

/// Grid, shared learner and active agents.
///
/// # Lifecycle
///
/// 1. Create with [`Simulation::new`] (default map) or [`Simulation::with_learner`].
/// 2. Optionally place structures and spawn agents by hand.
/// 3. Call [`Simulation::step`] until [`StepResult::game_over`].
/// 4. Read [`Simulation::final_stats`] and save the learned table.
#[derive(Debug)]
pub struct Simulation {
    pub config: SimulationConfig,
    map: GridMap,
    learner: QLearner,
    agents: Vec<AgentController>,
    rng: StdRng,
    tick: u64,
    ticks_since_spawn: u64,
    eliminated: u32,
    successful: u32,
    score: i64,
    /// Ages of every finished agent.
    survival_ticks: Vec<u64>,
    game_over: bool,
}

impl Simulation {
    /// Creates a simulation on the default map with a fresh learner.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        let map = GridMap::with_horizontal_path(config.map_width, config.map_height, config.cell_size);
        Self::with_map(config, map)
    }

    /// Creates a simulation on `map` with a fresh learner.
    pub fn with_map(config: SimulationConfig, map: GridMap) -> Result<Self, ConfigError> {
        let learner = QLearner::new(&config.learning, config.seed.wrapping_add(1))?;
        Ok(Self::with_learner(config, map, learner))
    }

    /// Creates a simulation on `map` that trains `learner`.
    pub fn with_learner(config: SimulationConfig, map: GridMap, learner: QLearner) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            map,
            learner,
            agents: Vec::new(),
            rng,
            tick: 0,
            ticks_since_spawn: 0,
            eliminated: 0,
            successful: 0,
            score: 0,
            survival_ticks: Vec::new(),
            game_over: false,
        }
    }

    /// Spawns an agent at column 0 on a random row that holds a path, start or empty cell.
    ///
    /// Gives up after `spawn_attempts` rows.
    pub fn spawn_agent(&mut self) -> Option<Id> {
        if self.map.height() > 0 {
            for _ in 0..self.config.spawn_attempts {
                let pos = Position::new(0, self.rng.gen_range(0..self.map.height()));
                if matches!(
                    self.map.cell(pos),
                    Some(CellType::Path | CellType::Start | CellType::Empty)
                ) {
                    return Some(self.spawn_agent_at(pos));
                }
            }
        }
        warn!(
            attempts = self.config.spawn_attempts,
            "no valid spawn cell found"
        );
        None
    }

    /// Spawns an agent at `pos` without checking the cell.
    pub fn spawn_agent_at(&mut self, pos: Position) -> Id {
        let id = generate_id();
        let ctrl = AgentController::new(id.clone(), pos, &self.map, self.config.agent.clone());
        debug!(agent = %id, position = %pos, "agent spawned");
        self.agents.push(ctrl);
        id
    }

    /// Advances the simulation by one tick.
    ///
    /// Once the game is over, further calls change nothing.
    pub fn step(&mut self) -> StepResult {
        let mut result = StepResult {
            tick: self.tick,
            game_over: self.game_over,
            ..StepResult::default()
        };
        if self.game_over {
            return result;
        }

        self.tick += 1;
        result.tick = self.tick;

        self.ticks_since_spawn += 1;
        if self.ticks_since_spawn >= self.config.spawn_interval_ticks {
            self.ticks_since_spawn = 0;
            result.spawned = self.spawn_agent();
        }

        let outcomes: Vec<TickOutcome> = self
            .agents
            .iter_mut()
            .map(|ctrl| ctrl.tick(&self.map, &mut self.learner))
            .collect();

        for (ctrl, outcome) in self.agents.iter().zip(&outcomes) {
            match outcome {
                TickOutcome::Moving => {}
                TickOutcome::Retreating => result.retreating += 1,
                TickOutcome::Eliminated => {
                    self.eliminated += 1;
                    self.score += ELIMINATION_SCORE;
                    self.survival_ticks.push(ctrl.state().age);
                    result.eliminated.push(ctrl.state().id.clone());
                }
                TickOutcome::ReachedEnd => {
                    self.successful += 1;
                    self.score += BREACH_SCORE;
                    self.survival_ticks.push(ctrl.state().age);
                    result.reached_end.push(ctrl.state().id.clone());
                }
            }
        }
        self.agents.retain(|ctrl| !ctrl.status().is_terminal());

        self.learner.decay_epsilon();

        if self.successful >= self.config.max_successful {
            self.game_over = true;
            info!(
                tick = self.tick,
                successful = self.successful,
                "game over"
            );
        }
        result.game_over = self.game_over;
        result
    }

    /// Steps until the game is over or `max_ticks` more ticks have run.
    pub fn run(&mut self, max_ticks: u64) -> FinalStats {
        for _ in 0..max_ticks {
            if self.step().game_over {
                break;
            }
        }
        self.final_stats()
    }

    /// Deals external damage to an agent.
    ///
    /// A damaging hit scores [`HIT_SCORE`]; a lethal one also removes the agent at once and
    /// counts it as eliminated. Returns `None` for an unknown agent, otherwise whether the
    /// hit was lethal.
    pub fn damage_agent(&mut self, id: &str, amount: i32) -> Option<bool> {
        let idx = self.agents.iter().position(|c| c.id() == id)?;
        if amount > 0 {
            self.score += HIT_SCORE;
        }
        let lethal = self.agents[idx].take_damage(amount);
        if lethal {
            let ctrl = self.agents.remove(idx);
            self.eliminated += 1;
            self.score += ELIMINATION_SCORE;
            self.survival_ticks.push(ctrl.state().age);
            debug!(agent = %id, "agent destroyed");
        }
        Some(lethal)
    }

    /// Places a structure at `pos` if the cell allows it.
    pub fn place_structure(&mut self, pos: Position) -> bool {
        self.map.place_structure(pos)
    }

    /// Removes the structure at `pos`, restoring a path cell.
    pub fn remove_structure(&mut self, pos: Position) -> bool {
        self.map.remove_structure(pos)
    }

    pub fn stats(&self) -> SimulationStats {
        SimulationStats {
            tick: self.tick,
            active: self.agents.len(),
            eliminated: self.eliminated,
            successful: self.successful,
            structures: self.map.structure_count(),
            score: self.score,
            epsilon: self.learner.epsilon(),
        }
    }

    pub fn final_stats(&self) -> FinalStats {
        FinalStats::new(
            self.eliminated,
            self.successful,
            &self.survival_ticks,
            self.score,
            self.tick,
        )
    }

    /// Writes the learner's table to `path`.
    #[cfg(feature = "serde")]
    pub fn save_learning_table(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        self.learner.table().save(path)
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    pub fn learner(&self) -> &QLearner {
        &self.learner
    }

    pub fn into_learner(self) -> QLearner {
        self.learner
    }

    pub fn agents(&self) -> &[AgentController] {
        &self.agents
    }

    pub fn agent(&self, id: &str) -> Option<&AgentController> {
        self.agents.iter().find(|c| c.id() == id)
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }
}

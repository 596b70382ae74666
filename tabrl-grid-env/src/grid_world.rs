//! Deterministic grid world.
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use tabrl_core::{error::TabrlError, Act, Env, State, StateId, Transition};

/// Action of [`GridWorld`].
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub enum Move {
    /// Decrease the row index.
    Up,
    /// Increase the row index.
    Down,
    /// Decrease the column index.
    Left,
    /// Increase the column index.
    Right,
}

impl Act for Move {}

/// Configuration of [`GridWorld`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct GridWorldConfig {
    /// Number of columns.
    pub width: usize,

    /// Number of rows.
    pub height: usize,

    /// Terminal cells as (column, row) pairs.
    pub terminals: Vec<(usize, usize)>,

    /// Designated start cell, if any.
    pub start: Option<(usize, usize)>,

    /// Reward of every non-terminal step.
    pub step_reward: f64,

    /// Reward of a step entering a terminal cell.
    pub terminal_reward: f64,
}

impl Default for GridWorldConfig {
    fn default() -> Self {
        Self {
            width: 4,
            height: 4,
            terminals: vec![(0, 0), (3, 3)],
            start: None,
            step_reward: -1.0,
            terminal_reward: 1.0,
        }
    }
}

impl GridWorldConfig {
    /// Sets the grid dimensions.
    pub fn size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the terminal cells.
    pub fn terminals(mut self, v: Vec<(usize, usize)>) -> Self {
        self.terminals = v;
        self
    }

    /// Sets the designated start cell.
    pub fn start(mut self, x: usize, y: usize) -> Self {
        self.start = Some((x, y));
        self
    }

    /// Sets the step reward.
    pub fn step_reward(mut self, v: f64) -> Self {
        self.step_reward = v;
        self
    }

    /// Sets the terminal-entry reward.
    pub fn terminal_reward(mut self, v: f64) -> Self {
        self.terminal_reward = v;
        self
    }

    /// Constructs [`GridWorldConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`GridWorldConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// A rectangular grid with deterministic moves.
///
/// Cell (x, y) gets the stable id `y * width + x`. All four moves are
/// legal in every non-terminal cell; a move off the edge leaves the
/// position unchanged. Entering a terminal cell ends the episode with the
/// terminal reward, every other step earns the step reward.
pub struct GridWorld {
    width: usize,
    states: Vec<State<Move>>,
    start: Option<StateId>,
    step_reward: f64,
    terminal_reward: f64,
}

impl GridWorld {
    fn cell_id(&self, x: usize, y: usize) -> StateId {
        StateId(y * self.width + x)
    }

    /// The (column, row) position of a state.
    pub fn position(&self, id: StateId) -> (usize, usize) {
        (id.0 % self.width, id.0 / self.width)
    }
}

impl Env for GridWorld {
    type Config = GridWorldConfig;
    type Act = Move;

    fn build(config: &Self::Config, _seed: u64) -> Result<Self> {
        info!(
            "building {}x{} grid world with {} terminal cells",
            config.width,
            config.height,
            config.terminals.len()
        );
        let n = config.width * config.height;
        let states = (0..n)
            .map(|ix| {
                let (x, y) = (ix % config.width, ix / config.width);
                let terminal = config.terminals.contains(&(x, y));
                let actions = if terminal {
                    vec![]
                } else {
                    vec![Move::Up, Move::Down, Move::Left, Move::Right]
                };
                State::new(StateId(ix), terminal, actions)
            })
            .collect();
        let start = config.start.map(|(x, y)| StateId(y * config.width + x));
        Ok(Self {
            width: config.width,
            states,
            start,
            step_reward: config.step_reward,
            terminal_reward: config.terminal_reward,
        })
    }

    fn n_states(&self) -> usize {
        self.states.len()
    }

    fn state(&self, id: StateId) -> &State<Move> {
        &self.states[id.0]
    }

    fn states_plus(&self) -> Vec<StateId> {
        self.states.iter().map(|s| s.id()).collect()
    }

    fn states(&self) -> Vec<StateId> {
        self.states
            .iter()
            .filter(|s| !s.is_terminal())
            .map(|s| s.id())
            .collect()
    }

    fn start_state(&self) -> Option<StateId> {
        self.start
    }

    fn transit(&mut self, state: StateId, act: Move) -> Result<Transition> {
        if !self.state(state).actions().contains(&act) {
            return Err(TabrlError::IllegalAction {
                state,
                act: format!("{:?}", act),
            }
            .into());
        }
        let (x, y) = self.position(state);
        let height = self.states.len() / self.width;
        let (nx, ny) = match act {
            Move::Up => (x, y.saturating_sub(1)),
            Move::Down => (x, (y + 1).min(height - 1)),
            Move::Left => (x.saturating_sub(1), y),
            Move::Right => ((x + 1).min(self.width - 1), y),
        };
        let next = self.cell_id(nx, ny);
        let terminal = self.state(next).is_terminal();
        Ok(Transition {
            next,
            reward: if terminal {
                self.terminal_reward
            } else {
                self.step_reward
            },
            is_terminated: terminal,
            is_truncated: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridWorld {
        GridWorld::build(&GridWorldConfig::default(), 0).unwrap()
    }

    #[test]
    fn ids_are_stable_row_major() {
        let env = grid();
        assert_eq!(env.position(StateId(0)), (0, 0));
        assert_eq!(env.position(StateId(7)), (3, 1));
        assert_eq!(env.n_states(), 16);
    }

    #[test]
    fn terminal_cells_have_no_actions() {
        let env = grid();
        assert!(env.state(StateId(0)).is_terminal());
        assert!(env.state(StateId(15)).is_terminal());
        assert!(env.state(StateId(0)).actions().is_empty());
        assert_eq!(env.states().len(), 14);
        assert_eq!(env.states_plus().len(), 16);
    }

    #[test]
    fn moves_clamp_at_the_border() {
        let mut env = grid();
        // (3, 0) moving right stays put.
        let t = env.transit(StateId(3), Move::Right).unwrap();
        assert_eq!(t.next, StateId(3));
        assert!(!t.is_terminated);
        assert_eq!(t.reward, -1.0);
    }

    #[test]
    fn entering_a_terminal_pays_the_terminal_reward() {
        let mut env = grid();
        // (1, 0) moving left enters the (0, 0) terminal.
        let t = env.transit(StateId(1), Move::Left).unwrap();
        assert_eq!(t.next, StateId(0));
        assert!(t.is_terminated);
        assert_eq!(t.reward, 1.0);
    }

    #[test]
    fn illegal_action_fails_fast() {
        let mut env = grid();
        assert!(env.transit(StateId(0), Move::Up).is_err());
    }

    #[test]
    fn config_yaml_round_trip() -> Result<()> {
        use tempdir::TempDir;

        let config = GridWorldConfig::default()
            .size(6, 5)
            .terminals(vec![(5, 4)])
            .start(0, 0)
            .step_reward(-0.5)
            .terminal_reward(10.0);

        let dir = TempDir::new("grid_world_config")?;
        let path = dir.path().join("grid.yaml");
        config.save(&path)?;
        assert_eq!(GridWorldConfig::load(&path)?, config);
        Ok(())
    }
}

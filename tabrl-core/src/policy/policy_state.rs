//! Per-state policy record.
use super::StateActionPolicy;
use crate::Act;
use rand::{rngs::StdRng, Rng};

/// Policy record of one state.
///
/// Holds the state's visit count, its value estimate (used by Monte Carlo
/// prediction) and one [`StateActionPolicy`] per legal action. The action
/// set is fixed at creation; rebalancing only redistributes probability
/// mass over it.
#[derive(Clone, Debug, PartialEq)]
pub struct PolicyState<A: Act> {
    value: Option<f64>,
    visits: usize,
    actions: Vec<(A, StateActionPolicy)>,
}

impl<A: Act> PolicyState<A> {
    /// Creates a record with uniform probabilities over the given actions.
    pub fn uniform(actions: &[A]) -> Self {
        let n = actions.len();
        let prob = if n == 0 { 0.0 } else { 1.0 / n as f64 };
        Self {
            value: None,
            visits: 0,
            actions: actions.iter().map(|a| (*a, StateActionPolicy::new(prob))).collect(),
        }
    }

    /// The state-value estimate, if any update has happened yet.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Times this state has been visited.
    pub fn visits(&self) -> usize {
        self.visits
    }

    /// Number of legal actions.
    pub fn n_actions(&self) -> usize {
        self.actions.len()
    }

    /// Iterates over the actions and their records.
    pub fn actions(&self) -> impl Iterator<Item = (A, &StateActionPolicy)> {
        self.actions.iter().map(|(a, sap)| (*a, sap))
    }

    /// Counts one visit of the state.
    pub fn record_visit(&mut self) {
        self.visits += 1;
    }

    /// Incremental-mean update of the state value towards the return `g`.
    pub fn update_value_mean(&mut self, g: f64) {
        self.visits += 1;
        let v = self.value.unwrap_or(0.0);
        self.value = Some(v + (g - v) / self.visits as f64);
    }

    /// Position of `act` in this state's action set.
    pub fn action_index(&self, act: A) -> Option<usize> {
        self.actions.iter().position(|(a, _)| *a == act)
    }

    /// The record of `act`, if it is a legal action of this state.
    pub fn action(&self, act: A) -> Option<&StateActionPolicy> {
        self.actions.iter().find(|(a, _)| *a == act).map(|(_, sap)| sap)
    }

    /// The record at a previously looked-up action index.
    pub fn action_at(&self, ix: usize) -> &StateActionPolicy {
        &self.actions[ix].1
    }

    /// Mutable access to the record at an action index.
    pub fn action_at_mut(&mut self, ix: usize) -> &mut StateActionPolicy {
        &mut self.actions[ix].1
    }

    /// Highest action value; unset values read as -inf.
    pub fn max_value(&self) -> f64 {
        self.actions
            .iter()
            .map(|(_, sap)| sap.value_or_neg_inf())
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Highest action value with unset values reading as `default`.
    ///
    /// This is the bootstrap form used by Q-learning targets, where a
    /// never-tried action still counts as zero-valued. An empty action
    /// set yields `default`.
    pub fn max_value_or(&self, default: f64) -> f64 {
        if self.actions.is_empty() {
            return default;
        }
        self.actions
            .iter()
            .map(|(_, sap)| sap.value_or(default))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Expectation of the action values under the current distribution.
    pub fn expected_value(&self) -> f64 {
        self.actions
            .iter()
            .map(|(_, sap)| sap.prob() * sap.value_or(0.0))
            .sum()
    }

    /// The greedy action: highest value, first on ties.
    pub fn greedy_action(&self) -> Option<A> {
        let max = self.max_value();
        self.actions
            .iter()
            .find(|(_, sap)| sap.value_or_neg_inf() == max)
            .map(|(a, _)| *a)
    }

    /// Samples an action from the current distribution.
    ///
    /// A single uniform draw is scanned against the cumulative
    /// probabilities of the in-policy actions. If accumulated probability
    /// never exceeds the draw due to floating-point rounding, the last
    /// enumerated in-policy action is returned; this fallback is part of
    /// the contract, not an error path.
    pub fn sample(&self, rng: &mut StdRng) -> Option<A> {
        let draw: f64 = rng.gen();
        let mut acc = 0.0;
        let mut last = None;
        for (a, sap) in self.actions.iter() {
            if !sap.in_policy() {
                continue;
            }
            last = Some(*a);
            acc += sap.prob();
            if draw < acc {
                return last;
            }
        }
        last
    }

    /// Recomputes every action's probability from the current values.
    ///
    /// With `epsilon == 0` the tie set of maximal actions splits the whole
    /// mass evenly and every other action drops out of the policy. With
    /// `epsilon > 0` every action keeps the floor `epsilon / n` and the tie
    /// set additionally splits `1 - epsilon`, so exploration never dies out.
    pub fn rebalance(&mut self, epsilon: f64) {
        let n = self.actions.len();
        if n == 0 {
            return;
        }
        let max = self.max_value();
        let k = self
            .actions
            .iter()
            .filter(|(_, sap)| sap.value_or_neg_inf() == max)
            .count();
        for (_, sap) in self.actions.iter_mut() {
            let is_max = sap.value_or_neg_inf() == max;
            let prob = if epsilon == 0.0 {
                if is_max {
                    1.0 / k as f64
                } else {
                    0.0
                }
            } else {
                let floor = epsilon / n as f64;
                if is_max {
                    (1.0 - epsilon) / k as f64 + floor
                } else {
                    floor
                }
            };
            sap.set_prob(prob);
        }
    }

    fn ucb_score(&self, sap: &StateActionPolicy, c: f64) -> f64 {
        if sap.visits() == 0 {
            // Never-tried actions are forced before any exploitation.
            return f64::INFINITY;
        }
        let n = self.visits.max(1) as f64;
        sap.value_or(0.0) + c * (n.ln() / sap.visits() as f64).sqrt()
    }

    /// The action with the highest upper-confidence-bound score.
    pub fn ucb_action(&self, c: f64) -> Option<A> {
        let mut best: Option<(A, f64)> = None;
        for (a, sap) in self.actions.iter() {
            let score = self.ucb_score(sap, c);
            match best {
                Some((_, s)) if s >= score => {}
                _ => best = Some((*a, score)),
            }
        }
        best.map(|(a, _)| a)
    }

    /// Greedy rebalance scored by UCB instead of raw value.
    ///
    /// Used during tree-search backpropagation; ties split evenly exactly
    /// as in the greedy branch of [`PolicyState::rebalance`].
    pub fn rebalance_ucb(&mut self, c: f64) {
        let n = self.actions.len();
        if n == 0 {
            return;
        }
        let scores: Vec<f64> = self
            .actions
            .iter()
            .map(|(_, sap)| self.ucb_score(sap, c))
            .collect();
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let k = scores.iter().filter(|s| **s == max).count();
        for ((_, sap), score) in self.actions.iter_mut().zip(scores.iter()) {
            let prob = if *score == max { 1.0 / k as f64 } else { 0.0 };
            sap.set_prob(prob);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum A4 {
        A,
        B,
        C,
        D,
    }
    impl Act for A4 {}

    const ALL: [A4; 4] = [A4::A, A4::B, A4::C, A4::D];

    fn prob_sum(ps: &PolicyState<A4>) -> f64 {
        ps.actions().map(|(_, sap)| sap.prob()).sum()
    }

    #[test]
    fn uniform_probs_sum_to_one() {
        let ps = PolicyState::uniform(&ALL);
        assert!((prob_sum(&ps) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn greedy_rebalance_concentrates_on_max() {
        let mut ps = PolicyState::uniform(&ALL);
        let ix = ps.action_index(A4::C).unwrap();
        ps.action_at_mut(ix).update_mean(1.0);
        ps.rebalance(0.0);

        assert!((prob_sum(&ps) - 1.0).abs() < 1e-12);
        assert_eq!(ps.action(A4::C).unwrap().prob(), 1.0);
        assert!(!ps.action(A4::A).unwrap().in_policy());
        assert_eq!(ps.greedy_action(), Some(A4::C));
    }

    #[test]
    fn greedy_rebalance_splits_ties() {
        let mut ps = PolicyState::uniform(&ALL);
        for a in [A4::B, A4::D] {
            let ix = ps.action_index(a).unwrap();
            ps.action_at_mut(ix).update_mean(2.0);
        }
        ps.rebalance(0.0);

        assert_eq!(ps.action(A4::B).unwrap().prob(), 0.5);
        assert_eq!(ps.action(A4::D).unwrap().prob(), 0.5);
        assert!(!ps.action(A4::A).unwrap().in_policy());
    }

    #[test]
    fn soft_rebalance_keeps_floor_probability() {
        let mut ps = PolicyState::uniform(&ALL);
        let ix = ps.action_index(A4::A).unwrap();
        ps.action_at_mut(ix).update_mean(1.0);
        ps.rebalance(0.2);

        assert!((prob_sum(&ps) - 1.0).abs() < 1e-12);
        assert!((ps.action(A4::A).unwrap().prob() - (0.8 + 0.05)).abs() < 1e-12);
        for a in [A4::B, A4::C, A4::D] {
            assert!((ps.action(a).unwrap().prob() - 0.05).abs() < 1e-12);
            assert!(ps.action(a).unwrap().in_policy());
        }
    }

    #[test]
    fn all_unset_values_tie() {
        let mut ps = PolicyState::uniform(&ALL);
        ps.rebalance(0.0);
        for (_, sap) in ps.actions.iter() {
            assert_eq!(sap.prob(), 0.25);
        }
    }

    #[test]
    fn sample_returns_in_policy_action() {
        let mut ps = PolicyState::uniform(&ALL);
        let ix = ps.action_index(A4::B).unwrap();
        ps.action_at_mut(ix).update_mean(1.0);
        ps.rebalance(0.0);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            assert_eq!(ps.sample(&mut rng), Some(A4::B));
        }
    }

    #[test]
    fn ucb_prefers_untried_actions() {
        let mut ps = PolicyState::uniform(&ALL);
        ps.record_visit();
        let ix = ps.action_index(A4::A).unwrap();
        ps.action_at_mut(ix).update_win(true);

        // A has been tried; the argmax must be one of the untried actions.
        let picked = ps.ucb_action(2f64.sqrt()).unwrap();
        assert_ne!(picked, A4::A);
    }

    #[test]
    fn max_value_or_is_not_clamped_at_the_default() {
        // All values set and negative: the maximum must come out negative,
        // not be pulled up to the default.
        let mut ps = PolicyState::uniform(&[A4::A, A4::B]);
        let a = ps.action_index(A4::A).unwrap();
        let b = ps.action_index(A4::B).unwrap();
        ps.action_at_mut(a).update_mean(-5.0);
        ps.action_at_mut(b).update_mean(-3.0);
        assert_eq!(ps.max_value_or(0.0), -3.0);

        // An unset action still reads as the default.
        let mut ps = PolicyState::uniform(&[A4::A, A4::B]);
        let a = ps.action_index(A4::A).unwrap();
        ps.action_at_mut(a).update_mean(-5.0);
        assert_eq!(ps.max_value_or(0.0), 0.0);
    }

    #[test]
    fn expected_value_weights_by_probability() {
        let mut ps = PolicyState::uniform(&[A4::A, A4::B]);
        let a = ps.action_index(A4::A).unwrap();
        let b = ps.action_index(A4::B).unwrap();
        ps.action_at_mut(a).update_mean(2.0);
        ps.action_at_mut(b).update_mean(-2.0);
        // Still uniform: 0.5 * 2 + 0.5 * (-2) = 0.
        assert!(ps.expected_value().abs() < 1e-12);
    }
}

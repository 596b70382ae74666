//! Per-(state, action) statistics.

/// Statistics of one (state, action) pair.
///
/// A fresh record has an unset value estimate; unset values read as
/// negative infinity wherever a maximum or argmax is taken, and as an
/// explicit default wherever a bootstrap target is formed. The visit count
/// only ever grows.
#[derive(Clone, Debug, PartialEq)]
pub struct StateActionPolicy {
    value: Option<f64>,
    visits: usize,
    prob: f64,
    cum_weight: f64,
}

impl StateActionPolicy {
    pub(crate) fn new(prob: f64) -> Self {
        Self {
            value: None,
            visits: 0,
            prob,
            cum_weight: 0.0,
        }
    }

    /// The value estimate, if any update has happened yet.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// The value estimate, or `default` if it is still unset.
    pub fn value_or(&self, default: f64) -> f64 {
        self.value.unwrap_or(default)
    }

    /// The value estimate for max/argmax purposes: unset reads as -inf.
    pub fn value_or_neg_inf(&self) -> f64 {
        self.value.unwrap_or(f64::NEG_INFINITY)
    }

    /// Times this pair has been updated.
    pub fn visits(&self) -> usize {
        self.visits
    }

    /// Probability that this action is chosen when the policy is sampled.
    pub fn prob(&self) -> f64 {
        self.prob
    }

    /// Whether the action currently carries any probability mass.
    pub fn in_policy(&self) -> bool {
        self.prob > 0.0
    }

    /// Cumulative importance-weight sum, used by off-policy control.
    pub fn cum_weight(&self) -> f64 {
        self.cum_weight
    }

    pub(crate) fn set_prob(&mut self, prob: f64) {
        self.prob = prob;
    }

    /// Incremental-mean update towards the return `g`.
    pub fn update_mean(&mut self, g: f64) {
        self.visits += 1;
        let v = self.value_or(0.0);
        self.value = Some(v + (g - v) / self.visits as f64);
    }

    /// Constant-step-size update towards the bootstrap target.
    pub fn update_td(&mut self, alpha: f64, target: f64) {
        self.visits += 1;
        let q = self.value_or(0.0);
        self.value = Some(q + alpha * (target - q));
    }

    /// Weighted incremental-mean update with importance weight `w`.
    ///
    /// The weight is added to the cumulative sum before the value moves,
    /// so the first update with `w == 1` lands exactly on `g`.
    pub fn update_weighted(&mut self, w: f64, g: f64) {
        self.visits += 1;
        self.cum_weight += w;
        let v = self.value_or(0.0);
        self.value = Some(v + (w / self.cum_weight) * (g - v));
    }

    /// Incremental mean of a win indicator, used by tree search.
    pub fn update_win(&mut self, win: bool) {
        let w = if win { 1.0 } else { 0.0 };
        self.update_mean(w);
    }
}

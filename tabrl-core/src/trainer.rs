//! Drive a [`Learner`] for an iteration budget.
mod config;

use crate::{
    record::{Record, RecordValue::Scalar, Recorder},
    Env, Evaluator, Learner, PolicyTable,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::info;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the learning loop and related objects.
///
/// One training iteration is one [`Learner::episode`] call: the learner
/// generates an episode (or tree-search path) against the environment and
/// folds it into the policy table. The trainer repeats this for the
/// configured budget, periodically evaluating the greedy policy and
/// passing per-iteration metrics to a [`Recorder`].
///
/// ```mermaid
/// graph LR
///     A[Learner]-->|Act|B[Env]
///     B -->|"(State, Reward)"|A
///     A -->|value updates|C[PolicyTable]
///     C -->|action distribution|A
/// ```
///
/// Work is bounded purely by `max_iters`; there is no early-abort signal
/// mid-episode beyond what the environment itself reports.
pub struct Trainer {
    /// The maximal number of training iterations.
    max_iters: usize,

    /// Interval of evaluation in iterations.
    eval_interval: usize,

    /// Interval of flushing records in iterations.
    flush_record_interval: usize,
}

impl Trainer {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig) -> Self {
        Self {
            max_iters: config.max_iters,
            eval_interval: config.eval_interval,
            flush_record_interval: config.flush_record_interval,
        }
    }

    /// Performs one training iteration.
    ///
    /// The second return value tells whether an evaluation ran.
    pub fn train_step<E, L, D>(
        &self,
        env: &mut E,
        policy: &mut PolicyTable<E::Act>,
        learner: &mut L,
        evaluator: &mut D,
        iter: usize,
    ) -> Result<(Record, bool)>
    where
        E: Env,
        L: Learner<E>,
        D: Evaluator<E>,
    {
        let mut record = learner.episode(env, policy)?;

        if self.eval_interval != 0 && iter % self.eval_interval == 0 {
            let eval_return = evaluator.evaluate(env, policy)?;
            record.insert("eval_return", Scalar(eval_return as f32));
            info!("iteration {}: eval_return = {}", iter, eval_return);
            Ok((record, true))
        } else {
            Ok((record, false))
        }
    }

    /// Runs the learner for the full iteration budget.
    pub fn train<E, L, D>(
        &mut self,
        env: &mut E,
        policy: &mut PolicyTable<E::Act>,
        learner: &mut L,
        evaluator: &mut D,
        recorder: &mut dyn Recorder,
    ) -> Result<()>
    where
        E: Env,
        L: Learner<E>,
        D: Evaluator<E>,
    {
        for iter in 1..=self.max_iters {
            let (mut record, _) = self.train_step(env, policy, learner, evaluator, iter)?;

            record.insert("iteration", Scalar(iter as f32));
            recorder.write(record);

            if self.flush_record_interval != 0 && iter % self.flush_record_interval == 0 {
                recorder.flush(iter as i64);
            }
        }
        info!("finished {} iterations", self.max_iters);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mc::{McPredictionConfig, MonteCarloPrediction};
    use crate::record::{BufferedRecorder, NullRecorder};
    use crate::testing::{LineConfig, LineWorld};
    use crate::{Configurable, DefaultEvaluator};

    #[test]
    fn trainer_runs_the_full_budget() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut env = LineWorld::fixture(LineConfig::default());
        let mut policy = PolicyTable::for_env(&env);
        let mut learner = MonteCarloPrediction::build(McPredictionConfig::default());
        let mut evaluator = DefaultEvaluator::new(2, 10_000, 0);
        let mut recorder = BufferedRecorder::new();

        let mut trainer = Trainer::build(TrainerConfig::default().max_iters(25).eval_interval(5));
        trainer
            .train(
                &mut env,
                &mut policy,
                &mut learner,
                &mut evaluator,
                &mut recorder,
            )
            .unwrap();

        assert_eq!(recorder.len(), 25);
        let evals = recorder
            .iter()
            .filter(|r| r.get("eval_return").is_some())
            .count();
        assert_eq!(evals, 5);
    }

    #[test]
    fn null_recorder_discards_records_but_training_proceeds() {
        let mut env = LineWorld::fixture(LineConfig::default());
        let mut policy = PolicyTable::for_env(&env);
        let mut learner = MonteCarloPrediction::build(McPredictionConfig::default());
        let mut evaluator = DefaultEvaluator::new(1, 10_000, 0);
        let mut recorder = NullRecorder {};

        let mut trainer = Trainer::build(TrainerConfig::default().max_iters(10).eval_interval(5));
        trainer
            .train(
                &mut env,
                &mut policy,
                &mut learner,
                &mut evaluator,
                &mut recorder,
            )
            .unwrap();

        assert!(policy.states().any(|id| policy.get(id).unwrap().visits() > 0));
    }
}

//! Utilities for inspecting learned policies.
use crate::{
    evaluator::greedy_step,
    record::{Record, RecordValue, Recorder},
    Env, PolicyTable,
};
use anyhow::Result;

/// Runs greedy episodes with a policy and records every step.
///
/// Episodes start at the environment's designated start state, or at a
/// random non-terminal state if there is none. Returns the per-episode
/// cumulative rewards.
pub fn eval_with_recorder<E, R>(
    env: &mut E,
    policy: &PolicyTable<E::Act>,
    n_episodes: usize,
    step_cap: usize,
    recorder: &mut R,
) -> Result<Vec<f64>>
where
    E: Env,
    R: Recorder,
{
    let mut rs = Vec::new();

    for episode in 0..n_episodes {
        env.reset()?;
        let mut cur = match env.start_state() {
            Some(s) => s,
            None => {
                let states = env.states();
                states[fastrand::usize(..states.len())]
            }
        };
        let mut count_step = 0;
        let mut r_total = 0.0;

        loop {
            let t = greedy_step(env, policy, cur)?;
            r_total += t.reward;

            let mut record = Record::empty();
            record.insert("episode", RecordValue::Scalar(episode as f32));
            record.insert("step", RecordValue::Scalar(count_step as f32));
            record.insert("state", RecordValue::Scalar(cur.0 as f32));
            record.insert("reward", RecordValue::Scalar(t.reward as f32));
            recorder.write(record);

            if t.is_done() || count_step >= step_cap {
                break;
            }
            cur = t.next;
            count_step += 1;
        }
        rs.push(r_total);
    }

    Ok(rs)
}

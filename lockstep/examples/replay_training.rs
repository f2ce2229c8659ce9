//! Example demonstrating a replay-buffer workflow.
//!
//! This example shows how to:
//! - Declare lockstep fields for transitions
//! - Append rollout batches with automatic eviction
//! - Sample aligned minibatches with next-state offsets
//! - Run an epoch of shuffled, no-replacement batches

#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]

use lockstep::error::Result;
use lockstep::{ElementType, FieldSpec, ReadRequest, RingBuffer};
use rand::SeedableRng;
use rand::rngs::StdRng;

const OBS_DIM: usize = 4;

fn main() -> Result<()> {
    println!("lockstep replay buffer example");

    // Keep the most recent 256 transitions.
    let mut buffer = RingBuffer::new(
        256,
        vec![
            FieldSpec::new("obs", ElementType::F32, vec![OBS_DIM])?,
            FieldSpec::scalar("action", ElementType::I32),
            FieldSpec::scalar("reward", ElementType::F32),
        ],
    )?;

    // Simulate 10 rollouts of 40 steps each; older rollouts get evicted.
    for rollout in 0..10 {
        let steps = 40;
        let obs: Vec<f32> = (0..steps * OBS_DIM)
            .map(|i| (rollout * steps + i) as f32 * 0.01)
            .collect();
        let action: Vec<i32> = (0..steps).map(|i| (i % 3) as i32).collect();
        let reward: Vec<f32> = (0..steps).map(|i| if i % 5 == 0 { 1.0 } else { 0.0 }).collect();

        buffer.append(&[
            ("obs", obs.into()),
            ("action", action.into()),
            ("reward", reward.into()),
        ])?;
    }
    println!(
        "appended 400 steps, buffer holds {} of capacity {}",
        buffer.len(),
        buffer.capacity()
    );

    // Q-learning style minibatch: state, next state, reward.
    let mut rng = StdRng::seed_from_u64(42);
    let minibatch = buffer.random_sample(
        &mut rng,
        32,
        &[
            ReadRequest::new("obs"),
            ReadRequest::new("obs").with_offset(1).with_output("obs_next"),
            ReadRequest::new("action"),
            ReadRequest::new("reward"),
        ],
    )?;
    println!(
        "sampled minibatch: obs {:?}, obs_next {:?}",
        minibatch["obs"].shape(),
        minibatch["obs_next"].shape()
    );

    // PPO style epoch: every occupied slot exactly once, shuffled.
    let epoch = buffer.sample_batches_reordered(
        &mut rng,
        64,
        0,
        &[ReadRequest::new("obs"), ReadRequest::new("action")],
    )?;
    let rows = epoch["obs"].rows();
    println!("epoch of {} rows in batches of 64", rows);
    for (batch_index, chunk) in epoch["action"]
        .data()
        .as_i32()
        .unwrap()
        .chunks(64)
        .enumerate()
    {
        println!("  batch {}: {} transitions", batch_index, chunk.len());
    }

    Ok(())
}

//! Integration tests driving the buffer the way a training loop would.

#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use lockstep::error::Result;
use lockstep::{ElementType, FieldSpec, ReadRequest, RingBuffer};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn transition_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("obs", ElementType::F32, vec![3]).unwrap(),
        FieldSpec::scalar("action", ElementType::I32),
        FieldSpec::scalar("reward", ElementType::F32),
        FieldSpec::scalar("done", ElementType::U8),
    ]
}

/// Appends `steps` synthetic transitions where every field encodes the
/// global step number, so alignment is checkable from any sample.
fn push_steps(buffer: &mut RingBuffer, start: usize, steps: usize) -> Result<()> {
    let obs: Vec<f32> = (start..start + steps)
        .flat_map(|i| [i as f32, i as f32 + 0.1, i as f32 + 0.2])
        .collect();
    let action: Vec<i32> = (start..start + steps).map(|i| i as i32).collect();
    let reward: Vec<f32> = (start..start + steps).map(|i| i as f32 * 0.5).collect();
    let done: Vec<u8> = (start..start + steps).map(|i| u8::from(i % 7 == 0)).collect();

    buffer.append(&[
        ("obs", obs.into()),
        ("action", action.into()),
        ("reward", reward.into()),
        ("done", done.into()),
    ])
}

#[test]
fn test_replay_workflow_bounded() -> Result<()> {
    let mut buffer = RingBuffer::new(64, transition_fields())?;

    // Overfill: 100 steps into 64 slots, in uneven batches.
    let mut written = 0;
    for batch in [10, 25, 1, 40, 24] {
        push_steps(&mut buffer, written, batch)?;
        written += batch;
    }
    assert_eq!(written, 100);
    assert_eq!(buffer.len(), 64);
    assert_eq!(buffer.capacity(), 64);

    // Oldest surviving step is 100 - 64 = 36.
    let oldest = buffer.fetch_at(0, &[ReadRequest::new("action")])?;
    assert_eq!(oldest["action"].data().as_i32(), Some(&[36][..]));

    // Sampled transitions stay aligned across fields.
    let mut rng = StdRng::seed_from_u64(11);
    let sample = buffer.random_sample(
        &mut rng,
        32,
        &[
            ReadRequest::new("obs"),
            ReadRequest::new("action"),
            ReadRequest::new("reward"),
        ],
    )?;
    let obs = sample["obs"].data().as_f32().unwrap();
    let action = sample["action"].data().as_i32().unwrap();
    let reward = sample["reward"].data().as_f32().unwrap();
    for row in 0..32 {
        let step = action[row];
        assert!((36..100).contains(&step));
        assert_eq!(obs[row * 3], step as f32);
        assert_eq!(reward[row], step as f32 * 0.5);
    }
    Ok(())
}

#[test]
fn test_epoch_batching_unbounded() -> Result<()> {
    let mut buffer = RingBuffer::new(0, transition_fields())?;
    push_steps(&mut buffer, 0, 50)?;
    assert_eq!(buffer.len(), 50);

    let mut rng = StdRng::seed_from_u64(5);
    let epoch = buffer.sample_batches_reordered(
        &mut rng,
        8,
        0,
        &[ReadRequest::new("action"), ReadRequest::new("reward")],
    )?;

    // usable = floor(50 / 8) * 8 = 48 rows, each step at most once.
    let action = epoch["action"].data().as_i32().unwrap();
    assert_eq!(action.len(), 48);
    let mut seen = [false; 50];
    for &step in action {
        let step = step as usize;
        assert!(!seen[step], "step {step} repeated within one epoch");
        seen[step] = true;
    }

    // Rows stay aligned with their sibling field.
    let reward = epoch["reward"].data().as_f32().unwrap();
    for (a, r) in action.iter().zip(reward) {
        assert_eq!(*r, *a as f32 * 0.5);
    }
    Ok(())
}

#[test]
fn test_next_state_offsets_across_wraparound() -> Result<()> {
    let mut buffer = RingBuffer::new(16, transition_fields())?;
    push_steps(&mut buffer, 0, 40)?;
    assert_eq!(buffer.len(), 16);

    // Fetch every slot with its successor; the last slot's successor wraps
    // to the oldest.
    let result = buffer.fetch_range(
        0,
        16,
        &[
            ReadRequest::new("action"),
            ReadRequest::new("action").with_offset(1).with_output("action_next"),
        ],
    )?;
    let action = result["action"].data().as_i32().unwrap();
    let next = result["action_next"].data().as_i32().unwrap();
    for row in 0..15 {
        assert_eq!(next[row], action[row] + 1);
    }
    assert_eq!(next[15], action[0]);
    Ok(())
}

#[test]
fn test_rollout_transfer_between_buffers() -> Result<()> {
    // Collect short rollouts into a scratch buffer, drain into a shared one.
    let mut replay = RingBuffer::new(32, transition_fields())?;
    let mut rollout = RingBuffer::new(0, transition_fields())?;

    for episode in 0..4 {
        rollout.clear();
        push_steps(&mut rollout, episode * 10, 10)?;
        replay.append_buffer(&rollout)?;
    }
    assert_eq!(replay.len(), 32);

    // 40 steps through a 32-slot buffer: steps 8..40 survive, in order.
    let all = replay.fetch_range(0, 32, &[ReadRequest::new("action")])?;
    let expected: Vec<i32> = (8..40).collect();
    assert_eq!(all["action"].data().as_i32(), Some(&expected[..]));
    Ok(())
}

#[test]
fn test_clear_then_reuse_matches_fresh_buffer() -> Result<()> {
    let mut used = RingBuffer::new(8, transition_fields())?;
    push_steps(&mut used, 0, 20)?;
    used.clear();
    assert!(used.is_empty());
    assert_eq!(used.capacity(), 8);

    let mut fresh = RingBuffer::new(8, transition_fields())?;
    push_steps(&mut used, 100, 5)?;
    push_steps(&mut fresh, 100, 5)?;

    let a = used.fetch_range(0, 5, &[ReadRequest::new("reward")])?;
    let b = fresh.fetch_range(0, 5, &[ReadRequest::new("reward")])?;
    assert_eq!(a["reward"], b["reward"]);
    Ok(())
}

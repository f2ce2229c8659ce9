//! Snapshot round-trip tests: a serialized buffer restores to an identical
//! state, including cursor position and wraparound.

#![allow(clippy::cast_possible_truncation)]

use lockstep::error::Result;
use lockstep::{ElementType, FieldSpec, ReadRequest, RingBuffer};

fn sample_buffer() -> Result<RingBuffer> {
    let mut buffer = RingBuffer::new(
        4,
        vec![
            FieldSpec::new("obs", ElementType::F64, vec![2])?,
            FieldSpec::scalar("step", ElementType::I64),
        ],
    )?;
    // Six slots through four: the snapshot must capture a wrapped state.
    for i in 0..6i64 {
        buffer.append(&[
            ("obs", vec![f64::from(i as i32), 0.5].into()),
            ("step", vec![i].into()),
        ])?;
    }
    Ok(buffer)
}

#[test]
fn test_snapshot_round_trip() -> Result<()> {
    let original = sample_buffer()?;

    let json = serde_json::to_string(&original).expect("serialize buffer");
    let restored: RingBuffer = serde_json::from_str(&json).expect("deserialize buffer");

    assert_eq!(restored.len(), original.len());
    assert_eq!(restored.capacity(), original.capacity());
    assert_eq!(restored.max_count(), original.max_count());
    assert_eq!(restored.write_cursor(), original.write_cursor());

    let requests = [ReadRequest::new("obs"), ReadRequest::new("step")];
    let before = original.fetch_range(0, original.len(), &requests)?;
    let after = restored.fetch_range(0, restored.len(), &requests)?;
    assert_eq!(before, after);
    assert_eq!(after["step"].data().as_i64(), Some(&[2i64, 3, 4, 5][..]));
    Ok(())
}

#[test]
fn test_restored_buffer_accepts_appends() -> Result<()> {
    let original = sample_buffer()?;
    let json = serde_json::to_string(&original).expect("serialize buffer");
    let mut restored: RingBuffer = serde_json::from_str(&json).expect("deserialize buffer");

    restored.append(&[
        ("obs", vec![9.0f64, 9.5].into()),
        ("step", vec![9i64].into()),
    ])?;

    let all = restored.fetch_range(0, 4, &[ReadRequest::new("step")])?;
    assert_eq!(all["step"].data().as_i64(), Some(&[3i64, 4, 5, 9][..]));
    Ok(())
}

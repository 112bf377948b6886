use std::collections::HashSet;

use uuid::Uuid;

use super::*;

/// Records every write; ids in `reject` fail.
#[derive(Default)]
struct RecordingSink {
    calls: Vec<(ElementId, ElementPatch)>,
    reject: HashSet<ElementId>,
}

impl Persistence for RecordingSink {
    fn update_element(&mut self, id: ElementId, fields: &ElementPatch) -> Result<(), SinkError> {
        if self.reject.contains(&id) {
            return Err(SinkError::new("offline"));
        }
        self.calls.push((id, fields.clone()));
        Ok(())
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// =============================================================
// update
// =============================================================

#[test]
fn new_coalescer_is_idle() {
    let c = Coalescer::new();
    assert!(!c.has_pending());
    assert!(c.is_empty());
    assert_eq!(c.deadline(), None);
}

#[test]
fn update_arms_deadline() {
    let mut c = Coalescer::new();
    c.update(Uuid::new_v4(), ElementPatch::position(1.0, 1.0), ms(100));
    assert_eq!(c.deadline(), Some(ms(1100)));
    assert_eq!(c.len(), 1);
}

#[test]
fn each_update_pushes_deadline_out() {
    let mut c = Coalescer::new();
    let id = Uuid::new_v4();
    c.update(id, ElementPatch::position(1.0, 1.0), ms(0));
    c.update(id, ElementPatch::position(2.0, 2.0), ms(900));
    assert_eq!(c.deadline(), Some(ms(1900)));
}

#[test]
fn empty_patch_is_ignored() {
    let mut c = Coalescer::new();
    c.update(Uuid::new_v4(), ElementPatch::default(), ms(0));
    assert!(!c.has_pending());
    assert_eq!(c.deadline(), None);
}

#[test]
fn updates_merge_per_element() {
    let mut c = Coalescer::new();
    let id = Uuid::new_v4();
    c.update(id, ElementPatch::position(1.0, 1.0), ms(0));
    c.update(id, ElementPatch { x: Some(5.0), width: Some(90.0), ..ElementPatch::default() }, ms(10));
    let pending = c.pending(&id).unwrap();
    assert_eq!(pending.x, Some(5.0));
    assert_eq!(pending.y, Some(1.0));
    assert_eq!(pending.width, Some(90.0));
    assert_eq!(c.len(), 1);
}

// =============================================================
// poll
// =============================================================

#[test]
fn poll_before_deadline_does_nothing() {
    let mut c = Coalescer::new();
    let mut sink = RecordingSink::default();
    c.update(Uuid::new_v4(), ElementPatch::position(1.0, 1.0), ms(0));
    assert!(c.poll(ms(999), &mut sink).is_none());
    assert!(sink.calls.is_empty());
    assert!(c.has_pending());
}

#[test]
fn poll_at_deadline_flushes() {
    let mut c = Coalescer::new();
    let mut sink = RecordingSink::default();
    c.update(Uuid::new_v4(), ElementPatch::position(1.0, 1.0), ms(0));
    assert_eq!(c.poll(ms(1000), &mut sink), Some(Ok(1)));
    assert_eq!(sink.calls.len(), 1);
    assert!(!c.has_pending());
    assert_eq!(c.deadline(), None);
}

#[test]
fn poll_without_pending_is_none() {
    let mut c = Coalescer::new();
    let mut sink = RecordingSink::default();
    assert!(c.poll(ms(50_000), &mut sink).is_none());
}

#[test]
fn many_updates_coalesce_to_one_call() {
    let mut c = Coalescer::new();
    let mut sink = RecordingSink::default();
    let id = Uuid::new_v4();
    for i in 1..=50u32 {
        c.update(id, ElementPatch { x: Some(f64::from(i)), ..ElementPatch::default() }, ms(u64::from(i) * 10));
    }
    assert!(c.poll(ms(1400), &mut sink).is_none());
    assert_eq!(c.poll(ms(1500), &mut sink), Some(Ok(1)));
    assert_eq!(sink.calls, vec![(id, ElementPatch { x: Some(50.0), ..ElementPatch::default() })]);
}

// =============================================================
// flush
// =============================================================

#[test]
fn force_flush_ignores_timer() {
    let mut c = Coalescer::new();
    let mut sink = RecordingSink::default();
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    c.update(a, ElementPatch::position(1.0, 1.0), ms(0));
    c.update(b, ElementPatch::z_index(3), ms(0));
    assert_eq!(c.force_flush(&mut sink), Ok(2));
    assert_eq!(sink.calls.len(), 2);
    assert!(!c.has_pending());
}

#[test]
fn flush_with_nothing_pending_is_ok_zero() {
    let mut c = Coalescer::new();
    let mut sink = RecordingSink::default();
    assert_eq!(c.force_flush(&mut sink), Ok(0));
    assert!(sink.calls.is_empty());
}

#[test]
fn rejected_update_is_reported_and_dropped() {
    let mut c = Coalescer::new();
    let good = Uuid::new_v4();
    let bad = Uuid::new_v4();
    let mut sink = RecordingSink { reject: HashSet::from([bad]), ..RecordingSink::default() };
    c.update(good, ElementPatch::position(1.0, 1.0), ms(0));
    c.update(bad, ElementPatch::position(2.0, 2.0), ms(0));

    let err = c.force_flush(&mut sink).unwrap_err();
    assert_eq!(err.attempted, 2);
    assert_eq!(err.failed.len(), 1);
    assert_eq!(err.failed[0].id, bad);
    assert_eq!(err.failed[0].fields, ElementPatch::position(2.0, 2.0));
    assert_eq!(err.failed[0].reason, "offline");
    assert_eq!(sink.calls.len(), 1);
    assert!(!c.has_pending(), "failed entries are not restored");
}

#[test]
fn flush_error_message_counts_failures() {
    let err = FlushError {
        attempted: 3,
        failed: vec![FailedUpdate { id: Uuid::nil(), fields: ElementPatch::default(), reason: "x".into() }],
    };
    assert_eq!(err.to_string(), "1 of 3 element updates failed");
}

// =============================================================
// discard / clear / requeue
// =============================================================

#[test]
fn discard_drops_one_element() {
    let mut c = Coalescer::new();
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    c.update(a, ElementPatch::position(1.0, 1.0), ms(0));
    c.update(b, ElementPatch::position(2.0, 2.0), ms(0));
    c.discard(&a);
    assert!(c.pending(&a).is_none());
    assert!(c.pending(&b).is_some());
    assert!(c.deadline().is_some());
}

#[test]
fn discard_last_disarms_timer() {
    let mut c = Coalescer::new();
    let a = Uuid::new_v4();
    c.update(a, ElementPatch::position(1.0, 1.0), ms(0));
    c.discard(&a);
    assert_eq!(c.deadline(), None);
}

#[test]
fn clear_drops_everything() {
    let mut c = Coalescer::new();
    c.update(Uuid::new_v4(), ElementPatch::position(1.0, 1.0), ms(0));
    c.update(Uuid::new_v4(), ElementPatch::position(1.0, 1.0), ms(0));
    c.clear();
    assert!(c.is_empty());
    assert_eq!(c.deadline(), None);
}

#[test]
fn requeue_prefers_newer_fields() {
    let mut c = Coalescer::new();
    let id = Uuid::new_v4();
    c.update(id, ElementPatch { x: Some(99.0), ..ElementPatch::default() }, ms(2000));
    let failed = vec![FailedUpdate { id, fields: ElementPatch::position(1.0, 2.0), reason: "offline".into() }];
    c.requeue(failed, ms(2100));

    let pending = c.pending(&id).unwrap();
    assert_eq!(pending.x, Some(99.0));
    assert_eq!(pending.y, Some(2.0));
    assert_eq!(c.deadline(), Some(ms(3100)));
}

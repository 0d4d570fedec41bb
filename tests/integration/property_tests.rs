//! Property tests for serialization.

use proptest::prelude::*;
use xray_segments::{AnnotationValue, Segment};

fn annotation_value() -> impl Strategy<Value = AnnotationValue> {
    prop_oneof![
        "[a-z]{0,12}".prop_map(AnnotationValue::from),
        any::<i64>().prop_map(AnnotationValue::from),
        any::<bool>().prop_map(AnnotationValue::from),
    ]
}

proptest! {
    #[test]
    fn prop_serialization_is_idempotent(
        name in "[a-zA-Z0-9 _-]{0,24}",
        annotations in prop::collection::btree_map("[a-z]{1,8}", annotation_value(), 0..6),
        error in any::<bool>(),
        fault in any::<bool>(),
        closed in any::<bool>(),
    ) {
        let mut segment = Segment::new();
        segment.set_name(name).set_error(error).set_fault(fault).begin();
        for (key, value) in annotations {
            segment.add_annotation(key, value);
        }
        if closed {
            segment.end();
        }

        let first = segment.to_json();
        let second = segment.to_json();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.get("end_time").is_some(), closed);
        prop_assert_eq!(first.get("in_progress").is_some(), !closed);
        prop_assert_eq!(first.get("error").is_some(), error);
    }

    #[test]
    fn prop_last_annotation_write_wins(
        key in "[a-z]{1,8}",
        first in any::<i64>(),
        second in any::<i64>(),
    ) {
        let mut segment = Segment::new();
        segment.add_annotation(key.clone(), first).add_annotation(key.clone(), second);
        prop_assert_eq!(segment.annotations().len(), 1);
        prop_assert_eq!(segment.annotations()[&key].as_int(), Some(second));
    }

    #[test]
    fn prop_sampled_parent_samples_every_child(count in 1usize..8) {
        let mut root = Segment::new();
        root.set_sampled(true).begin();
        for _ in 0..count {
            root.add_subsegment(Segment::new());
        }
        prop_assert!(root.subsegments().iter().all(Segment::is_sampled));
    }
}

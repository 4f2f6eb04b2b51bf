use dlt_types::Record;

use crate::error::{MergeError, MergeResult};

/// Union an incoming record with the destination's existing record of
/// the same identity. Pure; no I/O.
///
/// With no existing record the incoming one is returned unchanged.
/// Otherwise every incoming field is either added (absent in the
/// existing record), confirmed equal, or a hard
/// [`MergeError::Conflict`]. Fields only the existing record has are
/// kept as-is.
pub fn merge_record(incoming: Record, existing: Option<Record>) -> MergeResult<Record> {
    let Some(existing) = existing else {
        return Ok(incoming);
    };
    let mut merged = existing.fields;
    for (field, value) in incoming.fields {
        match merged.get(&field) {
            None => {
                merged.insert(field, value);
            }
            Some(current) if *current == value => {}
            Some(current) => {
                return Err(MergeError::Conflict {
                    id: incoming.id,
                    field,
                    incoming: value,
                    existing: current.clone(),
                });
            }
        }
    }
    Ok(Record::new(incoming.id, merged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlt_types::{Fields, RecordId};
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn fields(pairs: &[(&str, Value)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn record(pairs: &[(&str, Value)]) -> Record {
        Record::new(RecordId::semver("foo", "1.0.0"), fields(pairs))
    }

    // -----------------------------------------------------------------------
    // Unit cases
    // -----------------------------------------------------------------------

    #[test]
    fn no_existing_record_passes_through() {
        let incoming = record(&[("filename", json!("foo-1.0.0.tar.gz"))]);
        let merged = merge_record(incoming.clone(), None).unwrap();
        assert_eq!(merged, incoming);
    }

    #[test]
    fn incoming_fields_fill_gaps() {
        let incoming = record(&[
            ("filename", json!("foo-1.0.0.tar.gz")),
            ("integrity", json!("sha512-abc")),
        ]);
        let existing = record(&[("filename", json!("foo-1.0.0.tar.gz"))]);
        let merged = merge_record(incoming, Some(existing)).unwrap();
        assert_eq!(merged.fields.get("integrity"), Some(&json!("sha512-abc")));
    }

    #[test]
    fn existing_only_fields_survive() {
        let incoming = record(&[("filename", json!("foo-1.0.0.tar.gz"))]);
        let existing = record(&[
            ("filename", json!("foo-1.0.0.tar.gz")),
            ("resolved", json!("https://example.com/foo")),
        ]);
        let merged = merge_record(incoming, Some(existing)).unwrap();
        assert_eq!(
            merged.fields.get("resolved"),
            Some(&json!("https://example.com/foo"))
        );
    }

    #[test]
    fn disagreement_is_a_conflict_with_diagnostics() {
        let incoming = record(&[("integrity", json!("sha512-new"))]);
        let existing = record(&[("integrity", json!("sha512-old"))]);
        let err = merge_record(incoming, Some(existing)).unwrap_err();
        match err {
            MergeError::Conflict {
                id,
                field,
                incoming,
                existing,
            } => {
                assert_eq!(id, RecordId::semver("foo", "1.0.0"));
                assert_eq!(field, "integrity");
                assert_eq!(incoming, json!("sha512-new"));
                assert_eq!(existing, json!("sha512-old"));
            }
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn equal_nested_values_do_not_conflict() {
        let incoming = record(&[("refs", json!(["main", "v2.0"]))]);
        let existing = record(&[("refs", json!(["main", "v2.0"]))]);
        assert!(merge_record(incoming, Some(existing)).is_ok());
    }

    #[test]
    fn unequal_nested_values_conflict() {
        let incoming = record(&[("refs", json!(["main"]))]);
        let existing = record(&[("refs", json!(["develop"]))]);
        assert!(merge_record(incoming, Some(existing)).is_err());
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    fn arb_fields(prefix: &'static str) -> impl Strategy<Value = Fields> {
        proptest::collection::btree_map(
            "[a-z]{1,6}".prop_map(move |k| format!("{prefix}_{k}")),
            any::<i64>().prop_map(|v| json!(v)),
            0..8,
        )
    }

    proptest! {
        /// Disjoint field sets always merge to their exact union.
        #[test]
        fn disjoint_fields_union(a in arb_fields("a"), b in arb_fields("b")) {
            let id = RecordId::semver("pkg", "1.0.0");
            let merged = merge_record(
                Record::new(id.clone(), a.clone()),
                Some(Record::new(id, b.clone())),
            ).unwrap();

            let mut expected = b;
            expected.extend(a);
            prop_assert_eq!(merged.fields, expected);
        }

        /// Merging a record with itself never conflicts and changes nothing.
        #[test]
        fn self_merge_is_identity(a in arb_fields("a")) {
            let id = RecordId::semver("pkg", "1.0.0");
            let merged = merge_record(
                Record::new(id.clone(), a.clone()),
                Some(Record::new(id, a.clone())),
            ).unwrap();
            prop_assert_eq!(merged.fields, a);
        }

        /// A single disagreeing field is always detected.
        #[test]
        fn one_disagreement_conflicts(a in arb_fields("a"), v in any::<i64>()) {
            let id = RecordId::semver("pkg", "1.0.0");
            let mut incoming = a.clone();
            incoming.insert("shared".to_string(), json!(v));
            let mut existing = a;
            existing.insert("shared".to_string(), json!(v.wrapping_add(1)));

            let result = merge_record(
                Record::new(id.clone(), incoming),
                Some(Record::new(id, existing)),
            );
            prop_assert!(
                matches!(result, Err(MergeError::Conflict { .. })),
                "expected MergeError::Conflict, got {:?}",
                result
            );
        }
    }
}

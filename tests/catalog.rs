//! Catalog construction, authoring checks and snapshots
mod common;
use common::*;
use leadpath::prelude::*;
use serde_json::json;

#[cfg(test)]
mod catalog_tests {
    use super::*;
    use std::result::Result;

    fn build(statuses: Vec<StatusDefinition>) -> Result<Catalog, CatalogError> {
        Catalog::builder(statuses).build()
    }

    fn select(name: &str, options: &[&str]) -> FieldDefinition {
        FieldDefinition::new(name, FieldType::Select).with_options(options)
    }

    #[test]
    fn test_json_catalog_matches_builder_catalog() {
        let from_json = Catalog::builder(SCENARIO_CATALOG_JSON).build().unwrap();
        assert_eq!(from_json, scenario_catalog());
        assert_eq!(from_json.default_status().id, "new");
    }

    #[test]
    fn test_malformed_json_is_a_conversion_error() {
        let err = Catalog::builder("[{\"_id\": ").build().unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Conversion(CatalogConversionError::JsonParseError(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_status_ids() {
        let err = build(vec![
            StatusDefinition::new("new", "New").default_status(),
            StatusDefinition::new("new", "New again"),
        ])
        .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateStatus("new".to_string()));
    }

    #[test]
    fn test_requires_exactly_one_default() {
        let none = build(vec![StatusDefinition::new("a", "A")]).unwrap_err();
        assert_eq!(none, CatalogError::NoDefaultStatus);

        let two = build(vec![
            StatusDefinition::new("a", "A").default_status(),
            StatusDefinition::new("b", "B").default_status(),
        ])
        .unwrap_err();
        assert_eq!(
            two,
            CatalogError::MultipleDefaultStatuses(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_rejects_child_for_undeclared_option() {
        let err = build(vec![
            StatusDefinition::new("a", "A")
                .default_status()
                .with_field(select("Outcome", &["Yes"]).with_child("No", "b")),
            StatusDefinition::new("b", "B"),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::UndeclaredOption { ref option, .. } if option == "No"));
    }

    #[test]
    fn test_rejects_unknown_child_status() {
        let err = build(vec![
            StatusDefinition::new("a", "A")
                .default_status()
                .with_field(select("Outcome", &["Yes"]).with_child("Yes", "missing")),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownChildStatus { ref child_id, .. } if child_id == "missing"));
    }

    #[test]
    fn test_rejects_branching_on_non_select() {
        let err = build(vec![
            StatusDefinition::new("a", "A").default_status().with_field(
                FieldDefinition::new("Notes", FieldType::Text)
                    .with_options(&["x"])
                    .with_child("x", "b"),
            ),
            StatusDefinition::new("b", "B"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            CatalogError::BranchOnNonSelect {
                status_id: "a".to_string(),
                field: "Notes".to_string(),
            }
        );
    }

    #[test]
    fn test_rejects_names_containing_the_separator() {
        let field_clash = build(vec![
            StatusDefinition::new("a", "A")
                .default_status()
                .with_field(FieldDefinition::new("Next_Date", FieldType::Date)),
        ])
        .unwrap_err();
        assert!(matches!(field_clash, CatalogError::SeparatorCollision { ref name, .. } if name == "Next_Date"));

        let option_clash = build(vec![
            StatusDefinition::new("a", "A")
                .default_status()
                .with_field(select("Outcome", &["Call_Back"]).with_child("Call_Back", "b")),
            StatusDefinition::new("b", "B"),
        ])
        .unwrap_err();
        assert!(matches!(option_clash, CatalogError::SeparatorCollision { ref name, .. } if name == "Call_Back"));

        let other_separator = Catalog::builder(vec![
            StatusDefinition::new("a", "A")
                .default_status()
                .with_field(FieldDefinition::new("Next_Date", FieldType::Date)),
        ])
        .with_separator("::")
        .build();
        assert!(other_separator.is_ok());

        let empty = Catalog::builder(deep_statuses()).with_separator("").build();
        assert_eq!(empty.unwrap_err(), CatalogError::EmptySeparator);
    }

    #[test]
    fn test_rejects_empty_names() {
        let err = build(vec![
            StatusDefinition::new("a", "A")
                .default_status()
                .with_field(FieldDefinition::new("", FieldType::Text)),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::EmptyName { what: "field name", .. }));
    }

    #[test]
    fn test_rejects_cycles_but_not_through_final_statuses() {
        let err = build(vec![
            StatusDefinition::new("a", "A")
                .default_status()
                .with_field(select("Go", &["B"]).with_child("B", "b")),
            StatusDefinition::new("b", "B").with_field(select("Back", &["A"]).with_child("A", "a")),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::Cycle(_)));

        // `lost` is final and maps back to `qualified`; that edge is never followed.
        assert!(build(deep_statuses()).is_ok());
    }

    #[test]
    fn test_rejects_catalog_deeper_than_max_depth() {
        let err = Catalog::builder(deep_statuses())
            .with_max_depth(1)
            .build()
            .unwrap_err();
        assert!(matches!(err, CatalogError::TooDeep { max_depth: 1, .. }));

        assert!(Catalog::builder(deep_statuses()).with_max_depth(2).build().is_ok());
    }

    #[test]
    fn test_unrecognized_keys_report_drift() {
        let catalog = deep_catalog();
        let values = data(&[
            ("Email", json!("ada@example.com")),
            ("Outcome_Interested_Budget", json!(1)),
            ("Outcome_Interested_Stage_Demo_Email", json!("x@example.com")),
            ("Outcome_Lost_Budget", json!(2)),
            ("Legacy Score", json!(3)),
        ]);
        let drift = catalog.unrecognized_keys(&values);
        assert_eq!(drift.keys, vec!["Legacy Score", "Outcome_Lost_Budget"]);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let catalog = Catalog::builder(deep_statuses())
            .with_separator("::")
            .build()
            .unwrap();
        let bytes = catalog.snapshot().to_bytes().unwrap();
        let restored = CatalogSnapshot::from_bytes(&bytes)
            .unwrap()
            .into_catalog()
            .unwrap();
        assert_eq!(restored, catalog);
        assert_eq!(restored.namespacer().separator(), "::");
    }

    #[test]
    fn test_snapshot_file_round_trip() {
        let catalog = deep_catalog();
        let file = std::env::temp_dir().join(format!("leadpath-snapshot-{}.bin", std::process::id()));
        let file = file.to_str().unwrap();

        catalog.snapshot().save(file).unwrap();
        let restored = CatalogSnapshot::from_file(file).unwrap().into_catalog().unwrap();
        std::fs::remove_file(file).unwrap();
        assert_eq!(restored, catalog);
    }

    #[test]
    fn test_snapshot_rejects_other_versions_and_garbage() {
        let mut snapshot = deep_catalog().snapshot();
        snapshot.format_version = 99;
        assert!(matches!(snapshot.into_catalog(), Err(SnapshotError::Generic(_))));

        assert!(CatalogSnapshot::from_bytes(&[0xff, 0x01]).is_err());
    }

    #[test]
    fn test_snapshot_revalidates_statuses() {
        let mut snapshot = deep_catalog().snapshot();
        snapshot.statuses.retain(|s| s.id != "demo");
        assert!(matches!(
            snapshot.into_catalog(),
            Err(SnapshotError::Catalog(CatalogError::UnknownChildStatus { .. }))
        ));
    }
}

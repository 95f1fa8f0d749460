//! Common test utilities for building catalogs and leads.
use leadpath::prelude::*;
use serde_json::{Value, json};

/// The two-level catalog from the product walkthrough.
///
/// `New --Outcome=Interested--> StatusB`, `New --Outcome=Not Interested--> StatusC`.
#[allow(dead_code)]
pub fn scenario_catalog() -> Catalog {
    Catalog::builder(vec![
        StatusDefinition::new("new", "New")
            .default_status()
            .with_field(
                FieldDefinition::new("Outcome", FieldType::Select)
                    .with_options(&["Interested", "Not Interested"])
                    .with_child("Interested", "status-b")
                    .with_child("Not Interested", "status-c"),
            ),
        StatusDefinition::new("status-b", "StatusB").with_field(
            FieldDefinition::new("Next Meeting Date", FieldType::Date).required(),
        ),
        StatusDefinition::new("status-c", "StatusC")
            .final_status()
            .with_field(FieldDefinition::new("Reason", FieldType::Textarea)),
    ])
    .build()
    .expect("scenario catalog is valid")
}

/// A three-level catalog with a plain name reused across depths.
///
/// ```text
/// New (Email, Outcome)
///  ├─ Outcome=Interested -> Qualified (Budget, Notes, Stage)
///  │    ├─ Stage=Demo     -> Demo (Next Meeting Date*, Email)
///  │    └─ Stage=Proposal -> Proposal (Amount*)
///  └─ Outcome=Lost        -> Lost [final] (Reason, Reopen)
/// ```
#[allow(dead_code)]
pub fn deep_catalog() -> Catalog {
    Catalog::builder(deep_statuses())
        .build()
        .expect("deep catalog is valid")
}

#[allow(dead_code)]
pub fn deep_statuses() -> Vec<StatusDefinition> {
    vec![
        StatusDefinition::new("new", "New")
            .default_status()
            .with_field(FieldDefinition::new("Email", FieldType::Email).required())
            .with_field(
                FieldDefinition::new("Outcome", FieldType::Select)
                    .with_options(&["Interested", "Lost", "Callback"])
                    .with_child("Interested", "qualified")
                    .with_child("Lost", "lost"),
            ),
        StatusDefinition::new("qualified", "Qualified")
            .with_field(FieldDefinition::new("Budget", FieldType::Number))
            .with_field(FieldDefinition::new("Notes", FieldType::Textarea))
            .with_field(
                FieldDefinition::new("Stage", FieldType::Select)
                    .required()
                    .with_options(&["Demo", "Proposal"])
                    .with_child("Demo", "demo")
                    .with_child("Proposal", "proposal"),
            ),
        StatusDefinition::new("demo", "Demo")
            .with_field(FieldDefinition::new("Next Meeting Date", FieldType::Date).required())
            .with_field(FieldDefinition::new("Email", FieldType::Email)),
        StatusDefinition::new("proposal", "Proposal")
            .with_field(FieldDefinition::new("Amount", FieldType::Number).required()),
        // Final: its branching select must never be followed.
        StatusDefinition::new("lost", "Lost")
            .final_status()
            .with_field(FieldDefinition::new("Reason", FieldType::Text))
            .with_field(
                FieldDefinition::new("Reopen", FieldType::Select)
                    .with_options(&["Yes"])
                    .with_child("Yes", "qualified"),
            ),
    ]
}

/// Two sibling branches that each declare a branching select named `Stage`.
///
/// ```text
/// New (Outcome)
///  ├─ Outcome=A -> A (Stage)  ── Stage=X -> AX
///  └─ Outcome=B -> B (Stage)  ── Stage=X -> BX
/// ```
#[allow(dead_code)]
pub fn sibling_catalog() -> Catalog {
    let stage = |child: &str| {
        FieldDefinition::new("Stage", FieldType::Select)
            .with_options(&["X", "Hold"])
            .with_child("X", child)
    };
    Catalog::builder(vec![
        StatusDefinition::new("new", "New")
            .default_status()
            .with_field(
                FieldDefinition::new("Outcome", FieldType::Select)
                    .with_options(&["A", "B"])
                    .with_child("A", "a")
                    .with_child("B", "b"),
            ),
        StatusDefinition::new("a", "A").with_field(stage("ax")),
        StatusDefinition::new("b", "B").with_field(stage("bx")),
        StatusDefinition::new("ax", "AX"),
        StatusDefinition::new("bx", "BX"),
    ])
    .build()
    .expect("sibling catalog is valid")
}

/// A lead that went `New -> A -> AX`, with the alias the merge writes.
#[allow(dead_code)]
pub fn lead_on_ax() -> Lead {
    lead_with(
        "ax",
        &[
            ("Outcome", json!("A")),
            ("Outcome_A_Stage", json!("X")),
            ("Stage", json!("X")),
        ],
    )
}

/// The scenario catalog as an admin backend serves it.
#[allow(dead_code)]
pub const SCENARIO_CATALOG_JSON: &str = r#"[
    {
        "_id": "new",
        "name": "New",
        "isDefaultStatus": true,
        "formFields": [
            {
                "name": "Outcome",
                "fieldType": "select",
                "options": ["Interested", "Not Interested"],
                "childStatusByOption": {
                    "Interested": "status-b",
                    "Not Interested": "status-c"
                }
            }
        ]
    },
    {
        "_id": "status-b",
        "name": "StatusB",
        "formFields": [
            { "name": "Next Meeting Date", "fieldType": "date", "isRequired": true }
        ]
    },
    {
        "_id": "status-c",
        "name": "StatusC",
        "isFinalStatus": true,
        "formFields": [
            { "name": "Reason", "fieldType": "textarea" }
        ]
    }
]"#;

/// Builds lead data from `(key, value)` pairs.
#[allow(dead_code)]
pub fn data(pairs: &[(&str, Value)]) -> LeadData {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// A lead on `status_id` holding `pairs`.
#[allow(dead_code)]
pub fn lead_with(status_id: &str, pairs: &[(&str, Value)]) -> Lead {
    Lead {
        id: "lead-1".to_string(),
        current_status_id: status_id.to_string(),
        data: data(pairs),
        history: Vec::new(),
    }
}

/// Builds an edit map from `(key, value)` pairs.
#[allow(dead_code)]
pub fn edits(pairs: &[(FieldKey, Value)]) -> Edits {
    pairs.iter().cloned().collect()
}

/// `[Outcome=Interested]`, the branch into `Qualified`.
#[allow(dead_code)]
pub fn interested() -> BranchStep {
    BranchStep::new("Outcome", "Interested")
}

/// `[Outcome=Interested, Stage=Demo]`, the branch into `Demo`.
#[allow(dead_code)]
pub fn demo_branch() -> Vec<BranchStep> {
    vec![interested(), BranchStep::new("Stage", "Demo")]
}

//! Writing priorities to the project's priority field

use crate::projects::{find_field, FieldDataType, FieldUpdate, ProjectField};
use crate::{Error, GitHubClient, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use trellis_core::{Priority, PriorityCriteria};

/// Outcome of a single priority assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Assessment {
    pub success: bool,
    pub priority: Priority,
}

/// One entry of a batch update request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityUpdate {
    pub item_id: String,
    pub priority: Priority,
}

/// Per-item outcome of a batch update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub item_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Value to write for a priority on the given field
///
/// Single-select fields take the id of the option named like the priority;
/// text fields take the priority name.
pub fn priority_value(field: &ProjectField, priority: Priority) -> Result<FieldUpdate> {
    match field.data_type {
        FieldDataType::SingleSelect => field
            .option(priority.as_str())
            .map(|o| FieldUpdate::SingleSelectOption(o.id.clone()))
            .ok_or_else(|| {
                Error::Other(format!(
                    "Field '{}' has no option named '{}'",
                    field.name, priority
                ))
            }),
        FieldDataType::Text => Ok(FieldUpdate::Text(priority.to_string())),
        other => Err(Error::Other(format!(
            "Field '{}' has type {:?}, expected single select or text",
            field.name, other
        ))),
    }
}

impl GitHubClient {
    async fn priority_field(&self, project_id: &str, field_name: &str) -> Result<ProjectField> {
        let fields = self.get_project_fields(project_id).await?;
        find_field(&fields, field_name)
            .cloned()
            .ok_or_else(|| Error::FieldNotFound(field_name.to_string()))
    }

    /// Score an item and write the result to the priority field
    pub async fn assess_item_priority(
        &self,
        project_id: &str,
        item_id: &str,
        criteria: &PriorityCriteria,
        field_name: &str,
    ) -> Result<Assessment> {
        let priority = criteria.priority();
        let field = self.priority_field(project_id, field_name).await?;
        let value = priority_value(&field, priority)?;

        self.update_item_field(project_id, item_id, &field.id, &value)
            .await?;

        info!(
            project_id,
            item_id,
            score = criteria.score(),
            %priority,
            "Assessed item priority"
        );
        Ok(Assessment {
            success: true,
            priority,
        })
    }

    /// Write priorities for several items, one mutation each
    ///
    /// Failing to resolve the priority field fails the whole batch; a failed
    /// item is reported in its own entry and the rest still run.
    pub async fn batch_update_priorities(
        &self,
        project_id: &str,
        updates: &[PriorityUpdate],
        field_name: &str,
    ) -> Result<Vec<BatchOutcome>> {
        let field = self.priority_field(project_id, field_name).await?;
        let mut outcomes = Vec::with_capacity(updates.len());

        for update in updates {
            let result = match priority_value(&field, update.priority) {
                Ok(value) => {
                    self.update_item_field(project_id, &update.item_id, &field.id, &value)
                        .await
                }
                Err(e) => Err(e),
            };

            let outcome = match result {
                Ok(()) => BatchOutcome {
                    item_id: update.item_id.clone(),
                    success: true,
                    error: None,
                },
                Err(e) => {
                    warn!(
                        project_id,
                        item_id = %update.item_id,
                        error = %e,
                        "Priority update failed"
                    );
                    BatchOutcome {
                        item_id: update.item_id.clone(),
                        success: false,
                        error: Some(e.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }

        let failed = outcomes.iter().filter(|o| !o.success).count();
        info!(project_id, total = outcomes.len(), failed, "Batch priority update finished");
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projects::FieldOption;

    fn field(data_type: FieldDataType, options: &[(&str, &str)]) -> ProjectField {
        ProjectField {
            id: "F1".to_string(),
            name: "Priority".to_string(),
            data_type,
            options: options
                .iter()
                .map(|(id, name)| FieldOption {
                    id: id.to_string(),
                    name: name.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_single_select_uses_option_id() {
        let field = field(
            FieldDataType::SingleSelect,
            &[("o1", "High"), ("o2", "Medium"), ("o3", "Low")],
        );
        assert_eq!(
            priority_value(&field, Priority::Medium).unwrap(),
            FieldUpdate::SingleSelectOption("o2".to_string())
        );
    }

    #[test]
    fn test_single_select_missing_option() {
        let field = field(FieldDataType::SingleSelect, &[("o1", "P0"), ("o2", "P1")]);
        let err = priority_value(&field, Priority::High).unwrap_err();
        assert!(err.to_string().contains("no option named 'high'"));
    }

    #[test]
    fn test_text_field_uses_name() {
        let field = field(FieldDataType::Text, &[]);
        assert_eq!(
            priority_value(&field, Priority::Low).unwrap(),
            FieldUpdate::Text("low".to_string())
        );
    }

    #[test]
    fn test_other_field_types_rejected() {
        let field = field(FieldDataType::Number, &[]);
        assert!(priority_value(&field, Priority::Low).is_err());
    }

    #[test]
    fn test_batch_request_parsing() {
        let updates: Vec<PriorityUpdate> = serde_json::from_str(
            r#"[{"item_id": "I1", "priority": "high"}, {"item_id": "I2", "priority": "low"}]"#,
        )
        .unwrap();
        assert_eq!(updates[0].priority, Priority::High);
        assert_eq!(updates[1].item_id, "I2");
    }

    #[test]
    fn test_outcome_serialization() {
        let ok = BatchOutcome {
            item_id: "I1".to_string(),
            success: true,
            error: None,
        };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({ "item_id": "I1", "success": true })
        );
    }
}

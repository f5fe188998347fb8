//! Generic planning over a schema.
//!
//! Diffs the prior state against the proposed state attribute by attribute.
//! Resources that can derive computed attributes from configuration fill them
//! into the proposed state before calling [`plan_resource`].

use serde_json::{Map, Value};

use crate::schema::Schema;
use crate::types::{AttributeChange, PlanResult};
use crate::value::unknown;

/// Plan a create (`prior` is `None`), update, or destroy (`proposed` is `null`).
pub fn plan_resource(schema: &Schema, prior: Option<&Value>, proposed: Value) -> PlanResult {
    let proposed = match proposed {
        Value::Null => return plan_destroy(schema, prior),
        Value::Object(map) => map,
        other => return PlanResult::no_change(other),
    };
    let prior = prior.and_then(Value::as_object);

    let requires_replace = prior.is_some_and(|prior| {
        schema
            .sorted_attributes()
            .into_iter()
            .any(|(name, attr)| attr.force_new && differs(prior.get(name), proposed.get(name)))
    });

    let mut planned = proposed;
    for (name, attr) in schema.sorted_attributes() {
        if !attr.flags.is_computed_only() || non_null(planned.get(name)).is_some() {
            continue;
        }
        let value = match prior.and_then(|p| non_null(p.get(name))) {
            Some(prior_value) if !requires_replace => prior_value.clone(),
            _ => unknown(),
        };
        planned.insert(name.to_string(), value);
    }

    let changes = match prior {
        None => schema
            .sorted_attributes()
            .into_iter()
            .filter_map(|(name, _)| {
                non_null(planned.get(name)).map(|v| AttributeChange::added(name, v.clone()))
            })
            .collect(),
        Some(prior) => diff(schema, prior, &planned),
    };

    PlanResult::with_changes(Value::Object(planned), changes, requires_replace)
}

fn plan_destroy(schema: &Schema, prior: Option<&Value>) -> PlanResult {
    let changes = prior
        .and_then(Value::as_object)
        .map(|prior| {
            schema
                .sorted_attributes()
                .into_iter()
                .filter_map(|(name, _)| {
                    non_null(prior.get(name)).map(|v| AttributeChange::removed(name, v.clone()))
                })
                .collect()
        })
        .unwrap_or_default();

    PlanResult::with_changes(Value::Null, changes, false)
}

fn diff(schema: &Schema, prior: &Map<String, Value>, planned: &Map<String, Value>) -> Vec<AttributeChange> {
    schema
        .sorted_attributes()
        .into_iter()
        .filter(|(name, _)| differs(prior.get(*name), planned.get(*name)))
        .map(|(name, _)| {
            AttributeChange::new(
                name,
                non_null(prior.get(name)).cloned(),
                non_null(planned.get(name)).cloned(),
            )
        })
        .collect()
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn differs(before: Option<&Value>, after: Option<&Value>) -> bool {
    non_null(before) != non_null(after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Attribute;
    use crate::value::is_unknown;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("name", Attribute::required_string().with_force_new())
            .with_attribute("label", Attribute::required_string())
            .with_attribute("tags", Attribute::optional_string_list())
    }

    #[test]
    fn test_plan_create() {
        let plan = plan_resource(&schema(), None, json!({"name": "Light", "label": "Light"}));

        assert!(!plan.requires_replace);
        assert!(is_unknown(&plan.planned_state["id"]));
        let paths: Vec<_> = plan.changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["id", "label", "name"]);
        assert!(plan.changes.iter().all(|c| c.before.is_none()));
    }

    #[test]
    fn test_plan_update_in_place() {
        let prior = json!({"id": "Light", "name": "Light", "label": "Old", "tags": null});
        let plan = plan_resource(&schema(), Some(&prior), json!({"name": "Light", "label": "New"}));

        assert!(!plan.requires_replace);
        assert_eq!(plan.planned_state["id"], "Light");
        assert_eq!(plan.changes.len(), 1);
        assert_eq!(plan.changes[0], AttributeChange::modified("label", json!("Old"), json!("New")));
    }

    #[test]
    fn test_plan_no_changes() {
        let prior = json!({"id": "Light", "name": "Light", "label": "L", "tags": ["a"]});
        let plan = plan_resource(
            &schema(),
            Some(&prior),
            json!({"name": "Light", "label": "L", "tags": ["a"]}),
        );

        assert!(plan.changes.is_empty());
        assert_eq!(plan.planned_state, prior);
    }

    #[test]
    fn test_plan_force_new_replaces() {
        let prior = json!({"id": "Light", "name": "Light", "label": "L"});
        let plan = plan_resource(&schema(), Some(&prior), json!({"name": "Lamp", "label": "L"}));

        assert!(plan.requires_replace);
        // computed values are recomputed by the replacement
        assert!(is_unknown(&plan.planned_state["id"]));
        let paths: Vec<_> = plan.changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["id", "name"]);
    }

    #[test]
    fn test_plan_destroy() {
        let prior = json!({"id": "Light", "name": "Light", "label": "L", "tags": null});
        let plan = plan_resource(&schema(), Some(&prior), Value::Null);

        assert!(plan.planned_state.is_null());
        assert_eq!(plan.changes.len(), 3);
        assert!(plan.changes.iter().all(|c| c.after.is_none()));
    }

    #[test]
    fn test_null_and_absent_are_equal() {
        let prior = json!({"id": "Light", "name": "Light", "label": "L", "tags": null});
        let plan = plan_resource(&schema(), Some(&prior), json!({"name": "Light", "label": "L"}));
        assert!(plan.changes.is_empty());
    }
}

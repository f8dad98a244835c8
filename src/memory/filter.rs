//! Mongo-style filter evaluation over JSON documents.
//!
//! Supported: implicit equality (including array membership), dotted paths,
//! `$eq $ne $gt $gte $lt $lte $in $nin $exists` on fields and
//! `$and $or $nor` at any document level.

use serde_json::Value;

use super::object_id::ObjectId;
use super::value::{comparable, compare, equal, lookup};
use crate::collection::StorageError;
use crate::entity::{Document, ID_FIELD};

/// Whether `doc` matches `filter`. `{}` matches every document.
pub(crate) fn matches(filter: &Value, doc: &Document) -> Result<bool, StorageError> {
    let clauses = filter
        .as_object()
        .ok_or_else(|| StorageError::InvalidFilter(format!("filter must be a document, got {}", filter)))?;

    for (key, condition) in clauses {
        let matched = match key.as_str() {
            "$and" => branches(key, condition)?
                .iter()
                .map(|f| matches(f, doc))
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .all(|m| m),
            "$or" => any_branch(key, condition, doc)?,
            "$nor" => !any_branch(key, condition, doc)?,
            op if op.starts_with('$') => {
                return Err(StorageError::InvalidFilter(format!("unknown operator {}", op)));
            }
            path => field_matches(lookup(doc, path), condition)?,
        };
        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Rewrites hex ids in `_id` conditions to their canonical lowercase form.
pub(crate) fn canonical_ids(filter: &mut Value) {
    let Some(clauses) = filter.as_object_mut() else {
        return;
    };
    for (key, condition) in clauses.iter_mut() {
        match key.as_str() {
            "$and" | "$or" | "$nor" => {
                if let Some(branches) = condition.as_array_mut() {
                    branches.iter_mut().for_each(canonical_ids);
                }
            }
            ID_FIELD => canonical_condition(condition),
            _ => {}
        }
    }
}

fn canonical_condition(condition: &mut Value) {
    match condition {
        Value::String(id) => {
            if let Ok(oid) = ObjectId::parse_str(id) {
                *id = oid.to_hex();
            }
        }
        Value::Array(items) => items.iter_mut().for_each(canonical_condition),
        Value::Object(ops) => ops.values_mut().for_each(canonical_condition),
        _ => {}
    }
}

fn branches<'a>(op: &str, condition: &'a Value) -> Result<&'a Vec<Value>, StorageError> {
    match condition.as_array() {
        Some(list) if !list.is_empty() => Ok(list),
        _ => Err(StorageError::InvalidFilter(format!(
            "{} expects a non-empty array",
            op
        ))),
    }
}

fn any_branch(op: &str, condition: &Value, doc: &Document) -> Result<bool, StorageError> {
    for branch in branches(op, condition)? {
        if matches(branch, doc)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn is_operator_expr(condition: &Value) -> bool {
    condition
        .as_object()
        .map(|o| !o.is_empty() && o.keys().all(|k| k.starts_with('$')))
        .unwrap_or(false)
}

fn field_matches(value: Option<&Value>, condition: &Value) -> Result<bool, StorageError> {
    if !is_operator_expr(condition) {
        return Ok(equals(value, condition));
    }

    for (op, arg) in condition.as_object().into_iter().flatten() {
        let matched = match op.as_str() {
            "$eq" => equals(value, arg),
            "$ne" => !equals(value, arg),
            "$gt" => range(value, arg, |o| o.is_gt()),
            "$gte" => range(value, arg, |o| o.is_ge()),
            "$lt" => range(value, arg, |o| o.is_lt()),
            "$lte" => range(value, arg, |o| o.is_le()),
            "$in" => in_list(op, value, arg)?,
            "$nin" => !in_list(op, value, arg)?,
            "$exists" => value.is_some() == truthy(arg),
            other => {
                return Err(StorageError::InvalidFilter(format!("unknown operator {}", other)));
            }
        };
        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Equality where a missing field equals null and an array field matches
/// any of its elements.
fn equals(value: Option<&Value>, target: &Value) -> bool {
    match value {
        None => target.is_null(),
        Some(v) if equal(v, target) => true,
        Some(Value::Array(items)) => items.iter().any(|item| equal(item, target)),
        Some(_) => false,
    }
}

fn range(value: Option<&Value>, bound: &Value, accept: impl Fn(std::cmp::Ordering) -> bool) -> bool {
    let check = |v: &Value| comparable(v, bound) && accept(compare(Some(v), Some(bound)));
    match value {
        None => false,
        Some(Value::Array(items)) if !bound.is_array() => items.iter().any(check),
        Some(v) => check(v),
    }
}

fn in_list(op: &str, value: Option<&Value>, arg: &Value) -> Result<bool, StorageError> {
    let list = arg
        .as_array()
        .ok_or_else(|| StorageError::InvalidFilter(format!("{} expects an array", op)))?;
    Ok(list.iter().any(|target| equals(value, target)))
}

fn truthy(arg: &Value) -> bool {
    match arg {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Value::Null => false,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Document {
        json!({
            "_id": "507f1f77bcf86cd799439011",
            "name": "Ada",
            "age": 36,
            "tags": ["math", "engines"],
            "address": { "city": "London" },
            "retired": null
        })
        .as_object()
        .unwrap()
        .clone()
    }

    fn check(filter: Value) -> bool {
        matches(&filter, &doc()).unwrap()
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(check(json!({})));
    }

    #[test]
    fn implicit_equality() {
        assert!(check(json!({ "name": "Ada" })));
        assert!(check(json!({ "name": "Ada", "age": 36.0 })));
        assert!(!check(json!({ "name": "Ada", "age": 37 })));
        assert!(check(json!({ "address.city": "London" })));
        assert!(check(json!({ "address": { "city": "London" } })));
    }

    #[test]
    fn arrays_match_members() {
        assert!(check(json!({ "tags": "math" })));
        assert!(check(json!({ "tags": ["math", "engines"] })));
        assert!(!check(json!({ "tags": "poetry" })));
    }

    #[test]
    fn missing_and_null() {
        assert!(check(json!({ "retired": null })));
        assert!(check(json!({ "nickname": null })));
        assert!(check(json!({ "nickname": { "$exists": false } })));
        assert!(check(json!({ "retired": { "$exists": true } })));
        assert!(!check(json!({ "nickname": { "$exists": 1 } })));
    }

    #[test]
    fn comparisons_stay_within_type() {
        assert!(check(json!({ "age": { "$gt": 30, "$lte": 36 } })));
        assert!(!check(json!({ "age": { "$lt": 36 } })));
        assert!(!check(json!({ "age": { "$gt": "30" } })));
        assert!(!check(json!({ "height": { "$gt": 0 } })));
        assert!(check(json!({ "name": { "$gte": "A", "$lt": "B" } })));
    }

    #[test]
    fn membership_operators() {
        assert!(check(json!({ "age": { "$in": [1, 36] } })));
        assert!(check(json!({ "tags": { "$in": ["poetry", "math"] } })));
        assert!(check(json!({ "name": { "$nin": ["Grace"] } })));
        assert!(!check(json!({ "_id": { "$nin": ["507f1f77bcf86cd799439011"] } })));
        assert!(check(json!({ "name": { "$ne": "Grace" } })));
    }

    #[test]
    fn large_integers_match_exactly() {
        let doc = json!({ "logins": 9_007_199_254_740_992_u64 })
            .as_object()
            .unwrap()
            .clone();
        let check = |filter: Value| matches(&filter, &doc).unwrap();

        assert!(check(json!({ "logins": 9_007_199_254_740_992_u64 })));
        assert!(!check(json!({ "logins": 9_007_199_254_740_993_u64 })));
        assert!(!check(json!({ "logins": { "$in": [9_007_199_254_740_993_u64] } })));
        assert!(check(json!({ "logins": { "$lt": 9_007_199_254_740_993_u64 } })));
        assert!(!check(json!({ "logins": { "$gte": 9_007_199_254_740_993_u64 } })));
    }

    #[test]
    fn id_conditions_are_lowercased() {
        let mut filter = json!({
            "_id": { "$in": ["507F1F77BCF86CD799439011", "short"] },
            "name": "Ada",
            "$or": [{ "_id": "507F1F77BCF86CD799439012" }, { "age": 36 }]
        });
        canonical_ids(&mut filter);
        assert_eq!(
            filter,
            json!({
                "_id": { "$in": ["507f1f77bcf86cd799439011", "short"] },
                "name": "Ada",
                "$or": [{ "_id": "507f1f77bcf86cd799439012" }, { "age": 36 }]
            })
        );
        assert!(matches(&filter, &doc()).unwrap());
    }

    #[test]
    fn logical_operators() {
        assert!(check(json!({ "$or": [{ "name": "Grace" }, { "age": 36 }] })));
        assert!(!check(json!({ "$and": [{ "name": "Ada" }, { "age": 1 }] })));
        assert!(check(json!({ "$nor": [{ "name": "Grace" }] })));
    }

    #[test]
    fn malformed_filters_are_rejected() {
        let d = doc();
        assert!(matches!(
            matches(&json!([]), &d),
            Err(StorageError::InvalidFilter(_))
        ));
        assert!(matches!(
            matches(&json!({ "$where": "1" }), &d),
            Err(StorageError::InvalidFilter(_))
        ));
        assert!(matches!(
            matches(&json!({ "age": { "$regex": "3" } }), &d),
            Err(StorageError::InvalidFilter(_))
        ));
        assert!(matches!(
            matches(&json!({ "age": { "$in": 3 } }), &d),
            Err(StorageError::InvalidFilter(_))
        ));
        assert!(matches!(
            matches(&json!({ "$or": [] }), &d),
            Err(StorageError::InvalidFilter(_))
        ));
    }
}

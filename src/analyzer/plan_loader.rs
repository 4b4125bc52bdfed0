//! Terraform plan pair loading.
//!
//! Parses two Terraform plan JSON documents (baseline and PR) and
//! normalizes them into a flat list of [`ResourceChange`]s: one entry
//! per resource address and tracked attribute whose desired state
//! differs between the two plans, plus whole-resource markers for
//! creations and destructions. Formatting-only differences between the
//! plan files (whitespace, key order) never produce a change because
//! comparison happens on parsed values.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::analyzer::ResourceChange;
use crate::analyzer::rules;
use crate::error::{PlanError, Result};

/// File names probed when a plan argument is a directory.
const PLAN_CANDIDATES: &[&str] = &["plan.json", "tfplan.json"];

#[derive(Debug, Deserialize)]
struct PlanDocument {
    format_version: String,
    resource_changes: Vec<PlanResourceChange>,
}

#[derive(Debug, Deserialize)]
struct PlanResourceChange {
    address: String,
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    change: PlanChange,
}

#[derive(Debug, Default, Deserialize)]
struct PlanChange {
    #[serde(default)]
    #[allow(dead_code)]
    before: Option<Value>,
    #[serde(default)]
    after: Option<Value>,
}

/// Load a baseline/PR plan pair and diff their desired states.
pub fn load_plan_pair(baseline: &Path, pr: &Path) -> Result<Vec<ResourceChange>> {
    let baseline_doc = read_plan(baseline)?;
    let pr_doc = read_plan(pr)?;
    Ok(diff_documents(&baseline_doc, &pr_doc))
}

fn read_plan(path: &Path) -> Result<PlanDocument> {
    let file = resolve_plan_path(path)?;
    let content = fs::read_to_string(&file)?;
    let doc: PlanDocument =
        serde_json::from_str(&content).map_err(|e| PlanError::Malformed {
            path: file.clone(),
            reason: e.to_string(),
        })?;
    log::debug!(
        "parsed plan '{}' (format_version {}, {} resource change(s))",
        file.display(),
        doc.format_version,
        doc.resource_changes.len()
    );
    Ok(doc)
}

/// Accept a plan file directly, or probe a directory for one.
fn resolve_plan_path(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    if path.is_dir() {
        for candidate in PLAN_CANDIDATES {
            let probe = path.join(candidate);
            if probe.is_file() {
                return Ok(probe);
            }
        }
        // Fall back to the first JSON file in traversal order.
        let mut json_files: Vec<PathBuf> = WalkDir::new(path)
            .min_depth(1)
            .max_depth(2)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        if let Some(first) = json_files.drain(..).next() {
            return Ok(first);
        }
    }
    Err(PlanError::NotFound(path.to_path_buf()).into())
}

/// The state a plan wants for each address: `change.after`, with null
/// meaning the resource is absent once the plan applies.
fn desired_states(doc: &PlanDocument) -> BTreeMap<&str, (&PlanResourceChange, Option<&Value>)> {
    let mut states = BTreeMap::new();
    for rc in &doc.resource_changes {
        let state = rc.change.after.as_ref().filter(|v| !v.is_null());
        states.insert(rc.address.as_str(), (rc, state));
    }
    states
}

fn diff_documents(baseline: &PlanDocument, pr: &PlanDocument) -> Vec<ResourceChange> {
    let baseline_states = desired_states(baseline);
    let pr_states = desired_states(pr);

    let mut addresses: Vec<&str> = baseline_states.keys().copied().collect();
    for address in pr_states.keys() {
        if !baseline_states.contains_key(address) {
            addresses.push(address);
        }
    }
    addresses.sort_unstable();

    let mut changes = Vec::new();
    for address in addresses {
        let before_side = baseline_states.get(address);
        let after_side = pr_states.get(address);
        let meta = after_side.or(before_side).map(|(rc, _)| *rc);
        let Some(meta) = meta else { continue };

        let before_state = before_side.and_then(|(_, state)| *state);
        let after_state = after_side.and_then(|(_, state)| *state);

        match (before_state, after_state) {
            (None, None) => {}
            (Some(_), Some(_)) => {
                for path in rules::tracked_attribute_paths(&meta.resource_type) {
                    let before_value = lookup_path(before_state, path);
                    let after_value = lookup_path(after_state, path);
                    if before_value != after_value {
                        changes.push(ResourceChange {
                            address: address.to_string(),
                            resource_type: meta.resource_type.clone(),
                            name: meta.name.clone(),
                            attribute_path: path.to_string(),
                            before: before_value,
                            after: after_value,
                        });
                    }
                }
            }
            // Created or destroyed: one whole-resource marker.
            (before, after) => {
                changes.push(ResourceChange {
                    address: address.to_string(),
                    resource_type: meta.resource_type.clone(),
                    name: meta.name.clone(),
                    attribute_path: String::new(),
                    before: before.cloned(),
                    after: after.cloned(),
                });
            }
        }
    }

    changes.sort_by(|a, b| {
        a.address
            .cmp(&b.address)
            .then_with(|| a.attribute_path.cmp(&b.attribute_path))
    });
    changes
}

/// Walk a dotted path; numeric segments index into arrays.
fn lookup_path(state: Option<&Value>, path: &str) -> Option<Value> {
    let mut current = state?;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }
    if current.is_null() { None } else { Some(current.clone()) }
}

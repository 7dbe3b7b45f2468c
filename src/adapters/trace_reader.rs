use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::dependency_tree::domain::TargetFramework;
use crate::handlers::{RuleItem, RuleUpdate};
use crate::ports::{TraceBatch, TraceSource};
use crate::shared::error::DepTreeError;
use crate::shared::Result;

/// Reads recorded evaluation traces from JSON files.
///
/// A trace is a JSON array of batches; each batch carries either
/// `ruleUpdates` or `orderedItems`, tagged with `source` and
/// `targetFramework`.
#[derive(Debug, Default)]
pub struct FileTraceReader;

impl FileTraceReader {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct BatchDto {
    source: String,
    target_framework: String,
    #[serde(default)]
    rule_updates: Option<Vec<RuleUpdateDto>>,
    #[serde(default)]
    ordered_items: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RuleUpdateDto {
    rule_name: String,
    #[serde(default)]
    full_update: bool,
    #[serde(default)]
    added: Vec<RuleItemDto>,
    #[serde(default)]
    removed: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RuleItemDto {
    item_spec: String,
    #[serde(default)]
    properties: IndexMap<String, String>,
}

impl TraceSource for FileTraceReader {
    fn read_batches(&self, path: &Path) -> Result<Vec<TraceBatch>> {
        if !path.exists() {
            return Err(DepTreeError::TraceNotFound {
                path: path.to_path_buf(),
                suggestion: "Check the path, or record a trace with your evaluation host first"
                    .to_string(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path).map_err(|e| DepTreeError::TraceParse {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

        let batches: Vec<BatchDto> =
            serde_json::from_str(&content).map_err(|e| DepTreeError::TraceParse {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?;

        batches
            .into_iter()
            .enumerate()
            .map(|(index, dto)| convert_batch(path, index, dto))
            .collect()
    }
}

fn convert_batch(path: &Path, index: usize, dto: BatchDto) -> Result<TraceBatch> {
    let target_framework = TargetFramework::new(dto.target_framework)?;

    match (dto.rule_updates, dto.ordered_items) {
        (Some(rule_updates), None) => {
            let updates = rule_updates
                .into_iter()
                .map(|u| convert_update(u, &target_framework))
                .collect();
            Ok(TraceBatch::Updates {
                source: dto.source,
                target_framework,
                updates,
            })
        }
        (None, Some(items)) => Ok(TraceBatch::OrderedItems {
            source: dto.source,
            target_framework,
            items,
        }),
        _ => Err(DepTreeError::TraceParse {
            path: path.to_path_buf(),
            details: format!(
                "batch {} must carry exactly one of 'ruleUpdates' or 'orderedItems'",
                index
            ),
        }
        .into()),
    }
}

fn convert_update(dto: RuleUpdateDto, target_framework: &TargetFramework) -> RuleUpdate {
    let mut update = if dto.full_update {
        RuleUpdate::full(dto.rule_name, target_framework.clone())
    } else {
        RuleUpdate::incremental(dto.rule_name, target_framework.clone())
    };
    for item in dto.added {
        update = update.with_added(RuleItem::new(item.item_spec).with_properties(item.properties));
    }
    for removed in dto.removed {
        update = update.with_removed(removed);
    }
    update
}

//! Rollup of one project's published field scores over the full catalog.

use crate::model::catalog::{Catalog, Category, Field, FieldId};
use crate::model::project::ProjectId;
use crate::scoring::aggregate::{category_score, overall_score, Contribution};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Current published scores keyed by `(project, field)`.
pub type ScoreMap = HashMap<(ProjectId, FieldId), Decimal>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRollup<'a> {
    pub field: &'a Field,
    pub score: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRollup<'a> {
    pub category: &'a Category,
    /// Exact weighted mean; `None` when no field contributes.
    pub score: Option<Decimal>,
    pub fields: Vec<FieldRollup<'a>>,
}

/// Every category and field of the catalog with the project's scores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRollup<'a> {
    pub project_id: ProjectId,
    pub overall: Option<Decimal>,
    pub categories: Vec<CategoryRollup<'a>>,
}

/// Computes field, category and overall scores for one project.
///
/// Rows follow the catalog's structural order, including categories and
/// fields the project has no score for.
pub fn rollup_project<'a>(
    catalog: &'a Catalog,
    project_id: ProjectId,
    scores: &ScoreMap,
) -> ProjectRollup<'a> {
    let categories: Vec<CategoryRollup<'a>> = catalog
        .categories
        .iter()
        .map(|node| {
            let fields: Vec<FieldRollup<'a>> = node
                .fields
                .iter()
                .map(|field| FieldRollup {
                    field,
                    score: scores.get(&(project_id, field.id)).copied(),
                })
                .collect();
            let score = category_score(
                fields
                    .iter()
                    .map(|item| Contribution::new(item.score, item.field.weight)),
            );
            CategoryRollup {
                category: &node.category,
                score,
                fields,
            }
        })
        .collect();

    let overall = overall_score(
        categories
            .iter()
            .map(|item| Contribution::new(item.score, item.category.weight)),
    );

    ProjectRollup {
        project_id,
        overall,
        categories,
    }
}

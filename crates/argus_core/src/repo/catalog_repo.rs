//! Catalog hierarchy repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist categories, fields, metrics and their translations.
//! - Load the full scoring hierarchy in one pass for aggregation.
//!
//! # Invariants
//! - Categories and fields are returned in `(weight, id)` order.
//! - Translations are returned in insertion (`id`) order.
//! - An entity and its initial translations are written atomically.

use crate::model::catalog::{
    Catalog, Category, CategoryId, CategoryNode, Field, FieldId, Metric, MetricId, NewCategory,
    NewField, NewMetric,
};
use crate::model::translation::{NewTranslation, TranslationId};
use crate::repo::support::{
    bool_to_int, ensure_schema_current, insert_translation, int_to_bool, load_all_translations,
    load_translations, weight_from_db, TranslationTable, CATEGORY_TRANSLATIONS,
    FIELD_TRANSLATIONS, METRIC_TRANSLATIONS,
};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const CATEGORY_SELECT_SQL: &str = "SELECT id, slug, weight FROM categories";

const FIELD_SELECT_SQL: &str = "SELECT
    fields.id AS id,
    fields.category_id AS category_id,
    fields.slug AS slug,
    fields.weight AS weight,
    fields.analysis_periodicity_days AS analysis_periodicity_days
FROM fields";

const METRIC_SELECT_SQL: &str = "SELECT
    metrics.id AS id,
    metrics.field_id AS field_id,
    metrics.slug AS slug,
    metrics.weight AS weight,
    metrics.collection_enabled AS collection_enabled
FROM metrics";

/// Repository interface for the Category → Field → Metric hierarchy.
pub trait CatalogRepository {
    fn create_category(&self, category: &NewCategory) -> RepoResult<CategoryId>;
    fn add_category_translation(
        &self,
        category_id: CategoryId,
        translation: &NewTranslation,
    ) -> RepoResult<TranslationId>;
    fn create_field(&self, field: &NewField) -> RepoResult<FieldId>;
    fn add_field_translation(
        &self,
        field_id: FieldId,
        translation: &NewTranslation,
    ) -> RepoResult<TranslationId>;
    fn create_metric(&self, metric: &NewMetric) -> RepoResult<MetricId>;
    fn add_metric_translation(
        &self,
        metric_id: MetricId,
        translation: &NewTranslation,
    ) -> RepoResult<TranslationId>;
    /// Enables or disables raw data collection for one metric.
    fn set_metric_collection(&self, metric_id: MetricId, enabled: bool) -> RepoResult<()>;
    /// Loads every category and field with translations, in structural order.
    fn load_catalog(&self) -> RepoResult<Catalog>;
    fn get_category(&self, category_id: CategoryId) -> RepoResult<Option<Category>>;
    fn find_category(&self, category_slug: &str) -> RepoResult<Option<Category>>;
    fn find_field(&self, category_slug: &str, field_slug: &str) -> RepoResult<Option<Field>>;
    fn find_metric(
        &self,
        category_slug: &str,
        field_slug: &str,
        metric_slug: &str,
    ) -> RepoResult<Option<Metric>>;
    /// Lists metrics of one field ordered by `(weight, id)`.
    fn list_metrics(&self, field_id: FieldId) -> RepoResult<Vec<Metric>>;
}

/// SQLite-backed catalog repository.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_current(conn)?;
        Ok(Self { conn })
    }

    fn insert_with_translations(
        &self,
        table: TranslationTable,
        translations: &[NewTranslation],
        insert_owner: impl FnOnce(&Connection) -> RepoResult<i64>,
    ) -> RepoResult<i64> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let owner_id = insert_owner(&tx)?;
        for translation in translations {
            insert_translation(&tx, table, owner_id, translation)?;
        }
        tx.commit()?;
        Ok(owner_id)
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn create_category(&self, category: &NewCategory) -> RepoResult<CategoryId> {
        category.validate()?;
        self.insert_with_translations(CATEGORY_TRANSLATIONS, &category.translations, |conn| {
            conn.execute(
                "INSERT INTO categories (slug, weight) VALUES (?1, ?2);",
                params![category.slug, category.weight],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn add_category_translation(
        &self,
        category_id: CategoryId,
        translation: &NewTranslation,
    ) -> RepoResult<TranslationId> {
        insert_translation(self.conn, CATEGORY_TRANSLATIONS, category_id, translation)
    }

    fn create_field(&self, field: &NewField) -> RepoResult<FieldId> {
        field.validate()?;
        self.insert_with_translations(FIELD_TRANSLATIONS, &field.translations, |conn| {
            conn.execute(
                "INSERT INTO fields (category_id, slug, weight, analysis_periodicity_days)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    field.category_id,
                    field.slug,
                    field.weight,
                    field.analysis_periodicity_days,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn add_field_translation(
        &self,
        field_id: FieldId,
        translation: &NewTranslation,
    ) -> RepoResult<TranslationId> {
        insert_translation(self.conn, FIELD_TRANSLATIONS, field_id, translation)
    }

    fn create_metric(&self, metric: &NewMetric) -> RepoResult<MetricId> {
        metric.validate()?;
        self.insert_with_translations(METRIC_TRANSLATIONS, &metric.translations, |conn| {
            conn.execute(
                "INSERT INTO metrics (field_id, slug, weight, collection_enabled)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    metric.field_id,
                    metric.slug,
                    metric.weight,
                    bool_to_int(metric.collection_enabled),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn add_metric_translation(
        &self,
        metric_id: MetricId,
        translation: &NewTranslation,
    ) -> RepoResult<TranslationId> {
        insert_translation(self.conn, METRIC_TRANSLATIONS, metric_id, translation)
    }

    fn set_metric_collection(&self, metric_id: MetricId, enabled: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE metrics SET collection_enabled = ?2 WHERE id = ?1;",
            params![metric_id, bool_to_int(enabled)],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("metric", metric_id));
        }
        Ok(())
    }

    fn load_catalog(&self) -> RepoResult<Catalog> {
        let mut category_translations = load_all_translations(self.conn, CATEGORY_TRANSLATIONS)?;
        let mut field_translations = load_all_translations(self.conn, FIELD_TRANSLATIONS)?;

        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL} ORDER BY weight ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            let mut category = parse_category_row(row)?;
            category.translations = category_translations
                .remove(&category.id)
                .unwrap_or_default();
            categories.push(CategoryNode {
                category,
                fields: Vec::new(),
            });
        }

        let mut stmt = self.conn.prepare(&format!(
            "{FIELD_SELECT_SQL} ORDER BY fields.category_id ASC, fields.weight ASC, fields.id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut field = parse_field_row(row)?;
            field.translations = field_translations.remove(&field.id).unwrap_or_default();
            let node = categories
                .iter_mut()
                .find(|node| node.category.id == field.category_id)
                .ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "field {} references unknown category {}",
                        field.id, field.category_id
                    ))
                })?;
            node.fields.push(field);
        }

        Ok(Catalog { categories })
    }

    fn get_category(&self, category_id: CategoryId) -> RepoResult<Option<Category>> {
        let category = self
            .conn
            .query_row(
                &format!("{CATEGORY_SELECT_SQL} WHERE id = ?1;"),
                [category_id],
                |row| Ok(parse_category_row(row)),
            )
            .optional()?
            .transpose()?;
        self.with_category_translations(category)
    }

    fn find_category(&self, category_slug: &str) -> RepoResult<Option<Category>> {
        let category = self
            .conn
            .query_row(
                &format!("{CATEGORY_SELECT_SQL} WHERE slug = ?1;"),
                [category_slug],
                |row| Ok(parse_category_row(row)),
            )
            .optional()?
            .transpose()?;
        self.with_category_translations(category)
    }

    fn find_field(&self, category_slug: &str, field_slug: &str) -> RepoResult<Option<Field>> {
        let field = self
            .conn
            .query_row(
                &format!(
                    "{FIELD_SELECT_SQL}
                     INNER JOIN categories ON categories.id = fields.category_id
                     WHERE categories.slug = ?1
                       AND fields.slug = ?2;"
                ),
                params![category_slug, field_slug],
                |row| Ok(parse_field_row(row)),
            )
            .optional()?
            .transpose()?;

        match field {
            Some(mut field) => {
                field.translations = load_translations(self.conn, FIELD_TRANSLATIONS, field.id)?;
                Ok(Some(field))
            }
            None => Ok(None),
        }
    }

    fn find_metric(
        &self,
        category_slug: &str,
        field_slug: &str,
        metric_slug: &str,
    ) -> RepoResult<Option<Metric>> {
        let metric = self
            .conn
            .query_row(
                &format!(
                    "{METRIC_SELECT_SQL}
                     INNER JOIN fields ON fields.id = metrics.field_id
                     INNER JOIN categories ON categories.id = fields.category_id
                     WHERE categories.slug = ?1
                       AND fields.slug = ?2
                       AND metrics.slug = ?3;"
                ),
                params![category_slug, field_slug, metric_slug],
                |row| Ok(parse_metric_row(row)),
            )
            .optional()?
            .transpose()?;

        match metric {
            Some(mut metric) => {
                metric.translations =
                    load_translations(self.conn, METRIC_TRANSLATIONS, metric.id)?;
                Ok(Some(metric))
            }
            None => Ok(None),
        }
    }

    fn list_metrics(&self, field_id: FieldId) -> RepoResult<Vec<Metric>> {
        let mut stmt = self.conn.prepare(&format!(
            "{METRIC_SELECT_SQL}
             WHERE metrics.field_id = ?1
             ORDER BY metrics.weight ASC, metrics.id ASC;"
        ))?;
        let mut rows = stmt.query([field_id])?;
        let mut metrics = Vec::new();
        while let Some(row) = rows.next()? {
            let mut metric = parse_metric_row(row)?;
            metric.translations = load_translations(self.conn, METRIC_TRANSLATIONS, metric.id)?;
            metrics.push(metric);
        }
        Ok(metrics)
    }
}

impl SqliteCatalogRepository<'_> {
    fn with_category_translations(
        &self,
        category: Option<Category>,
    ) -> RepoResult<Option<Category>> {
        match category {
            Some(mut category) => {
                category.translations =
                    load_translations(self.conn, CATEGORY_TRANSLATIONS, category.id)?;
                Ok(Some(category))
            }
            None => Ok(None),
        }
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    Ok(Category {
        id: row.get("id")?,
        slug: row.get("slug")?,
        weight: weight_from_db(row.get("weight")?, "categories.weight")?,
        translations: Vec::new(),
    })
}

fn parse_field_row(row: &Row<'_>) -> RepoResult<Field> {
    let periodicity = row
        .get::<_, Option<i64>>("analysis_periodicity_days")?
        .map(|days| {
            u32::try_from(days).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid periodicity `{days}` in fields.analysis_periodicity_days"
                ))
            })
        })
        .transpose()?;

    Ok(Field {
        id: row.get("id")?,
        category_id: row.get("category_id")?,
        slug: row.get("slug")?,
        weight: weight_from_db(row.get("weight")?, "fields.weight")?,
        analysis_periodicity_days: periodicity,
        translations: Vec::new(),
    })
}

fn parse_metric_row(row: &Row<'_>) -> RepoResult<Metric> {
    Ok(Metric {
        id: row.get("id")?,
        field_id: row.get("field_id")?,
        slug: row.get("slug")?,
        weight: weight_from_db(row.get("weight")?, "metrics.weight")?,
        collection_enabled: int_to_bool(
            row.get("collection_enabled")?,
            "metrics.collection_enabled",
        )?,
        translations: Vec::new(),
    })
}

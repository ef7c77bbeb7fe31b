//! Row decoding and connection checks shared by SQLite repositories.

use crate::db::migrations::{current_user_version, latest_version};
use crate::model::translation::{NewTranslation, Translation, TranslationId};
use crate::model::validation::{validate_locale, validate_name};
use crate::repo::{RepoError, RepoResult};
use rust_decimal::Decimal;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::str::FromStr;

pub(crate) fn ensure_schema_current(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn parse_decimal(value: &str, column: &'static str) -> RepoResult<Decimal> {
    Decimal::from_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid decimal `{value}` in {column}")))
}

pub(crate) fn weight_from_db(value: i64, column: &'static str) -> RepoResult<u32> {
    u32::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid weight `{value}` in {column}")))
}

/// Translation tables share one shape: `(id, <owner>_id, locale, name, description)`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TranslationTable {
    pub table: &'static str,
    pub owner_column: &'static str,
}

pub(crate) const CATEGORY_TRANSLATIONS: TranslationTable = TranslationTable {
    table: "category_translations",
    owner_column: "category_id",
};

pub(crate) const FIELD_TRANSLATIONS: TranslationTable = TranslationTable {
    table: "field_translations",
    owner_column: "field_id",
};

pub(crate) const METRIC_TRANSLATIONS: TranslationTable = TranslationTable {
    table: "metric_translations",
    owner_column: "metric_id",
};

impl TranslationTable {
    fn select_sql(&self) -> String {
        format!(
            "SELECT id, {owner} AS owner_id, locale, name, description FROM {table}",
            owner = self.owner_column,
            table = self.table,
        )
    }
}

/// Validates and inserts one translation, returning its row id.
///
/// A second translation for the same (owner, locale) fails on the table's
/// unique constraint.
pub(crate) fn insert_translation(
    conn: &Connection,
    table: TranslationTable,
    owner_id: i64,
    translation: &NewTranslation,
) -> RepoResult<TranslationId> {
    let locale = validate_locale(&translation.locale)?;
    let name = validate_name(&translation.name)?;
    let description = translation
        .description
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());

    conn.execute(
        &format!(
            "INSERT INTO {table} ({owner}, locale, name, description) VALUES (?1, ?2, ?3, ?4);",
            table = table.table,
            owner = table.owner_column,
        ),
        params![owner_id, locale, name, description],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Loads every translation of one table, grouped by owner, insertion-ordered.
pub(crate) fn load_all_translations(
    conn: &Connection,
    table: TranslationTable,
) -> RepoResult<HashMap<i64, Vec<Translation>>> {
    let sql = format!("{} ORDER BY id ASC;", table.select_sql());
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    let mut grouped: HashMap<i64, Vec<Translation>> = HashMap::new();
    while let Some(row) = rows.next()? {
        let owner_id: i64 = row.get("owner_id")?;
        grouped.entry(owner_id).or_default().push(Translation {
            id: row.get("id")?,
            locale: row.get("locale")?,
            name: row.get("name")?,
            description: row.get("description")?,
        });
    }
    Ok(grouped)
}

/// Loads the insertion-ordered translations of one owner.
pub(crate) fn load_translations(
    conn: &Connection,
    table: TranslationTable,
    owner_id: i64,
) -> RepoResult<Vec<Translation>> {
    let sql = format!(
        "{} WHERE {} = ?1 ORDER BY id ASC;",
        table.select_sql(),
        table.owner_column
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([owner_id])?;
    let mut translations = Vec::new();
    while let Some(row) = rows.next()? {
        translations.push(Translation {
            id: row.get("id")?,
            locale: row.get("locale")?,
            name: row.get("name")?,
            description: row.get("description")?,
        });
    }
    Ok(translations)
}

/// Builds `?, ?, ?` for an `IN (...)` list of `count` parameters.
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

//! Query-building helpers for list endpoints.
//!
//! List queries are assembled with [`QueryBuilder`] so the same filter clause
//! can be pushed onto both the `COUNT(*)` and the page query.

use anyhow::Context;
use emsu_core::{AppError, PaginationParams};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

/// Wraps `term` for a substring `LIKE`, escaping the wildcards it contains.
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Pushes ` AND (col LIKE ? OR ...)` over `columns`.
///
/// SQLite `LIKE` is case-insensitive for ASCII.
pub fn push_search(qb: &mut QueryBuilder<'_, Sqlite>, columns: &[&str], term: &str) {
    let pattern = like_pattern(term);

    qb.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(*column)
            .push(" LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\'");
    }
    qb.push(")");
}

/// Restricts to active rows unless the caller asked for everything.
pub fn push_active_filter(
    qb: &mut QueryBuilder<'_, Sqlite>,
    column: &str,
    include_inactive: Option<bool>,
) {
    if !include_inactive.unwrap_or(false) {
        qb.push(" AND ").push(column).push(" = 1");
    }
}

pub fn push_page(qb: &mut QueryBuilder<'_, Sqlite>, pagination: &PaginationParams) {
    qb.push(" LIMIT ")
        .push_bind(pagination.per_page())
        .push(" OFFSET ")
        .push_bind(pagination.offset());
}

/// Whether another row of `table` already holds `value` in `column`.
///
/// `table` and `column` are always literals from the calling service.
pub async fn value_taken<'e, E>(
    db: E,
    table: &str,
    column: &str,
    value: &str,
    exclude_id: Option<i64>,
) -> Result<bool, AppError>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {table} WHERE {column} = ? AND id != ?"
    ))
    .bind(value)
    .bind(exclude_id.unwrap_or(0))
    .fetch_one(db)
    .await
    .with_context(|| format!("Failed to check {table}.{column} uniqueness"))
    .map_err(AppError::database)?;

    Ok(count > 0)
}

/// Fails with 400 unless a row with `id` exists in `table`, active or not.
pub async fn ensure_exists<'e, E>(
    db: E,
    table: &str,
    id: i64,
    message: &str,
) -> Result<(), AppError>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table} WHERE id = ?"))
        .bind(id)
        .fetch_one(db)
        .await
        .with_context(|| format!("Failed to look up {table} {id}"))
        .map_err(AppError::database)?;

    if count == 0 {
        return Err(AppError::bad_request(anyhow::anyhow!("{}", message)));
    }
    Ok(())
}

/// Fails with 400 unless an active row with `id` exists in `table`.
pub async fn ensure_active<'e, E>(
    db: E,
    table: &str,
    id: i64,
    message: &str,
) -> Result<(), AppError>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {table} WHERE id = ? AND is_active = 1"
    ))
    .bind(id)
    .fetch_one(db)
    .await
    .with_context(|| format!("Failed to look up active {table} {id}"))
    .map_err(AppError::database)?;

    if count == 0 {
        return Err(AppError::bad_request(anyhow::anyhow!("{}", message)));
    }
    Ok(())
}

/// Maps constraint violations that slipped past the explicit checks to 400.
pub fn map_write_error(err: sqlx::Error, conflict_message: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::bad_request(anyhow::anyhow!("{}", conflict_message));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::bad_request(anyhow::anyhow!("Referenced record does not exist"));
        }
    }
    AppError::database(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_term() {
        assert_eq!(like_pattern("doe"), "%doe%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_push_search_builds_or_group() {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM students WHERE 1=1");
        push_search(&mut qb, &["first_name", "email"], "ann");
        assert_eq!(
            qb.sql(),
            "SELECT * FROM students WHERE 1=1 AND (first_name LIKE ? ESCAPE '\\' OR email LIKE ? ESCAPE '\\')"
        );
    }

    #[test]
    fn test_active_filter_is_skipped_when_including_inactive() {
        let mut qb = QueryBuilder::<Sqlite>::new("WHERE 1=1");
        push_active_filter(&mut qb, "s.is_active", Some(true));
        assert_eq!(qb.sql(), "WHERE 1=1");

        let mut qb = QueryBuilder::<Sqlite>::new("WHERE 1=1");
        push_active_filter(&mut qb, "s.is_active", None);
        assert_eq!(qb.sql(), "WHERE 1=1 AND s.is_active = 1");
    }
}

//! Merchant Repository

use super::{RepoError, RepoResult};
use shared::models::{Merchant, MerchantSettings};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqliteExecutor;

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Merchant>> {
    let merchant = sqlx::query_as::<_, Merchant>("SELECT * FROM merchants WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(merchant)
}

pub async fn create(
    db: impl SqliteExecutor<'_>,
    name: &str,
    settings: Option<&MerchantSettings>,
) -> RepoResult<Merchant> {
    let settings_json = settings
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| RepoError::Validation(format!("Invalid merchant settings: {e}")))?;
    let now = now_millis();
    let merchant = sqlx::query_as::<_, Merchant>(
        "INSERT INTO merchants (id, name, settings, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(snowflake_id())
    .bind(name)
    .bind(settings_json)
    .bind(now)
    .bind(now)
    .fetch_one(db)
    .await?;
    Ok(merchant)
}

pub async fn update_settings(
    db: impl SqliteExecutor<'_>,
    id: i64,
    settings: &MerchantSettings,
) -> RepoResult<()> {
    let json = serde_json::to_string(settings)
        .map_err(|e| RepoError::Validation(format!("Invalid merchant settings: {e}")))?;
    let rows = sqlx::query("UPDATE merchants SET settings = ?, updated_at = ? WHERE id = ?")
        .bind(json)
        .bind(now_millis())
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();
    if rows == 0 {
        return Err(RepoError::NotFound(format!("merchant {id}")));
    }
    Ok(())
}

use serde::{Deserialize, Serialize};

use super::{now_rfc3339, Storage, StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub role: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub role: Option<String>,
    pub avatar_url: Option<String>,
}

impl Storage {
    /// Profiles are keyed by user id, created on first touch.
    pub async fn ensure_profile(&self, user_id: &str) -> StoreResult<ProfileRow> {
        let now = now_rfc3339();
        sqlx::query(
            "INSERT INTO profiles (id, created_at, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(id) DO NOTHING",
        )
        .bind(user_id)
        .bind(&now)
        .bind(&now)
        .execute(self.pool_ref())
        .await?;
        self.get_profile(user_id).await
    }

    pub async fn get_profile(&self, user_id: &str) -> StoreResult<ProfileRow> {
        sqlx::query_as("SELECT * FROM profiles WHERE id = ?")
            .bind(user_id)
            .fetch_optional(self.pool_ref())
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity: "profile",
                id: user_id.to_string(),
            })
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        patch: ProfilePatch,
    ) -> StoreResult<ProfileRow> {
        let now = now_rfc3339();
        let result = sqlx::query(
            "UPDATE profiles SET
                 full_name = COALESCE(?, full_name),
                 email = COALESCE(?, email),
                 phone = COALESCE(?, phone),
                 department = COALESCE(?, department),
                 role = COALESCE(?, role),
                 avatar_url = COALESCE(?, avatar_url),
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(&patch.full_name)
        .bind(&patch.email)
        .bind(&patch.phone)
        .bind(&patch.department)
        .bind(&patch.role)
        .bind(&patch.avatar_url)
        .bind(&now)
        .bind(user_id)
        .execute(self.pool_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "profile",
                id: user_id.to_string(),
            });
        }
        self.get_profile(user_id).await
    }
}

use serde::{Deserialize, Serialize};

use super::{new_id, now_rfc3339, Storage, StoreResult};

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct QuoteRow {
    pub id: String,
    pub quote: String,
    pub author: Option<String>,
    pub category: Option<String>,
    pub created_at: String,
}

/// Quotes shipped with a fresh database so completion celebrations work
/// out of the box.
const SEED_QUOTES: &[(&str, Option<&str>, &str)] = &[
    (
        "The secret of getting ahead is getting started.",
        Some("Mark Twain"),
        "completion",
    ),
    (
        "Well done is better than well said.",
        Some("Benjamin Franklin"),
        "completion",
    ),
    (
        "Small deeds done are better than great deeds planned.",
        Some("Peter Marshall"),
        "completion",
    ),
    (
        "Focus on being productive instead of busy.",
        Some("Tim Ferriss"),
        "focus",
    ),
    ("It always seems impossible until it is done.", Some("Nelson Mandela"), "focus"),
];

impl Storage {
    pub async fn add_quote(
        &self,
        quote: &str,
        author: Option<&str>,
        category: Option<&str>,
    ) -> StoreResult<QuoteRow> {
        let id = new_id();
        let now = now_rfc3339();
        sqlx::query(
            "INSERT INTO motivational_quotes (id, quote, author, category, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(quote)
        .bind(author)
        .bind(category)
        .bind(&now)
        .execute(self.pool_ref())
        .await?;

        Ok(
            sqlx::query_as("SELECT * FROM motivational_quotes WHERE id = ?")
                .bind(&id)
                .fetch_one(self.pool_ref())
                .await?,
        )
    }

    /// A random quote, optionally restricted to a category. `None` when the
    /// table has no matching rows.
    pub async fn random_quote(&self, category: Option<&str>) -> StoreResult<Option<QuoteRow>> {
        let row = match category {
            Some(cat) => {
                sqlx::query_as(
                    "SELECT * FROM motivational_quotes WHERE category = ?
                     ORDER BY RANDOM() LIMIT 1",
                )
                .bind(cat)
                .fetch_optional(self.pool_ref())
                .await?
            }
            None => {
                sqlx::query_as("SELECT * FROM motivational_quotes ORDER BY RANDOM() LIMIT 1")
                    .fetch_optional(self.pool_ref())
                    .await?
            }
        };
        Ok(row)
    }

    /// Idempotent: only seeds an empty table.
    pub async fn seed_quotes(&self) -> StoreResult<()> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM motivational_quotes")
            .fetch_one(self.pool_ref())
            .await?;
        if count.0 > 0 {
            return Ok(());
        }
        for (quote, author, category) in SEED_QUOTES {
            self.add_quote(quote, *author, Some(category)).await?;
        }
        Ok(())
    }
}

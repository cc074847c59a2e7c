//! Site theme
//!
//! A single row of color settings, editable by admins and served publicly so
//! the frontend can apply them.

use crate::content::SINGLETON_ID;
use crate::storage::Database;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;

/// Site theme colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub primary_color: String,
    pub secondary_color: String,
    pub background_color: String,
    pub text_color: String,
    pub updated_at: DateTime<Utc>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_color: "#1d4ed8".to_string(),
            secondary_color: "#9333ea".to_string(),
            background_color: "#ffffff".to_string(),
            text_color: "#111827".to_string(),
            updated_at: Utc::now(),
        }
    }
}

/// Validate a `#rrggbb` hex color string
pub fn validate_hex_color(value: &str) -> Result<()> {
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());

    if valid {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "'{}' is not a #rrggbb hex color",
            value
        )))
    }
}

impl Theme {
    /// Validate all color fields
    pub fn validate(&self) -> Result<()> {
        validate_hex_color(&self.primary_color)?;
        validate_hex_color(&self.secondary_color)?;
        validate_hex_color(&self.background_color)?;
        validate_hex_color(&self.text_color)?;
        Ok(())
    }
}

/// Theme repository for database operations
pub struct ThemeRepository<'a> {
    db: &'a Database,
}

impl<'a> ThemeRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Get the stored theme, or the default palette when none is set
    pub async fn get(&self) -> Result<Theme> {
        let row = sqlx::query(
            "SELECT primary_color, secondary_color, background_color, text_color, updated_at FROM theme WHERE id = ?",
        )
        .bind(SINGLETON_ID)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row
            .map(|r| Theme {
                primary_color: r.get("primary_color"),
                secondary_color: r.get("secondary_color"),
                background_color: r.get("background_color"),
                text_color: r.get("text_color"),
                updated_at: r.get("updated_at"),
            })
            .unwrap_or_default())
    }

    /// Store the theme, validating colors first
    pub async fn set(&self, theme: &Theme) -> Result<()> {
        theme.validate()?;

        sqlx::query(
            r#"
            INSERT INTO theme (id, primary_color, secondary_color, background_color, text_color, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                primary_color = excluded.primary_color,
                secondary_color = excluded.secondary_color,
                background_color = excluded.background_color,
                text_color = excluded.text_color,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(SINGLETON_ID)
        .bind(&theme.primary_color)
        .bind(&theme.secondary_color)
        .bind(&theme.background_color)
        .bind(&theme.text_color)
        .bind(Utc::now())
        .execute(self.db.pool())
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color_validation() {
        assert!(validate_hex_color("#1d4ed8").is_ok());
        assert!(validate_hex_color("#FFFFFF").is_ok());
        assert!(validate_hex_color("1d4ed8").is_err());
        assert!(validate_hex_color("#1d4e").is_err());
        assert!(validate_hex_color("#gggggg").is_err());
    }

    #[tokio::test]
    async fn test_get_returns_default_when_unset() {
        let db = Database::in_memory().await.unwrap();
        let repo = ThemeRepository::new(&db);

        let theme = repo.get().await.unwrap();
        assert_eq!(theme.primary_color, "#1d4ed8");
    }

    #[tokio::test]
    async fn test_set_and_get_theme() {
        let db = Database::in_memory().await.unwrap();
        let repo = ThemeRepository::new(&db);

        let theme = Theme {
            primary_color: "#ff0000".to_string(),
            ..Default::default()
        };
        repo.set(&theme).await.unwrap();

        let stored = repo.get().await.unwrap();
        assert_eq!(stored.primary_color, "#ff0000");

        // Second set overwrites the singleton
        let theme2 = Theme {
            primary_color: "#00ff00".to_string(),
            ..Default::default()
        };
        repo.set(&theme2).await.unwrap();
        assert_eq!(repo.get().await.unwrap().primary_color, "#00ff00");
    }

    #[tokio::test]
    async fn test_set_rejects_bad_colors() {
        let db = Database::in_memory().await.unwrap();
        let repo = ThemeRepository::new(&db);

        let theme = Theme {
            text_color: "purple".to_string(),
            ..Default::default()
        };
        assert!(repo.set(&theme).await.is_err());
    }
}

//! Farm database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::Farm;

impl Database {
    /// Insert a new farm.
    pub fn insert_farm(&self, farm: &Farm) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO farms (id, name, location, owner_name, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                farm.id,
                farm.name,
                farm.location,
                farm.owner_name,
                farm.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a farm by ID.
    pub fn get_farm(&self, id: &str) -> DbResult<Option<Farm>> {
        self.conn
            .query_row(
                r#"
                SELECT id, name, location, owner_name, created_at
                FROM farms
                WHERE id = ?
                "#,
                [id],
                |row| {
                    Ok(Farm {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        location: row.get(2)?,
                        owner_name: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all farms.
    pub fn list_farms(&self) -> DbResult<Vec<Farm>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, location, owner_name, created_at
            FROM farms
            ORDER BY name, id
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Farm {
                id: row.get(0)?,
                name: row.get(1)?,
                location: row.get(2)?,
                owner_name: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

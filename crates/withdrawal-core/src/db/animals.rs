//! Animal registry database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Animal, AnimalStatus};

const ANIMAL_COLUMNS: &str = "id, tag, animal_type, age, weight_kg, farm_id, \
                              status, status_updated_at, created_at, updated_at";

impl Database {
    /// Insert a new animal.
    pub fn insert_animal(&self, animal: &Animal) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO animals (
                id, tag, animal_type, age, weight_kg, farm_id,
                status, status_updated_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                animal.id,
                animal.tag,
                animal.animal_type,
                animal.age,
                animal.weight_kg,
                animal.farm_id,
                animal.status.as_str(),
                animal.status_updated_at,
                animal.created_at,
                animal.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Get an animal by internal ID.
    pub fn get_animal(&self, id: &str) -> DbResult<Option<Animal>> {
        let sql = format!("SELECT {} FROM animals WHERE id = ?", ANIMAL_COLUMNS);
        self.conn
            .query_row(&sql, [id], AnimalRow::from_row)
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Get an animal by identity tag.
    pub fn get_animal_by_tag(&self, tag: &str) -> DbResult<Option<Animal>> {
        let sql = format!("SELECT {} FROM animals WHERE tag = ?", ANIMAL_COLUMNS);
        self.conn
            .query_row(&sql, [tag], AnimalRow::from_row)
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Check whether a tag is already registered.
    pub fn animal_tag_exists(&self, tag: &str) -> DbResult<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM animals WHERE tag = ?)",
            [tag],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// List every animal, ordered by tag.
    pub fn list_animals(&self) -> DbResult<Vec<Animal>> {
        let sql = format!("SELECT {} FROM animals ORDER BY tag", ANIMAL_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], AnimalRow::from_row)?;

        let mut animals = Vec::new();
        for row in rows {
            animals.push(row?.try_into()?);
        }
        Ok(animals)
    }

    /// List the animals of one farm, ordered by tag.
    pub fn list_animals_for_farm(&self, farm_id: &str) -> DbResult<Vec<Animal>> {
        let sql = format!(
            "SELECT {} FROM animals WHERE farm_id = ? ORDER BY tag",
            ANIMAL_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([farm_id], AnimalRow::from_row)?;

        let mut animals = Vec::new();
        for row in rows {
            animals.push(row?.try_into()?);
        }
        Ok(animals)
    }

    /// Write the cached status of an animal.
    ///
    /// `evaluated_at` is the evaluation time that produced the status.
    pub fn update_animal_status(
        &self,
        id: &str,
        status: AnimalStatus,
        evaluated_at: &str,
    ) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE animals SET
                status = ?2,
                status_updated_at = ?3,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![id, status.as_str(), evaluated_at],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete an animal together with all of its usage records.
    pub fn delete_animal(&self, id: &str) -> DbResult<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let usages = tx.execute("DELETE FROM medicine_usages WHERE animal_id = ?", [id])?;
        let rows_affected = tx.execute("DELETE FROM animals WHERE id = ?", [id])?;
        tx.commit()?;

        if rows_affected > 0 {
            tracing::debug!("Deleted animal {} and {} usage records", id, usages);
        }
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct AnimalRow {
    id: String,
    tag: String,
    animal_type: String,
    age: i64,
    weight_kg: Option<f64>,
    farm_id: String,
    status: String,
    status_updated_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl AnimalRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(AnimalRow {
            id: row.get(0)?,
            tag: row.get(1)?,
            animal_type: row.get(2)?,
            age: row.get(3)?,
            weight_kg: row.get(4)?,
            farm_id: row.get(5)?,
            status: row.get(6)?,
            status_updated_at: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }
}

impl TryFrom<AnimalRow> for Animal {
    type Error = DbError;

    fn try_from(row: AnimalRow) -> Result<Self, Self::Error> {
        let status = AnimalStatus::parse(&row.status)
            .ok_or_else(|| DbError::Constraint(format!("Unknown animal status: {}", row.status)))?;
        let age = u32::try_from(row.age)
            .map_err(|_| DbError::Constraint(format!("Age out of range: {}", row.age)))?;

        Ok(Animal {
            id: row.id,
            tag: row.tag,
            animal_type: row.animal_type,
            age,
            weight_kg: row.weight_kg,
            farm_id: row.farm_id,
            status,
            status_updated_at: row.status_updated_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

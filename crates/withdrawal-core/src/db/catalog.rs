//! Medicine catalog database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::MedicineStandard;

impl Database {
    /// Insert or update a catalog entry.
    pub fn upsert_medicine(&self, medicine: &MedicineStandard) -> DbResult<()> {
        let mut normalized = medicine.clone();
        normalized.normalize_animals();
        let animals_json = serde_json::to_string(&normalized.applicable_animals)?;

        self.conn.execute(
            r#"
            INSERT INTO medicine_standards (name, withdrawal_days, applicable_animals, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(name) DO UPDATE SET
                withdrawal_days = excluded.withdrawal_days,
                applicable_animals = excluded.applicable_animals,
                updated_at = datetime('now')
            "#,
            params![normalized.name, normalized.withdrawal_days, animals_json],
        )?;
        Ok(())
    }

    /// Get a catalog entry by exact (case-sensitive) name.
    pub fn get_medicine(&self, name: &str) -> DbResult<Option<MedicineStandard>> {
        self.conn
            .query_row(
                r#"
                SELECT name, withdrawal_days, applicable_animals
                FROM medicine_standards
                WHERE name = ?
                "#,
                [name],
                |row| {
                    Ok(MedicineRow {
                        name: row.get(0)?,
                        withdrawal_days: row.get(1)?,
                        applicable_animals: row.get(2)?,
                    })
                },
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List every catalog entry, ordered by name.
    pub fn list_medicines(&self) -> DbResult<Vec<MedicineStandard>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT name, withdrawal_days, applicable_animals
            FROM medicine_standards
            ORDER BY name
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(MedicineRow {
                name: row.get(0)?,
                withdrawal_days: row.get(1)?,
                applicable_animals: row.get(2)?,
            })
        })?;

        let mut medicines = Vec::new();
        for row in rows {
            medicines.push(row?.try_into()?);
        }
        Ok(medicines)
    }

    /// List catalog entries that apply to an animal type.
    pub fn list_medicines_for_animal(&self, animal_type: &str) -> DbResult<Vec<MedicineStandard>> {
        Ok(self
            .list_medicines()?
            .into_iter()
            .filter(|m| m.is_applicable_to(animal_type))
            .collect())
    }

    /// Delete a catalog entry. Existing usage records keep their snapshot.
    pub fn delete_medicine(&self, name: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM medicine_standards WHERE name = ?", [name])?;
        Ok(rows_affected > 0)
    }

    /// Count catalog entries.
    pub fn count_medicines(&self) -> DbResult<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM medicine_standards", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Seed the catalog with `medicines` if it is empty. Returns the number inserted.
    pub fn seed_catalog_if_empty(&self, medicines: &[MedicineStandard]) -> DbResult<usize> {
        if self.count_medicines()? > 0 {
            return Ok(0);
        }
        for medicine in medicines {
            self.upsert_medicine(medicine)?;
        }
        tracing::info!("Seeded medicine catalog with {} entries", medicines.len());
        Ok(medicines.len())
    }
}

/// Intermediate row struct for database mapping.
struct MedicineRow {
    name: String,
    withdrawal_days: i64,
    applicable_animals: String,
}

impl TryFrom<MedicineRow> for MedicineStandard {
    type Error = DbError;

    fn try_from(row: MedicineRow) -> Result<Self, Self::Error> {
        let withdrawal_days = u32::try_from(row.withdrawal_days).map_err(|_| {
            DbError::Constraint(format!(
                "Withdrawal days out of range for {}: {}",
                row.name, row.withdrawal_days
            ))
        })?;

        Ok(MedicineStandard {
            name: row.name,
            withdrawal_days,
            applicable_animals: serde_json::from_str(&row.applicable_animals)?,
        })
    }
}

//! Medicine usage ledger database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{format_timestamp, parse_timestamp, Database, DbError, DbResult};
use crate::models::{UsageRecord, WithdrawalDuration, WithdrawalUnit};

const USAGE_COLUMNS: &str =
    "id, animal_id, medicine_name, administered_at, withdrawal_amount, withdrawal_unit, notes";

impl Database {
    /// Append a usage record.
    pub fn insert_usage(&self, record: &UsageRecord) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO medicine_usages (
                id, animal_id, medicine_name, administered_at,
                withdrawal_amount, withdrawal_unit, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.id,
                record.animal_id,
                record.medicine_name,
                format_timestamp(record.administered_at),
                record.withdrawal.amount,
                record.withdrawal.unit.as_str(),
                record.notes,
            ],
        )?;
        Ok(())
    }

    /// Get a usage record by ID.
    pub fn get_usage(&self, id: &str) -> DbResult<Option<UsageRecord>> {
        let sql = format!("SELECT {} FROM medicine_usages WHERE id = ?", USAGE_COLUMNS);
        self.conn
            .query_row(&sql, [id], UsageRow::from_row)
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List the usage records of one animal, oldest first.
    pub fn list_usages_for_animal(&self, animal_id: &str) -> DbResult<Vec<UsageRecord>> {
        let sql = format!(
            "SELECT {} FROM medicine_usages WHERE animal_id = ? ORDER BY administered_at, id",
            USAGE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([animal_id], UsageRow::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.try_into()?);
        }
        Ok(records)
    }

    /// Count the usage records of one animal.
    pub fn count_usages_for_animal(&self, animal_id: &str) -> DbResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM medicine_usages WHERE animal_id = ?",
            [animal_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Delete a usage record. Deleting a record that is already gone is not an error.
    pub fn delete_usage(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM medicine_usages WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Delete a batch of usage records. Returns how many rows were actually removed.
    pub fn delete_usages(&self, ids: &[String]) -> DbResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.unchecked_transaction()?;
        let mut removed = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM medicine_usages WHERE id = ?")?;
            for id in ids {
                removed += stmt.execute([id])?;
            }
        }
        tx.commit()?;
        Ok(removed)
    }
}

/// Intermediate row struct for database mapping.
struct UsageRow {
    id: String,
    animal_id: String,
    medicine_name: String,
    administered_at: String,
    withdrawal_amount: i64,
    withdrawal_unit: String,
    notes: Option<String>,
}

impl UsageRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(UsageRow {
            id: row.get(0)?,
            animal_id: row.get(1)?,
            medicine_name: row.get(2)?,
            administered_at: row.get(3)?,
            withdrawal_amount: row.get(4)?,
            withdrawal_unit: row.get(5)?,
            notes: row.get(6)?,
        })
    }
}

impl TryFrom<UsageRow> for UsageRecord {
    type Error = DbError;

    fn try_from(row: UsageRow) -> Result<Self, Self::Error> {
        let unit = WithdrawalUnit::parse(&row.withdrawal_unit).ok_or_else(|| {
            DbError::Constraint(format!("Unknown withdrawal unit: {}", row.withdrawal_unit))
        })?;
        let amount = u32::try_from(row.withdrawal_amount).map_err(|_| {
            DbError::Constraint(format!(
                "Withdrawal amount out of range: {}",
                row.withdrawal_amount
            ))
        })?;

        Ok(UsageRecord {
            id: row.id,
            animal_id: row.animal_id,
            medicine_name: row.medicine_name,
            administered_at: parse_timestamp(&row.administered_at)?,
            withdrawal: WithdrawalDuration { amount, unit },
            notes: row.notes,
        })
    }
}

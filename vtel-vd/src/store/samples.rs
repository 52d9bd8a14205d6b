//! Vehicle sample persistence and filtered queries

use tracing::debug;
use vtel_common::db::{NewSample, VehicleSample};
use vtel_common::time::{ceil_to_storage, to_storage_text};
use vtel_common::{Error, Result};

use super::{RecordStore, TimeRange};

const SAMPLE_COLUMNS: &str =
    "id, timestamp, speed, odometer, soc, elevation, shift_state, vehicle_registration_id";

/// WHERE clause for one registration plus the bounds present in `range`.
///
/// Placeholders are bound in order: registration id, start, end.
fn filter_clause(range: &TimeRange) -> String {
    let mut clause = String::from("WHERE vehicle_registration_id = ?");
    if range.start.is_some() {
        clause.push_str(" AND timestamp >= ?");
    }
    if range.end.is_some() {
        clause.push_str(" AND timestamp <= ?");
    }
    clause
}

/// Bound values as stored text. The lower bound rounds up to the storage
/// precision; the upper bound truncates, matching how rows are stored.
fn bound_texts(range: &TimeRange) -> Vec<String> {
    let start = range.start.map(|s| to_storage_text(&ceil_to_storage(&s)));
    let end = range.end.map(|e| to_storage_text(&e));
    start.into_iter().chain(end).collect()
}

impl RecordStore {
    /// Insert many samples in one transaction.
    ///
    /// Every sample must reference a registration that already exists;
    /// otherwise the batch fails with [`Error::Validation`] and nothing is
    /// written.
    pub async fn bulk_create_samples(&self, samples: Vec<NewSample>) -> Result<Vec<VehicleSample>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        let mut persisted = Vec::with_capacity(samples.len());

        for sample in samples {
            let reading = &sample.reading;
            let id = sqlx::query(
                r#"
                INSERT INTO vehicle_samples (
                    timestamp, speed, odometer, soc, elevation, shift_state,
                    vehicle_registration_id
                )
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(to_storage_text(&reading.timestamp))
            .bind(reading.speed)
            .bind(reading.odometer)
            .bind(reading.soc)
            .bind(reading.elevation)
            .bind(reading.shift_state.as_deref())
            .bind(sample.vehicle_registration_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::from_write(e, "insert vehicle sample"))?
            .last_insert_rowid();

            persisted.push(sample.into_persisted(id));
        }

        tx.commit().await?;
        debug!("Inserted {} vehicle samples", persisted.len());

        Ok(persisted)
    }

    pub async fn get_sample_by_id(&self, id: i64) -> Result<Option<VehicleSample>> {
        let sql = format!("SELECT {} FROM vehicle_samples WHERE id = ?", SAMPLE_COLUMNS);
        let sample = sqlx::query_as::<_, VehicleSample>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sample)
    }

    /// One page of a registration's samples plus the total match count.
    ///
    /// Rows are ordered by timestamp, ties by insertion order; `offset` and
    /// `limit` apply after filtering. Count and page are read in the same
    /// transaction.
    pub async fn query_samples(
        &self,
        registration_id: i64,
        range: &TimeRange,
        offset: i64,
        limit: i64,
    ) -> Result<(i64, Vec<VehicleSample>)> {
        let clause = filter_clause(range);
        let bounds = bound_texts(range);

        let count_sql = format!("SELECT COUNT(*) FROM vehicle_samples {}", clause);
        let page_sql = format!(
            "SELECT {} FROM vehicle_samples {} ORDER BY timestamp ASC, id ASC LIMIT ? OFFSET ?",
            SAMPLE_COLUMNS, clause
        );

        let mut tx = self.pool.begin().await?;

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(registration_id);
        for bound in &bounds {
            count_query = count_query.bind(bound);
        }
        let total = count_query.fetch_one(&mut *tx).await?;

        let mut page_query = sqlx::query_as::<_, VehicleSample>(&page_sql).bind(registration_id);
        for bound in &bounds {
            page_query = page_query.bind(bound);
        }
        let page = page_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok((total, page))
    }

    /// Every sample of a registration in insertion order
    pub async fn samples_for_registration(&self, registration_id: i64) -> Result<Vec<VehicleSample>> {
        let sql = format!(
            "SELECT {} FROM vehicle_samples WHERE vehicle_registration_id = ? ORDER BY id",
            SAMPLE_COLUMNS
        );
        let samples = sqlx::query_as::<_, VehicleSample>(&sql)
            .bind(registration_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vtel_common::time::parse_timestamp;

    #[test]
    fn test_filter_clause_matches_bounds() {
        assert_eq!(
            filter_clause(&TimeRange::all()),
            "WHERE vehicle_registration_id = ?"
        );

        let start = parse_timestamp("2022-07-12T10:00:00");
        let range = TimeRange::new(start, None);
        assert_eq!(
            filter_clause(&range),
            "WHERE vehicle_registration_id = ? AND timestamp >= ?"
        );
        assert_eq!(bound_texts(&range), vec!["2022-07-12 10:00:00.000000".to_string()]);

        let range = TimeRange::new(start, start);
        assert_eq!(
            filter_clause(&range),
            "WHERE vehicle_registration_id = ? AND timestamp >= ? AND timestamp <= ?"
        );
        assert_eq!(bound_texts(&range).len(), 2);
    }

    #[test]
    fn test_bound_texts_round_toward_range() {
        let fine = chrono::NaiveDateTime::parse_from_str(
            "2023-01-01 00:00:00.1234569",
            "%Y-%m-%d %H:%M:%S%.f",
        )
        .unwrap();
        let range = TimeRange::new(Some(fine), Some(fine));

        assert_eq!(
            bound_texts(&range),
            vec![
                "2023-01-01 00:00:00.123457".to_string(),
                "2023-01-01 00:00:00.123456".to_string(),
            ]
        );
    }
}

use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Row, Transaction};
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::model::{
    BaUnitId, BillKey, NewBaUnit, NewOwnership, NewParty, NewSpatialUnit, NewSupplementalAssessment,
    NewTaxAssessment, NewTaxBill, NewTaxPayment, NewTaxRate, NewTaxRateArea, PartyId,
    SpatialUnitId, TaxRateId, TraId, SRID_WGS84,
};
use crate::store::traits::{SeedStore, SeedTransaction};

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a PostgreSQL store with the given database URL
    pub async fn connect(config: &DatabaseConfig, database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections.unwrap_or(1))
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs.unwrap_or(30)))
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Release the connection(s) held by the pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait::async_trait]
impl SeedStore for PostgresStore {
    type Transaction = PgSeedTransaction;

    async fn begin(&self) -> Result<PgSeedTransaction> {
        let tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin seeding transaction")?;

        Ok(PgSeedTransaction { tx })
    }
}

/// The run's single transaction. Dropping it without `commit` rolls back.
pub struct PgSeedTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait::async_trait]
impl SeedTransaction for PgSeedTransaction {
    async fn insert_party(&mut self, party: &NewParty) -> Result<PartyId> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO ladm.LA_Party (party_name, party_type, identifier)
            VALUES ($1, $2, $3)
            RETURNING party_id::bigint
            "#,
        )
        .bind(&party.party_name)
        .bind(party.party_type.as_str())
        .bind(&party.identifier)
        .fetch_one(&mut *self.tx)
        .await
        .context("Failed to insert party")
    }

    async fn insert_spatial_unit(&mut self, unit: &NewSpatialUnit) -> Result<SpatialUnitId> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO ladm.LA_SpatialUnit (geometry, address, cadastral_ref, area_sq_m)
            VALUES (ST_SetSRID(ST_MakePoint($1, $2), $3), $4, $5, $6)
            RETURNING spatial_unit_id::bigint
            "#,
        )
        .bind(unit.geometry.lng)
        .bind(unit.geometry.lat)
        .bind(SRID_WGS84)
        .bind(&unit.address)
        .bind(&unit.cadastral_ref)
        .bind(unit.area_sq_m)
        .fetch_one(&mut *self.tx)
        .await
        .context("Failed to insert spatial unit")
    }

    async fn insert_ba_unit(&mut self, unit: &NewBaUnit) -> Result<BaUnitId> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO ladm.LA_BAUnit (unit_name, spatial_unit_id, assessor_parcel_number, tra_id, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING ba_unit_id::bigint
            "#,
        )
        .bind(&unit.unit_name)
        .bind(unit.spatial_unit_id)
        .bind(&unit.assessor_parcel_number)
        .bind(unit.tra_id)
        .bind(&unit.description)
        .fetch_one(&mut *self.tx)
        .await
        .context("Failed to insert BAUnit")
    }

    async fn insert_tax_rate_area(&mut self, area: &NewTaxRateArea) -> Result<TraId> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO ladm.TaxRateArea (tra_code, description)
            VALUES ($1, $2)
            RETURNING tra_id::bigint
            "#,
        )
        .bind(&area.tra_code)
        .bind(&area.description)
        .fetch_one(&mut *self.tx)
        .await
        .with_context(|| format!("Failed to insert tax rate area {}", area.tra_code))
    }

    async fn insert_tax_rate(&mut self, rate: &NewTaxRate) -> Result<TaxRateId> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO ladm.TaxRate (rate_name, rate_value, effective_date, expiration_date)
            VALUES ($1, $2, $3, $4)
            RETURNING tax_rate_id::bigint
            "#,
        )
        .bind(&rate.rate_name)
        .bind(rate.rate_value)
        .bind(rate.effective_date)
        .bind(rate.expiration_date)
        .fetch_one(&mut *self.tx)
        .await
        .with_context(|| format!("Failed to insert tax rate {}", rate.rate_name))
    }

    async fn assign_tax_rate_area(&mut self, ba_unit_id: BaUnitId, tra_id: TraId) -> Result<()> {
        sqlx::query("UPDATE ladm.LA_BAUnit SET tra_id = $1 WHERE ba_unit_id = $2")
            .bind(tra_id)
            .bind(ba_unit_id)
            .execute(&mut *self.tx)
            .await
            .context("Failed to assign tax rate area")?;

        Ok(())
    }

    async fn insert_tax_assessment(&mut self, assessment: &NewTaxAssessment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ladm.TaxAssessment (
                ba_unit_id, assessment_year, base_year, base_year_value,
                prop_13_factor, current_assessed_value, roll_type, tax_rate_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(assessment.ba_unit_id)
        .bind(assessment.assessment_year)
        .bind(assessment.base_year)
        .bind(assessment.base_year_value)
        .bind(assessment.prop_13_factor)
        .bind(assessment.current_assessed_value)
        .bind(assessment.roll_type.as_str())
        .bind(assessment.tax_rate_id)
        .execute(&mut *self.tx)
        .await
        .context("Failed to insert tax assessment")?;

        Ok(())
    }

    async fn insert_supplemental_assessment(
        &mut self,
        assessment: &NewSupplementalAssessment,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ladm.SupplementalAssessment (
                ba_unit_id, event_date, reason_code,
                old_value, new_value, difference_value, tax_rate_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(assessment.ba_unit_id)
        .bind(assessment.event_date)
        .bind(assessment.reason_code.as_str())
        .bind(assessment.old_value)
        .bind(assessment.new_value)
        .bind(assessment.difference_value)
        .bind(assessment.tax_rate_id)
        .execute(&mut *self.tx)
        .await
        .context("Failed to insert supplemental assessment")?;

        Ok(())
    }

    async fn insert_ownership(&mut self, ownership: &NewOwnership) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ladm.LA_RRR (rrr_type, ba_unit_id, party_id, start_date)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(ownership.rrr_type.as_str())
        .bind(ownership.ba_unit_id)
        .bind(ownership.party_id)
        .bind(ownership.start_date)
        .execute(&mut *self.tx)
        .await
        .context("Failed to insert ownership record")?;

        Ok(())
    }

    async fn insert_tax_bill(&mut self, bill: &NewTaxBill) -> Result<BillKey> {
        let row = sqlx::query(
            r#"
            INSERT INTO ladm.TaxBill (
                bill_date, ba_unit_id, party_id,
                due_date, amount_due, is_paid, bill_type, supplemental_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING bill_date, bill_uid::bigint AS bill_uid
            "#,
        )
        .bind(bill.bill_date)
        .bind(bill.ba_unit_id)
        .bind(bill.party_id)
        .bind(bill.due_date)
        .bind(bill.amount_due)
        .bind(bill.is_paid)
        .bind(bill.bill_type.as_str())
        .bind(bill.supplemental_id)
        .fetch_one(&mut *self.tx)
        .await
        .context("Failed to insert tax bill")?;

        Ok(BillKey {
            bill_date: row.try_get("bill_date")?,
            bill_uid: row.try_get("bill_uid")?,
        })
    }

    async fn insert_tax_payment(&mut self, payment: &NewTaxPayment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ladm.TaxPayment (payment_date, bill_date, bill_uid, amount_paid)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(payment.payment_date)
        .bind(payment.bill.bill_date)
        .bind(payment.bill.bill_uid)
        .bind(payment.amount_paid)
        .execute(&mut *self.tx)
        .await
        .context("Failed to insert tax payment")?;

        Ok(())
    }

    async fn mark_bill_paid(&mut self, bill: &BillKey) -> Result<()> {
        sqlx::query("UPDATE ladm.TaxBill SET is_paid = TRUE WHERE bill_date = $1 AND bill_uid = $2")
            .bind(bill.bill_date)
            .bind(bill.bill_uid)
            .execute(&mut *self.tx)
            .await
            .context("Failed to mark tax bill paid")?;

        Ok(())
    }

    async fn commit(self) -> Result<()> {
        self.tx
            .commit()
            .await
            .context("Failed to commit seeding transaction")
    }

    async fn rollback(self) -> Result<()> {
        self.tx
            .rollback()
            .await
            .context("Failed to roll back seeding transaction")
    }
}

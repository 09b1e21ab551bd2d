use crate::model::{
    BaUnitId, BillKey, NewBaUnit, NewOwnership, NewParty, NewSpatialUnit, NewSupplementalAssessment,
    NewTaxAssessment, NewTaxBill, NewTaxPayment, NewTaxRate, NewTaxRateArea, PartyId,
    SpatialUnitId, TaxRateId, TraId,
};
use anyhow::Result;

/// Single-row writers used by the seeding phases. All writes belong to one
/// transaction that ends with exactly one of `commit` or `rollback`.
#[async_trait::async_trait]
pub trait SeedTransaction: Send {
    async fn insert_party(&mut self, party: &NewParty) -> Result<PartyId>;
    async fn insert_spatial_unit(&mut self, unit: &NewSpatialUnit) -> Result<SpatialUnitId>;
    async fn insert_ba_unit(&mut self, unit: &NewBaUnit) -> Result<BaUnitId>;
    async fn insert_tax_rate_area(&mut self, area: &NewTaxRateArea) -> Result<TraId>;
    async fn insert_tax_rate(&mut self, rate: &NewTaxRate) -> Result<TaxRateId>;
    /// Point an existing BAUnit at a tax-rate area
    async fn assign_tax_rate_area(&mut self, ba_unit_id: BaUnitId, tra_id: TraId) -> Result<()>;
    async fn insert_tax_assessment(&mut self, assessment: &NewTaxAssessment) -> Result<()>;
    async fn insert_supplemental_assessment(
        &mut self,
        assessment: &NewSupplementalAssessment,
    ) -> Result<()>;
    async fn insert_ownership(&mut self, ownership: &NewOwnership) -> Result<()>;
    /// Insert a bill and return its partition-aware composite key
    async fn insert_tax_bill(&mut self, bill: &NewTaxBill) -> Result<BillKey>;
    async fn insert_tax_payment(&mut self, payment: &NewTaxPayment) -> Result<()>;
    async fn mark_bill_paid(&mut self, bill: &BillKey) -> Result<()>;

    async fn commit(self) -> Result<()>;
    async fn rollback(self) -> Result<()>;
}

/// A target that can open the run's transaction
#[async_trait::async_trait]
pub trait SeedStore: Send + Sync {
    type Transaction: SeedTransaction;

    async fn begin(&self) -> Result<Self::Transaction>;
}

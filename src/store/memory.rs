use anyhow::Result;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::sync::Arc;

use crate::error::SeedError;
use crate::model::{
    BaUnitId, BillKey, NewBaUnit, NewOwnership, NewParty, NewSpatialUnit, NewSupplementalAssessment,
    NewTaxAssessment, NewTaxBill, NewTaxPayment, NewTaxRate, NewTaxRateArea, PartyId,
    SpatialUnitId, Table, TaxRateId, TraId,
};
use crate::store::traits::{SeedStore, SeedTransaction};

/// Rows held by a `MemoryStore`, keyed the way the database keys them
#[derive(Debug, Clone, Default)]
pub struct MemoryTables {
    pub parties: BTreeMap<PartyId, NewParty>,
    pub spatial_units: BTreeMap<SpatialUnitId, NewSpatialUnit>,
    pub ba_units: BTreeMap<BaUnitId, NewBaUnit>,
    pub tax_rate_areas: BTreeMap<TraId, NewTaxRateArea>,
    pub tax_rates: BTreeMap<TaxRateId, NewTaxRate>,
    pub tax_assessments: Vec<NewTaxAssessment>,
    pub supplemental_assessments: Vec<NewSupplementalAssessment>,
    pub ownerships: Vec<NewOwnership>,
    pub tax_bills: BTreeMap<BillKey, NewTaxBill>,
    pub tax_payments: Vec<NewTaxPayment>,
    sequences: HashMap<Table, i64>,
}

impl MemoryTables {
    pub fn row_count(&self, table: Table) -> usize {
        match table {
            Table::Party => self.parties.len(),
            Table::SpatialUnit => self.spatial_units.len(),
            Table::BaUnit => self.ba_units.len(),
            Table::TaxRateArea => self.tax_rate_areas.len(),
            Table::TaxRate => self.tax_rates.len(),
            Table::TaxAssessment => self.tax_assessments.len(),
            Table::SupplementalAssessment => self.supplemental_assessments.len(),
            Table::Rrr => self.ownerships.len(),
            Table::TaxBill => self.tax_bills.len(),
            Table::TaxPayment => self.tax_payments.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Table::ALL.iter().all(|table| self.row_count(*table) == 0)
    }

    /// Serial-style keys starting at 1, never reused within a store
    fn next_id(&mut self, table: Table) -> i64 {
        let next = self.sequences.entry(table).or_insert(0);
        *next += 1;
        *next
    }
}

/// Fail the `row`-th insert (1-based) into `table` within a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailPoint {
    pub table: Table,
    pub row: usize,
}

/// In-process seeding target with the same transactional contract as
/// PostgreSQL: nothing is visible in `snapshot` until `commit`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    committed: Arc<Mutex<MemoryTables>>,
    fail_point: Option<FailPoint>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(fail_point: FailPoint) -> Self {
        Self {
            committed: Arc::default(),
            fail_point: Some(fail_point),
        }
    }

    /// A handle on the same committed rows whose transactions fail at `fail_point`
    pub fn failing_at(&self, fail_point: FailPoint) -> Self {
        Self {
            committed: Arc::clone(&self.committed),
            fail_point: Some(fail_point),
        }
    }

    /// Copy of the committed rows
    pub fn snapshot(&self) -> MemoryTables {
        self.committed.lock().clone()
    }
}

#[async_trait::async_trait]
impl SeedStore for MemoryStore {
    type Transaction = MemoryTransaction;

    async fn begin(&self) -> Result<MemoryTransaction> {
        let working = self.committed.lock().clone();
        Ok(MemoryTransaction {
            working,
            target: Arc::clone(&self.committed),
            fail_point: self.fail_point,
            inserts: HashMap::new(),
        })
    }
}

pub struct MemoryTransaction {
    working: MemoryTables,
    target: Arc<Mutex<MemoryTables>>,
    fail_point: Option<FailPoint>,
    inserts: HashMap<Table, usize>,
}

impl MemoryTransaction {
    fn record_insert(&mut self, table: Table) -> Result<()> {
        let count = self.inserts.entry(table).or_insert(0);
        *count += 1;

        match self.fail_point {
            Some(point) if point.table == table && point.row == *count => {
                Err(SeedError::Injected { table, row: *count }.into())
            }
            _ => Ok(()),
        }
    }
}

fn require_key<K: Ord + Display, V>(
    rows: &BTreeMap<K, V>,
    key: &K,
    table: Table,
    referenced: Table,
) -> Result<()> {
    if rows.contains_key(key) {
        Ok(())
    } else {
        Err(SeedError::ForeignKey {
            table,
            referenced,
            key: key.to_string(),
        }
        .into())
    }
}

#[async_trait::async_trait]
impl SeedTransaction for MemoryTransaction {
    async fn insert_party(&mut self, party: &NewParty) -> Result<PartyId> {
        self.record_insert(Table::Party)?;
        let id = self.working.next_id(Table::Party);
        self.working.parties.insert(id, party.clone());
        Ok(id)
    }

    async fn insert_spatial_unit(&mut self, unit: &NewSpatialUnit) -> Result<SpatialUnitId> {
        self.record_insert(Table::SpatialUnit)?;
        let id = self.working.next_id(Table::SpatialUnit);
        self.working.spatial_units.insert(id, unit.clone());
        Ok(id)
    }

    async fn insert_ba_unit(&mut self, unit: &NewBaUnit) -> Result<BaUnitId> {
        self.record_insert(Table::BaUnit)?;
        require_key(
            &self.working.spatial_units,
            &unit.spatial_unit_id,
            Table::BaUnit,
            Table::SpatialUnit,
        )?;
        if let Some(tra_id) = &unit.tra_id {
            require_key(&self.working.tax_rate_areas, tra_id, Table::BaUnit, Table::TaxRateArea)?;
        }
        let id = self.working.next_id(Table::BaUnit);
        self.working.ba_units.insert(id, unit.clone());
        Ok(id)
    }

    async fn insert_tax_rate_area(&mut self, area: &NewTaxRateArea) -> Result<TraId> {
        self.record_insert(Table::TaxRateArea)?;
        let id = self.working.next_id(Table::TaxRateArea);
        self.working.tax_rate_areas.insert(id, area.clone());
        Ok(id)
    }

    async fn insert_tax_rate(&mut self, rate: &NewTaxRate) -> Result<TaxRateId> {
        self.record_insert(Table::TaxRate)?;
        let id = self.working.next_id(Table::TaxRate);
        self.working.tax_rates.insert(id, rate.clone());
        Ok(id)
    }

    async fn assign_tax_rate_area(&mut self, ba_unit_id: BaUnitId, tra_id: TraId) -> Result<()> {
        require_key(&self.working.tax_rate_areas, &tra_id, Table::BaUnit, Table::TaxRateArea)?;
        let unit = self
            .working
            .ba_units
            .get_mut(&ba_unit_id)
            .ok_or(SeedError::MissingRow {
                table: Table::BaUnit,
                key: ba_unit_id.to_string(),
            })?;
        unit.tra_id = Some(tra_id);
        Ok(())
    }

    async fn insert_tax_assessment(&mut self, assessment: &NewTaxAssessment) -> Result<()> {
        self.record_insert(Table::TaxAssessment)?;
        require_key(
            &self.working.ba_units,
            &assessment.ba_unit_id,
            Table::TaxAssessment,
            Table::BaUnit,
        )?;
        require_key(
            &self.working.tax_rates,
            &assessment.tax_rate_id,
            Table::TaxAssessment,
            Table::TaxRate,
        )?;
        self.working.tax_assessments.push(assessment.clone());
        Ok(())
    }

    async fn insert_supplemental_assessment(
        &mut self,
        assessment: &NewSupplementalAssessment,
    ) -> Result<()> {
        self.record_insert(Table::SupplementalAssessment)?;
        require_key(
            &self.working.ba_units,
            &assessment.ba_unit_id,
            Table::SupplementalAssessment,
            Table::BaUnit,
        )?;
        require_key(
            &self.working.tax_rates,
            &assessment.tax_rate_id,
            Table::SupplementalAssessment,
            Table::TaxRate,
        )?;
        self.working.supplemental_assessments.push(assessment.clone());
        Ok(())
    }

    async fn insert_ownership(&mut self, ownership: &NewOwnership) -> Result<()> {
        self.record_insert(Table::Rrr)?;
        require_key(&self.working.ba_units, &ownership.ba_unit_id, Table::Rrr, Table::BaUnit)?;
        require_key(&self.working.parties, &ownership.party_id, Table::Rrr, Table::Party)?;
        self.working.ownerships.push(ownership.clone());
        Ok(())
    }

    async fn insert_tax_bill(&mut self, bill: &NewTaxBill) -> Result<BillKey> {
        self.record_insert(Table::TaxBill)?;
        require_key(&self.working.ba_units, &bill.ba_unit_id, Table::TaxBill, Table::BaUnit)?;
        require_key(&self.working.parties, &bill.party_id, Table::TaxBill, Table::Party)?;
        let key = BillKey {
            bill_date: bill.bill_date,
            bill_uid: self.working.next_id(Table::TaxBill),
        };
        self.working.tax_bills.insert(key, bill.clone());
        Ok(key)
    }

    async fn insert_tax_payment(&mut self, payment: &NewTaxPayment) -> Result<()> {
        self.record_insert(Table::TaxPayment)?;
        require_key(&self.working.tax_bills, &payment.bill, Table::TaxPayment, Table::TaxBill)?;
        self.working.tax_payments.push(payment.clone());
        Ok(())
    }

    async fn mark_bill_paid(&mut self, bill: &BillKey) -> Result<()> {
        let row = self
            .working
            .tax_bills
            .get_mut(bill)
            .ok_or(SeedError::MissingRow {
                table: Table::TaxBill,
                key: bill.to_string(),
            })?;
        row.is_paid = true;
        Ok(())
    }

    async fn commit(self) -> Result<()> {
        *self.target.lock() = self.working;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GeoPoint, PartyType};

    fn party() -> NewParty {
        NewParty {
            party_name: "Ada Lovelace".to_string(),
            party_type: PartyType::Individual,
            identifier: "123456789".to_string(),
        }
    }

    fn spatial_unit() -> NewSpatialUnit {
        NewSpatialUnit {
            geometry: GeoPoint {
                lng: -116.0,
                lat: 33.5,
            },
            address: "1 Main St, Springfield, CA 90000".to_string(),
            cadastral_ref: "CAD-000001".to_string(),
            area_sq_m: 500.0,
        }
    }

    #[tokio::test]
    async fn rows_are_invisible_until_commit() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let first = tx.insert_party(&party()).await.unwrap();
        let second = tx.insert_party(&party()).await.unwrap();
        assert_eq!((first, second), (1, 2));
        assert!(store.snapshot().is_empty());

        tx.commit().await.unwrap();
        assert_eq!(store.snapshot().row_count(Table::Party), 2);
    }

    #[tokio::test]
    async fn rollback_discards_staged_rows() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_spatial_unit(&spatial_unit()).await.unwrap();
        tx.rollback().await.unwrap();

        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn dangling_spatial_unit_is_rejected() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let err = tx
            .insert_ba_unit(&NewBaUnit {
                unit_name: "Parcel ABCD".to_string(),
                spatial_unit_id: 42,
                assessor_parcel_number: "123-456-789".to_string(),
                tra_id: None,
                description: None,
            })
            .await
            .unwrap_err();

        match err.downcast_ref::<SeedError>() {
            Some(SeedError::ForeignKey { referenced, .. }) => {
                assert_eq!(*referenced, Table::SpatialUnit)
            }
            other => panic!("expected foreign key error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn fail_point_triggers_on_the_chosen_row() {
        let store = MemoryStore::with_failure(FailPoint {
            table: Table::Party,
            row: 3,
        });
        let mut tx = store.begin().await.unwrap();

        assert!(tx.insert_party(&party()).await.is_ok());
        assert!(tx.insert_party(&party()).await.is_ok());
        let err = tx.insert_party(&party()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SeedError>(),
            Some(SeedError::Injected {
                table: Table::Party,
                row: 3
            })
        ));
    }

    #[tokio::test]
    async fn assigning_unknown_tax_rate_area_fails() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let spatial_unit_id = tx.insert_spatial_unit(&spatial_unit()).await.unwrap();
        let ba_unit_id = tx
            .insert_ba_unit(&NewBaUnit {
                unit_name: "Parcel WXYZ".to_string(),
                spatial_unit_id,
                assessor_parcel_number: "111-222-333".to_string(),
                tra_id: None,
                description: None,
            })
            .await
            .unwrap();

        assert!(tx.assign_tax_rate_area(ba_unit_id, 7).await.is_err());
    }
}

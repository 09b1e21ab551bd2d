use anyhow::Result;
use chrono::{NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::SeedError;
use crate::model::{BaUnitId, BillKey, PartyId, SpatialUnitId, Table, TaxRateId, TraId};
use crate::seed::flavor::Flavor;
use crate::seed::generate;
use crate::seed::reference;
use crate::seed::report::SeedReport;
use crate::store::traits::{SeedStore, SeedTransaction};

/// Upper bound on supplemental assessments per run
pub const MAX_SUPPLEMENTAL: usize = 10;

/// Printed on stderr whenever a run is rolled back, regardless of log level
pub const ROLLBACK_NOTICE: &str = "Error during seeding. Rolled back transaction.";

/// Validated shape of one seeding run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPlan {
    pub parties: usize,
    pub parcels: usize,
    pub bills: usize,
    pub flavor: Flavor,
    /// Upper bound for every generated date
    pub today: NaiveDate,
}

impl SeedPlan {
    pub fn new(
        parties: usize,
        parcels: usize,
        bills: usize,
        flavor: Flavor,
    ) -> std::result::Result<Self, SeedError> {
        // Ownership needs a party per parcel; bills need both
        if parcels > 0 && parties == 0 {
            return Err(SeedError::MissingParent {
                child: Table::Rrr,
                parent: Table::Party,
            });
        }
        if bills > 0 && parties == 0 {
            return Err(SeedError::MissingParent {
                child: Table::TaxBill,
                parent: Table::Party,
            });
        }
        if bills > 0 && parcels == 0 {
            return Err(SeedError::MissingParent {
                child: Table::TaxBill,
                parent: Table::BaUnit,
            });
        }

        Ok(Self {
            parties,
            parcels,
            bills,
            flavor,
            today: Utc::now().date_naive(),
        })
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn supplemental_count(&self) -> usize {
        (self.parcels / 5).min(MAX_SUPPLEMENTAL)
    }

    /// Exactly this many bills get payments; the rest get none
    pub fn bills_with_payments(&self) -> usize {
        self.bills / 2
    }
}

/// Run every phase in one transaction. Commits on success; on any failure the
/// whole transaction is rolled back and the original error is returned.
pub async fn run_seed<S, R>(store: &S, plan: &SeedPlan, rng: &mut R) -> Result<SeedReport>
where
    S: SeedStore,
    R: Rng + ?Sized,
{
    let mut tx = store.begin().await?;

    match seed_all(&mut tx, plan, rng).await {
        Ok(report) => {
            tx.commit().await?;
            Ok(report)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                log::error!("Rollback failed: {:#}", rollback_err);
            }
            log::error!("{}", ROLLBACK_NOTICE);
            eprintln!("{}", ROLLBACK_NOTICE);
            Err(err)
        }
    }
}

async fn seed_all<T, R>(tx: &mut T, plan: &SeedPlan, rng: &mut R) -> Result<SeedReport>
where
    T: SeedTransaction,
    R: Rng + ?Sized,
{
    let mut report = SeedReport {
        flavor: plan.flavor,
        ..Default::default()
    };

    log::info!("Inserting Parties...");
    let party_ids = insert_parties(tx, plan, rng).await?;
    report.parties = party_ids.len();

    log::info!("Inserting SpatialUnits...");
    let spatial_ids = insert_spatial_units(tx, plan, rng).await?;
    report.spatial_units = spatial_ids.len();

    log::info!("Inserting BAUnits...");
    let ba_unit_ids = insert_ba_units(tx, plan, rng, &spatial_ids).await?;
    report.ba_units = ba_unit_ids.len();

    log::info!("Inserting TaxRateArea & TaxRate...");
    let (tra_ids, tax_rate_ids) = insert_tax_reference(tx).await?;
    report.tax_rate_areas = tra_ids.len();
    report.tax_rates = tax_rate_ids.len();
    assign_tax_rate_areas(tx, rng, &ba_unit_ids, &tra_ids).await?;

    log::info!("Inserting TaxAssessments...");
    report.tax_assessments = insert_assessments(tx, rng, &ba_unit_ids, &tax_rate_ids).await?;

    log::info!("Inserting SupplementalAssessments...");
    report.supplemental_assessments =
        insert_supplemental_assessments(tx, plan, rng, &ba_unit_ids, &tax_rate_ids).await?;

    log::info!("Inserting RRR (Ownership)...");
    report.ownerships = insert_ownerships(tx, plan, rng, &ba_unit_ids, &party_ids).await?;

    log::info!("Inserting TaxBills...");
    let bills = insert_tax_bills(tx, plan, rng, &ba_unit_ids, &party_ids).await?;
    report.tax_bills = bills.len();

    log::info!("Inserting TaxPayments...");
    let (payments, bills_with_payments) = insert_tax_payments(tx, plan, rng, &bills).await?;
    report.tax_payments = payments;
    report.bills_with_payments = bills_with_payments;

    report.bills_marked_paid = mark_bills_paid(tx, rng, &bills).await?;
    if report.tax_bills > 0 {
        log::warn!(
            "is_paid was set by coin flip on {} of {} bills and does not reflect summed payments",
            report.bills_marked_paid,
            report.tax_bills
        );
    }

    Ok(report)
}

fn pick<T: Copy, R: Rng + ?Sized>(
    rng: &mut R,
    items: &[T],
    child: Table,
    parent: Table,
) -> Result<T> {
    items
        .choose(rng)
        .copied()
        .ok_or_else(|| SeedError::MissingParent { child, parent }.into())
}

async fn insert_parties<T, R>(tx: &mut T, plan: &SeedPlan, rng: &mut R) -> Result<Vec<PartyId>>
where
    T: SeedTransaction,
    R: Rng + ?Sized,
{
    let mut party_ids = Vec::with_capacity(plan.parties);
    for _ in 0..plan.parties {
        let party = generate::party(rng, plan.flavor);
        let id = tx.insert_party(&party).await?;
        log::debug!("party {} -> {}", party.party_name, id);
        party_ids.push(id);
    }
    Ok(party_ids)
}

async fn insert_spatial_units<T, R>(
    tx: &mut T,
    plan: &SeedPlan,
    rng: &mut R,
) -> Result<Vec<SpatialUnitId>>
where
    T: SeedTransaction,
    R: Rng + ?Sized,
{
    let mut spatial_ids = Vec::with_capacity(plan.parcels);
    for _ in 0..plan.parcels {
        let unit = generate::spatial_unit(rng, plan.flavor);
        spatial_ids.push(tx.insert_spatial_unit(&unit).await?);
    }
    Ok(spatial_ids)
}

async fn insert_ba_units<T, R>(
    tx: &mut T,
    plan: &SeedPlan,
    rng: &mut R,
    spatial_ids: &[SpatialUnitId],
) -> Result<Vec<BaUnitId>>
where
    T: SeedTransaction,
    R: Rng + ?Sized,
{
    let mut ba_unit_ids = Vec::with_capacity(spatial_ids.len());
    for &spatial_unit_id in spatial_ids {
        let unit = generate::ba_unit(rng, plan.flavor, spatial_unit_id);
        ba_unit_ids.push(tx.insert_ba_unit(&unit).await?);
    }
    Ok(ba_unit_ids)
}

async fn insert_tax_reference<T: SeedTransaction>(
    tx: &mut T,
) -> Result<(Vec<TraId>, Vec<TaxRateId>)> {
    let mut tra_ids = Vec::new();
    for area in reference::tax_rate_areas() {
        tra_ids.push(tx.insert_tax_rate_area(&area).await?);
    }

    let mut tax_rate_ids = Vec::new();
    for rate in reference::tax_rates() {
        tax_rate_ids.push(tx.insert_tax_rate(&rate).await?);
    }

    Ok((tra_ids, tax_rate_ids))
}

async fn assign_tax_rate_areas<T, R>(
    tx: &mut T,
    rng: &mut R,
    ba_unit_ids: &[BaUnitId],
    tra_ids: &[TraId],
) -> Result<()>
where
    T: SeedTransaction,
    R: Rng + ?Sized,
{
    for &ba_unit_id in ba_unit_ids {
        let tra_id = pick(rng, tra_ids, Table::BaUnit, Table::TaxRateArea)?;
        tx.assign_tax_rate_area(ba_unit_id, tra_id).await?;
    }
    Ok(())
}

async fn insert_assessments<T, R>(
    tx: &mut T,
    rng: &mut R,
    ba_unit_ids: &[BaUnitId],
    tax_rate_ids: &[TaxRateId],
) -> Result<usize>
where
    T: SeedTransaction,
    R: Rng + ?Sized,
{
    for &ba_unit_id in ba_unit_ids {
        let tax_rate_id = pick(rng, tax_rate_ids, Table::TaxAssessment, Table::TaxRate)?;
        let assessment = generate::tax_assessment(rng, ba_unit_id, tax_rate_id);
        tx.insert_tax_assessment(&assessment).await?;
    }
    Ok(ba_unit_ids.len())
}

async fn insert_supplemental_assessments<T, R>(
    tx: &mut T,
    plan: &SeedPlan,
    rng: &mut R,
    ba_unit_ids: &[BaUnitId],
    tax_rate_ids: &[TaxRateId],
) -> Result<usize>
where
    T: SeedTransaction,
    R: Rng + ?Sized,
{
    let subset: Vec<BaUnitId> = ba_unit_ids
        .choose_multiple(rng, plan.supplemental_count())
        .copied()
        .collect();

    for &ba_unit_id in &subset {
        let tax_rate_id = pick(rng, tax_rate_ids, Table::SupplementalAssessment, Table::TaxRate)?;
        let assessment =
            generate::supplemental_assessment(rng, ba_unit_id, tax_rate_id, plan.today);
        tx.insert_supplemental_assessment(&assessment).await?;
    }
    Ok(subset.len())
}

async fn insert_ownerships<T, R>(
    tx: &mut T,
    plan: &SeedPlan,
    rng: &mut R,
    ba_unit_ids: &[BaUnitId],
    party_ids: &[PartyId],
) -> Result<usize>
where
    T: SeedTransaction,
    R: Rng + ?Sized,
{
    for &ba_unit_id in ba_unit_ids {
        let party_id = pick(rng, party_ids, Table::Rrr, Table::Party)?;
        let ownership = generate::ownership(rng, ba_unit_id, party_id, plan.today);
        tx.insert_ownership(&ownership).await?;
    }
    Ok(ba_unit_ids.len())
}

async fn insert_tax_bills<T, R>(
    tx: &mut T,
    plan: &SeedPlan,
    rng: &mut R,
    ba_unit_ids: &[BaUnitId],
    party_ids: &[PartyId],
) -> Result<Vec<BillKey>>
where
    T: SeedTransaction,
    R: Rng + ?Sized,
{
    let mut bills = Vec::with_capacity(plan.bills);
    for _ in 0..plan.bills {
        let ba_unit_id = pick(rng, ba_unit_ids, Table::TaxBill, Table::BaUnit)?;
        let party_id = pick(rng, party_ids, Table::TaxBill, Table::Party)?;
        let bill = generate::tax_bill(rng, ba_unit_id, party_id, plan.today);
        bills.push(tx.insert_tax_bill(&bill).await?);
    }
    Ok(bills)
}

/// Half the bills, sampled without replacement, get one or two payments.
/// Returns (payments inserted, bills paid into).
async fn insert_tax_payments<T, R>(
    tx: &mut T,
    plan: &SeedPlan,
    rng: &mut R,
    bills: &[BillKey],
) -> Result<(usize, usize)>
where
    T: SeedTransaction,
    R: Rng + ?Sized,
{
    let paid_into: Vec<BillKey> = bills
        .choose_multiple(rng, plan.bills_with_payments())
        .copied()
        .collect();

    let mut payments = 0;
    for &bill in &paid_into {
        let how_many = rng.gen_range(1..=2);
        for _ in 0..how_many {
            let payment = generate::tax_payment(rng, bill, plan.today);
            tx.insert_tax_payment(&payment).await?;
            payments += 1;
        }
    }
    Ok((payments, paid_into.len()))
}

async fn mark_bills_paid<T, R>(tx: &mut T, rng: &mut R, bills: &[BillKey]) -> Result<usize>
where
    T: SeedTransaction,
    R: Rng + ?Sized,
{
    let mut marked = 0;
    for bill in bills {
        if rng.gen_bool(0.5) {
            tx.mark_bill_paid(bill).await?;
            marked += 1;
        }
    }
    Ok(marked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{FailPoint, MemoryStore};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn plan(parties: usize, parcels: usize, bills: usize) -> SeedPlan {
        SeedPlan::new(parties, parcels, bills, Flavor::Generic)
            .unwrap()
            .with_today(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap())
    }

    #[test]
    fn plan_rejects_children_without_parents() {
        assert!(matches!(
            SeedPlan::new(0, 5, 0, Flavor::Generic),
            Err(SeedError::MissingParent {
                parent: Table::Party,
                ..
            })
        ));
        assert!(matches!(
            SeedPlan::new(3, 0, 4, Flavor::Generic),
            Err(SeedError::MissingParent {
                parent: Table::BaUnit,
                ..
            })
        ));
        assert!(SeedPlan::new(0, 0, 0, Flavor::Generic).is_ok());
        assert!(SeedPlan::new(4, 0, 0, Flavor::Riverside).is_ok());
    }

    #[test]
    fn supplemental_count_is_capped_at_ten() {
        assert_eq!(plan(1, 4, 0).supplemental_count(), 0);
        assert_eq!(plan(1, 20, 0).supplemental_count(), 4);
        assert_eq!(plan(1, 1000, 0).supplemental_count(), 10);
        assert_eq!(plan(1, 1, 41).bills_with_payments(), 20);
    }

    #[tokio::test]
    async fn example_run_produces_expected_counts() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(42);
        let plan = plan(10, 20, 40);

        let report = run_seed(&store, &plan, &mut rng).await.unwrap();

        assert_eq!(report.parties, 10);
        assert_eq!(report.spatial_units, 20);
        assert_eq!(report.ba_units, 20);
        assert_eq!(report.tax_rate_areas, 3);
        assert_eq!(report.tax_rates, 3);
        assert_eq!(report.tax_assessments, 20);
        assert_eq!(report.supplemental_assessments, 4);
        assert_eq!(report.ownerships, 20);
        assert_eq!(report.tax_bills, 40);
        assert_eq!(report.bills_with_payments, 20);
        assert!((20..=40).contains(&report.tax_payments));

        let tables = store.snapshot();
        for table in Table::ALL {
            assert_eq!(tables.row_count(table), report.count(table), "{}", table);
        }
    }

    #[tokio::test]
    async fn every_bill_references_captured_keys() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(9);
        run_seed(&store, &plan(5, 8, 30), &mut rng).await.unwrap();

        let tables = store.snapshot();
        for bill in tables.tax_bills.values() {
            assert!(tables.ba_units.contains_key(&bill.ba_unit_id));
            assert!(tables.parties.contains_key(&bill.party_id));
        }

        let tra_ids: HashSet<_> = tables.tax_rate_areas.keys().copied().collect();
        for unit in tables.ba_units.values() {
            assert!(tra_ids.contains(&unit.tra_id.unwrap()));
        }

        let with_payments: HashSet<_> = tables.tax_payments.iter().map(|p| p.bill).collect();
        assert_eq!(with_payments.len(), 15);
    }

    #[tokio::test]
    async fn plan_helpers_drive_supplemental_and_payment_counts() {
        for (parcels, bills) in [(3, 1), (20, 41), (90, 7)] {
            let store = MemoryStore::new();
            let mut rng = StdRng::seed_from_u64(parcels as u64);
            let plan = plan(4, parcels, bills);

            let report = run_seed(&store, &plan, &mut rng).await.unwrap();

            assert_eq!(report.supplemental_assessments, plan.supplemental_count());
            assert_eq!(report.bills_with_payments, plan.bills_with_payments());
        }
    }

    #[tokio::test]
    async fn paid_flag_matches_report_and_ignores_payments() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(7);
        let report = run_seed(&store, &plan(5, 10, 40), &mut rng).await.unwrap();

        let tables = store.snapshot();
        let paid: HashSet<BillKey> = tables
            .tax_bills
            .iter()
            .filter(|(_, bill)| bill.is_paid)
            .map(|(key, _)| *key)
            .collect();
        assert_eq!(paid.len(), report.bills_marked_paid);
        assert!(paid.len() < report.tax_bills);

        // The flag is a coin flip, not derived from payments
        let with_payments: HashSet<BillKey> =
            tables.tax_payments.iter().map(|p| p.bill).collect();
        assert!(paid.iter().any(|key| !with_payments.contains(key)));
        assert!(with_payments.iter().any(|key| !paid.contains(key)));
    }

    #[tokio::test]
    async fn failure_mid_run_leaves_nothing_committed() {
        let store = MemoryStore::with_failure(FailPoint {
            table: Table::TaxBill,
            row: 7,
        });
        let mut rng = StdRng::seed_from_u64(1);

        let err = run_seed(&store, &plan(5, 10, 20), &mut rng)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SeedError>(),
            Some(SeedError::Injected {
                table: Table::TaxBill,
                row: 7
            })
        ));
        assert!(store.snapshot().is_empty());
        assert_eq!(ROLLBACK_NOTICE, "Error during seeding. Rolled back transaction.");
    }

    #[tokio::test]
    async fn empty_plan_still_seeds_reference_tables() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(0);
        let report = run_seed(&store, &plan(0, 0, 0), &mut rng).await.unwrap();

        assert_eq!(report.rows_inserted(), 6);
        assert_eq!(report.bills_marked_paid, 0);
    }
}

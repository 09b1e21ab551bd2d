use chrono::NaiveDate;
use ladm_seeder::{run_seed, FailPoint, Flavor, MemoryStore, SeedError, SeedPlan, Table};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
}

#[tokio::test]
async fn test_requested_counts_are_honoured() {
    for (parties, parcels, bills, seed) in [(10, 20, 40, 1u64), (1, 1, 1, 2), (7, 64, 9, 3)] {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(seed);
        let plan = SeedPlan::new(parties, parcels, bills, Flavor::Generic)
            .unwrap()
            .with_today(today());

        run_seed(&store, &plan, &mut rng).await.unwrap();

        let tables = store.snapshot();
        assert_eq!(tables.row_count(Table::Party), parties);
        assert_eq!(tables.row_count(Table::SpatialUnit), parcels);
        assert_eq!(tables.row_count(Table::BaUnit), parcels);
        assert_eq!(tables.row_count(Table::TaxAssessment), parcels);
        assert_eq!(tables.row_count(Table::Rrr), parcels);
        assert_eq!(tables.row_count(Table::TaxBill), bills);
        assert_eq!(
            tables.row_count(Table::SupplementalAssessment),
            (parcels / 5).min(10)
        );

        let billed: HashSet<_> = tables.tax_payments.iter().map(|p| p.bill).collect();
        assert_eq!(billed.len(), bills / 2);
    }
}

#[tokio::test]
async fn test_payments_reference_bills_and_respect_dates() {
    let store = MemoryStore::new();
    let mut rng = StdRng::seed_from_u64(31);
    let plan = SeedPlan::new(4, 10, 25, Flavor::Riverside)
        .unwrap()
        .with_today(today());

    run_seed(&store, &plan, &mut rng).await.unwrap();

    let tables = store.snapshot();
    let mut per_bill = std::collections::HashMap::new();
    for payment in &tables.tax_payments {
        assert!(tables.tax_bills.contains_key(&payment.bill));
        assert!(payment.payment_date >= payment.bill.bill_date);
        assert!(payment.payment_date <= today());
        *per_bill.entry(payment.bill).or_insert(0) += 1;
    }
    assert!(per_bill.values().all(|n| (1..=2).contains(n)));
}

#[tokio::test]
async fn test_forced_failure_rolls_back_every_phase() {
    for table in [Table::Party, Table::BaUnit, Table::SupplementalAssessment, Table::TaxPayment] {
        let store = MemoryStore::with_failure(FailPoint { table, row: 1 });
        let mut rng = StdRng::seed_from_u64(8);
        let plan = SeedPlan::new(5, 25, 10, Flavor::Generic)
            .unwrap()
            .with_today(today());

        let err = run_seed(&store, &plan, &mut rng).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SeedError>(),
            Some(SeedError::Injected { .. })
        ));
        assert!(store.snapshot().is_empty(), "rows survived failure in {}", table);
    }
}

#[tokio::test]
async fn test_failed_run_keeps_earlier_commits() {
    let store = MemoryStore::new();
    let mut rng = StdRng::seed_from_u64(12);
    let plan = SeedPlan::new(2, 3, 4, Flavor::Generic)
        .unwrap()
        .with_today(today());
    run_seed(&store, &plan, &mut rng).await.unwrap();
    let before = store.snapshot();

    let failing = store.failing_at(FailPoint {
        table: Table::TaxBill,
        row: 2,
    });
    assert!(run_seed(&failing, &plan, &mut rng).await.is_err());

    let after = store.snapshot();
    for table in Table::ALL {
        assert_eq!(before.row_count(table), after.row_count(table));
    }
}

//! Row generators. Each takes the RNG plus whatever keys earlier phases
//! captured and returns a row ready to insert; none of them touch the store.

use chrono::{Duration, Months, NaiveDate};
use rand::distributions::{Distribution, Uniform};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{
    BaUnitId, BillKey, BillType, BoundingBox, GeoPoint, NewBaUnit, NewOwnership, NewParty,
    NewSpatialUnit, NewSupplementalAssessment, NewTaxAssessment, NewTaxBill, NewTaxPayment,
    PartyId, ReasonCode, RollType, RrrType, SpatialUnitId, TaxRateId,
};
use crate::seed::flavor::Flavor;

pub const BILL_DUE_DAYS: i64 = 30;
pub const ASSESSMENT_YEARS: [i32; 3] = [2023, 2024, 2025];
pub const BASE_YEARS: [i32; 3] = [2018, 2019, 2020];

/// Uniform pick from a constant vocabulary; an empty one yields `T::default()`
pub fn one_of<T: Copy + Default, R: Rng + ?Sized>(rng: &mut R, items: &[T]) -> T {
    items.choose(rng).copied().unwrap_or_default()
}

pub fn digits<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

pub fn uppercase<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(b'A' + rng.gen_range(0..26u8)))
        .collect()
}

/// The calendar date `years` years before `today`
pub fn years_before(today: NaiveDate, years: u32) -> NaiveDate {
    today
        .checked_sub_months(Months::new(12 * years))
        .unwrap_or(NaiveDate::MIN)
}

/// Uniform date in `[start, end]`; collapses to `start` when the range is empty
pub fn date_between<R: Rng + ?Sized>(rng: &mut R, start: NaiveDate, end: NaiveDate) -> NaiveDate {
    let span = (end - start).num_days();
    if span <= 0 {
        return start;
    }
    start + Duration::days(rng.gen_range(0..=span))
}

pub fn point_in<R: Rng + ?Sized>(rng: &mut R, bbox: &BoundingBox) -> GeoPoint {
    GeoPoint {
        lng: Uniform::new_inclusive(bbox.min_lng, bbox.max_lng).sample(rng),
        lat: Uniform::new_inclusive(bbox.min_lat, bbox.max_lat).sample(rng),
    }
}

pub fn party<R: Rng + ?Sized>(rng: &mut R, flavor: Flavor) -> NewParty {
    let (party_name, party_type) = flavor.party(rng);
    NewParty {
        party_name,
        party_type,
        identifier: digits(rng, 9),
    }
}

pub fn spatial_unit<R: Rng + ?Sized>(rng: &mut R, flavor: Flavor) -> NewSpatialUnit {
    NewSpatialUnit {
        address: flavor.address(rng),
        geometry: point_in(rng, &flavor.bounding_box()),
        cadastral_ref: format!("CAD-{}", digits(rng, 6)),
        area_sq_m: rng.gen_range(200.0..20000.0),
    }
}

/// Assessor parcel number, `ddd-ddd-ddd`
pub fn parcel_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{}-{}-{}", digits(rng, 3), digits(rng, 3), digits(rng, 3))
}

pub fn ba_unit<R: Rng + ?Sized>(
    rng: &mut R,
    flavor: Flavor,
    spatial_unit_id: SpatialUnitId,
) -> NewBaUnit {
    NewBaUnit {
        unit_name: format!("Parcel {}", uppercase(rng, 4)),
        spatial_unit_id,
        assessor_parcel_number: parcel_number(rng),
        tra_id: None,
        description: flavor.ba_unit_description(rng),
    }
}

pub fn tax_assessment<R: Rng + ?Sized>(
    rng: &mut R,
    ba_unit_id: BaUnitId,
    tax_rate_id: TaxRateId,
) -> NewTaxAssessment {
    let base_year_value = rng.gen_range(100_000.0..800_000.0);
    // Prop 13 style bump of at most 10%
    let prop_13_factor = 1.0 + rng.gen::<f64>() * 0.1;

    NewTaxAssessment {
        ba_unit_id,
        assessment_year: one_of(rng, &ASSESSMENT_YEARS),
        base_year: one_of(rng, &BASE_YEARS),
        base_year_value,
        prop_13_factor,
        current_assessed_value: base_year_value * prop_13_factor,
        roll_type: one_of(rng, RollType::ALL),
        tax_rate_id,
    }
}

pub fn supplemental_assessment<R: Rng + ?Sized>(
    rng: &mut R,
    ba_unit_id: BaUnitId,
    tax_rate_id: TaxRateId,
    today: NaiveDate,
) -> NewSupplementalAssessment {
    let reason_code = one_of(rng, ReasonCode::ALL);
    let old_value = rng.gen_range(100_000.0..600_000.0);
    let new_value = old_value + rng.gen_range(10_000.0..60_000.0);

    NewSupplementalAssessment {
        ba_unit_id,
        event_date: date_between(rng, years_before(today, 2), today),
        reason_code,
        old_value,
        new_value,
        difference_value: new_value - old_value,
        tax_rate_id,
    }
}

pub fn ownership<R: Rng + ?Sized>(
    rng: &mut R,
    ba_unit_id: BaUnitId,
    party_id: PartyId,
    today: NaiveDate,
) -> NewOwnership {
    NewOwnership {
        rrr_type: RrrType::Ownership,
        ba_unit_id,
        party_id,
        start_date: date_between(rng, years_before(today, 10), today),
    }
}

pub fn tax_bill<R: Rng + ?Sized>(
    rng: &mut R,
    ba_unit_id: BaUnitId,
    party_id: PartyId,
    today: NaiveDate,
) -> NewTaxBill {
    // Dates outside the pre-created monthly partitions land in the default partition
    let bill_date = date_between(rng, years_before(today, 3), today);

    NewTaxBill {
        bill_date,
        ba_unit_id,
        party_id,
        due_date: bill_date + Duration::days(BILL_DUE_DAYS),
        amount_due: rng.gen_range(500.0..5000.0),
        is_paid: false,
        bill_type: one_of(rng, BillType::ALL),
        supplemental_id: None,
    }
}

pub fn tax_payment<R: Rng + ?Sized>(rng: &mut R, bill: BillKey, today: NaiveDate) -> NewTaxPayment {
    NewTaxPayment {
        payment_date: date_between(rng, bill.bill_date, today),
        bill,
        amount_paid: rng.gen_range(50.0..1000.0),
    }
}

use crate::model::{BaUnitId, BillType, BillUid, PartyId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite key of a partitioned `TaxBill` row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BillKey {
    pub bill_date: NaiveDate,
    pub bill_uid: BillUid,
}

impl fmt::Display for BillKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.bill_date, self.bill_uid)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTaxBill {
    pub bill_date: NaiveDate,
    pub ba_unit_id: BaUnitId,
    pub party_id: PartyId,
    pub due_date: NaiveDate,
    pub amount_due: f64,
    pub is_paid: bool,
    pub bill_type: BillType,
    pub supplemental_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTaxPayment {
    pub payment_date: NaiveDate,
    pub bill: BillKey,
    pub amount_paid: f64,
}

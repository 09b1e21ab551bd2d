use crate::model::{BaUnitId, PartyId, PartyType, RrrType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A row for `LA_Party`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewParty {
    pub party_name: String,
    pub party_type: PartyType,
    /// Nine-digit numeric identifier, kept as text
    pub identifier: String,
}

/// A row for `LA_RRR`; only ownership is generated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOwnership {
    pub rrr_type: RrrType,
    pub ba_unit_id: BaUnitId,
    pub party_id: PartyId,
    pub start_date: NaiveDate,
}

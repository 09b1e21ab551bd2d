use crate::model::{BaUnitId, ReasonCode, RollType, TaxRateId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTaxRateArea {
    pub tra_code: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTaxRate {
    pub rate_name: String,
    pub rate_value: f64,
    pub effective_date: NaiveDate,
    pub expiration_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTaxAssessment {
    pub ba_unit_id: BaUnitId,
    pub assessment_year: i32,
    pub base_year: i32,
    pub base_year_value: f64,
    pub prop_13_factor: f64,
    pub current_assessed_value: f64,
    pub roll_type: RollType,
    pub tax_rate_id: TaxRateId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSupplementalAssessment {
    pub ba_unit_id: BaUnitId,
    pub event_date: NaiveDate,
    pub reason_code: ReasonCode,
    pub old_value: f64,
    pub new_value: f64,
    pub difference_value: f64,
    pub tax_rate_id: TaxRateId,
}

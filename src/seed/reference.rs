use chrono::NaiveDate;

use crate::model::{NewTaxRate, NewTaxRateArea};

pub const TAX_RATE_AREAS: [(&str, &str); 3] = [
    ("TRA_001", "Riverside City District"),
    ("TRA_002", "Murrieta District"),
    ("TRA_003", "Coachella District"),
];

/// (name, rate, effective year); none of the seeded rates expire
pub const TAX_RATES: [(&str, f64, i32); 3] = [
    ("Base Prop 13 Rate", 0.0100, 2020),
    ("Local Bond Measure", 0.0015, 2020),
    ("Special School Tax", 0.0008, 2020),
];

pub fn tax_rate_areas() -> Vec<NewTaxRateArea> {
    TAX_RATE_AREAS
        .iter()
        .map(|(code, description)| NewTaxRateArea {
            tra_code: code.to_string(),
            description: description.to_string(),
        })
        .collect()
}

pub fn tax_rates() -> Vec<NewTaxRate> {
    TAX_RATES
        .iter()
        .map(|(name, value, year)| NewTaxRate {
            rate_name: name.to_string(),
            rate_value: *value,
            effective_date: NaiveDate::from_ymd_opt(*year, 1, 1).unwrap_or_default(),
            expiration_date: None,
        })
        .collect()
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-generated surrogate keys, captured from `RETURNING ... ::bigint`
pub type PartyId = i64;
pub type SpatialUnitId = i64;
pub type BaUnitId = i64;
pub type TraId = i64;
pub type TaxRateId = i64;
pub type BillUid = i64;

/// Every table the seeder writes to, in the order the phases first touch them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Party,
    SpatialUnit,
    BaUnit,
    TaxRateArea,
    TaxRate,
    TaxAssessment,
    SupplementalAssessment,
    Rrr,
    TaxBill,
    TaxPayment,
}

impl Table {
    pub const ALL: [Table; 10] = [
        Table::Party,
        Table::SpatialUnit,
        Table::BaUnit,
        Table::TaxRateArea,
        Table::TaxRate,
        Table::TaxAssessment,
        Table::SupplementalAssessment,
        Table::Rrr,
        Table::TaxBill,
        Table::TaxPayment,
    ];

    /// Schema-qualified table name in the target database
    pub fn qualified_name(&self) -> &'static str {
        match self {
            Table::Party => "ladm.LA_Party",
            Table::SpatialUnit => "ladm.LA_SpatialUnit",
            Table::BaUnit => "ladm.LA_BAUnit",
            Table::TaxRateArea => "ladm.TaxRateArea",
            Table::TaxRate => "ladm.TaxRate",
            Table::TaxAssessment => "ladm.TaxAssessment",
            Table::SupplementalAssessment => "ladm.SupplementalAssessment",
            Table::Rrr => "ladm.LA_RRR",
            Table::TaxBill => "ladm.TaxBill",
            Table::TaxPayment => "ladm.TaxPayment",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.qualified_name())
    }
}

/// A WGS84 (SRID 4326) point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

pub const SRID_WGS84: i32 = 4326;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lng: f64,
    pub max_lng: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub const fn new(min_lng: f64, max_lng: f64, min_lat: f64, max_lat: f64) -> Self {
        Self {
            min_lng,
            max_lng,
            min_lat,
            max_lat,
        }
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lng >= self.min_lng
            && point.lng <= self.max_lng
            && point.lat >= self.min_lat
            && point.lat <= self.max_lat
    }
}

/// Implements `as_str` and `Display` for a fieldless vocabulary enum whose
/// database text is fixed.
macro_rules! db_text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartyType {
    #[default]
    Individual,
    Company,
    GovAgency,
}

db_text_enum!(PartyType {
    Individual => "Individual",
    Company => "Company",
    GovAgency => "GovAgency",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollType {
    #[default]
    Secured,
    Unsecured,
}

db_text_enum!(RollType {
    Secured => "Secured",
    Unsecured => "Unsecured",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReasonCode {
    #[default]
    ChangeOfOwnership,
    NewConstruction,
}

db_text_enum!(ReasonCode {
    ChangeOfOwnership => "ChangeOfOwnership",
    NewConstruction => "NewConstruction",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillType {
    #[default]
    Annual,
    Supplemental,
}

db_text_enum!(BillType {
    Annual => "Annual",
    Supplemental => "Supplemental",
});

/// Only ownership rights are generated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RrrType {
    #[default]
    Ownership,
}

db_text_enum!(RrrType {
    Ownership => "Ownership",
});

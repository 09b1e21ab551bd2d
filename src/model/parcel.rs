use crate::model::{GeoPoint, SpatialUnitId, TraId};
use serde::{Deserialize, Serialize};

/// A row for `LA_SpatialUnit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSpatialUnit {
    pub geometry: GeoPoint,
    pub address: String,
    pub cadastral_ref: String,
    pub area_sq_m: f64,
}

/// A row for `LA_BAUnit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBaUnit {
    pub unit_name: String,
    pub spatial_unit_id: SpatialUnitId,
    pub assessor_parcel_number: String,
    /// Always inserted empty and assigned once the tax-rate areas exist
    pub tra_id: Option<TraId>,
    pub description: Option<String>,
}

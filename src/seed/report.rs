use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::Table;
use crate::seed::flavor::Flavor;

/// What one committed run inserted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    pub flavor: Flavor,
    pub parties: usize,
    pub spatial_units: usize,
    pub ba_units: usize,
    pub tax_rate_areas: usize,
    pub tax_rates: usize,
    pub tax_assessments: usize,
    pub supplemental_assessments: usize,
    pub ownerships: usize,
    pub tax_bills: usize,
    pub tax_payments: usize,
    pub bills_with_payments: usize,
    /// Set by coin flip, independent of `tax_payments`
    pub bills_marked_paid: usize,
}

impl SeedReport {
    pub fn count(&self, table: Table) -> usize {
        match table {
            Table::Party => self.parties,
            Table::SpatialUnit => self.spatial_units,
            Table::BaUnit => self.ba_units,
            Table::TaxRateArea => self.tax_rate_areas,
            Table::TaxRate => self.tax_rates,
            Table::TaxAssessment => self.tax_assessments,
            Table::SupplementalAssessment => self.supplemental_assessments,
            Table::Rrr => self.ownerships,
            Table::TaxBill => self.tax_bills,
            Table::TaxPayment => self.tax_payments,
        }
    }

    pub fn rows_inserted(&self) -> usize {
        Table::ALL.iter().map(|table| self.count(*table)).sum()
    }
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for table in Table::ALL {
            writeln!(f, "  {:<30} {:>8}", table.qualified_name(), self.count(table))?;
        }
        writeln!(
            f,
            "  {:<30} {:>8}",
            "bills with payments", self.bills_with_payments
        )?;
        write!(f, "  {:<30} {:>8}", "bills marked paid", self.bills_marked_paid)
    }
}

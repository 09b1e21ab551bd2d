use fake::faker::address::en::{BuildingNumber, CityName, StateAbbr, StreetName, ZipCode};
use fake::faker::name::en::Name;
use fake::Fake;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::{BoundingBox, PartyType};
use crate::seed::generate::one_of;

/// Generic addresses land roughly on Riverside County
pub const GENERIC_BBOX: BoundingBox = BoundingBox::new(-117.0, -115.0, 33.0, 34.0);

/// A tighter box around Riverside city
pub const RIVERSIDE_BBOX: BoundingBox = BoundingBox::new(-117.50, -117.25, 33.85, 34.00);

pub const RIVERSIDE_ZIP_CODES: [&str; 8] = [
    "92501", "92503", "92504", "92505", "92506", "92507", "92508", "92509",
];

pub const STREET_SUFFIXES: [&str; 8] = ["St", "Ave", "Blvd", "Rd", "Ln", "Way", "Dr", "Ct"];

pub const RIVERSIDE_AGENCIES: [&str; 4] = [
    "Riverside County Assessor's Office",
    "Riverside City Hall",
    "Riverside Water Department",
    "Riverside Unified School District",
];

pub const RIVERSIDE_BUSINESSES: [&str; 4] = [
    "Mission Inn Hotel & Spa",
    "La Sierra University",
    "Riverside Community Hospital",
    "Galleria at Tyler",
];

/// Vocabulary used for generated names and addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// Fake-corpus names and addresses anywhere in the county box
    #[default]
    Generic,
    /// Riverside streets, zip codes, businesses and agencies
    Riverside,
}

impl Flavor {
    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Flavor::Generic => GENERIC_BBOX,
            Flavor::Riverside => RIVERSIDE_BBOX,
        }
    }

    /// Pick a party type uniformly and name the party for it
    pub fn party<R: Rng + ?Sized>(&self, rng: &mut R) -> (String, PartyType) {
        let party_type = one_of(rng, PartyType::ALL);
        let name = match (self, party_type) {
            (Flavor::Riverside, PartyType::Company) => one_of(rng, &RIVERSIDE_BUSINESSES).to_string(),
            (Flavor::Riverside, PartyType::GovAgency) => one_of(rng, &RIVERSIDE_AGENCIES).to_string(),
            _ => Name().fake_with_rng(rng),
        };
        (name, party_type)
    }

    /// Single-line postal address
    pub fn address<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match self {
            Flavor::Generic => {
                let building: String = BuildingNumber().fake_with_rng(rng);
                let street: String = StreetName().fake_with_rng(rng);
                let city: String = CityName().fake_with_rng(rng);
                let state: String = StateAbbr().fake_with_rng(rng);
                let zip: String = ZipCode().fake_with_rng(rng);
                format!("{} {}, {}, {} {}", building, street, city, state, zip)
            }
            Flavor::Riverside => {
                let street_number = rng.gen_range(100..=9999);
                let street: String = StreetName().fake_with_rng(rng);
                let street_word = street.split_whitespace().next().unwrap_or("Magnolia");
                let suffix = one_of(rng, &STREET_SUFFIXES);
                let zip = one_of(rng, &RIVERSIDE_ZIP_CODES);
                format!(
                    "{} {} {}, Riverside, CA {}",
                    street_number, street_word, suffix, zip
                )
            }
        }
    }

    /// Riverside parcels carry a simulated household size
    pub fn ba_unit_description<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        match self {
            Flavor::Generic => None,
            Flavor::Riverside => Some(format!("Household Size: {}", rng.gen_range(1..=6))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn riverside_addresses_use_local_zip_codes() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let address = Flavor::Riverside.address(&mut rng);
            assert!(address.contains(", Riverside, CA 925"), "{}", address);
            assert!(RIVERSIDE_ZIP_CODES.iter().any(|zip| address.ends_with(zip)));
            assert!(!address.contains('\n'));
        }
    }

    #[test]
    fn riverside_organisations_come_from_the_local_lists() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let (name, party_type) = Flavor::Riverside.party(&mut rng);
            match party_type {
                PartyType::Company => assert!(RIVERSIDE_BUSINESSES.contains(&name.as_str())),
                PartyType::GovAgency => assert!(RIVERSIDE_AGENCIES.contains(&name.as_str())),
                PartyType::Individual => assert!(!name.is_empty()),
            }
        }
    }

    #[test]
    fn generic_addresses_are_single_line() {
        let mut rng = StdRng::seed_from_u64(3);
        let address = Flavor::Generic.address(&mut rng);
        assert!(!address.contains('\n'));
        assert_eq!(address.matches(", ").count(), 2);
    }

    #[test]
    fn household_size_only_for_riverside() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(Flavor::Generic.ba_unit_description(&mut rng), None);

        let description = Flavor::Riverside.ba_unit_description(&mut rng).unwrap();
        let size: u32 = description
            .strip_prefix("Household Size: ")
            .unwrap()
            .parse()
            .unwrap();
        assert!((1..=6).contains(&size));
    }
}

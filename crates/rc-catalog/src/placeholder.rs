//! Built-in placeholder directory used when no catalog file is configured.

use crate::catalog::ResourceCatalog;
use crate::resource::{Category, Resource};

struct Entry {
    zipcode: &'static str,
    id: u32,
    category: Category,
    name: &'static str,
    description: &'static str,
    address: &'static str,
    phone: &'static str,
    website: Option<&'static str>,
    lat: f64,
    lng: f64,
}

const ENTRIES: &[Entry] = &[
    Entry {
        zipcode: "30303",
        id: 1,
        category: Category::Housing,
        name: "Downtown Affordable Housing",
        description: "Income-based apartments in the downtown core.",
        address: "123 Peachtree St, Atlanta, GA 30303",
        phone: "404-555-1000",
        website: None,
        lat: 33.7563,
        lng: -84.3877,
    },
    Entry {
        zipcode: "30303",
        id: 2,
        category: Category::Housing,
        name: "Community Housing Partners",
        description: "Rental assistance and shelter referrals.",
        address: "456 Auburn Ave, Atlanta, GA 30303",
        phone: "404-555-2000",
        website: None,
        lat: 33.7548,
        lng: -84.3833,
    },
    Entry {
        zipcode: "30303",
        id: 4,
        category: Category::FoodAssistance,
        name: "Fulton County SNAP Office",
        description: "Provides information and applications for the Supplemental Nutrition Assistance Program (SNAP).",
        address: "123 Main St, Atlanta, GA 30303",
        phone: "404-555-1212",
        website: Some("https://dfcs.georgia.gov/"),
        lat: 33.7537,
        lng: -84.3880,
    },
    Entry {
        zipcode: "30303",
        id: 5,
        category: Category::UtilityAssistance,
        name: "Atlanta LIHEAP Program",
        description: "The Low Income Home Energy Assistance Program (LIHEAP) helps with heating and cooling bills.",
        address: "456 Central Ave, Atlanta, GA 30303",
        phone: "404-555-4545",
        website: Some("https://www.pca-atl.org/services/energy-assistance/"),
        lat: 33.7510,
        lng: -84.3900,
    },
    Entry {
        zipcode: "10001",
        id: 3,
        category: Category::Housing,
        name: "Midtown Low-Income Apartments",
        description: "Affordable units with income-restricted leases.",
        address: "789 8th Ave, New York, NY 10001",
        phone: "212-555-3000",
        website: None,
        lat: 40.7563,
        lng: -73.9904,
    },
    Entry {
        zipcode: "10001",
        id: 6,
        category: Category::FoodAssistance,
        name: "NYC SNAP Center - Midtown",
        description: "Provides information and applications for the Supplemental Nutrition Assistance Program (SNAP).",
        address: "111 W 34th St, New York, NY 10001",
        phone: "212-555-1212",
        website: Some("https://www.nyc.gov/snap"),
        lat: 40.7498,
        lng: -73.9875,
    },
    Entry {
        zipcode: "10001",
        id: 7,
        category: Category::UtilityAssistance,
        name: "NY HEAP Office",
        description: "The Home Energy Assistance Program (HEAP) can help you pay for heating your home.",
        address: "222 8th Ave, New York, NY 10001",
        phone: "212-555-4545",
        website: Some("https://otda.ny.gov/programs/heap/"),
        lat: 40.7449,
        lng: -73.9982,
    },
];

fn entries() -> impl Iterator<Item = (String, Resource)> {
    ENTRIES.iter().map(|e| {
        (
            e.zipcode.to_string(),
            Resource {
                id: e.id,
                category: e.category,
                name: e.name.to_string(),
                description: e.description.to_string(),
                address: e.address.to_string(),
                phone: e.phone.to_string(),
                website: e.website.map(str::to_string),
                lat: e.lat,
                lng: e.lng,
            },
        )
    })
}

impl ResourceCatalog {
    /// The built-in Atlanta (30303) and Midtown Manhattan (10001) directory.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::from_trusted(entries())
    }
}

//! Catalog entity models.
//!
//! Catalog rows are maintained out of band by the content team; this service
//! only reads them. Monetary columns are NUMERIC and load as `Decimal`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Which booking flow a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
pub enum FlowKind {
    Tour,
    Rental,
}

impl FlowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowKind::Tour => "tour",
            FlowKind::Rental => "rental",
        }
    }
}

impl std::fmt::Display for FlowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tour destination from catalog_destinations
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Destination {
    pub id: String,
    pub name: String,
    pub region: String,
    pub category: String,
    pub duration_hours: i32,
    pub entrance_fee: Decimal,
    pub is_popular: bool,
}

/// Vehicle from catalog_vehicles. One table serves both flows: tour vehicles
/// publish a half-day rate; rental vehicles publish a with-driver rate and a
/// refundable security deposit.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub name: String,
    pub category: String,
    pub max_passengers: i32,
    pub price_per_day: Decimal,
    pub price_per_half_day: Option<Decimal>,
    pub with_driver_price_per_day: Option<Decimal>,
    pub security_deposit: Option<Decimal>,
}

/// Driver tier from catalog_driver_tiers. The base tier is free (included in
/// the vehicle price); certified and guide tiers add a per-day rate.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct DriverTier {
    pub id: String,
    pub name: String,
    pub price_per_day: Decimal,
    pub recommended: bool,
}

/// How an extra's price is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
pub enum ExtraPriceType {
    /// Rate × chosen quantity (quantity is a headcount).
    Person,
    /// Flat rate once per booking, quantity ignored.
    Trip,
    /// Rate × quantity × billable days.
    Day,
}

/// Optional extra / add-on service from catalog_extras
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Extra {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub price_type: ExtraPriceType,
}

/// Insurance tier from catalog_insurance_plans (rental flow)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct InsurancePlan {
    pub id: String,
    pub name: String,
    pub price_per_day: Decimal,
    pub deductible: Decimal,
    pub coverage: Vec<String>,
    pub recommended: bool,
}

/// Delivery option from catalog_delivery_options (rental flow).
/// Self-pickup is a zero-price option that needs no address.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct DeliveryOption {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub estimated_time: Option<String>,
    pub requires_address: bool,
}

/// Curated tour package from catalog_packages; seeds a draft via deep link.
/// `duration_days` is 0.5 for half-day itineraries.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct TourPackage {
    pub id: String,
    pub name: String,
    pub duration_days: Decimal,
    pub destinations: Vec<String>,
    pub starting_price: Decimal,
    pub is_featured: bool,
}

/// Per-category commission percentages. Delivery fees carry no percentage
/// here: the platform retains them in full.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct CommissionTable {
    pub rental_pct: Decimal,
    pub insurance_pct: Decimal,
    pub addon_pct: Decimal,
}

impl Default for CommissionTable {
    fn default() -> Self {
        Self {
            rental_pct: dec!(15),
            insurance_pct: dec!(20),
            addon_pct: dec!(25),
        }
    }
}

/// Everything a booking flow needs from the catalog, loaded as one read-only
/// unit so the calculators and step gates see a consistent view.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSnapshot {
    pub flow: FlowKind,
    pub destinations: Vec<Destination>,
    pub vehicles: Vec<Vehicle>,
    pub drivers: Vec<DriverTier>,
    pub extras: Vec<Extra>,
    pub insurance_plans: Vec<InsurancePlan>,
    pub delivery_options: Vec<DeliveryOption>,
    pub packages: Vec<TourPackage>,
    pub commissions: CommissionTable,
}

impl CatalogSnapshot {
    /// Empty snapshot for a flow; lookups all miss and filters come back
    /// empty, which downstream treats as an empty-state, never an error.
    pub fn empty(flow: FlowKind) -> Self {
        Self {
            flow,
            destinations: Vec::new(),
            vehicles: Vec::new(),
            drivers: Vec::new(),
            extras: Vec::new(),
            insurance_plans: Vec::new(),
            delivery_options: Vec::new(),
            packages: Vec::new(),
            commissions: CommissionTable::default(),
        }
    }

    pub fn destination(&self, id: &str) -> Option<&Destination> {
        self.destinations.iter().find(|d| d.id == id)
    }

    pub fn vehicle(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn driver(&self, id: &str) -> Option<&DriverTier> {
        self.drivers.iter().find(|d| d.id == id)
    }

    pub fn extra(&self, id: &str) -> Option<&Extra> {
        self.extras.iter().find(|e| e.id == id)
    }

    pub fn insurance_plan(&self, id: &str) -> Option<&InsurancePlan> {
        self.insurance_plans.iter().find(|p| p.id == id)
    }

    pub fn delivery_option(&self, id: &str) -> Option<&DeliveryOption> {
        self.delivery_options.iter().find(|o| o.id == id)
    }

    pub fn package(&self, id: &str) -> Option<&TourPackage> {
        self.packages.iter().find(|p| p.id == id)
    }

    /// Vehicles with enough seats for the party. An empty result is an
    /// empty-state for the vehicle step, not a failure.
    pub fn vehicles_with_capacity(&self, seats: u32) -> Vec<&Vehicle> {
        self.vehicles
            .iter()
            .filter(|v| i64::from(v.max_passengers) >= i64::from(seats))
            .collect()
    }

    /// Destinations filtered by category; `None` returns all.
    pub fn destinations_in(&self, category: Option<&str>) -> Vec<&Destination> {
        match category {
            None => self.destinations.iter().collect(),
            Some(cat) => self
                .destinations
                .iter()
                .filter(|d| d.category == cat)
                .collect(),
        }
    }
}

//! The in-progress booking draft.
//!
//! `Draft` is an immutable value: every update method consumes the draft and
//! returns a new one, and consumers detect change by structural equality.
//! The draft accepts whatever it is given (clamping shapes values, it never
//! rejects them); deciding whether the draft is good enough to move forward
//! is the step controller's job, not the draft's.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::models::{FlowKind, TourPackage};

/// Multi-day tours are clamped to this range of days.
pub const MIN_MULTI_DAY: u32 = 2;
pub const MAX_MULTI_DAY: u32 = 14;

/// What kind of booking the draft is building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingMode {
    /// Curated tour package chosen from the catalog.
    PackageTour,
    /// Custom tour built destination by destination.
    CustomTour,
    /// Vehicle rental without a driver.
    SelfDrive,
    /// Vehicle rental with the owner's driver included.
    WithDriver,
}

impl BookingMode {
    pub fn flow(&self) -> FlowKind {
        match self {
            BookingMode::PackageTour | BookingMode::CustomTour => FlowKind::Tour,
            BookingMode::SelfDrive | BookingMode::WithDriver => FlowKind::Rental,
        }
    }
}

/// Tour duration shape. Multi-day carries its own day count on the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DurationType {
    HalfDay,
    FullDay,
    MultiDay,
}

/// When and where. Tour drafts use start date + duration + pickup details;
/// rental drafts use a start/end date pair with handover times. Unused
/// fields simply stay at their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schedule {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub pickup_time: String,
    pub return_time: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub duration_type: DurationType,
    pub duration_days: u32,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            pickup_time: String::new(),
            return_time: String::new(),
            pickup_location: String::new(),
            dropoff_location: String::new(),
            duration_type: DurationType::FullDay,
            duration_days: 1,
        }
    }
}

/// Party size per age band. Infants travel on a lap and take no seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Passengers {
    #[serde(deserialize_with = "deserialize_adults")]
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

/// A draft never holds zero adults, no matter where the value came from,
/// so wire input gets the same floor as [`Draft::with_passengers`].
fn deserialize_adults<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    u32::deserialize(deserializer).map(|adults| adults.max(1))
}

impl Default for Passengers {
    fn default() -> Self {
        Self {
            adults: 2,
            children: 0,
            infants: 0,
        }
    }
}

impl Passengers {
    /// Seats the vehicle must provide; widened so the sum cannot overflow.
    pub fn seats_needed(&self) -> i64 {
        i64::from(self.adults) + i64::from(self.children)
    }
}

/// Free-form customer details, presence-checked only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub whatsapp: String,
    pub nationality: String,
    pub hotel_name: String,
    pub hotel_address: String,
    pub passport_number: String,
    pub license_number: String,
    pub emergency_contact: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    Card,
    Paypal,
    BankTransfer,
    Cash,
}

/// One selected extra with its quantity (always at least 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraSelection {
    pub extra_id: String,
    pub quantity: u32,
}

/// The draft itself. Catalog choices are stored as ids; resolution against
/// the catalog happens in the gates and calculators so a stale id degrades
/// to "nothing selected" instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Draft {
    pub mode: BookingMode,
    pub package_id: Option<String>,
    pub destinations: Vec<String>,
    pub vehicle_id: Option<String>,
    pub driver_id: Option<String>,
    pub extras: Vec<ExtraSelection>,
    pub insurance_id: Option<String>,
    pub delivery_id: Option<String>,
    pub delivery_address: String,
    pub schedule: Schedule,
    pub passengers: Passengers,
    pub contact: Contact,
    pub payment_method: PaymentMethod,
    pub special_requests: String,
    pub dietary_requirements: String,
    pub agreed_to_terms: bool,
}

impl Default for Draft {
    fn default() -> Self {
        Self::new(BookingMode::CustomTour)
    }
}

impl Draft {
    /// Fresh draft for a mode, with the flow's usual handover times
    /// pre-filled the way the booking forms present them.
    pub fn new(mode: BookingMode) -> Self {
        let schedule = match mode.flow() {
            FlowKind::Tour => Schedule {
                pickup_time: "08:00".to_string(),
                ..Schedule::default()
            },
            FlowKind::Rental => Schedule {
                pickup_time: "09:00".to_string(),
                return_time: "18:00".to_string(),
                ..Schedule::default()
            },
        };

        Self {
            mode,
            package_id: None,
            destinations: Vec::new(),
            vehicle_id: None,
            driver_id: None,
            extras: Vec::new(),
            insurance_id: None,
            delivery_id: None,
            delivery_address: String::new(),
            schedule,
            passengers: Passengers::default(),
            contact: Contact::default(),
            payment_method: PaymentMethod::Card,
            special_requests: String::new(),
            dietary_requirements: String::new(),
            agreed_to_terms: false,
        }
    }

    /// Deep-link constructor: seed a tour draft from a catalog package.
    /// Runs once at mount; later catalog changes do not re-seed.
    pub fn from_package(package: &TourPackage) -> Self {
        Draft::new(BookingMode::PackageTour).choose_package(package)
    }

    pub fn flow(&self) -> FlowKind {
        self.mode.flow()
    }

    // ---- tour type ----

    /// Pick a curated package: switches the draft to package mode and seeds
    /// destinations and duration from the package definition.
    pub fn choose_package(mut self, package: &TourPackage) -> Self {
        self.mode = BookingMode::PackageTour;
        self.package_id = Some(package.id.clone());
        self.destinations = package.destinations.clone();

        if package.duration_days < dec!(1) {
            self.schedule.duration_type = DurationType::HalfDay;
            self.schedule.duration_days = 1;
        } else if package.duration_days == dec!(1) {
            self.schedule.duration_type = DurationType::FullDay;
            self.schedule.duration_days = 1;
        } else {
            self.schedule.duration_type = DurationType::MultiDay;
            self.schedule.duration_days = package
                .duration_days
                .to_u32()
                .unwrap_or(MIN_MULTI_DAY)
                .clamp(MIN_MULTI_DAY, MAX_MULTI_DAY);
        }

        self
    }

    /// Switch to a custom tour. Destinations picked so far are kept so the
    /// user loses nothing by changing their mind.
    pub fn choose_custom(mut self) -> Self {
        self.mode = BookingMode::CustomTour;
        self.package_id = None;
        self
    }

    // ---- list toggles ----

    /// Toggle a destination: absent adds it (keeping selection order),
    /// present removes it.
    pub fn toggle_destination(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if let Some(pos) = self.destinations.iter().position(|d| *d == id) {
            self.destinations.remove(pos);
        } else {
            self.destinations.push(id);
        }
        self
    }

    /// Toggle an extra: first selection adds it at quantity 1, selecting it
    /// again removes it.
    pub fn toggle_extra(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if let Some(pos) = self.extras.iter().position(|e| e.extra_id == id) {
            self.extras.remove(pos);
        } else {
            self.extras.push(ExtraSelection {
                extra_id: id,
                quantity: 1,
            });
        }
        self
    }

    /// Adjust an extra's quantity by a delta, clamped to a minimum of 1.
    /// Decrementing at quantity 1 leaves the extra selected; removal goes
    /// through [`Draft::toggle_extra`]. Unknown ids are ignored.
    pub fn adjust_extra_quantity(mut self, id: &str, delta: i32) -> Self {
        if let Some(sel) = self.extras.iter_mut().find(|e| e.extra_id == id) {
            let adjusted = i64::from(sel.quantity) + i64::from(delta);
            sel.quantity = adjusted.clamp(1, i64::from(u32::MAX)) as u32;
        }
        self
    }

    // ---- single-choice selections ----

    pub fn with_vehicle(mut self, id: impl Into<String>) -> Self {
        self.vehicle_id = Some(id.into());
        self
    }

    pub fn with_driver(mut self, id: impl Into<String>) -> Self {
        self.driver_id = Some(id.into());
        self
    }

    pub fn with_insurance(mut self, id: impl Into<String>) -> Self {
        self.insurance_id = Some(id.into());
        self
    }

    pub fn with_delivery(mut self, id: impl Into<String>) -> Self {
        self.delivery_id = Some(id.into());
        self
    }

    pub fn with_delivery_address(mut self, address: impl Into<String>) -> Self {
        self.delivery_address = address.into();
        self
    }

    // ---- schedule ----

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.schedule.start_date = Some(date);
        self
    }

    pub fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.schedule.end_date = Some(date);
        self
    }

    pub fn with_pickup_time(mut self, time: impl Into<String>) -> Self {
        self.schedule.pickup_time = time.into();
        self
    }

    pub fn with_return_time(mut self, time: impl Into<String>) -> Self {
        self.schedule.return_time = time.into();
        self
    }

    pub fn with_pickup_location(mut self, location: impl Into<String>) -> Self {
        self.schedule.pickup_location = location.into();
        self
    }

    pub fn with_dropoff_location(mut self, location: impl Into<String>) -> Self {
        self.schedule.dropoff_location = location.into();
        self
    }

    /// Set the duration type. Leaving multi-day resets the day count to 1;
    /// entering it clamps the count into the allowed range.
    pub fn with_duration_type(mut self, duration_type: DurationType) -> Self {
        self.schedule.duration_type = duration_type;
        self.schedule.duration_days = match duration_type {
            DurationType::HalfDay | DurationType::FullDay => 1,
            DurationType::MultiDay => self
                .schedule
                .duration_days
                .clamp(MIN_MULTI_DAY, MAX_MULTI_DAY),
        };
        self
    }

    /// Set the multi-day day count, clamped to [2, 14]. Has no effect unless
    /// the duration type is multi-day.
    pub fn with_duration_days(mut self, days: u32) -> Self {
        if self.schedule.duration_type == DurationType::MultiDay {
            self.schedule.duration_days = days.clamp(MIN_MULTI_DAY, MAX_MULTI_DAY);
        }
        self
    }

    // ---- party, contact, payment ----

    /// Replace the passenger counts. Adults never drop below 1.
    pub fn with_passengers(mut self, passengers: Passengers) -> Self {
        self.passengers = Passengers {
            adults: passengers.adults.max(1),
            ..passengers
        };
        self
    }

    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contact = contact;
        self
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = method;
        self
    }

    pub fn with_special_requests(mut self, requests: impl Into<String>) -> Self {
        self.special_requests = requests.into();
        self
    }

    pub fn with_dietary_requirements(mut self, requirements: impl Into<String>) -> Self {
        self.dietary_requirements = requirements.into();
        self
    }

    pub fn with_agreement(mut self, agreed: bool) -> Self {
        self.agreed_to_terms = agreed;
        self
    }

    // ---- derived values ----

    /// Day factor for per-day tour pricing: 0.5 for half-day, 1 for
    /// full-day, the day count for multi-day.
    pub fn duration_multiplier(&self) -> Decimal {
        match self.schedule.duration_type {
            DurationType::HalfDay => dec!(0.5),
            DurationType::FullDay => Decimal::ONE,
            DurationType::MultiDay => Decimal::from(self.schedule.duration_days),
        }
    }

    /// Billable rental days from the date pair, never below 1. Missing
    /// dates count as a single day until the form is filled in.
    pub fn rental_days(&self) -> u32 {
        match (self.schedule.start_date, self.schedule.end_date) {
            (Some(start), Some(end)) => (end - start).num_days().max(1) as u32,
            _ => 1,
        }
    }

    pub fn extra_quantity(&self, id: &str) -> Option<u32> {
        self.extras
            .iter()
            .find(|e| e.extra_id == id)
            .map(|e| e.quantity)
    }
}

/// Owner of the single mutable draft for one booking attempt.
///
/// `apply` installs the updated draft and reports whether anything actually
/// changed; the revision counter gives dependents a cheap "new snapshot
/// exists" signal without comparing drafts themselves.
#[derive(Debug, Clone)]
pub struct SelectionStore {
    draft: Draft,
    revision: u64,
}

impl SelectionStore {
    pub fn new(draft: Draft) -> Self {
        Self { draft, revision: 0 }
    }

    /// Current snapshot of the draft.
    pub fn get(&self) -> &Draft {
        &self.draft
    }

    /// Bumps whenever `apply` produced a structurally different draft.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Run an update against the current draft. Returns true when the new
    /// draft differs structurally from the old one.
    pub fn apply(&mut self, update: impl FnOnce(Draft) -> Draft) -> bool {
        let next = update(self.draft.clone());
        if next == self.draft {
            return false;
        }
        self.draft = next;
        self.revision += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_package() -> TourPackage {
        TourPackage {
            id: "cultural-triangle".to_string(),
            name: "Cultural Triangle Explorer".to_string(),
            duration_days: dec!(1),
            destinations: vec![
                "sigiriya".to_string(),
                "dambulla".to_string(),
                "polonnaruwa".to_string(),
            ],
            starting_price: dec!(95),
            is_featured: true,
        }
    }

    // ==================== toggle tests ====================

    #[test]
    fn test_toggle_destination_adds_then_removes() {
        let draft = Draft::new(BookingMode::CustomTour)
            .toggle_destination("sigiriya")
            .toggle_destination("kandy");
        assert_eq!(draft.destinations, vec!["sigiriya", "kandy"]);

        let draft = draft.toggle_destination("sigiriya");
        assert_eq!(draft.destinations, vec!["kandy"]);
    }

    #[test]
    fn test_toggle_destination_keeps_selection_order() {
        let draft = Draft::new(BookingMode::CustomTour)
            .toggle_destination("ella")
            .toggle_destination("kandy")
            .toggle_destination("galle")
            .toggle_destination("kandy")
            .toggle_destination("kandy");
        assert_eq!(draft.destinations, vec!["ella", "galle", "kandy"]);
    }

    #[test]
    fn test_toggle_extra_starts_at_quantity_one() {
        let draft = Draft::new(BookingMode::CustomTour).toggle_extra("lunch");
        assert_eq!(draft.extra_quantity("lunch"), Some(1));

        let draft = draft.toggle_extra("lunch");
        assert_eq!(draft.extra_quantity("lunch"), None);
    }

    #[test]
    fn test_extra_quantity_clamps_at_one_and_never_removes() {
        let draft = Draft::new(BookingMode::CustomTour)
            .toggle_extra("lunch")
            .adjust_extra_quantity("lunch", 3);
        assert_eq!(draft.extra_quantity("lunch"), Some(4));

        // Decrementing past 1 keeps the extra selected at quantity 1
        let draft = draft.adjust_extra_quantity("lunch", -10);
        assert_eq!(draft.extra_quantity("lunch"), Some(1));
    }

    #[test]
    fn test_extra_quantity_saturates_instead_of_wrapping() {
        let mut draft = Draft::new(BookingMode::CustomTour).toggle_extra("lunch");
        draft.extras[0].quantity = u32::MAX;

        let draft = draft.adjust_extra_quantity("lunch", 1);
        assert_eq!(draft.extra_quantity("lunch"), Some(u32::MAX));
    }

    #[test]
    fn test_adjust_quantity_ignores_unselected_extra() {
        let draft = Draft::new(BookingMode::CustomTour).adjust_extra_quantity("lunch", 2);
        assert!(draft.extras.is_empty());
    }

    // ==================== schedule tests ====================

    #[test]
    fn test_multi_day_count_is_clamped() {
        let draft = Draft::new(BookingMode::CustomTour)
            .with_duration_type(DurationType::MultiDay)
            .with_duration_days(15);
        assert_eq!(draft.schedule.duration_days, 14);

        let draft = draft.with_duration_days(1);
        assert_eq!(draft.schedule.duration_days, 2);
    }

    #[test]
    fn test_entering_multi_day_lifts_day_count_to_minimum() {
        let draft = Draft::new(BookingMode::CustomTour).with_duration_type(DurationType::MultiDay);
        assert_eq!(draft.schedule.duration_days, 2);

        let draft = draft.with_duration_type(DurationType::FullDay);
        assert_eq!(draft.schedule.duration_days, 1);
    }

    #[test]
    fn test_day_count_ignored_outside_multi_day() {
        let draft = Draft::new(BookingMode::CustomTour).with_duration_days(7);
        assert_eq!(draft.schedule.duration_type, DurationType::FullDay);
        assert_eq!(draft.schedule.duration_days, 1);
    }

    #[test]
    fn test_duration_multiplier_per_type() {
        let draft = Draft::new(BookingMode::CustomTour);
        assert_eq!(draft.duration_multiplier(), dec!(1));

        let draft = draft.with_duration_type(DurationType::HalfDay);
        assert_eq!(draft.duration_multiplier(), dec!(0.5));

        let draft = draft
            .with_duration_type(DurationType::MultiDay)
            .with_duration_days(5);
        assert_eq!(draft.duration_multiplier(), dec!(5));
    }

    #[test]
    fn test_rental_days_from_date_pair() {
        let draft = Draft::new(BookingMode::SelfDrive)
            .with_start_date(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap())
            .with_end_date(NaiveDate::from_ymd_opt(2025, 3, 13).unwrap());
        assert_eq!(draft.rental_days(), 3);
    }

    #[test]
    fn test_rental_days_never_below_one() {
        // Missing dates
        assert_eq!(Draft::new(BookingMode::SelfDrive).rental_days(), 1);

        // Same-day rental
        let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let draft = Draft::new(BookingMode::SelfDrive)
            .with_start_date(day)
            .with_end_date(day);
        assert_eq!(draft.rental_days(), 1);

        // Inverted dates still clamp rather than error
        let draft = Draft::new(BookingMode::SelfDrive)
            .with_start_date(NaiveDate::from_ymd_opt(2025, 3, 13).unwrap())
            .with_end_date(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(draft.rental_days(), 1);
    }

    // ==================== passenger tests ====================

    #[test]
    fn test_adults_never_drop_below_one() {
        let draft = Draft::new(BookingMode::CustomTour).with_passengers(Passengers {
            adults: 0,
            children: 2,
            infants: 1,
        });
        assert_eq!(draft.passengers.adults, 1);
        assert_eq!(draft.passengers.children, 2);
    }

    #[test]
    fn test_seats_needed_excludes_infants() {
        let passengers = Passengers {
            adults: 2,
            children: 1,
            infants: 2,
        };
        assert_eq!(passengers.seats_needed(), 3);
    }

    #[test]
    fn test_seats_needed_survives_huge_counters() {
        let passengers = Passengers {
            adults: u32::MAX,
            children: 1,
            infants: 0,
        };
        assert_eq!(passengers.seats_needed(), i64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_deserialized_adults_never_below_one() {
        let passengers: Passengers =
            serde_json::from_str(r#"{"adults":0,"children":2,"infants":1}"#).unwrap();
        assert_eq!(passengers.adults, 1);
        assert_eq!(passengers.children, 2);

        // An absent count falls back to the default party, not the floor
        let passengers: Passengers = serde_json::from_str(r#"{"children":3}"#).unwrap();
        assert_eq!(passengers.adults, 2);
    }

    #[test]
    fn test_wire_draft_cannot_carry_zero_adults() {
        let draft: Draft = serde_json::from_str(r#"{"passengers":{"adults":0}}"#).unwrap();
        assert_eq!(draft.passengers.adults, 1);
    }

    // ==================== package seeding tests ====================

    #[test]
    fn test_from_package_seeds_destinations_and_duration() {
        let draft = Draft::from_package(&sample_package());
        assert_eq!(draft.mode, BookingMode::PackageTour);
        assert_eq!(draft.package_id.as_deref(), Some("cultural-triangle"));
        assert_eq!(
            draft.destinations,
            vec!["sigiriya", "dambulla", "polonnaruwa"]
        );
        assert_eq!(draft.schedule.duration_type, DurationType::FullDay);
    }

    #[test]
    fn test_package_seeding_maps_fractional_days_to_half_day() {
        let mut package = sample_package();
        package.duration_days = dec!(0.5);
        let draft = Draft::from_package(&package);
        assert_eq!(draft.schedule.duration_type, DurationType::HalfDay);
        assert_eq!(draft.schedule.duration_days, 1);
    }

    #[test]
    fn test_package_seeding_maps_long_itineraries_to_multi_day() {
        let mut package = sample_package();
        package.duration_days = dec!(3);
        let draft = Draft::from_package(&package);
        assert_eq!(draft.schedule.duration_type, DurationType::MultiDay);
        assert_eq!(draft.schedule.duration_days, 3);
    }

    #[test]
    fn test_switching_to_custom_keeps_destinations() {
        let draft = Draft::from_package(&sample_package()).choose_custom();
        assert_eq!(draft.mode, BookingMode::CustomTour);
        assert!(draft.package_id.is_none());
        assert_eq!(draft.destinations.len(), 3);
    }

    // ==================== selection store tests ====================

    #[test]
    fn test_apply_reports_structural_change() {
        let mut store = SelectionStore::new(Draft::new(BookingMode::CustomTour));
        assert_eq!(store.revision(), 0);

        let changed = store.apply(|d| d.toggle_destination("kandy"));
        assert!(changed);
        assert_eq!(store.revision(), 1);
        assert_eq!(store.get().destinations, vec!["kandy"]);
    }

    #[test]
    fn test_apply_detects_no_op_updates() {
        let mut store = SelectionStore::new(Draft::new(BookingMode::CustomTour));

        // Identity update
        assert!(!store.apply(|d| d));
        // Add-then-remove lands on a structurally equal draft
        assert!(!store.apply(|d| d.toggle_destination("kandy").toggle_destination("kandy")));
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_store_equality_is_structural_not_identity() {
        let a = Draft::new(BookingMode::CustomTour).toggle_destination("ella");
        let b = Draft::new(BookingMode::CustomTour).toggle_destination("ella");
        assert_eq!(a, b);
    }
}

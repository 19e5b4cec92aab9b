//! Step sequencing and gate checks for the two booking wizards.
//!
//! Each flow is a static list of steps; a step's gate inspects the draft
//! (and the catalog, for capacity and delivery rules) and reports what is
//! still missing. The controller owns the cursor and the submission state
//! machine: advancing re-runs the current gate, submitting re-validates
//! every gate, and a submission in flight freezes the wizard until the
//! outcome is known.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::booking::draft::{BookingMode, Draft};
use crate::catalog::models::{CatalogSnapshot, FlowKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepId {
    // Tour wizard
    TourType,
    Destinations,
    Schedule,
    Vehicle,
    Driver,
    Extras,
    Details,
    Payment,
    // Rental wizard
    RentalDetails,
    Protection,
    PersonalInfo,
    RentalPayment,
}

/// A single unmet precondition, named for what the customer still has to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    PackageChosen,
    DestinationChosen,
    StartDateSet,
    StartDateNotPast,
    EndDateSet,
    PickupTimeSet,
    PickupLocationSet,
    DeliveryAddressSet,
    VehicleChosen,
    VehicleCapacity,
    DriverChosen,
    FirstNameSet,
    LastNameSet,
    EmailSet,
    PhoneSet,
    PassportNumberSet,
    LicenseNumberSet,
    TermsAccepted,
}

/// Outcome of running a gate: empty means the step may be left.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GateReport {
    pub missing: Vec<Requirement>,
}

impl GateReport {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn is_ok(&self) -> bool {
        self.missing.is_empty()
    }

    fn require(mut self, satisfied: bool, requirement: Requirement) -> Self {
        if !satisfied {
            self.missing.push(requirement);
        }
        self
    }

    fn merge(&mut self, other: GateReport) {
        for requirement in other.missing {
            if !self.missing.contains(&requirement) {
                self.missing.push(requirement);
            }
        }
    }
}

type GateFn = fn(&Draft, &CatalogSnapshot, NaiveDate) -> GateReport;

#[derive(Debug, Clone, Copy)]
pub struct StepDef {
    pub id: StepId,
    pub title: &'static str,
    gate: GateFn,
}

impl StepDef {
    pub fn check(&self, draft: &Draft, catalog: &CatalogSnapshot, today: NaiveDate) -> GateReport {
        (self.gate)(draft, catalog, today)
    }
}

#[derive(Debug)]
pub struct FlowDef {
    kind: FlowKind,
    steps: &'static [StepDef],
}

impl FlowDef {
    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    pub fn steps(&self) -> &'static [StepDef] {
        self.steps
    }

    /// Union of every step's missing requirements, in step order. Submission
    /// re-validates the whole flow, not just the step the cursor sits on.
    pub fn gate_all(&self, draft: &Draft, catalog: &CatalogSnapshot, today: NaiveDate) -> GateReport {
        let mut all = GateReport::ok();
        for step in self.steps {
            all.merge(step.check(draft, catalog, today));
        }
        all
    }
}

fn present(value: &str) -> bool {
    !value.trim().is_empty()
}

// ==================== tour gates ====================

fn gate_tour_type(draft: &Draft, catalog: &CatalogSnapshot, _today: NaiveDate) -> GateReport {
    match draft.mode {
        BookingMode::PackageTour => GateReport::ok().require(
            draft
                .package_id
                .as_deref()
                .is_some_and(|id| catalog.package(id).is_some()),
            Requirement::PackageChosen,
        ),
        _ => GateReport::ok(),
    }
}

fn gate_destinations(draft: &Draft, _catalog: &CatalogSnapshot, _today: NaiveDate) -> GateReport {
    GateReport::ok().require(!draft.destinations.is_empty(), Requirement::DestinationChosen)
}

fn gate_schedule(draft: &Draft, _catalog: &CatalogSnapshot, today: NaiveDate) -> GateReport {
    let start = draft.schedule.start_date;
    GateReport::ok()
        .require(start.is_some(), Requirement::StartDateSet)
        .require(
            start.map_or(true, |date| date >= today),
            Requirement::StartDateNotPast,
        )
        .require(present(&draft.schedule.pickup_time), Requirement::PickupTimeSet)
        .require(
            present(&draft.schedule.pickup_location),
            Requirement::PickupLocationSet,
        )
}

fn gate_vehicle(draft: &Draft, catalog: &CatalogSnapshot, _today: NaiveDate) -> GateReport {
    let vehicle = draft
        .vehicle_id
        .as_deref()
        .and_then(|id| catalog.vehicle(id));
    GateReport::ok()
        .require(vehicle.is_some(), Requirement::VehicleChosen)
        .require(
            vehicle.map_or(true, |v| {
                i64::from(v.max_passengers) >= draft.passengers.seats_needed()
            }),
            Requirement::VehicleCapacity,
        )
}

fn gate_driver(draft: &Draft, catalog: &CatalogSnapshot, _today: NaiveDate) -> GateReport {
    GateReport::ok().require(
        draft
            .driver_id
            .as_deref()
            .is_some_and(|id| catalog.driver(id).is_some()),
        Requirement::DriverChosen,
    )
}

fn gate_open(_draft: &Draft, _catalog: &CatalogSnapshot, _today: NaiveDate) -> GateReport {
    GateReport::ok()
}

fn gate_details(draft: &Draft, _catalog: &CatalogSnapshot, _today: NaiveDate) -> GateReport {
    GateReport::ok()
        .require(present(&draft.contact.first_name), Requirement::FirstNameSet)
        .require(present(&draft.contact.last_name), Requirement::LastNameSet)
        .require(present(&draft.contact.email), Requirement::EmailSet)
        .require(present(&draft.contact.phone), Requirement::PhoneSet)
}

fn gate_terms(draft: &Draft, _catalog: &CatalogSnapshot, _today: NaiveDate) -> GateReport {
    GateReport::ok().require(draft.agreed_to_terms, Requirement::TermsAccepted)
}

// ==================== rental gates ====================

fn gate_rental_details(draft: &Draft, catalog: &CatalogSnapshot, today: NaiveDate) -> GateReport {
    let start = draft.schedule.start_date;
    let needs_address = draft
        .delivery_id
        .as_deref()
        .and_then(|id| catalog.delivery_option(id))
        .map_or(false, |option| option.requires_address);

    GateReport::ok()
        .require(
            draft
                .vehicle_id
                .as_deref()
                .is_some_and(|id| catalog.vehicle(id).is_some()),
            Requirement::VehicleChosen,
        )
        .require(start.is_some(), Requirement::StartDateSet)
        .require(
            start.map_or(true, |date| date >= today),
            Requirement::StartDateNotPast,
        )
        .require(draft.schedule.end_date.is_some(), Requirement::EndDateSet)
        .require(
            !needs_address || present(&draft.delivery_address),
            Requirement::DeliveryAddressSet,
        )
}

fn gate_personal_info(draft: &Draft, _catalog: &CatalogSnapshot, _today: NaiveDate) -> GateReport {
    GateReport::ok()
        .require(present(&draft.contact.first_name), Requirement::FirstNameSet)
        .require(present(&draft.contact.last_name), Requirement::LastNameSet)
        .require(present(&draft.contact.email), Requirement::EmailSet)
        .require(present(&draft.contact.phone), Requirement::PhoneSet)
        .require(
            present(&draft.contact.passport_number),
            Requirement::PassportNumberSet,
        )
        .require(
            present(&draft.contact.license_number),
            Requirement::LicenseNumberSet,
        )
}

// ==================== flow definitions ====================

static TOUR_FLOW: FlowDef = FlowDef {
    kind: FlowKind::Tour,
    steps: &[
        StepDef {
            id: StepId::TourType,
            title: "Tour Type",
            gate: gate_tour_type,
        },
        StepDef {
            id: StepId::Destinations,
            title: "Destinations",
            gate: gate_destinations,
        },
        StepDef {
            id: StepId::Schedule,
            title: "Schedule",
            gate: gate_schedule,
        },
        StepDef {
            id: StepId::Vehicle,
            title: "Vehicle",
            gate: gate_vehicle,
        },
        StepDef {
            id: StepId::Driver,
            title: "Driver",
            gate: gate_driver,
        },
        StepDef {
            id: StepId::Extras,
            title: "Extras",
            gate: gate_open,
        },
        StepDef {
            id: StepId::Details,
            title: "Details",
            gate: gate_details,
        },
        StepDef {
            id: StepId::Payment,
            title: "Payment",
            gate: gate_terms,
        },
    ],
};

static RENTAL_FLOW: FlowDef = FlowDef {
    kind: FlowKind::Rental,
    steps: &[
        StepDef {
            id: StepId::RentalDetails,
            title: "Details",
            gate: gate_rental_details,
        },
        StepDef {
            id: StepId::Protection,
            title: "Protection & Add-ons",
            gate: gate_open,
        },
        StepDef {
            id: StepId::PersonalInfo,
            title: "Personal Info",
            gate: gate_personal_info,
        },
        StepDef {
            id: StepId::RentalPayment,
            title: "Payment",
            gate: gate_terms,
        },
    ],
};

pub fn flow_for(kind: FlowKind) -> &'static FlowDef {
    match kind {
        FlowKind::Tour => &TOUR_FLOW,
        FlowKind::Rental => &RENTAL_FLOW,
    }
}

// ==================== controller ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Cursor sits on the step at this index.
    AtStep(usize),
    /// A submission is in flight; the wizard is frozen.
    Submitting,
    /// Terminal: the booking exists under this reference.
    Confirmed { reference: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved onto the named step.
    Advanced(StepId),
    /// Current step's gate failed; the cursor did not move.
    Blocked(GateReport),
    /// Nothing to do: already at the final step, submitting, or confirmed.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitBlocked {
    #[error("submission attempted before the final step")]
    NotAtFinalStep,
    #[error("draft does not satisfy the flow's requirements")]
    Requirements(GateReport),
    #[error("a submission is already in flight")]
    AlreadyInFlight,
    #[error("booking is already confirmed")]
    AlreadyConfirmed,
}

/// Cursor over one flow's steps plus the submission state machine.
#[derive(Debug, Clone)]
pub struct FlowController {
    flow: &'static FlowDef,
    phase: Phase,
}

impl FlowController {
    pub fn new(kind: FlowKind) -> Self {
        Self {
            flow: flow_for(kind),
            phase: Phase::AtStep(0),
        }
    }

    pub fn flow(&self) -> &'static FlowDef {
        self.flow
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Index of the current step, if the wizard is still step-bound.
    pub fn position(&self) -> Option<usize> {
        match self.phase {
            Phase::AtStep(index) => Some(index),
            _ => None,
        }
    }

    pub fn current_step(&self) -> Option<StepId> {
        self.position().map(|index| self.flow.steps[index].id)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, Phase::Submitting)
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self.phase, Phase::Confirmed { .. })
    }

    pub fn reference(&self) -> Option<&str> {
        match &self.phase {
            Phase::Confirmed { reference } => Some(reference),
            _ => None,
        }
    }

    /// Try to leave the current step. The gate runs against the live draft,
    /// so a draft edited since the last check is judged as it is now.
    pub fn advance(
        &mut self,
        draft: &Draft,
        catalog: &CatalogSnapshot,
        today: NaiveDate,
    ) -> AdvanceOutcome {
        let Phase::AtStep(index) = self.phase else {
            return AdvanceOutcome::Unchanged;
        };

        let report = self.flow.steps[index].check(draft, catalog, today);
        if !report.is_ok() {
            return AdvanceOutcome::Blocked(report);
        }

        if index + 1 < self.flow.steps.len() {
            self.phase = Phase::AtStep(index + 1);
            AdvanceOutcome::Advanced(self.flow.steps[index + 1].id)
        } else {
            AdvanceOutcome::Unchanged
        }
    }

    /// Step back one position. Never gated, but refused on the first step
    /// and while a submission is in flight or confirmed.
    pub fn retreat(&mut self) -> bool {
        match self.phase {
            Phase::AtStep(index) if index > 0 => {
                self.phase = Phase::AtStep(index - 1);
                true
            }
            _ => false,
        }
    }

    /// Enter the submitting phase. Requires the cursor on the final step and
    /// every gate in the flow to pass against the current draft.
    pub fn begin_submission(
        &mut self,
        draft: &Draft,
        catalog: &CatalogSnapshot,
        today: NaiveDate,
    ) -> Result<(), SubmitBlocked> {
        match self.phase {
            Phase::Confirmed { .. } => return Err(SubmitBlocked::AlreadyConfirmed),
            Phase::Submitting => return Err(SubmitBlocked::AlreadyInFlight),
            Phase::AtStep(index) if index + 1 != self.flow.steps.len() => {
                return Err(SubmitBlocked::NotAtFinalStep);
            }
            Phase::AtStep(_) => {}
        }

        let report = self.flow.gate_all(draft, catalog, today);
        if !report.is_ok() {
            return Err(SubmitBlocked::Requirements(report));
        }

        self.phase = Phase::Submitting;
        Ok(())
    }

    /// The in-flight submission succeeded; the wizard becomes terminal.
    pub fn record_success(&mut self, reference: impl Into<String>) {
        if self.is_submitting() {
            self.phase = Phase::Confirmed {
                reference: reference.into(),
            };
        }
    }

    /// The in-flight submission failed; return to the final step so the
    /// customer can retry.
    pub fn record_failure(&mut self) {
        if self.is_submitting() {
            self.phase = Phase::AtStep(self.flow.steps.len() - 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::draft::Passengers;
    use crate::catalog::models::{DeliveryOption, DriverTier, TourPackage, Vehicle};
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn tour_catalog() -> CatalogSnapshot {
        let mut catalog = CatalogSnapshot::empty(FlowKind::Tour);
        catalog.vehicles.push(Vehicle {
            id: "sedan".to_string(),
            name: "Comfort Sedan".to_string(),
            category: "sedan".to_string(),
            max_passengers: 3,
            price_per_day: dec!(75),
            price_per_half_day: Some(dec!(45)),
            with_driver_price_per_day: None,
            security_deposit: None,
        });
        catalog.vehicles.push(Vehicle {
            id: "van".to_string(),
            name: "Family Van".to_string(),
            category: "van".to_string(),
            max_passengers: 9,
            price_per_day: dec!(120),
            price_per_half_day: Some(dec!(70)),
            with_driver_price_per_day: None,
            security_deposit: None,
        });
        catalog.drivers.push(DriverTier {
            id: "professional".to_string(),
            name: "Professional Chauffeur".to_string(),
            price_per_day: dec!(30),
            recommended: true,
        });
        catalog.packages.push(TourPackage {
            id: "highlands".to_string(),
            name: "Highlands Escape".to_string(),
            duration_days: dec!(2),
            destinations: vec!["kandy".to_string(), "ella".to_string()],
            starting_price: dec!(180),
            is_featured: false,
        });
        catalog
    }

    fn rental_catalog() -> CatalogSnapshot {
        let mut catalog = CatalogSnapshot::empty(FlowKind::Rental);
        catalog.vehicles.push(Vehicle {
            id: "suv".to_string(),
            name: "Compact SUV".to_string(),
            category: "suv".to_string(),
            max_passengers: 5,
            price_per_day: dec!(50),
            price_per_half_day: None,
            with_driver_price_per_day: Some(dec!(75)),
            security_deposit: Some(dec!(100)),
        });
        catalog.delivery_options.push(DeliveryOption {
            id: "self_pickup".to_string(),
            name: "Self Pickup".to_string(),
            price: dec!(0),
            estimated_time: None,
            requires_address: false,
        });
        catalog.delivery_options.push(DeliveryOption {
            id: "hotel".to_string(),
            name: "Hotel Delivery".to_string(),
            price: dec!(15),
            estimated_time: Some("1-2 hours".to_string()),
            requires_address: true,
        });
        catalog
    }

    fn ready_tour_draft() -> Draft {
        let mut draft = Draft::new(BookingMode::CustomTour)
            .toggle_destination("kandy")
            .with_start_date(NaiveDate::from_ymd_opt(2025, 6, 20).unwrap())
            .with_pickup_location("Colombo Fort")
            .with_vehicle("sedan")
            .with_driver("professional")
            .with_agreement(true);
        draft.contact.first_name = "Amara".to_string();
        draft.contact.last_name = "Silva".to_string();
        draft.contact.email = "amara@example.com".to_string();
        draft.contact.phone = "+94 77 123 4567".to_string();
        draft
    }

    fn ready_rental_draft() -> Draft {
        let mut draft = Draft::new(BookingMode::SelfDrive)
            .with_vehicle("suv")
            .with_start_date(NaiveDate::from_ymd_opt(2025, 6, 20).unwrap())
            .with_end_date(NaiveDate::from_ymd_opt(2025, 6, 23).unwrap())
            .with_delivery("self_pickup")
            .with_agreement(true);
        draft.contact.first_name = "Amara".to_string();
        draft.contact.last_name = "Silva".to_string();
        draft.contact.email = "amara@example.com".to_string();
        draft.contact.phone = "+94 77 123 4567".to_string();
        draft.contact.passport_number = "N1234567".to_string();
        draft.contact.license_number = "B9876543".to_string();
        draft
    }

    fn walk_to_final(controller: &mut FlowController, draft: &Draft, catalog: &CatalogSnapshot) {
        while let AdvanceOutcome::Advanced(_) = controller.advance(draft, catalog, today()) {}
    }

    // ==================== gate tests ====================

    #[test]
    fn test_package_mode_requires_known_package() {
        let catalog = tour_catalog();
        let draft = Draft::new(BookingMode::PackageTour);
        let report = gate_tour_type(&draft, &catalog, today());
        assert_eq!(report.missing, vec![Requirement::PackageChosen]);

        let report = gate_tour_type(&draft.clone().with_vehicle("ignored"), &catalog, today());
        assert_eq!(report.missing, vec![Requirement::PackageChosen]);

        let seeded = Draft::from_package(&catalog.packages[0]);
        assert!(gate_tour_type(&seeded, &catalog, today()).is_ok());
    }

    #[test]
    fn test_custom_mode_needs_no_package() {
        let catalog = tour_catalog();
        let draft = Draft::new(BookingMode::CustomTour);
        assert!(gate_tour_type(&draft, &catalog, today()).is_ok());
    }

    #[test]
    fn test_schedule_gate_rejects_past_dates() {
        let catalog = tour_catalog();
        let draft = ready_tour_draft().with_start_date(NaiveDate::from_ymd_opt(2025, 6, 14).unwrap());
        let report = gate_schedule(&draft, &catalog, today());
        assert_eq!(report.missing, vec![Requirement::StartDateNotPast]);
    }

    #[test]
    fn test_schedule_gate_accepts_today() {
        let catalog = tour_catalog();
        let draft = ready_tour_draft().with_start_date(today());
        assert!(gate_schedule(&draft, &catalog, today()).is_ok());
    }

    #[test]
    fn test_schedule_gate_checks_presence_fields() {
        let catalog = tour_catalog();
        let draft = Draft::new(BookingMode::CustomTour).with_pickup_time("   ");
        let report = gate_schedule(&draft, &catalog, today());
        assert_eq!(
            report.missing,
            vec![
                Requirement::StartDateSet,
                Requirement::PickupTimeSet,
                Requirement::PickupLocationSet,
            ]
        );
    }

    #[test]
    fn test_vehicle_gate_enforces_capacity() {
        let catalog = tour_catalog();
        let draft = ready_tour_draft().with_passengers(Passengers {
            adults: 3,
            children: 2,
            infants: 0,
        });
        let report = gate_vehicle(&draft, &catalog, today());
        assert_eq!(report.missing, vec![Requirement::VehicleCapacity]);

        // Infants ride on laps and do not count against seats
        let draft = draft.with_passengers(Passengers {
            adults: 2,
            children: 1,
            infants: 4,
        });
        assert!(gate_vehicle(&draft, &catalog, today()).is_ok());

        let draft = draft
            .with_vehicle("van")
            .with_passengers(Passengers {
                adults: 3,
                children: 2,
                infants: 0,
            });
        assert!(gate_vehicle(&draft, &catalog, today()).is_ok());
    }

    #[test]
    fn test_vehicle_gate_rejects_huge_parties() {
        // Party sizes past i32 range must not wrap into a passing comparison
        let catalog = tour_catalog();
        let draft = ready_tour_draft().with_passengers(Passengers {
            adults: 2_147_483_648,
            children: 0,
            infants: 0,
        });
        let report = gate_vehicle(&draft, &catalog, today());
        assert_eq!(report.missing, vec![Requirement::VehicleCapacity]);
    }

    #[test]
    fn test_vehicle_gate_treats_stale_id_as_unchosen() {
        let catalog = tour_catalog();
        let draft = ready_tour_draft().with_vehicle("retired-bus");
        let report = gate_vehicle(&draft, &catalog, today());
        assert_eq!(report.missing, vec![Requirement::VehicleChosen]);
    }

    #[test]
    fn test_details_gate_ignores_whitespace_names() {
        let catalog = tour_catalog();
        let mut draft = ready_tour_draft();
        draft.contact.email = "  ".to_string();
        let report = gate_details(&draft, &catalog, today());
        assert_eq!(report.missing, vec![Requirement::EmailSet]);
    }

    #[test]
    fn test_rental_details_gate() {
        let catalog = rental_catalog();
        let draft = Draft::new(BookingMode::SelfDrive);
        let report = gate_rental_details(&draft, &catalog, today());
        assert_eq!(
            report.missing,
            vec![
                Requirement::VehicleChosen,
                Requirement::StartDateSet,
                Requirement::EndDateSet,
            ]
        );
    }

    #[test]
    fn test_rental_delivery_address_required_only_when_option_asks() {
        let catalog = rental_catalog();

        let draft = ready_rental_draft().with_delivery("hotel");
        let report = gate_rental_details(&draft, &catalog, today());
        assert_eq!(report.missing, vec![Requirement::DeliveryAddressSet]);

        let draft = draft.with_delivery_address("12 Galle Face, Colombo");
        assert!(gate_rental_details(&draft, &catalog, today()).is_ok());

        // Self pickup never needs an address
        let draft = ready_rental_draft();
        assert!(gate_rental_details(&draft, &catalog, today()).is_ok());
    }

    #[test]
    fn test_personal_info_gate_requires_documents() {
        let catalog = rental_catalog();
        let mut draft = ready_rental_draft();
        draft.contact.passport_number = String::new();
        draft.contact.license_number = String::new();
        let report = gate_personal_info(&draft, &catalog, today());
        assert_eq!(
            report.missing,
            vec![
                Requirement::PassportNumberSet,
                Requirement::LicenseNumberSet,
            ]
        );
    }

    // ==================== controller tests ====================

    #[test]
    fn test_happy_path_walks_all_tour_steps() {
        let catalog = tour_catalog();
        let draft = ready_tour_draft();
        let mut controller = FlowController::new(FlowKind::Tour);
        assert_eq!(controller.current_step(), Some(StepId::TourType));

        let mut visited = vec![];
        while let AdvanceOutcome::Advanced(step) = controller.advance(&draft, &catalog, today()) {
            visited.push(step);
        }

        assert_eq!(
            visited,
            vec![
                StepId::Destinations,
                StepId::Schedule,
                StepId::Vehicle,
                StepId::Driver,
                StepId::Extras,
                StepId::Details,
                StepId::Payment,
            ]
        );
        assert_eq!(controller.current_step(), Some(StepId::Payment));
        // Advancing off the final step is not how submission starts
        assert_eq!(
            controller.advance(&draft, &catalog, today()),
            AdvanceOutcome::Unchanged
        );
    }

    #[test]
    fn test_blocked_advance_keeps_cursor_in_place() {
        let catalog = tour_catalog();
        let draft = Draft::new(BookingMode::CustomTour);
        let mut controller = FlowController::new(FlowKind::Tour);
        controller.advance(&draft, &catalog, today());
        assert_eq!(controller.current_step(), Some(StepId::Destinations));

        let outcome = controller.advance(&draft, &catalog, today());
        assert_eq!(
            outcome,
            AdvanceOutcome::Blocked(GateReport {
                missing: vec![Requirement::DestinationChosen]
            })
        );
        assert_eq!(controller.current_step(), Some(StepId::Destinations));
    }

    #[test]
    fn test_retreat_is_ungated_but_stops_at_first_step() {
        let catalog = tour_catalog();
        let draft = ready_tour_draft();
        let mut controller = FlowController::new(FlowKind::Tour);
        controller.advance(&draft, &catalog, today());
        controller.advance(&draft, &catalog, today());

        assert!(controller.retreat());
        assert!(controller.retreat());
        assert_eq!(controller.current_step(), Some(StepId::TourType));
        assert!(!controller.retreat());
    }

    #[test]
    fn test_submission_requires_final_step() {
        let catalog = tour_catalog();
        let draft = ready_tour_draft();
        let mut controller = FlowController::new(FlowKind::Tour);
        assert_eq!(
            controller.begin_submission(&draft, &catalog, today()),
            Err(SubmitBlocked::NotAtFinalStep)
        );
    }

    #[test]
    fn test_submission_revalidates_every_gate() {
        let catalog = tour_catalog();
        let draft = ready_tour_draft();
        let mut controller = FlowController::new(FlowKind::Tour);
        walk_to_final(&mut controller, &draft, &catalog);

        // The draft degraded after the gates were first passed
        let mut stale = draft.clone();
        stale.contact.email = String::new();
        stale.destinations.clear();

        match controller.begin_submission(&stale, &catalog, today()) {
            Err(SubmitBlocked::Requirements(report)) => {
                assert!(report.missing.contains(&Requirement::DestinationChosen));
                assert!(report.missing.contains(&Requirement::EmailSet));
            }
            other => panic!("expected requirements failure, got {other:?}"),
        }
        // Still on the final step, free to fix and retry
        assert_eq!(controller.current_step(), Some(StepId::Payment));
    }

    #[test]
    fn test_in_flight_submission_freezes_the_wizard() {
        let catalog = tour_catalog();
        let draft = ready_tour_draft();
        let mut controller = FlowController::new(FlowKind::Tour);
        walk_to_final(&mut controller, &draft, &catalog);

        assert!(controller.begin_submission(&draft, &catalog, today()).is_ok());
        assert!(controller.is_submitting());

        assert_eq!(
            controller.begin_submission(&draft, &catalog, today()),
            Err(SubmitBlocked::AlreadyInFlight)
        );
        assert!(!controller.retreat());
        assert_eq!(
            controller.advance(&draft, &catalog, today()),
            AdvanceOutcome::Unchanged
        );
    }

    #[test]
    fn test_success_confirms_and_failure_returns_to_final_step() {
        let catalog = tour_catalog();
        let draft = ready_tour_draft();

        let mut controller = FlowController::new(FlowKind::Tour);
        walk_to_final(&mut controller, &draft, &catalog);
        controller
            .begin_submission(&draft, &catalog, today())
            .unwrap();
        controller.record_failure();
        assert_eq!(controller.current_step(), Some(StepId::Payment));

        controller
            .begin_submission(&draft, &catalog, today())
            .unwrap();
        controller.record_success("PT01001");
        assert!(controller.is_confirmed());
        assert_eq!(controller.reference(), Some("PT01001"));
        assert_eq!(
            controller.begin_submission(&draft, &catalog, today()),
            Err(SubmitBlocked::AlreadyConfirmed)
        );
        assert!(!controller.retreat());
    }

    #[test]
    fn test_rental_flow_walks_four_steps() {
        let catalog = rental_catalog();
        let draft = ready_rental_draft();
        let mut controller = FlowController::new(FlowKind::Rental);

        let mut visited = vec![];
        while let AdvanceOutcome::Advanced(step) = controller.advance(&draft, &catalog, today()) {
            visited.push(step);
        }
        assert_eq!(
            visited,
            vec![
                StepId::Protection,
                StepId::PersonalInfo,
                StepId::RentalPayment,
            ]
        );

        assert!(controller.begin_submission(&draft, &catalog, today()).is_ok());
        controller.record_success("VR01001");
        assert_eq!(controller.reference(), Some("VR01001"));
    }
}

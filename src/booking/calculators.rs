//! Pricing composition and commission math.
//!
//! Pure functions over the draft and a catalog snapshot - no database
//! access, safe to re-run on every draft change. Every line item is rounded
//! to a whole currency unit before summation, so the total always equals
//! the sum of the displayed lines.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::booking::draft::{BookingMode, Draft, DurationType};
use crate::catalog::models::{CatalogSnapshot, CommissionTable, ExtraPriceType, FlowKind};

/// All prices are quoted and settled in this currency.
pub const CURRENCY: &str = "USD";

/// Round to a whole currency unit, half away from zero.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use recharge_booking::booking::round_money;
///
/// assert_eq!(round_money(dec!(22.5)), dec!(23));
/// assert_eq!(round_money(dec!(3.75)), dec!(4));
/// assert_eq!(round_money(dec!(4.4)), dec!(4));
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Which bucket a line item settles into. Deposit is refundable
/// pass-through; Entrance is paid on-site. Neither bears commission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    Vehicle,
    Driver,
    Entrance,
    Extra,
    ServiceFee,
    Insurance,
    Delivery,
    Deposit,
}

/// How a line's amount was derived, kept alongside the rounded amount so
/// the breakdown can be displayed without re-deriving it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CostBasis {
    Flat,
    PerDay { rate: Decimal, days: Decimal },
    PerUnit { rate: Decimal, quantity: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostLine {
    pub category: CostCategory,
    pub label: String,
    pub amount: Decimal,
    pub basis: CostBasis,
}

/// The aggregated, rounded set of line items at a point in time.
///
/// `subtotal` excludes the security deposit; `total` is the grand total
/// including it. Both are exact sums of the rounded line amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSnapshot {
    pub lines: Vec<CostLine>,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub currency: String,
}

impl PricingSnapshot {
    pub fn line(&self, category: CostCategory) -> Option<&CostLine> {
        self.lines.iter().find(|l| l.category == category)
    }

    pub fn category_total(&self, category: CostCategory) -> Decimal {
        self.lines
            .iter()
            .filter(|l| l.category == category)
            .map(|l| l.amount)
            .sum()
    }
}

/// Flow-dependent pricing knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingPolicy {
    /// Fraction of the vehicle+driver subtotal charged as the platform's
    /// service fee. Never applied to entrance fees, extras, insurance, or
    /// delivery.
    pub service_fee_rate: Decimal,
}

impl PricingPolicy {
    pub fn for_flow(flow: FlowKind) -> Self {
        match flow {
            FlowKind::Tour => Self {
                service_fee_rate: dec!(0.05),
            },
            FlowKind::Rental => Self {
                service_fee_rate: dec!(0.10),
            },
        }
    }
}

/// Price the draft against the catalog with the flow's standard policy.
pub fn price(draft: &Draft, catalog: &CatalogSnapshot) -> PricingSnapshot {
    price_with_policy(draft, catalog, PricingPolicy::for_flow(draft.flow()))
}

/// Price the draft with an explicit policy.
///
/// Selections that no longer resolve against the catalog contribute
/// nothing; selected items are kept as lines even at zero, while derived
/// aggregates (entrance estimate, service fee) are omitted when zero.
pub fn price_with_policy(
    draft: &Draft,
    catalog: &CatalogSnapshot,
    policy: PricingPolicy,
) -> PricingSnapshot {
    let lines = match draft.flow() {
        FlowKind::Tour => tour_lines(draft, catalog, policy),
        FlowKind::Rental => rental_lines(draft, catalog, policy),
    };

    let subtotal = lines
        .iter()
        .filter(|l| l.category != CostCategory::Deposit)
        .map(|l| l.amount)
        .sum();
    let total = lines.iter().map(|l| l.amount).sum();

    PricingSnapshot {
        lines,
        subtotal,
        total,
        currency: CURRENCY.to_string(),
    }
}

fn tour_lines(draft: &Draft, catalog: &CatalogSnapshot, policy: PricingPolicy) -> Vec<CostLine> {
    let mut lines = Vec::new();
    let multiplier = draft.duration_multiplier();

    // Vehicle: half-day uses the published half-day rate when the catalog
    // carries one, otherwise half the daily rate.
    let mut fee_base = Decimal::ZERO;
    if let Some(vehicle) = draft.vehicle_id.as_deref().and_then(|id| catalog.vehicle(id)) {
        let (amount, basis) = match (draft.schedule.duration_type, vehicle.price_per_half_day) {
            (DurationType::HalfDay, Some(half_rate)) => (line_amount(half_rate), CostBasis::Flat),
            _ => (
                line_amount(vehicle.price_per_day * multiplier),
                CostBasis::PerDay {
                    rate: vehicle.price_per_day,
                    days: multiplier,
                },
            ),
        };
        fee_base += amount;
        lines.push(CostLine {
            category: CostCategory::Vehicle,
            label: vehicle.name.clone(),
            amount,
            basis,
        });
    }

    // Driver add-on half-day pricing is always 0.5x the daily rate, even
    // though vehicles carry a published half-day rate. Kept as-is.
    if let Some(driver) = draft.driver_id.as_deref().and_then(|id| catalog.driver(id)) {
        let amount = line_amount(driver.price_per_day * multiplier);
        fee_base += amount;
        lines.push(CostLine {
            category: CostCategory::Driver,
            label: driver.name.clone(),
            amount,
            basis: CostBasis::PerDay {
                rate: driver.price_per_day,
                days: multiplier,
            },
        });
    }

    // Entrance fees are a plain sum over the chosen destinations, shown as
    // an on-site estimate. Unknown ids contribute nothing.
    let entrance: Decimal = draft
        .destinations
        .iter()
        .filter_map(|id| catalog.destination(id))
        .map(|d| d.entrance_fee)
        .sum();
    let entrance = line_amount(entrance);
    if entrance > Decimal::ZERO {
        lines.push(CostLine {
            category: CostCategory::Entrance,
            label: "Entrance fees (estimate)".to_string(),
            amount: entrance,
            basis: CostBasis::Flat,
        });
    }

    push_extra_lines(draft, catalog, multiplier, &mut lines);
    push_service_fee(policy, fee_base, &mut lines);

    lines
}

fn rental_lines(draft: &Draft, catalog: &CatalogSnapshot, policy: PricingPolicy) -> Vec<CostLine> {
    let mut lines = Vec::new();
    let days = Decimal::from(draft.rental_days());

    // With-driver rentals use the published with-driver rate; a vehicle
    // listed without one falls back to the self-drive rate.
    let mut fee_base = Decimal::ZERO;
    let mut deposit = None;
    if let Some(vehicle) = draft.vehicle_id.as_deref().and_then(|id| catalog.vehicle(id)) {
        let rate = match draft.mode {
            BookingMode::WithDriver => vehicle
                .with_driver_price_per_day
                .unwrap_or(vehicle.price_per_day),
            _ => vehicle.price_per_day,
        };
        let amount = line_amount(rate * days);
        fee_base += amount;
        deposit = vehicle.security_deposit;
        lines.push(CostLine {
            category: CostCategory::Vehicle,
            label: vehicle.name.clone(),
            amount,
            basis: CostBasis::PerDay { rate, days },
        });
    }

    if let Some(plan) = draft
        .insurance_id
        .as_deref()
        .and_then(|id| catalog.insurance_plan(id))
    {
        lines.push(CostLine {
            category: CostCategory::Insurance,
            label: plan.name.clone(),
            amount: line_amount(plan.price_per_day * days),
            basis: CostBasis::PerDay {
                rate: plan.price_per_day,
                days,
            },
        });
    }

    push_extra_lines(draft, catalog, days, &mut lines);

    if let Some(option) = draft
        .delivery_id
        .as_deref()
        .and_then(|id| catalog.delivery_option(id))
    {
        lines.push(CostLine {
            category: CostCategory::Delivery,
            label: option.name.clone(),
            amount: line_amount(option.price),
            basis: CostBasis::Flat,
        });
    }

    push_service_fee(policy, fee_base, &mut lines);

    // Refundable, excluded from the commission-bearing subtotal.
    if let Some(deposit) = deposit {
        let amount = line_amount(deposit);
        if amount > Decimal::ZERO {
            lines.push(CostLine {
                category: CostCategory::Deposit,
                label: "Security deposit".to_string(),
                amount,
                basis: CostBasis::Flat,
            });
        }
    }

    lines
}

/// One line per selected extra. Per-person charges rate x quantity,
/// per-trip charges the rate once, per-day charges rate x quantity x days.
fn push_extra_lines(
    draft: &Draft,
    catalog: &CatalogSnapshot,
    day_factor: Decimal,
    lines: &mut Vec<CostLine>,
) {
    for selection in &draft.extras {
        let Some(extra) = catalog.extra(&selection.extra_id) else {
            continue;
        };
        let quantity = selection.quantity.max(1);

        let (amount, basis) = match extra.price_type {
            ExtraPriceType::Person => (
                line_amount(extra.price * Decimal::from(quantity)),
                CostBasis::PerUnit {
                    rate: extra.price,
                    quantity,
                },
            ),
            ExtraPriceType::Trip => (line_amount(extra.price), CostBasis::Flat),
            ExtraPriceType::Day => (
                line_amount(extra.price * Decimal::from(quantity) * day_factor),
                CostBasis::PerDay {
                    rate: extra.price * Decimal::from(quantity),
                    days: day_factor,
                },
            ),
        };

        let label = if quantity > 1 && extra.price_type != ExtraPriceType::Trip {
            format!("{} × {}", extra.name, quantity)
        } else {
            extra.name.clone()
        };

        lines.push(CostLine {
            category: CostCategory::Extra,
            label,
            amount,
            basis,
        });
    }
}

/// Service fee on the rounded vehicle+driver subtotal only.
fn push_service_fee(policy: PricingPolicy, fee_base: Decimal, lines: &mut Vec<CostLine>) {
    let fee = line_amount(fee_base * policy.service_fee_rate);
    if fee > Decimal::ZERO {
        let percent = (policy.service_fee_rate * dec!(100)).normalize();
        lines.push(CostLine {
            category: CostCategory::ServiceFee,
            label: format!("Service fee ({percent}%)"),
            amount: fee,
            basis: CostBasis::Flat,
        });
    }
}

fn line_amount(raw: Decimal) -> Decimal {
    round_money(raw).max(Decimal::ZERO)
}

// ==================== commission split ====================

/// Platform/supplier split of a rental snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionBreakdown {
    pub rental_commission: Decimal,
    pub insurance_commission: Decimal,
    pub addon_commission: Decimal,
    pub service_fee: Decimal,
    pub delivery_fee: Decimal,
    /// Category commissions + service fee + full delivery fee.
    pub platform_total: Decimal,
    /// What the vehicle owner receives: rental and insurance net of their
    /// commissions. Add-on payouts are not modeled.
    pub supplier_payout: Decimal,
    /// Snapshot subtotal minus deposit and entrance estimate.
    pub commission_bearing_subtotal: Decimal,
}

/// Split a snapshot between platform and supplier using the published
/// per-category percentages. Add-on commissions are rounded per line, the
/// delivery fee is retained in full, and the deposit never enters the
/// split.
pub fn split(snapshot: &PricingSnapshot, table: &CommissionTable) -> CommissionBreakdown {
    let mut rental_cost = Decimal::ZERO;
    let mut insurance_cost = Decimal::ZERO;
    let mut addon_commission = Decimal::ZERO;
    let mut service_fee = Decimal::ZERO;
    let mut delivery_fee = Decimal::ZERO;
    let mut commission_bearing_subtotal = Decimal::ZERO;

    for line in &snapshot.lines {
        match line.category {
            CostCategory::Vehicle | CostCategory::Driver => rental_cost += line.amount,
            CostCategory::Insurance => insurance_cost += line.amount,
            CostCategory::Extra => addon_commission += commission(line.amount, table.addon_pct),
            CostCategory::ServiceFee => service_fee += line.amount,
            CostCategory::Delivery => delivery_fee += line.amount,
            CostCategory::Entrance | CostCategory::Deposit => continue,
        }
        commission_bearing_subtotal += line.amount;
    }

    let rental_commission = commission(rental_cost, table.rental_pct);
    let insurance_commission = commission(insurance_cost, table.insurance_pct);

    CommissionBreakdown {
        rental_commission,
        insurance_commission,
        addon_commission,
        service_fee,
        delivery_fee,
        platform_total: rental_commission
            + insurance_commission
            + addon_commission
            + service_fee
            + delivery_fee,
        supplier_payout: (rental_cost - rental_commission)
            + (insurance_cost - insurance_commission),
        commission_bearing_subtotal,
    }
}

fn commission(cost: Decimal, percent: Decimal) -> Decimal {
    round_money(cost * percent / dec!(100))
}

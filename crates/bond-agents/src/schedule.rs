//! Synthetic cash-flow schedule generation
//!
//! The datasets carry no payment history, so the schedule is synthesized
//! from the bond's terms: semiannual coupons working back from the
//! redemption date, plus the principal at redemption.

use chrono::{Months, NaiveDate};
use serde::Serialize;

/// One projected payment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashFlow {
    pub date: NaiveDate,
    pub amount: f64,
    pub kind: CashFlowKind,
}

/// Payment classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CashFlowKind {
    Coupon,
    Principal,
}

impl CashFlowKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Coupon => "Coupon",
            Self::Principal => "Principal",
        }
    }
}

/// Remaining payments strictly after `from`, in date order
///
/// Coupon dates are every six months counting back from redemption; the
/// principal repays on the redemption date. A bond already past redemption
/// yields an empty schedule.
pub fn semiannual_schedule(
    face_value: f64,
    coupon_rate: f64,
    redemption: NaiveDate,
    from: NaiveDate,
) -> Vec<CashFlow> {
    let coupon = face_value * coupon_rate / 100.0 / 2.0;

    let mut coupon_dates = Vec::new();
    let mut date = redemption;
    while date > from {
        coupon_dates.push(date);
        match date.checked_sub_months(Months::new(6)) {
            Some(previous) => date = previous,
            None => break,
        }
    }
    coupon_dates.reverse();

    let mut flows: Vec<CashFlow> = coupon_dates
        .into_iter()
        .map(|date| CashFlow {
            date,
            amount: coupon,
            kind: CashFlowKind::Coupon,
        })
        .collect();

    if redemption > from {
        flows.push(CashFlow {
            date: redemption,
            amount: face_value,
            kind: CashFlowKind::Principal,
        });
    }
    flows
}

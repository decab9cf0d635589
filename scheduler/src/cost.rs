//! Transition waste and setup time: the two pure cost functions every
//! optimizer layers on top of. Both are deterministic in their two (or
//! three) inputs and never allocate.

use crate::types::{Machine, Order, ProcessFamily};

/// Cross-family changeover penalty: switching a machine between process
/// families always costs this fraction of the next order's mass.
const CROSS_FAMILY_WASTE: f64 = 0.15;

/// Fraction of `next.quantity_kg` scrapped transitioning from `prev` to
/// `next` on the same machine.
pub fn waste(prev: &Order, next: &Order) -> f64 {
    if prev.process_family != next.process_family {
        return CROSS_FAMILY_WASTE;
    }

    match next.process_family {
        ProcessFamily::Extrusion => {
            let same_material = prev.material_id == next.material_id;
            let same_color = prev.color == next.color;
            match (same_material, same_color) {
                (true, true) => 0.02,
                (true, false) => 0.05,
                (false, true) => 0.08,
                (false, false) => 0.12,
            }
        }
        ProcessFamily::Ringing => ringing_waste(prev, next),
        ProcessFamily::CorrugationSoft => {
            corrugation_waste(prev, next, 0.025, 0.04, 0.07)
        }
        ProcessFamily::CorrugationHard => {
            corrugation_waste(prev, next, 0.03, 0.05, 0.08)
        }
    }
}

fn parse_caliber(caliber: &str) -> Option<i64> {
    caliber.strip_prefix('D').and_then(|digits| digits.parse().ok())
}

fn ringing_waste(prev: &Order, next: &Order) -> f64 {
    let (Some(prev_caliber), Some(next_caliber)) = (&prev.caliber, &next.caliber) else {
        return 0.05;
    };
    let (Some(prev_val), Some(next_val)) =
        (parse_caliber(prev_caliber), parse_caliber(next_caliber))
    else {
        return 0.05;
    };

    if prev_val == next_val {
        return 0.015;
    }
    if (prev_val - next_val).abs() <= 50 {
        0.03
    } else {
        0.06
    }
}

fn corrugation_waste(prev: &Order, next: &Order, same: f64, small: f64, large: f64) -> f64 {
    let (Some(prev_t), Some(next_t)) = (prev.thickness_mm, next.thickness_mm) else {
        return 0.05;
    };

    if prev_t == next_t {
        return same;
    }
    if (prev_t - next_t).abs() <= 0.5 {
        small
    } else {
        large
    }
}

/// Changeover minutes for placing `next` on `machine` immediately after
/// `prev` (or first on the machine if `prev` is `None`).
pub fn setup_minutes(next: &Order, machine: &Machine, prev: Option<&Order>) -> i64 {
    let base = machine.base_setup_minutes;

    let Some(prev) = prev else {
        return base;
    };

    if prev.process_family != next.process_family {
        return base * 2;
    }

    let factor = waste(prev, next);
    base + (base as f64 * factor).floor() as i64
}

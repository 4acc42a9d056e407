// src/workforce.rs
//! Workforce headcounts, the hours-worked pool and the monthly-average
//! exposed workforce behind the incidence index.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::warn;

use crate::absence::{DEFAULT_WEEKLY_HOURS, DEFAULT_WORKING_DAYS};
use crate::model::{Employee, EmployeeStatus, Lookups, RoleClass};
use crate::period::{end_of_month, inclusive_days, AnalysisPeriod};

// 5 working days per 7 calendar days; holidays and branch calendars are
// intentionally out of the approximation.
const WORKDAYS_PER_WEEK: Decimal = dec!(5);
const CALENDAR_DAYS_PER_WEEK: Decimal = dec!(7);

// Backstop against absurd period spans (years are not validated).
const MAX_EXPOSURE_MONTHS: usize = 1200;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkforceSummary {
    pub total_trabajadores: u32,
    pub activos: u32,
    pub inactivos: u32,
    pub con_licencia: u32,
    pub operativos: u32,
    pub administrativos: u32,
    /// Gross pool; net hours come out after discounting accident and
    /// absence loss.
    pub horas_trabajadas_brutas: Decimal,
    pub promedio_expuestos: Decimal,
}

pub fn assess(
    employees: &[Employee],
    lookups: &Lookups<'_>,
    period: &AnalysisPeriod,
) -> WorkforceSummary {
    let mut summary = WorkforceSummary {
        total_trabajadores: employees.len() as u32,
        ..WorkforceSummary::default()
    };

    for employee in employees {
        match employee.estado {
            EmployeeStatus::Activo => summary.activos += 1,
            EmployeeStatus::Inactivo => summary.inactivos += 1,
            EmployeeStatus::Licencia => summary.con_licencia += 1,
        }
        match employee.cargo {
            Some(RoleClass::Operativo) => summary.operativos += 1,
            Some(RoleClass::Administrativo) => summary.administrativos += 1,
            None => {}
        }
        if employee.estado.is_employed() {
            summary.horas_trabajadas_brutas += hours_contribution(employee, lookups, period);
        }
    }

    summary.promedio_expuestos = monthly_average_exposed(employees, period);
    summary
}

/// Hours-per-day for the hours-worked pool and accident-loss math:
/// weekly hours fall back employee -> branch -> 40, divided by the
/// employee's (or branch's) working days, default 5.
pub fn hours_per_day(employee: &Employee, lookups: &Lookups<'_>) -> Decimal {
    let branch = lookups.branch_of(employee);
    let positive = |v: Decimal| (v > Decimal::ZERO).then_some(v);
    let weekly = employee
        .horas_semanales
        .and_then(positive)
        .or_else(|| branch.and_then(|b| b.horas_semanales).and_then(positive))
        .unwrap_or(DEFAULT_WEEKLY_HOURS);
    let days = employee
        .dias_laborales
        .and_then(positive)
        .or_else(|| branch.and_then(|b| b.dias_laborales).and_then(positive))
        .unwrap_or(DEFAULT_WORKING_DAYS);
    weekly / days
}

/// Per-employee hours contribution, prorated from the registration
/// date when the employee entered the system inside the period.
fn hours_contribution(
    employee: &Employee,
    lookups: &Lookups<'_>,
    period: &AnalysisPeriod,
) -> Decimal {
    let effective_start = match (period.inicio, employee.fecha_registro) {
        (Some(inicio), Some(registro)) => inicio.max(registro),
        (Some(inicio), None) => inicio,
        (None, Some(registro)) => registro,
        // Unbounded on both ends: nothing to count.
        (None, None) => return Decimal::ZERO,
    };
    let dias = inclusive_days(effective_start, period.fin);
    if dias <= 0 {
        return Decimal::ZERO;
    }
    let dias_laborales = Decimal::from(dias) * WORKDAYS_PER_WEEK / CALENDAR_DAYS_PER_WEEK;
    dias_laborales * hours_per_day(employee, lookups)
}

/// Average headcount that existed (registration-wise) at each month end
/// inside the period. Zero months falls back to the roster size.
fn monthly_average_exposed(employees: &[Employee], period: &AnalysisPeriod) -> Decimal {
    let roster = Decimal::from(employees.len() as u64);
    let Some(inicio) = period.inicio else {
        return roster;
    };
    let month_ends = month_ends_between(inicio, period.fin);
    if month_ends.is_empty() {
        return roster;
    }
    let total: u64 = month_ends
        .iter()
        .map(|month_end| {
            employees
                .iter()
                .filter(|e| e.fecha_registro.map_or(true, |r| r <= *month_end))
                .count() as u64
        })
        .sum();
    Decimal::from(total) / Decimal::from(month_ends.len() as u64)
}

fn month_ends_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let mut ends = Vec::new();
    let (mut year, mut month) = (start.year(), start.month());
    let last = (end.year(), end.month());
    while (year, month) <= last {
        ends.push(end_of_month(year, month));
        if ends.len() >= MAX_EXPOSURE_MONTHS {
            warn!(
                desde = start.year(),
                hasta = end.year(),
                "exposure window too long, capping the monthly scan"
            );
            break;
        }
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    ends
}

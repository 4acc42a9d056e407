// src/accidents.rs
//! Accident-sourced loss, period-scoped (historical, not "as of
//! today"): lost-time accident count, days/hours lost and the distinct
//! accidented employees feeding the incidence index.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::absence::DEFAULT_HOURS_PER_DAY;
use crate::model::{AccidentEvent, AccidentKind, InvolvedEmployee, Lookups};
use crate::period::{ceil_days, AnalysisPeriod};
use crate::workforce::hours_per_day;
use crate::EmployeeId;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentLossSummary {
    /// In-period accident-kind records with at least one on-leave
    /// involved employee.
    pub accidentes_con_baja: u32,
    pub dias_perdidos: i64,
    /// Discounted from the gross hours-worked pool downstream.
    pub horas_perdidas: Decimal,
    pub trabajadores_accidentados: BTreeSet<EmployeeId>,
}

pub fn assess(
    accidents: &[AccidentEvent],
    period: &AnalysisPeriod,
    now: DateTime<Utc>,
    lookups: &Lookups<'_>,
) -> AccidentLossSummary {
    let mut summary = AccidentLossSummary::default();

    for accident in accidents {
        if accident.tipo != AccidentKind::Accidente {
            continue;
        }
        let Some(fecha) = accident.fecha else {
            debug!(accidente = %accident.id, "accident without timestamp, skipped");
            continue;
        };
        if !period.contains(fecha) {
            continue;
        }
        let on_leave: Vec<&InvolvedEmployee> = accident
            .involucrados
            .iter()
            .filter(|i| i.con_reposo)
            .collect();
        if on_leave.is_empty() {
            continue;
        }
        summary.accidentes_con_baja += 1;

        for involved in on_leave {
            let dias = match involved.dias_perdidos {
                // Recorded value is authoritative (closed case).
                Some(recorded) => recorded.max(0),
                None => derived_days(involved, fecha, period, now),
            };
            let horas_dia = involved_hours_per_day(&involved.trabajador_id, lookups);
            summary.dias_perdidos += dias;
            summary.horas_perdidas += Decimal::from(dias) * horas_dia;
            summary
                .trabajadores_accidentados
                .insert(involved.trabajador_id.clone());
        }
    }

    summary
}

/// `ceil((min(fin ?? now, period.fin) - max(inicio ?? accidente,
/// period.inicio)) / day)`, floored at zero.
fn derived_days(
    involved: &InvolvedEmployee,
    accident_date: DateTime<Utc>,
    period: &AnalysisPeriod,
    now: DateTime<Utc>,
) -> i64 {
    let leave_start = involved.inicio_reposo.unwrap_or(accident_date);
    let lo = match period.inicio {
        Some(inicio) => leave_start.max(inicio),
        None => leave_start,
    };
    let hi = involved.fin_reposo.unwrap_or(now).min(period.fin);
    ceil_days(lo, hi)
}

/// Branch-aware hours-per-day; unknown employees fall to the 8h default.
fn involved_hours_per_day(id: &str, lookups: &Lookups<'_>) -> Decimal {
    lookups
        .employee(id)
        .map(|e| hours_per_day(e, lookups))
        .unwrap_or(DEFAULT_HOURS_PER_DAY)
}

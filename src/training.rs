// src/training.rs
//! Training compliance: per-type counts, distinct-attendee coverage and
//! expired-training detection.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::indices::round2;
use crate::model::{Employee, TrainingKind, TrainingSession, TrainingStatus};
use crate::period::AnalysisPeriod;
use crate::EmployeeId;

const EXPIRY_DAYS: i64 = 365;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSummary {
    pub total: u32,
    pub completadas: u32,
    pub activas: u32,
    pub charlas: u32,
    pub simulacros: u32,
    pub capacitaciones: u32,
    pub asistentes_distintos: u32,
    /// Distinct attendees over the roster size, as a percentage.
    pub cumplimiento: Decimal,
    /// Employees with no attendance in-period, or whose last attended
    /// session is more than a year old.
    pub vencidos: Vec<EmployeeId>,
}

pub fn assess(
    sessions: &[TrainingSession],
    employees: &[Employee],
    period: &AnalysisPeriod,
    now: DateTime<Utc>,
) -> TrainingSummary {
    let mut summary = TrainingSummary::default();
    let mut in_period_attendees: HashSet<&str> = HashSet::new();
    // Most recent attended session per employee, any period.
    let mut last_attended: HashMap<&str, DateTime<Utc>> = HashMap::new();

    for session in sessions {
        let Some(fecha) = session.fecha_realizacion else {
            continue;
        };
        for attendance in &session.asistentes {
            if !attendance.asistio {
                continue;
            }
            last_attended
                .entry(attendance.trabajador_id.as_str())
                .and_modify(|d| *d = (*d).max(fecha))
                .or_insert(fecha);
        }
        if !period.contains(fecha) {
            continue;
        }

        summary.total += 1;
        match session.estado {
            TrainingStatus::Completada => summary.completadas += 1,
            TrainingStatus::Activa => summary.activas += 1,
        }
        match session.tipo {
            TrainingKind::Charla => summary.charlas += 1,
            TrainingKind::Simulacro => summary.simulacros += 1,
            TrainingKind::Capacitacion => summary.capacitaciones += 1,
        }
        for attendance in &session.asistentes {
            if attendance.asistio {
                in_period_attendees.insert(attendance.trabajador_id.as_str());
            }
        }
    }

    summary.asistentes_distintos = in_period_attendees.len() as u32;
    summary.cumplimiento = if employees.is_empty() {
        Decimal::ZERO
    } else {
        round2(
            Decimal::from(summary.asistentes_distintos) * Decimal::from(100u32)
                / Decimal::from(employees.len() as u64),
        )
    };

    let expiry_cutoff = now - Duration::days(EXPIRY_DAYS);
    let vencidos: BTreeSet<EmployeeId> = employees
        .iter()
        .filter(|e| e.estado.is_employed())
        .filter(|e| {
            let attended_in_period = in_period_attendees.contains(e.id.as_str());
            let stale = last_attended
                .get(e.id.as_str())
                .map_or(true, |last| *last < expiry_cutoff);
            !attended_in_period || stale
        })
        .map(|e| e.id.clone())
        .collect();
    summary.vencidos = vencidos.into_iter().collect();

    summary
}

// src/health.rs
//! Occupational health aggregation: clamps every absence case into the
//! analysis window, prorates days/hours and keeps the non-accident
//! subtotal that avoids double counting accident-sourced loss.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::absence::{self, CaseKind, NormalizedCase};
use crate::model::{AbsenceRecord, Employee};
use crate::period::{inclusive_days, AnalysisPeriod};

const RECENT_CASES_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSummary {
    pub total_casos: u32,
    pub casos_abiertos: u32,
    pub casos_cerrados: u32,
    pub casos_por_tipo: BTreeMap<CaseKind, u32>,
    pub dias_perdidos: i64,
    pub horas_perdidas: Decimal,
    /// Loss excluding accident-linked cases; accident-sourced loss is
    /// accounted for by the accident loss calculator.
    pub dias_perdidos_sin_accidente: i64,
    pub horas_perdidas_sin_accidente: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub resumen: HealthSummary,
    pub casos: Vec<NormalizedCase>,
    pub casos_recientes: Vec<NormalizedCase>,
}

/// Aggregates raw absence records over the window.
///
/// `resolve_hours_per_day` and `resolve_employee` are caller-supplied
/// collaborators; they must be total, and a panic inside them
/// propagates to the caller.
pub fn aggregate<'e, H, E>(
    records: &[AbsenceRecord],
    period: &AnalysisPeriod,
    now: DateTime<Utc>,
    resolve_hours_per_day: H,
    resolve_employee: E,
) -> HealthReport
where
    H: Fn(&AbsenceRecord) -> Decimal,
    E: Fn(&AbsenceRecord) -> Option<&'e Employee>,
{
    let mut resumen = HealthSummary::default();
    let mut casos: Vec<NormalizedCase> = Vec::with_capacity(records.len());

    for rec in records {
        let Some(start) = rec.start_date() else {
            debug!(caso = %rec.id, "absence record without resolvable start, skipped");
            continue;
        };
        let end = rec.end_date();
        // Open cases prorate up to `now` before clamping.
        let Some((lo, hi)) = period.clamp(start, end.unwrap_or(now)) else {
            debug!(caso = %rec.id, "absence record outside the window, skipped");
            continue;
        };
        let dias = inclusive_days(lo, hi);
        if dias <= 0 {
            continue;
        }
        let horas = (Decimal::from(dias) * resolve_hours_per_day(rec)).max(Decimal::ZERO);

        let perfil = absence::profile(rec);
        resumen.total_casos += 1;
        if perfil.abierto {
            resumen.casos_abiertos += 1;
        } else {
            resumen.casos_cerrados += 1;
        }
        *resumen.casos_por_tipo.entry(perfil.tipo).or_insert(0) += 1;
        resumen.dias_perdidos += dias;
        resumen.horas_perdidas += horas;
        if !perfil.relacion_accidente {
            resumen.dias_perdidos_sin_accidente += dias;
            resumen.horas_perdidas_sin_accidente += horas;
        }

        casos.push(NormalizedCase {
            id: rec.id.clone(),
            trabajador_id: rec.trabajador_id.clone(),
            trabajador: resolve_employee(rec).and_then(|e| e.nombre.clone()),
            tipo: perfil.tipo,
            etiqueta: perfil.etiqueta,
            abierto: perfil.abierto,
            relacion_accidente: perfil.relacion_accidente,
            fecha_inicio: start,
            fecha_termino: end,
            dias_en_periodo: dias,
            horas_en_periodo: horas,
        });
    }

    let casos_recientes = recent_cases(&casos);
    HealthReport {
        resumen,
        casos,
        casos_recientes,
    }
}

/// Newest first; equal start dates break ties on case id so truncation
/// is stable regardless of input order.
fn recent_cases(casos: &[NormalizedCase]) -> Vec<NormalizedCase> {
    let mut ordered = casos.to_vec();
    ordered.sort_by(|a, b| {
        b.fecha_inicio
            .cmp(&a.fecha_inicio)
            .then_with(|| a.id.cmp(&b.id))
    });
    ordered.truncate(RECENT_CASES_LIMIT);
    ordered
}

// src/breakdown.rs
//! Accident vs incident breakdown: kind/lost-time/open-closed splits,
//! the incident-to-accident reporting ratio and the per-area
//! distribution. Independent of the index pipeline.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::absence::is_closed_status;
use crate::indices::round2;
use crate::model::{AccidentEvent, AccidentKind, Lookups};
use crate::period::AnalysisPeriod;

const NO_AREA_LABEL: &str = "Sin área";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaCount {
    pub area: String,
    pub accidentes: u32,
    pub incidentes: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownSummary {
    pub total_eventos: u32,
    pub accidentes: u32,
    pub incidentes: u32,
    pub accidentes_con_baja: u32,
    pub accidentes_sin_baja: u32,
    pub abiertos: u32,
    pub cerrados: u32,
    /// `incidentes / accidentes` at 2 decimals; the raw incident count
    /// when there are no accidents to divide by.
    pub razon_incidente_accidente: Decimal,
    /// Sorted by total descending, area name ascending on ties.
    pub por_area: Vec<AreaCount>,
}

impl BreakdownSummary {
    /// The consumers' usual view: the heaviest `n` areas.
    pub fn top_areas(&self, n: usize) -> &[AreaCount] {
        &self.por_area[..n.min(self.por_area.len())]
    }
}

pub fn analyze(
    accidents: &[AccidentEvent],
    period: &AnalysisPeriod,
    lookups: &Lookups<'_>,
) -> BreakdownSummary {
    let mut summary = BreakdownSummary::default();
    let mut areas: HashMap<String, (u32, u32)> = HashMap::new();

    for event in accidents {
        let Some(fecha) = event.fecha else { continue };
        if !period.contains(fecha) {
            continue;
        }
        summary.total_eventos += 1;

        let is_accident = event.tipo == AccidentKind::Accidente;
        if is_accident {
            summary.accidentes += 1;
            if event.involucrados.iter().any(|i| i.con_reposo) {
                summary.accidentes_con_baja += 1;
            } else {
                summary.accidentes_sin_baja += 1;
            }
        } else {
            summary.incidentes += 1;
        }

        if event.estado.as_deref().is_some_and(is_closed_status) {
            summary.cerrados += 1;
        } else {
            summary.abiertos += 1;
        }

        for involved in &event.involucrados {
            let area = lookups
                .employee(&involved.trabajador_id)
                .and_then(|e| e.area.clone())
                .unwrap_or_else(|| NO_AREA_LABEL.to_string());
            let counters = areas.entry(area).or_insert((0, 0));
            if is_accident {
                counters.0 += 1;
            } else {
                counters.1 += 1;
            }
        }
    }

    summary.razon_incidente_accidente = if summary.accidentes > 0 {
        round2(Decimal::from(summary.incidentes) / Decimal::from(summary.accidentes))
    } else {
        Decimal::from(summary.incidentes)
    };

    let mut por_area: Vec<AreaCount> = areas
        .into_iter()
        .map(|(area, (accidentes, incidentes))| AreaCount {
            area,
            accidentes,
            incidentes,
            total: accidentes + incidentes,
        })
        .collect();
    por_area.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.area.cmp(&b.area)));
    summary.por_area = por_area;

    summary
}

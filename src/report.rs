// src/report.rs
//! Pass orchestration: builds the lookup maps once, runs every
//! aggregator over one resolved window and assembles the report the
//! dashboard consumes. Also hosts the year-over-year comparator.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::{debug, info};

use crate::absence;
use crate::accidents::{self, AccidentLossSummary};
use crate::breakdown::{self, BreakdownSummary};
use crate::classification::{self, ClassificationTally};
use crate::health::{self, HealthReport};
use crate::indices::{self, round2, ExposureInputs, IndexSet};
use crate::model::{AbsenceRecord, Lookups, SafetyDataSet};
use crate::period::AnalysisPeriod;
use crate::training::{self, TrainingSummary};
use crate::workforce::{self, WorkforceSummary};

/// Change classified as improvement/worsening beyond this many percent.
const VARIATION_THRESHOLD: Decimal = dec!(5);

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureSummary {
    pub horas_trabajadas_brutas: Decimal,
    pub horas_trabajadas_netas: Decimal,
    pub horas_perdidas_totales: Decimal,
    pub horas_perdidas_por_accidentes: Decimal,
    pub horas_perdidas_por_ausencias: Decimal,
    pub dias_perdidos_totales: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub total: u32,
    pub abiertas: u32,
    pub cerradas: u32,
    pub clasificaciones: ClassificationTally,
    pub no_conformidades: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyReport {
    pub periodo: AnalysisPeriod,
    pub fuerza_laboral: WorkforceSummary,
    pub salud_ocupacional: HealthReport,
    pub perdidas_accidentes: AccidentLossSummary,
    pub exposicion: ExposureSummary,
    pub indices: IndexSet,
    pub desglose: BreakdownSummary,
    pub capacitaciones: TrainingSummary,
    pub auditorias: AuditSummary,
}

/// One engine per data set: lookup maps are built once and shared,
/// read-only, by every component of every pass.
pub struct MetricsEngine<'a> {
    data: &'a SafetyDataSet,
    lookups: Lookups<'a>,
}

impl<'a> MetricsEngine<'a> {
    pub fn new(data: &'a SafetyDataSet) -> Self {
        Self {
            data,
            lookups: Lookups::build(data),
        }
    }

    pub fn annual_report(&self, year: i32, now: DateTime<Utc>) -> SafetyReport {
        self.report_for(AnalysisPeriod::for_year(year, now), now)
    }

    pub fn monthly_report(&self, year: i32, month: u32, now: DateTime<Utc>) -> SafetyReport {
        self.report_for(AnalysisPeriod::for_month(year, month, now), now)
    }

    pub fn report_for(&self, periodo: AnalysisPeriod, now: DateTime<Utc>) -> SafetyReport {
        debug!(?periodo, "running aggregation pass");

        let fuerza_laboral =
            workforce::assess(&self.data.trabajadores, &self.lookups, &periodo);

        let salud_ocupacional = health::aggregate(
            &self.data.ausencias,
            &periodo,
            now,
            |rec: &AbsenceRecord| {
                let employee = self.lookups.employee(&rec.trabajador_id);
                let branch = employee.and_then(|e| self.lookups.branch_of(e));
                absence::resolve_hours_per_day(rec, employee, branch)
            },
            |rec: &AbsenceRecord| self.lookups.employee(&rec.trabajador_id),
        );

        let perdidas_accidentes =
            accidents::assess(&self.data.accidentes, &periodo, now, &self.lookups);

        // Net pool: accident and non-accident loss discounted exactly
        // once each (accident-linked absences stay out of the absence
        // subtotal).
        let horas_perdidas_por_accidentes = perdidas_accidentes.horas_perdidas;
        let horas_perdidas_por_ausencias =
            salud_ocupacional.resumen.horas_perdidas_sin_accidente;
        let horas_perdidas_totales =
            horas_perdidas_por_accidentes + horas_perdidas_por_ausencias;
        let horas_trabajadas_netas = (fuerza_laboral.horas_trabajadas_brutas
            - horas_perdidas_totales)
            .max(Decimal::ZERO);
        let dias_perdidos_totales = perdidas_accidentes.dias_perdidos
            + salud_ocupacional.resumen.dias_perdidos_sin_accidente;

        let indices = indices::compute(&ExposureInputs {
            horas_netas: horas_trabajadas_netas,
            accidentes_con_baja: perdidas_accidentes.accidentes_con_baja,
            dias_perdidos_totales,
            promedio_expuestos: fuerza_laboral.promedio_expuestos,
            trabajadores_accidentados: perdidas_accidentes.trabajadores_accidentados.len() as u32,
            horas_perdidas_accidentes: horas_perdidas_por_accidentes,
            horas_perdidas_ausencias: horas_perdidas_por_ausencias,
        });

        let exposicion = ExposureSummary {
            horas_trabajadas_brutas: fuerza_laboral.horas_trabajadas_brutas,
            horas_trabajadas_netas,
            horas_perdidas_totales,
            horas_perdidas_por_accidentes,
            horas_perdidas_por_ausencias,
            dias_perdidos_totales,
        };

        let desglose = breakdown::analyze(&self.data.accidentes, &periodo, &self.lookups);
        let capacitaciones = training::assess(
            &self.data.capacitaciones,
            &self.data.trabajadores,
            &periodo,
            now,
        );
        let auditorias = audit_summary(self.data, &periodo);

        info!(
            casos = salud_ocupacional.resumen.total_casos,
            accidentes_con_baja = perdidas_accidentes.accidentes_con_baja,
            "aggregation pass finished"
        );

        SafetyReport {
            periodo,
            fuerza_laboral,
            salud_ocupacional,
            perdidas_accidentes,
            exposicion,
            indices,
            desglose,
            capacitaciones,
            auditorias,
        }
    }

    /// Runs the full pipeline for `year` and `year - 1` over the same
    /// inputs and classifies the per-index variation.
    pub fn compare_years(&self, year: i32, now: DateTime<Utc>) -> YearComparison {
        let actual = self.annual_report(year, now);
        let anterior = self.annual_report(year - 1, now);
        let variaciones = IndexVariations {
            frecuencia: variation(
                anterior.indices.frecuencia.tecnico,
                actual.indices.frecuencia.tecnico,
            ),
            severidad: variation(
                anterior.indices.severidad.tecnico,
                actual.indices.severidad.tecnico,
            ),
            incidencia: variation(
                anterior.indices.incidencia.tecnico,
                actual.indices.incidencia.tecnico,
            ),
            accidentabilidad: variation(
                anterior.indices.accidentabilidad.tecnico,
                actual.indices.accidentabilidad.tecnico,
            ),
        };
        YearComparison {
            anio_actual: year,
            anio_anterior: year - 1,
            actual,
            anterior,
            variaciones,
        }
    }
}

fn audit_summary(data: &SafetyDataSet, periodo: &AnalysisPeriod) -> AuditSummary {
    let mut summary = AuditSummary::default();
    for audit in &data.auditorias {
        let Some(fecha) = audit.fecha_creacion else {
            continue;
        };
        if !periodo.contains(fecha) {
            continue;
        }
        summary.total += 1;
        if audit
            .estado
            .as_deref()
            .is_some_and(absence::is_closed_status)
        {
            summary.cerradas += 1;
        } else {
            summary.abiertas += 1;
        }
        let tally = classification::tally_audit(audit);
        summary.clasificaciones.condicion += tally.condicion;
        summary.clasificaciones.actitud += tally.actitud;
        if let Some(nc) = &audit.no_conformidades {
            summary.no_conformidades += classification::sum_numeric_leaves(nc);
        }
    }
    summary
}

// --- Year-over-year variation ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariationKind {
    Mejora,
    Empeora,
    SinCambio,
    Nuevo,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    pub valor: Decimal,
    pub tipo: VariationKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexVariations {
    pub frecuencia: Variation,
    pub severidad: Variation,
    pub incidencia: Variation,
    pub accidentabilidad: Variation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearComparison {
    pub anio_actual: i32,
    pub anio_anterior: i32,
    pub actual: SafetyReport,
    pub anterior: SafetyReport,
    pub variaciones: IndexVariations,
}

/// Signed percentage change; lower index values are improvements. A
/// zero/absent previous value classifies as new (100) or no-change (0).
pub fn variation(previous: Decimal, current: Decimal) -> Variation {
    if previous == Decimal::ZERO {
        return if current == Decimal::ZERO {
            Variation {
                valor: Decimal::ZERO,
                tipo: VariationKind::SinCambio,
            }
        } else {
            Variation {
                valor: dec!(100),
                tipo: VariationKind::Nuevo,
            }
        };
    }
    let valor = round2((current - previous) / previous * dec!(100));
    let tipo = if valor < -VARIATION_THRESHOLD {
        VariationKind::Mejora
    } else if valor > VARIATION_THRESHOLD {
        VariationKind::Empeora
    } else {
        VariationKind::SinCambio
    };
    Variation { valor, tipo }
}

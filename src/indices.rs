// src/indices.rs
//! The final KPI set. Every index carries a full-precision-derived
//! technical value (stored at 2 decimals) and a displayable value that
//! is always `round(technical / 1000, 1)`. Formulas degrade to exactly
//! zero on a zero denominator, never NaN or infinity.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

const MILLION: Decimal = dec!(1_000_000);
const THOUSAND: Decimal = dec!(1000);

/// Half-up rounding at 2 decimals, matching the dashboard convention.
pub(crate) fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub(crate) fn round1(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResult {
    pub tecnico: Decimal,
    pub display: Decimal,
    pub unidad: String,
    pub descripcion: String,
}

impl IndexResult {
    fn new(raw: Decimal, unidad: &str, descripcion: &str) -> Self {
        let tecnico = round2(raw);
        Self {
            tecnico,
            display: round1(tecnico / THOUSAND),
            unidad: unidad.to_string(),
            descripcion: descripcion.to_string(),
        }
    }
}

/// Everything the index formulas need, produced by the workforce,
/// health and accident calculators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExposureInputs {
    /// Net hours worked: gross pool minus accident and absence loss.
    pub horas_netas: Decimal,
    pub accidentes_con_baja: u32,
    /// Accident-sourced days plus non-accident absence days.
    pub dias_perdidos_totales: i64,
    /// Monthly-average exposed workforce.
    pub promedio_expuestos: Decimal,
    pub trabajadores_accidentados: u32,
    pub horas_perdidas_accidentes: Decimal,
    pub horas_perdidas_ausencias: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSet {
    pub ausentismo: IndexResult,
    pub frecuencia: IndexResult,
    pub severidad: IndexResult,
    pub incidencia: IndexResult,
    pub accidentabilidad: IndexResult,
}

pub fn compute(inputs: &ExposureInputs) -> IndexSet {
    let horas_netas = inputs.horas_netas.max(Decimal::ZERO);
    let horas_perdidas = inputs.horas_perdidas_accidentes + inputs.horas_perdidas_ausencias;

    let ausentismo_raw = {
        let denominador = horas_netas + horas_perdidas;
        if denominador > Decimal::ZERO {
            horas_perdidas / denominador * dec!(100)
        } else {
            Decimal::ZERO
        }
    };
    let frecuencia_raw = if horas_netas > Decimal::ZERO {
        Decimal::from(inputs.accidentes_con_baja) * MILLION / horas_netas
    } else {
        Decimal::ZERO
    };
    let severidad_raw = if horas_netas > Decimal::ZERO {
        Decimal::from(inputs.dias_perdidos_totales) * MILLION / horas_netas
    } else {
        Decimal::ZERO
    };
    let incidencia_raw = if inputs.promedio_expuestos > Decimal::ZERO {
        Decimal::from(inputs.trabajadores_accidentados) * THOUSAND / inputs.promedio_expuestos
    } else {
        Decimal::ZERO
    };

    let frecuencia = IndexResult::new(
        frecuencia_raw,
        "acc. / millón HH",
        "Accidentes con tiempo perdido por millón de horas-hombre trabajadas",
    );
    let severidad = IndexResult::new(
        severidad_raw,
        "días / millón HH",
        "Días perdidos por millón de horas-hombre trabajadas",
    );
    let accidentabilidad = IndexResult::new(
        frecuencia.tecnico + severidad.tecnico,
        "índice combinado",
        "Suma de los índices de frecuencia y severidad",
    );

    IndexSet {
        ausentismo: IndexResult::new(
            ausentismo_raw,
            "%",
            "Porcentaje de horas-persona perdidas por accidentes y ausencias",
        ),
        frecuencia,
        severidad,
        incidencia: IndexResult::new(
            incidencia_raw,
            "trab. / 1.000 expuestos",
            "Trabajadores accidentados por cada mil expuestos (promedio mensual)",
        ),
        accidentabilidad,
    }
}

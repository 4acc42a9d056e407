// src/absence.rs
//! Case normalization: resolves a raw absence/medical-leave record's
//! type, open/closed state, accident linkage and hours-per-day. Every
//! resolver is total; unknown free text lands on a documented default.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::model::{normalize_text, AbsenceRecord, Branch, Employee};
use crate::EmployeeId;

pub const DEFAULT_HOURS_PER_DAY: Decimal = dec!(8);
pub const DEFAULT_WEEKLY_HOURS: Decimal = dec!(40);
pub const DEFAULT_WORKING_DAYS: Decimal = dec!(5);

// Keyword vocabularies, matched against normalized (trimmed,
// lower-cased, accent-stripped) type/reason/description text.
const COVID_KEYWORDS: &[&str] = &["covid", "coronavirus", "sars-cov"];
const OCCUPATIONAL_KEYWORDS: &[&str] = &["enfermedad profesional", "profesional"];
const ACCIDENT_KEYWORDS: &[&str] = &["accidente", "trayecto"];
const SPECIAL_LEAVE_KEYWORDS: &[&str] = &[
    "permiso",
    "especial",
    "maternal",
    "paternal",
    "matrimonio",
    "fallecimiento",
];
const ORDINARY_ILLNESS_KEYWORDS: &[&str] = &["enfermedad", "licencia medica", "licencia"];

static CLOSED_STATUS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(cerrad[oa]|finalizad[oa]|resuelto)$").expect("static closed-status pattern")
});

/// Whether an explicit status field reads as closed.
pub(crate) fn is_closed_status(raw: &str) -> bool {
    CLOSED_STATUS.is_match(&normalize_text(raw))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseKind {
    Covid,
    EnfermedadProfesional,
    Accidente,
    PermisoEspecial,
    EnfermedadComun,
    Otro,
}

impl CaseKind {
    pub fn etiqueta(self) -> &'static str {
        match self {
            Self::Covid => "COVID-19",
            Self::EnfermedadProfesional => "Enfermedad profesional",
            Self::Accidente => "Accidente laboral",
            Self::PermisoEspecial => "Permiso especial",
            Self::EnfermedadComun => "Enfermedad común",
            Self::Otro => "Otro",
        }
    }
}

/// The per-record resolution the aggregator consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseProfile {
    pub tipo: CaseKind,
    pub etiqueta: String,
    pub abierto: bool,
    pub relacion_accidente: bool,
}

/// Resolves type, open/closed state and accident linkage for one record.
pub fn profile(rec: &AbsenceRecord) -> CaseProfile {
    let haystack = free_text(rec);
    let tipo = resolve_kind(&haystack);
    let etiqueta = match tipo {
        CaseKind::Otro => rec
            .tipo
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(CaseKind::Otro.etiqueta())
            .to_string(),
        known => known.etiqueta().to_string(),
    };
    CaseProfile {
        tipo,
        etiqueta,
        abierto: resolve_is_open(rec),
        relacion_accidente: resolve_accident_linked(rec, &haystack),
    }
}

fn free_text(rec: &AbsenceRecord) -> String {
    let joined = [&rec.tipo, &rec.motivo, &rec.descripcion]
        .into_iter()
        .filter_map(|f| f.as_deref())
        .collect::<Vec<_>>()
        .join(" ");
    normalize_text(&joined)
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

// Priority order matters: COVID beats occupational illness beats
// accident linkage beats leave/permit beats ordinary illness.
// "Licencia por accidente laboral" must resolve as an accident, not as
// a generic "licencia".
fn resolve_kind(haystack: &str) -> CaseKind {
    if contains_any(haystack, COVID_KEYWORDS) {
        CaseKind::Covid
    } else if contains_any(haystack, OCCUPATIONAL_KEYWORDS) {
        CaseKind::EnfermedadProfesional
    } else if contains_any(haystack, ACCIDENT_KEYWORDS) {
        CaseKind::Accidente
    } else if contains_any(haystack, SPECIAL_LEAVE_KEYWORDS) {
        CaseKind::PermisoEspecial
    } else if contains_any(haystack, ORDINARY_ILLNESS_KEYWORDS) {
        CaseKind::EnfermedadComun
    } else {
        CaseKind::Otro
    }
}

/// Explicit status wins; without one, an end date closes the case.
fn resolve_is_open(rec: &AbsenceRecord) -> bool {
    let estado = rec
        .estado
        .as_deref()
        .map(normalize_text)
        .filter(|s| !s.is_empty());
    match estado {
        Some(token) => !CLOSED_STATUS.is_match(&token),
        None => rec.end_date().is_none(),
    }
}

fn resolve_accident_linked(rec: &AbsenceRecord, haystack: &str) -> bool {
    rec.accidente_id
        .as_deref()
        .is_some_and(|id| !id.trim().is_empty())
        || rec.relacion_accidente
        || contains_any(haystack, ACCIDENT_KEYWORDS)
}

// --- Hours-per-day fallback chain ---
//
// Ordered resolvers, first Some wins:
//   case explicit -> case weekly/working-days -> employee schedule
//   -> branch schedule -> 8h.

fn positive(value: Decimal) -> Option<Decimal> {
    (value > Decimal::ZERO).then_some(value)
}

fn explicit_case_hours(rec: &AbsenceRecord) -> Option<Decimal> {
    rec.horas_por_dia.and_then(positive)
}

fn case_weekly_hours(rec: &AbsenceRecord) -> Option<Decimal> {
    let weekly = rec.horas_semanales.and_then(positive)?;
    let days = rec
        .dias_laborales
        .and_then(positive)
        .unwrap_or(DEFAULT_WORKING_DAYS);
    Some(weekly / days)
}

fn employee_schedule_hours(employee: Option<&Employee>) -> Option<Decimal> {
    let employee = employee?;
    let weekly = employee.horas_semanales.and_then(positive)?;
    let days = employee
        .dias_laborales
        .and_then(positive)
        .unwrap_or(DEFAULT_WORKING_DAYS);
    Some(weekly / days)
}

fn branch_schedule_hours(branch: Option<&Branch>) -> Option<Decimal> {
    let branch = branch?;
    let weekly = branch.horas_semanales.and_then(positive)?;
    let days = branch
        .dias_laborales
        .and_then(positive)
        .unwrap_or(DEFAULT_WORKING_DAYS);
    Some(weekly / days)
}

pub fn resolve_hours_per_day(
    rec: &AbsenceRecord,
    employee: Option<&Employee>,
    branch: Option<&Branch>,
) -> Decimal {
    explicit_case_hours(rec)
        .or_else(|| case_weekly_hours(rec))
        .or_else(|| employee_schedule_hours(employee))
        .or_else(|| branch_schedule_hours(branch))
        .unwrap_or(DEFAULT_HOURS_PER_DAY)
}

/// A case clamped into the analysis window. Constructed per aggregation
/// pass, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedCase {
    pub id: String,
    pub trabajador_id: EmployeeId,
    pub trabajador: Option<String>,
    pub tipo: CaseKind,
    pub etiqueta: String,
    pub abierto: bool,
    pub relacion_accidente: bool,
    pub fecha_inicio: DateTime<Utc>,
    pub fecha_termino: Option<DateTime<Utc>>,
    pub dias_en_periodo: i64,
    pub horas_en_periodo: Decimal,
}

// src/model.rs
//! Input data model: the plain records the document store hands us,
//! plus the lenient field parsing that keeps deserialization total.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{BranchId, EmployeeId};

/// Trims, lower-cases and strips Spanish diacritics so free-text
/// vocabulary checks are accent- and case-insensitive.
pub(crate) fn normalize_text(raw: &str) -> String {
    raw.trim().to_lowercase().chars().map(fold_accent).collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        _ => c,
    }
}

/// Lenient timestamp parsing. The store is not consistent about date
/// encodings, so we accept RFC 3339, bare datetimes, bare dates and
/// epoch milliseconds; anything else is treated as absent.
pub(crate) mod lenient_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use tracing::debug;

    pub(crate) fn parse(raw: &Value) -> Option<DateTime<Utc>> {
        match raw {
            Value::String(s) => parse_str(s.trim()),
            Value::Number(n) => n
                .as_i64()
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            _ => None,
        }
    }

    fn parse_str(s: &str) -> Option<DateTime<Utc>> {
        if s.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Utc.from_utc_datetime(&dt));
            }
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return d.and_hms_opt(0, 0, 0).map(|dt| Utc.from_utc_datetime(&dt));
        }
        debug!(value = s, "unparseable date, treated as absent");
        None
    }

    pub(crate) fn optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(raw.as_ref().and_then(parse))
    }
}

// --- Roster ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmployeeStatus {
    #[default]
    Activo,
    Inactivo,
    Licencia,
}

impl EmployeeStatus {
    fn from_raw(raw: &str) -> Self {
        match normalize_text(raw).as_str() {
            "inactivo" | "inactive" | "deshabilitado" | "baja" => Self::Inactivo,
            "licencia" | "con licencia" | "reposo" | "on_leave" | "on leave" => Self::Licencia,
            _ => Self::Activo,
        }
    }

    /// On-leave employees are still employed; only `Inactivo` is out.
    pub fn is_employed(self) -> bool {
        !matches!(self, Self::Inactivo)
    }
}

impl<'de> Deserialize<'de> for EmployeeStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::from_raw).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleClass {
    Operativo,
    Administrativo,
}

impl RoleClass {
    fn from_raw(raw: &str) -> Option<Self> {
        match normalize_text(raw).as_str() {
            "operativo" | "operario" | "operador" | "operator" => Some(Self::Operativo),
            "administrativo" | "administrative" | "admin" | "oficina" => Some(Self::Administrativo),
            _ => None,
        }
    }
}

fn opt_role_class<'de, D>(deserializer: D) -> Result<Option<RoleClass>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(RoleClass::from_raw))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    #[serde(default, alias = "nombreCompleto")]
    pub nombre: Option<String>,
    #[serde(default)]
    pub estado: EmployeeStatus,
    #[serde(default, alias = "rol", deserialize_with = "opt_role_class")]
    pub cargo: Option<RoleClass>,
    /// Authoritative "exists since" signal; hours worked never accrue
    /// before this instant.
    #[serde(
        default,
        alias = "createdAt",
        alias = "fechaCreacion",
        alias = "fechaIngreso",
        deserialize_with = "lenient_date::optional"
    )]
    pub fecha_registro: Option<DateTime<Utc>>,
    #[serde(default)]
    pub horas_semanales: Option<Decimal>,
    #[serde(default)]
    pub dias_laborales: Option<Decimal>,
    #[serde(default, alias = "sucursal")]
    pub sucursal_id: Option<BranchId>,
    #[serde(default)]
    pub area: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: BranchId,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub horas_semanales: Option<Decimal>,
    #[serde(default)]
    pub dias_laborales: Option<Decimal>,
}

// --- Accident / incident reports ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccidentKind {
    #[default]
    Accidente,
    Incidente,
}

impl AccidentKind {
    fn from_raw(raw: &str) -> Self {
        match normalize_text(raw).as_str() {
            "incidente" | "incident" | "cuasi accidente" => Self::Incidente,
            _ => Self::Accidente,
        }
    }
}

impl<'de> Deserialize<'de> for AccidentKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::from_raw).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvolvedEmployee {
    #[serde(default, alias = "empleadoId", alias = "employeeId")]
    pub trabajador_id: EmployeeId,
    /// On-leave flag; an involved employee without it contributes no loss.
    #[serde(default, alias = "enReposo", alias = "onLeave")]
    pub con_reposo: bool,
    /// Authoritative when recorded (closed case).
    #[serde(default)]
    pub dias_perdidos: Option<i64>,
    #[serde(
        default,
        alias = "inicioLicencia",
        deserialize_with = "lenient_date::optional"
    )]
    pub inicio_reposo: Option<DateTime<Utc>>,
    #[serde(
        default,
        alias = "finLicencia",
        deserialize_with = "lenient_date::optional"
    )]
    pub fin_reposo: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentEvent {
    pub id: String,
    #[serde(default)]
    pub tipo: AccidentKind,
    #[serde(
        default,
        alias = "fechaAccidente",
        alias = "fechaEvento",
        deserialize_with = "lenient_date::optional"
    )]
    pub fecha: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estado: Option<String>,
    #[serde(default, alias = "sucursal")]
    pub sucursal_id: Option<BranchId>,
    #[serde(default, alias = "trabajadoresInvolucrados")]
    pub involucrados: Vec<InvolvedEmployee>,
}

// --- Absence / medical-leave cases ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "empleadoId", alias = "employeeId")]
    pub trabajador_id: EmployeeId,
    // Start-date candidates; `start_date()` picks the first non-null.
    #[serde(default, deserialize_with = "lenient_date::optional")]
    pub fecha_inicio: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_date::optional")]
    pub inicio_reposo: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_date::optional")]
    pub fecha_emision: Option<DateTime<Utc>>,
    #[serde(
        default,
        alias = "createdAt",
        deserialize_with = "lenient_date::optional"
    )]
    pub fecha_creacion: Option<DateTime<Utc>>,
    #[serde(
        default,
        alias = "fechaFin",
        deserialize_with = "lenient_date::optional"
    )]
    pub fecha_termino: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_date::optional")]
    pub fin_reposo: Option<DateTime<Utc>>,
    #[serde(default, alias = "tipoLicencia")]
    pub tipo: Option<String>,
    #[serde(default)]
    pub motivo: Option<String>,
    #[serde(default, alias = "detalle")]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub estado: Option<String>,
    #[serde(default)]
    pub horas_por_dia: Option<Decimal>,
    #[serde(default)]
    pub horas_semanales: Option<Decimal>,
    #[serde(default)]
    pub dias_laborales: Option<Decimal>,
    #[serde(default)]
    pub accidente_id: Option<String>,
    #[serde(default)]
    pub relacion_accidente: bool,
}

impl AbsenceRecord {
    /// First non-null start candidate, `fecha_creacion` last.
    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.fecha_inicio
            .or(self.inicio_reposo)
            .or(self.fecha_emision)
            .or(self.fecha_creacion)
    }

    /// Absent end date means the case is still running.
    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.fecha_termino.or(self.fin_reposo)
    }
}

// --- Training sessions ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrainingKind {
    Charla,
    Simulacro,
    #[default]
    Capacitacion,
}

impl TrainingKind {
    fn from_raw(raw: &str) -> Self {
        match normalize_text(raw).as_str() {
            "charla" | "talk" => Self::Charla,
            "simulacro" | "drill" => Self::Simulacro,
            _ => Self::Capacitacion,
        }
    }
}

impl<'de> Deserialize<'de> for TrainingKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::from_raw).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrainingStatus {
    Completada,
    #[default]
    Activa,
}

impl TrainingStatus {
    fn from_raw(raw: &str) -> Self {
        match normalize_text(raw).as_str() {
            "completada" | "completado" | "realizada" | "finalizada" | "completed" => {
                Self::Completada
            }
            _ => Self::Activa,
        }
    }
}

impl<'de> Deserialize<'de> for TrainingStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::from_raw).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    #[serde(default, alias = "empleadoId", alias = "employeeId")]
    pub trabajador_id: EmployeeId,
    #[serde(default, alias = "asistencia", alias = "attended")]
    pub asistio: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSession {
    pub id: String,
    #[serde(default)]
    pub tipo: TrainingKind,
    #[serde(default)]
    pub estado: TrainingStatus,
    #[serde(
        default,
        alias = "fecha",
        deserialize_with = "lenient_date::optional"
    )]
    pub fecha_realizacion: Option<DateTime<Utc>>,
    #[serde(default, alias = "participantes")]
    pub asistentes: Vec<Attendance>,
}

// --- Audit findings ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: String,
    #[serde(default)]
    pub estado: Option<String>,
    #[serde(
        default,
        alias = "createdAt",
        deserialize_with = "lenient_date::optional"
    )]
    pub fecha_creacion: Option<DateTime<Utc>>,
    /// Variable-shape classification payload; see `classification`.
    #[serde(default, alias = "clasificaciones")]
    pub clasificacion: Option<Value>,
    /// Pre-summed fallback, consulted only when `clasificacion` yields nothing.
    #[serde(default)]
    pub resumen_clasificaciones: Option<Value>,
    #[serde(default)]
    pub no_conformidades: Option<Value>,
}

// --- Data set & lookup maps ---

/// Everything one company/branch selection feeds into a pass. The fetch
/// layer (out of scope here) scopes and delivers these collections.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyDataSet {
    #[serde(default, alias = "empleados")]
    pub trabajadores: Vec<Employee>,
    #[serde(default)]
    pub sucursales: Vec<Branch>,
    #[serde(default)]
    pub accidentes: Vec<AccidentEvent>,
    #[serde(default, alias = "licencias")]
    pub ausencias: Vec<AbsenceRecord>,
    #[serde(default)]
    pub capacitaciones: Vec<TrainingSession>,
    #[serde(default)]
    pub auditorias: Vec<AuditRecord>,
}

/// Read-only id lookups, built once per pass and shared by every
/// component. Never mutated after construction.
#[derive(Debug)]
pub struct Lookups<'a> {
    employees: HashMap<&'a str, &'a Employee>,
    branches: HashMap<&'a str, &'a Branch>,
}

impl<'a> Lookups<'a> {
    pub fn build(data: &'a SafetyDataSet) -> Self {
        Self {
            employees: data
                .trabajadores
                .iter()
                .map(|e| (e.id.as_str(), e))
                .collect(),
            branches: data.sucursales.iter().map(|b| (b.id.as_str(), b)).collect(),
        }
    }

    pub fn employee(&self, id: &str) -> Option<&'a Employee> {
        self.employees.get(id).copied()
    }

    pub fn branch(&self, id: &str) -> Option<&'a Branch> {
        self.branches.get(id).copied()
    }

    pub fn branch_of(&self, employee: &Employee) -> Option<&'a Branch> {
        employee
            .sucursal_id
            .as_deref()
            .and_then(|id| self.branch(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_dates_accept_the_store_formats() {
        for raw in [
            serde_json::json!("2025-03-10T08:30:00Z"),
            serde_json::json!("2025-03-10T08:30:00"),
            serde_json::json!("2025-03-10 08:30:00"),
            serde_json::json!("2025-03-10"),
            serde_json::json!(1_741_594_200_000_i64),
        ] {
            assert!(lenient_date::parse(&raw).is_some(), "failed on {raw}");
        }
    }

    #[test]
    fn garbage_dates_degrade_to_absent() {
        for raw in [
            serde_json::json!("10/03/2025"),
            serde_json::json!("pronto"),
            serde_json::json!(""),
            serde_json::json!(true),
            serde_json::json!({ "seconds": 1 }),
        ] {
            assert_eq!(lenient_date::parse(&raw), None, "accepted {raw}");
        }
    }

    #[test]
    fn employee_status_tokens() {
        assert_eq!(EmployeeStatus::from_raw("ACTIVO"), EmployeeStatus::Activo);
        assert_eq!(EmployeeStatus::from_raw("Inactivo"), EmployeeStatus::Inactivo);
        assert_eq!(EmployeeStatus::from_raw("baja"), EmployeeStatus::Inactivo);
        assert_eq!(EmployeeStatus::from_raw("Licencia"), EmployeeStatus::Licencia);
        // Unknown vocabulary keeps the employee in the roster.
        assert_eq!(EmployeeStatus::from_raw("???"), EmployeeStatus::Activo);
    }

    #[test]
    fn absence_record_picks_first_start_candidate() {
        let rec: AbsenceRecord = serde_json::from_value(serde_json::json!({
            "id": "L-1",
            "trabajadorId": "T-1",
            "fechaEmision": "2025-02-01",
            "createdAt": "2025-01-15",
        }))
        .unwrap();
        let start = rec.start_date().unwrap();
        assert_eq!(start.to_rfc3339(), "2025-02-01T00:00:00+00:00");
    }
}

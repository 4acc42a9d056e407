// src/health_tests.rs

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::health::aggregate;
    use crate::model::{AbsenceRecord, Employee};
    use crate::period::AnalysisPeriod;

    fn d(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .unwrap_or_else(|_| panic!("bad test date {s}"))
            .with_timezone(&Utc)
    }

    fn case(id: &str, start: &str, end: Option<&str>) -> AbsenceRecord {
        AbsenceRecord {
            id: id.to_string(),
            trabajador_id: "T-1".to_string(),
            tipo: Some("Licencia médica".to_string()),
            fecha_inicio: Some(d(start)),
            fecha_termino: end.map(d),
            ..AbsenceRecord::default()
        }
    }

    fn eight_hours(_rec: &AbsenceRecord) -> Decimal {
        dec!(8)
    }

    fn no_employee(_rec: &AbsenceRecord) -> Option<&'static Employee> {
        None
    }

    #[test]
    fn contained_case_counts_its_literal_span() {
        let now = d("2025-06-01T00:00:00Z");
        let rec = case("L-1", "2024-03-01T00:00:00Z", Some("2024-03-10T00:00:00Z"));

        let year = aggregate(
            std::slice::from_ref(&rec),
            &AnalysisPeriod::for_year(2024, now),
            now,
            eight_hours,
            no_employee,
        );
        assert_eq!(year.resumen.dias_perdidos, 10);
        assert_eq!(year.resumen.horas_perdidas, dec!(80));

        // Same span, much shorter period: proration is period-independent
        // for fully contained cases.
        let month = aggregate(
            &[rec],
            &AnalysisPeriod::for_month(2024, 3, now),
            now,
            eight_hours,
            no_employee,
        );
        assert_eq!(month.resumen.dias_perdidos, 10);
    }

    #[test]
    fn open_case_prorates_to_now_then_clamps_to_period_end() {
        let now = d("2025-01-10T12:00:00Z");
        let rec = case("L-1", "2024-12-20T00:00:00Z", None);
        let report = aggregate(
            &[rec],
            &AnalysisPeriod::for_year(2024, now),
            now,
            eight_hours,
            no_employee,
        );
        // Dec 20 .. Dec 31, inclusive.
        assert_eq!(report.resumen.dias_perdidos, 12);
        assert_eq!(report.resumen.casos_abiertos, 1);
    }

    #[test]
    fn unresolvable_or_disjoint_cases_contribute_nothing() {
        let now = d("2025-06-01T00:00:00Z");
        let sin_fecha = AbsenceRecord {
            id: "L-0".to_string(),
            trabajador_id: "T-1".to_string(),
            ..AbsenceRecord::default()
        };
        let fuera = case("L-2", "2022-02-01T00:00:00Z", Some("2022-02-10T00:00:00Z"));
        let report = aggregate(
            &[sin_fecha, fuera],
            &AnalysisPeriod::for_year(2024, now),
            now,
            eight_hours,
            no_employee,
        );
        assert_eq!(report.resumen.total_casos, 0);
        assert!(report.casos.is_empty());
    }

    #[test]
    fn case_without_start_but_with_creation_date_still_counts() {
        let now = d("2025-06-01T00:00:00Z");
        let rec = AbsenceRecord {
            id: "L-3".to_string(),
            trabajador_id: "T-1".to_string(),
            fecha_creacion: Some(d("2024-05-02T00:00:00Z")),
            fecha_termino: Some(d("2024-05-04T00:00:00Z")),
            ..AbsenceRecord::default()
        };
        let report = aggregate(
            &[rec],
            &AnalysisPeriod::for_year(2024, now),
            now,
            eight_hours,
            no_employee,
        );
        assert_eq!(report.resumen.dias_perdidos, 3);
    }

    #[test]
    fn accident_linked_cases_stay_out_of_the_absence_subtotal() {
        let now = d("2025-06-01T00:00:00Z");
        let mut ligada = case("L-1", "2024-04-01T00:00:00Z", Some("2024-04-05T00:00:00Z"));
        ligada.tipo = Some("Licencia por accidente laboral".to_string());
        let comun = case("L-2", "2024-04-01T00:00:00Z", Some("2024-04-02T00:00:00Z"));

        let report = aggregate(
            &[ligada, comun],
            &AnalysisPeriod::for_year(2024, now),
            now,
            eight_hours,
            no_employee,
        );
        assert_eq!(report.resumen.dias_perdidos, 7);
        assert_eq!(report.resumen.horas_perdidas, dec!(56));
        assert_eq!(report.resumen.dias_perdidos_sin_accidente, 2);
        assert_eq!(report.resumen.horas_perdidas_sin_accidente, dec!(16));
    }

    #[test]
    fn recent_cases_newest_first_with_id_tiebreak() {
        let now = d("2025-06-01T00:00:00Z");
        let records = vec![
            case("B", "2024-05-01T00:00:00Z", Some("2024-05-02T00:00:00Z")),
            case("A", "2024-05-01T00:00:00Z", Some("2024-05-02T00:00:00Z")),
            case("C", "2024-08-01T00:00:00Z", Some("2024-08-02T00:00:00Z")),
            case("D", "2024-01-01T00:00:00Z", Some("2024-01-02T00:00:00Z")),
            case("E", "2024-02-01T00:00:00Z", Some("2024-02-02T00:00:00Z")),
            case("F", "2024-03-01T00:00:00Z", Some("2024-03-02T00:00:00Z")),
            case("G", "2024-04-01T00:00:00Z", Some("2024-04-02T00:00:00Z")),
        ];
        let report = aggregate(
            &records,
            &AnalysisPeriod::for_year(2024, now),
            now,
            eight_hours,
            no_employee,
        );
        let ids: Vec<&str> = report
            .casos_recientes
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["C", "A", "B", "G", "F"]);
    }

    #[test]
    fn unbounded_period_needs_a_case_start() {
        let now = d("2025-06-01T00:00:00Z");
        let period = AnalysisPeriod::unbounded(d("2024-12-31T23:59:59.999Z"));
        let historico = case("L-1", "2015-01-01T00:00:00Z", Some("2015-01-03T00:00:00Z"));
        let sin_inicio = AbsenceRecord {
            id: "L-2".to_string(),
            trabajador_id: "T-1".to_string(),
            ..AbsenceRecord::default()
        };
        let report = aggregate(
            &[historico, sin_inicio],
            &period,
            now,
            eight_hours,
            no_employee,
        );
        // No lower bound reaches back to 2015, but a case can never be
        // unbounded on both ends.
        assert_eq!(report.resumen.total_casos, 1);
        assert_eq!(report.resumen.dias_perdidos, 3);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let now = d("2025-06-01T00:00:00Z");
        let records = vec![
            case("L-1", "2024-03-01T00:00:00Z", Some("2024-03-10T00:00:00Z")),
            case("L-2", "2024-07-01T00:00:00Z", None),
        ];
        let period = AnalysisPeriod::for_year(2024, now);
        let first = aggregate(&records, &period, now, eight_hours, no_employee);
        let second = aggregate(&records, &period, now, eight_hours, no_employee);
        assert_eq!(first, second);
    }

    proptest! {
        // Proration invariant: a case fully inside the year counts its
        // literal inclusive span, whatever the period length.
        #[test]
        fn contained_span_day_count(start_offset in 0i64..300, len in 0i64..60) {
            let now = d("2025-06-01T00:00:00Z");
            let start = d("2024-01-01T00:00:00Z") + Duration::days(start_offset);
            let end = start + Duration::days(len);
            let rec = AbsenceRecord {
                id: "P-1".to_string(),
                trabajador_id: "T-1".to_string(),
                fecha_inicio: Some(start),
                fecha_termino: Some(end),
                ..AbsenceRecord::default()
            };
            let report = aggregate(
                &[rec],
                &AnalysisPeriod::for_year(2024, now),
                now,
                eight_hours,
                no_employee,
            );
            prop_assert_eq!(report.resumen.dias_perdidos, len + 1);
            prop_assert!(report.resumen.horas_perdidas >= Decimal::ZERO);
        }
    }
}

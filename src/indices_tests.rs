// src/indices_tests.rs

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::indices::{compute, ExposureInputs, IndexResult, IndexSet};

    fn all(indices: &IndexSet) -> [&IndexResult; 5] {
        [
            &indices.ausentismo,
            &indices.frecuencia,
            &indices.severidad,
            &indices.incidencia,
            &indices.accidentabilidad,
        ]
    }

    #[test]
    fn worked_example_over_a_million_hours() {
        let indices = compute(&ExposureInputs {
            horas_netas: dec!(1_000_000),
            accidentes_con_baja: 2,
            dias_perdidos_totales: 10,
            ..ExposureInputs::default()
        });
        assert_eq!(indices.frecuencia.tecnico, dec!(2.0));
        assert_eq!(indices.frecuencia.display, dec!(0.0));
        assert_eq!(indices.severidad.tecnico, dec!(10.0));
        assert_eq!(indices.severidad.display, dec!(0.0));
        assert_eq!(indices.accidentabilidad.tecnico, dec!(12.0));
    }

    #[test]
    fn zero_denominators_yield_exact_zeros() {
        let indices = compute(&ExposureInputs {
            // Loss recorded but no exposure at all.
            accidentes_con_baja: 3,
            dias_perdidos_totales: 9,
            trabajadores_accidentados: 2,
            ..ExposureInputs::default()
        });
        for index in all(&indices) {
            assert_eq!(index.tecnico, Decimal::ZERO);
            assert_eq!(index.display, Decimal::ZERO);
        }
    }

    #[test]
    fn absenteeism_uses_gross_hours_as_denominator() {
        let indices = compute(&ExposureInputs {
            horas_netas: dec!(900),
            horas_perdidas_accidentes: dec!(60),
            horas_perdidas_ausencias: dec!(40),
            ..ExposureInputs::default()
        });
        // 100 lost over (900 + 100) gross.
        assert_eq!(indices.ausentismo.tecnico, dec!(10));
        assert_eq!(indices.ausentismo.unidad, "%");
    }

    #[test]
    fn incidence_is_per_thousand_exposed() {
        let indices = compute(&ExposureInputs {
            horas_netas: dec!(1),
            promedio_expuestos: dec!(500),
            trabajadores_accidentados: 5,
            ..ExposureInputs::default()
        });
        assert_eq!(indices.incidencia.tecnico, dec!(10));
    }

    proptest! {
        // Display invariant and totality over arbitrary inputs: every
        // index displays round(technical / 1000, 1) and never NaN-like
        // garbage (Decimal has no NaN; the guard is the zero check).
        #[test]
        fn display_is_a_pure_function_of_technical(
            horas in 0i64..2_000_000,
            accidentes in 0u32..50,
            dias in 0i64..5_000,
            expuestos in 0i64..10_000,
            accidentados in 0u32..200,
            horas_acc in 0i64..10_000,
            horas_aus in 0i64..10_000,
        ) {
            let indices = compute(&ExposureInputs {
                horas_netas: Decimal::from(horas),
                accidentes_con_baja: accidentes,
                dias_perdidos_totales: dias,
                promedio_expuestos: Decimal::from(expuestos),
                trabajadores_accidentados: accidentados,
                horas_perdidas_accidentes: Decimal::from(horas_acc),
                horas_perdidas_ausencias: Decimal::from(horas_aus),
            });
            for index in all(&indices) {
                let expected = (index.tecnico / dec!(1000))
                    .round_dp_with_strategy(1, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
                prop_assert_eq!(index.display, expected);
                prop_assert!(index.tecnico >= Decimal::ZERO);
            }
        }
    }
}

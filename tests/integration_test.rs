//! End-to-end tests across the spread builder, the stationarity tester and
//! the file adapters.

mod common;

use common::*;
use spreadcheck::adapters::csv_adapter::CsvContractSource;
use spreadcheck::adapters::csv_report_adapter::CsvReportAdapter;
use spreadcheck::adapters::spread_csv_adapter::CsvSpreadStore;
use spreadcheck::domain::batch::{count_completed, FamilyOutcome};
use spreadcheck::domain::error::SpreadError;
use spreadcheck::domain::family::{InstrumentFamily, LegPair, LEG_COUNT, PAIR_COUNT};
use spreadcheck::domain::spread::build_families;
use spreadcheck::domain::stationarity::{analyze_families, AdfSettings, SIGNIFICANCE_LEVEL};
use spreadcheck::domain::summary::{build_summary, Locale};
use spreadcheck::ports::report_port::ReportPort;
use spreadcheck::ports::spread_port::SpreadStore;
use std::collections::HashSet;
use tempfile::TempDir;

fn families(list: &[&str]) -> Vec<InstrumentFamily> {
    list.iter().map(|s| InstrumentFamily::new(s).unwrap()).collect()
}

mod spread_builder {
    use super::*;

    #[test]
    fn raw_files_to_persisted_table() {
        let raw = TempDir::new().unwrap();
        let closes = cointegrated_legs(1, 40);
        write_raw_family(raw.path(), "if", &closes);
        // Drop one date from leg 2 so the join has to discard it.
        let leg2 = raw.path().join("IF02.csv");
        let content = std::fs::read_to_string(&leg2).unwrap();
        let dropped = day(10).format("%Y%m%d").to_string();
        let filtered: String = content
            .lines()
            .filter(|l| !l.contains(&dropped))
            .map(|l| format!("{l}\n"))
            .collect();
        std::fs::write(&leg2, filtered).unwrap();

        let source = CsvContractSource::new(raw.path().to_path_buf());
        let outcomes = build_families(&source, &families(&["if"]));
        let table = outcomes[0].completed().unwrap();

        assert_eq!(table.len(), 39);
        assert!(!table.dates().contains(&day(10)));
        let dates = table.dates();
        assert!(dates.windows(2).all(|w| w[0] < w[1]));

        for row in &table.rows {
            let i = (row.trade_date - day(0)).num_days() as usize;
            assert_eq!(row.closes, closes[i]);
            for pair in LegPair::all() {
                assert_eq!(
                    row.spread(pair),
                    Some(closes[i][pair.near] - closes[i][pair.far])
                );
            }
        }

        let store_dir = TempDir::new().unwrap();
        let store = CsvSpreadStore::new(store_dir.path().to_path_buf());
        store.save(table).unwrap();
        let reloaded = store.load(&table.family).unwrap();
        assert_eq!(reloaded.rows, table.rows);
    }

    #[test]
    fn missing_leg_file_fails_only_that_family() {
        let raw = TempDir::new().unwrap();
        write_raw_family(raw.path(), "if", &cointegrated_legs(2, 20));
        write_raw_family(raw.path(), "ih", &cointegrated_legs(3, 20));
        std::fs::remove_file(raw.path().join("IH03.csv")).unwrap();

        let source = CsvContractSource::new(raw.path().to_path_buf());
        let outcomes = build_families(&source, &families(&["if", "ih"]));

        assert!(outcomes[0].is_completed());
        assert!(matches!(
            outcomes[1].error(),
            Some(SpreadError::DataUnavailable { path }) if path.ends_with("IH03.csv")
        ));
    }

    #[test]
    fn every_pair_column_is_present_once() {
        let source = MockContractSource::new().with_family("im", &cointegrated_legs(4, 10));
        let outcomes = build_families(&source, &families(&["im"]));
        let table = outcomes[0].completed().unwrap();

        for row in &table.rows {
            assert_eq!(row.spreads.len(), PAIR_COUNT);
            assert!(row.spreads.iter().all(Option::is_some));
        }
        let names: HashSet<String> = LegPair::all().iter().map(|p| p.column_name()).collect();
        assert_eq!(names.len(), LEG_COUNT * (LEG_COUNT - 1) / 2);
    }
}

mod stationarity_tester {
    use super::*;

    fn store_with(entries: &[(&str, Vec<[f64; LEG_COUNT]>)]) -> MemorySpreadStore {
        let mut source = MockContractSource::new();
        for (symbol, closes) in entries {
            source = source.with_family(symbol, closes);
        }
        let symbols: Vec<&str> = entries.iter().map(|e| e.0).collect();
        let store = MemorySpreadStore::new();
        for outcome in build_families(&source, &families(&symbols)) {
            if let FamilyOutcome::Completed { value, .. } = outcome {
                store.save(&value).unwrap();
            }
        }
        store
    }

    #[test]
    fn cointegrated_legs_give_stationary_spreads() {
        let store = store_with(&[("if", cointegrated_legs(10, 300))]);
        let outcomes = analyze_families(&store, &families(&["if"]), &AdfSettings::default());
        let results = outcomes[0].completed().unwrap();

        assert_eq!(results.len(), PAIR_COUNT);
        for r in results {
            assert!(r.is_stationary, "pair {} p={}", r.pair, r.p_value);
            assert!(r.p_value <= SIGNIFICANCE_LEVEL);
        }
    }

    #[test]
    fn independent_walks_give_non_stationary_spreads() {
        let store = store_with(&[("ih", independent_walks(20, 300))]);
        let outcomes = analyze_families(&store, &families(&["ih"]), &AdfSettings::default());
        let results = outcomes[0].completed().unwrap();

        let non_stationary = results.iter().filter(|r| !r.is_stationary).count();
        assert!(non_stationary >= 4, "only {non_stationary}/6 kept the unit root");
    }

    #[test]
    fn missing_family_is_isolated() {
        let store = store_with(&[
            ("if", cointegrated_legs(30, 150)),
            ("ih", cointegrated_legs(31, 150)),
            ("ic", cointegrated_legs(32, 150)),
        ]);
        let outcomes = analyze_families(
            &store,
            &families(&["if", "ih", "ic", "im"]),
            &AdfSettings::default(),
        );

        assert_eq!(outcomes.len(), 4);
        assert_eq!(count_completed(&outcomes), 3);
        assert!(matches!(
            outcomes[3],
            FamilyOutcome::Failed {
                error: SpreadError::DataUnavailable { .. },
                ..
            }
        ));

        let rows = build_summary(&outcomes, Locale::Zh);
        assert_eq!(rows.len(), 3 * PAIR_COUNT);
        let keys: HashSet<(String, String)> = rows
            .iter()
            .map(|r| (r.family.clone(), r.pair.clone()))
            .collect();
        assert_eq!(keys.len(), rows.len());
        assert!(rows.iter().all(|r| r.family != "IM"));
    }

    #[test]
    fn constant_spread_fails_its_family_only() {
        let mut flat = cointegrated_legs(40, 100);
        for c in flat.iter_mut() {
            c[1] = c[0] - 8.0;
        }
        let store = store_with(&[("if", flat), ("ic", cointegrated_legs(41, 100))]);
        let outcomes = analyze_families(&store, &families(&["if", "ic"]), &AdfSettings::default());

        assert!(matches!(
            outcomes[0].error(),
            Some(SpreadError::DegenerateSeries { .. })
        ));
        assert!(outcomes[1].is_completed());
    }

    #[test]
    fn short_table_is_insufficient() {
        let store = store_with(&[("im", cointegrated_legs(50, 5))]);
        let outcomes = analyze_families(&store, &families(&["im"]), &AdfSettings::default());
        assert!(matches!(
            outcomes[0].error(),
            Some(SpreadError::InsufficientObservations { .. })
        ));
    }

    #[test]
    fn explicit_max_lag_bounds_the_search() {
        let store = store_with(&[("if", cointegrated_legs(60, 200))]);
        let settings = AdfSettings { max_lag: Some(2) };
        let outcomes = analyze_families(&store, &families(&["if"]), &settings);
        for r in outcomes[0].completed().unwrap() {
            assert!(r.used_lag <= 2);
            assert_eq!(r.nobs, 200 - 1 - r.used_lag);
        }
    }
}

mod report {
    use super::*;

    /// Half a unit in the fourth decimal, plus float slack.
    const ROUNDING: f64 = 5.0e-5 + 1e-12;

    #[test]
    fn written_report_reparses_within_rounding() {
        let source = MockContractSource::new()
            .with_family("if", &cointegrated_legs(70, 200))
            .with_family("ih", &independent_walks(71, 200));
        let store = MemorySpreadStore::new();
        for outcome in build_families(&source, &families(&["if", "ih"])) {
            store.save(outcome.completed().unwrap()).unwrap();
        }
        let outcomes = analyze_families(&store, &families(&["if", "ih"]), &AdfSettings::default());
        let rows = build_summary(&outcomes, Locale::En);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.csv");
        CsvReportAdapter.write(&rows, Locale::En, &path).unwrap();
        let reread = CsvReportAdapter.read(&path).unwrap();
        assert_eq!(reread, rows);

        let results: Vec<_> = outcomes
            .iter()
            .flat_map(|o| o.completed().unwrap().iter())
            .collect();
        assert_eq!(results.len(), reread.len());
        for (row, result) in reread.iter().zip(results) {
            let parse = |s: &str| s.parse::<f64>().unwrap();
            assert!((parse(&row.adf_statistic) - result.statistic).abs() <= ROUNDING);
            assert!((parse(&row.p_value) - result.p_value).abs() <= ROUNDING);
            assert!((parse(&row.critical_1pct) - result.critical_values.one_pct).abs() <= ROUNDING);
            assert!((parse(&row.critical_5pct) - result.critical_values.five_pct).abs() <= ROUNDING);
            assert!((parse(&row.critical_10pct) - result.critical_values.ten_pct).abs() <= ROUNDING);
            assert_eq!(row.stationary, if result.is_stationary { "yes" } else { "no" });
        }
    }
}

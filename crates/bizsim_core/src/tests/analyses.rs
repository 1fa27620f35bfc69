//! Sensitivity, tornado and scenario workflows end to end

use crate::analysis::{
    Scenario, ScenarioMetric, SensitivityRange, TornadoVariable, analyze_sensitivity,
    analyze_tornado, compare_scenarios,
};
use crate::error::SimulationError;
use crate::model::Distribution;

#[test]
fn test_sensitivity_linear_case() {
    let analysis = analyze_sensitivity(
        100.0,
        SensitivityRange::PercentOfBase { fraction: 0.10 },
        "{0}*2",
        11,
    )
    .unwrap();

    assert_eq!(analysis.sensitivity_factor, 2.0);
    assert_eq!(analysis.points.len(), 11);
    assert_eq!(analysis.points.first().unwrap().input, 90.0);
    assert_eq!(analysis.points.last().unwrap().input, 110.0);
    for pair in analysis.points.windows(2) {
        assert!(pair[0].input < pair[1].input);
    }
}

#[test]
fn test_sensitivity_factor_scales_with_slope() {
    let shallow = analyze_sensitivity(
        50.0,
        SensitivityRange::Explicit {
            min: 0.0,
            max: 100.0,
        },
        "{0} * 0.5 + 10",
        3,
    )
    .unwrap();
    let steep = analyze_sensitivity(
        50.0,
        SensitivityRange::Explicit {
            min: 0.0,
            max: 100.0,
        },
        "-{0} * 4",
        3,
    )
    .unwrap();

    assert_eq!(shallow.sensitivity_factor, 0.5);
    // The factor measures the spread of the response, not its direction
    assert_eq!(steep.sensitivity_factor, 4.0);
    assert_eq!(steep.base_output, -200.0);
}

#[test]
fn test_tornado_ranks_by_swing() {
    // Profit = units * (price - unit_cost) - fixed_costs
    let variables = [
        TornadoVariable::new("units", 100.0, 90.0, 110.0),
        TornadoVariable::new("price", 20.0, 15.0, 45.0),
        TornadoVariable::new("unit_cost", 10.0, 9.0, 11.0),
        TornadoVariable::new("fixed_costs", 500.0, 400.0, 600.0),
    ];
    let analysis = analyze_tornado(&variables, "{0} * ({1} - {2}) - {3}").unwrap();

    assert_eq!(analysis.baseline, 500.0);
    let names: Vec<_> = analysis.impacts.iter().map(|i| i.name.as_str()).collect();
    // price: 3000, units: 200, fixed_costs: 200, unit_cost: 200
    assert_eq!(names, ["price", "units", "unit_cost", "fixed_costs"]);
    assert_eq!(analysis.impacts[0].range, 3000.0);

    for pair in analysis.impacts.windows(2) {
        assert!(pair[0].range >= pair[1].range);
    }
}

#[test]
fn test_tornado_500_precedes_200() {
    let variables = [
        TornadoVariable::new("B", 0.0, -100.0, 100.0),
        TornadoVariable::new("A", 0.0, -250.0, 250.0),
    ];
    let analysis = analyze_tornado(&variables, "{0} + {1}").unwrap();
    assert_eq!(analysis.impacts[0].name, "A");
    assert_eq!(analysis.impacts[0].range, 500.0);
    assert_eq!(analysis.impacts[1].name, "B");
    assert_eq!(analysis.impacts[1].range, 200.0);
}

#[test]
fn test_scenarios_best_and_worst() {
    let comparison = compare_scenarios(
        &["value"],
        "{0}",
        &[
            Scenario::fixed("Base", [100.0]),
            Scenario::fixed("Best", [150.0]),
            Scenario::fixed("Worst", [50.0]),
        ],
        10,
        Some(42),
    )
    .unwrap();

    assert_eq!(comparison.best_scenario(ScenarioMetric::Mean).name, "Best");
    assert_eq!(comparison.worst_scenario(ScenarioMetric::Mean).name, "Worst");
    for metric in [ScenarioMetric::Median, ScenarioMetric::P5, ScenarioMetric::P95] {
        assert_eq!(comparison.best_scenario(metric).name, "Best");
        assert_eq!(comparison.worst_scenario(metric).name, "Worst");
    }
    assert_eq!(comparison.results().len(), 3);
    assert_eq!(comparison.seed, 42);
}

#[test]
fn test_uncertain_scenarios_rank_by_every_metric() {
    let comparison = compare_scenarios(
        &["revenue", "costs"],
        "{0} - {1}",
        &[
            Scenario::uncertain(
                "Conservative",
                [
                    Distribution::normal(1000.0, 50.0).unwrap(),
                    Distribution::fixed(800.0).unwrap(),
                ],
            ),
            Scenario::uncertain(
                "Aggressive",
                [
                    Distribution::normal(1300.0, 400.0).unwrap(),
                    Distribution::fixed(1000.0).unwrap(),
                ],
            ),
        ],
        20_000,
        Some(5),
    )
    .unwrap();

    // Aggressive has a higher mean but far wider dispersion
    assert_eq!(comparison.best_scenario(ScenarioMetric::Mean).name, "Aggressive");
    assert_eq!(comparison.best_scenario(ScenarioMetric::StdDev).name, "Conservative");
    assert_eq!(comparison.best_scenario(ScenarioMetric::P5).name, "Conservative");
    assert_eq!(comparison.best_scenario(ScenarioMetric::P95).name, "Aggressive");

    for metric in ScenarioMetric::ALL {
        let ranking = comparison.ranking(metric);
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].name, comparison.best_scenario(metric).name);
        assert_eq!(ranking[1].name, comparison.worst_scenario(metric).name);
    }
}

#[test]
fn test_scenario_length_mismatch_is_rejected() {
    let err = compare_scenarios(
        &["a", "b", "c"],
        "{0} + {1} + {2}",
        &[
            Scenario::fixed("Full", [1.0, 2.0, 3.0]),
            Scenario::fixed("Partial", [1.0, 2.0]),
        ],
        10,
        Some(1),
    )
    .unwrap_err();
    assert!(matches!(err, SimulationError::InvalidArgument(msg) if msg.contains("Partial")));
}

//! Property tests: projection identity, resolver idempotence and validity,
//! seed reproducibility, subgroup ordering.

use proptest::prelude::*;

use test_fixtures::linear_dataset;
use uplift_analysis::counterfactual::project;
use uplift_analysis::subgroup::SubgroupAnalyzer;
use uplift_analysis::{resolve, satisfies_backdoor, AdjustmentSet, CausalGraph, EffectEstimator, Edge, RefutationSuite};
use uplift_core::types::{Column, Dataset, RefutationKind, Schema};

/// Random DAG over `n` nodes: edges only go from lower to higher index, and
/// `N0 -> N{n-1}` is always present so treatment reaches outcome.
fn dag() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (3usize..9).prop_flat_map(|n| {
        let pairs = proptest::collection::vec((0..n, 0..n), 0..(n * 2));
        (Just(n), pairs)
    })
}

fn build((n, pairs): &(usize, Vec<(usize, usize)>)) -> CausalGraph {
    let name = |i: usize| format!("N{i}");
    let mut edges: Vec<Edge> = pairs
        .iter()
        .filter(|(a, b)| a < b)
        .map(|&(a, b)| Edge::new(name(a), name(b)))
        .collect();
    edges.push(Edge::new(name(0), name(n - 1)));
    CausalGraph::build((0..*n).map(name), &edges).unwrap()
}

proptest! {
    #[test]
    fn projection_at_one_is_identity(base in -1e6f64..1e6, ate in -1e3f64..1e3) {
        prop_assert_eq!(project(base, ate, 1.0), base);
    }

    #[test]
    fn projection_is_linear_in_multiplier(base in -1e3f64..1e3, ate in -10f64..10.0, m in 0.5f64..2.0) {
        let lift = project(base, ate, m) - base;
        prop_assert!((lift - (m - 1.0) * ate).abs() < 1e-9);
    }

    #[test]
    fn resolver_is_idempotent_and_valid(spec in dag(), treatment_offset in 0usize..3) {
        let g = build(&spec);
        let n = spec.0;
        // Any node before the outcome with a path to it works as treatment.
        let t = format!("N{}", treatment_offset.min(n - 2));
        let y = format!("N{}", n - 1);
        if g.has_directed_path(&t, &y).unwrap() {
            let first = resolve(&g, &t, &y).unwrap();
            let second = resolve(&g, &t, &y).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert!(satisfies_backdoor(&g, &t, &y, &first).unwrap());
            let descendants = g.descendants(&t).unwrap();
            prop_assert!(first.iter().all(|v| !descendants.contains(v)));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn refutations_reproduce_for_a_seed(seed in any::<u64>(), data_seed in 0u64..1000) {
        let ds = linear_dataset(120, 0.8, data_seed);
        let set = AdjustmentSet::new(["Noise"]);
        let suite = RefutationSuite::new(RefutationKind::ALL.to_vec(), 0.7, true).unwrap();
        let a = suite.run(&ds, "Treatment", "Outcome", &set, 0.8, seed);
        let b = suite.run(&ds, "Treatment", "Outcome", &set, 0.8, seed);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn subgroups_come_back_in_ascending_order(labels in proptest::collection::vec(0u8..5, 40..120)) {
        let n = labels.len();
        let schema = Schema::builder().treatment("t").outcome("y").group("g").build().unwrap();
        let t: Vec<f64> = (0..n).map(|i| ((i * 7) % 19) as f64).collect();
        let y: Vec<f64> = t.iter().enumerate().map(|(i, v)| 2.0 * v + (i % 3) as f64).collect();
        let g: Vec<String> = labels.iter().map(|l| format!("seg-{l}")).collect();
        let ds = Dataset::new(
            schema,
            vec![
                ("t".into(), Column::Numeric(t)),
                ("y".into(), Column::Numeric(y)),
                ("g".into(), Column::Categorical(g)),
            ],
        )
        .unwrap();

        let report = SubgroupAnalyzer::new(EffectEstimator::default(), true)
            .by_group(&ds, "t", "y", &AdjustmentSet::new(["g"]), "g")
            .unwrap();
        let mut seen: Vec<&str> = report.effects.iter().map(|e| e.group.as_str()).collect();
        seen.extend(report.skipped.iter().map(|s| s.group.as_str()));
        let fitted: Vec<&str> = report.effects.iter().map(|e| e.group.as_str()).collect();
        let mut sorted = fitted.clone();
        sorted.sort_unstable();
        prop_assert_eq!(fitted, sorted);
        let rows: usize = report.effects.iter().map(|e| e.n_obs).sum::<usize>()
            + report.skipped.iter().map(|s| s.n_obs).sum::<usize>();
        prop_assert_eq!(rows, n);
        seen.sort_unstable();
        seen.dedup();
        prop_assert_eq!(seen.len(), report.effects.len() + report.skipped.len());
    }
}

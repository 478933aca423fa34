use std::collections::{BTreeSet, HashMap};

use plugdag::dag::{PluginGraph, Scheduler};
use plugdag::{Executor, Family, PlugdagError, PluginId};
use plugdag_test_utils::builders::indexed_registry;
use plugdag_test_utils::recorder::Recorder;
use proptest::prelude::*;

// Acyclic by construction: plugin i may only depend on plugins 0..i.
fn dag_strategy(max_plugins: usize) -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1..=max_plugins).prop_flat_map(|n| {
        let edges = proptest::collection::vec((0..n, any::<usize>()), 0..n * 2);
        (Just(n), edges).prop_map(|(n, raw)| {
            let edges: BTreeSet<(usize, usize)> = raw
                .into_iter()
                .filter(|(from, _)| *from > 0)
                .map(|(from, to)| (from, to % from))
                .collect();
            (n, edges.into_iter().collect())
        })
    })
}

// A DAG plus one back edge closing a cycle of length >= 2.
fn cyclic_strategy(max_plugins: usize) -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2..=max_plugins).prop_flat_map(|n| {
        (dag_strategy_for(n), 0..n, 0..n).prop_map(move |(mut edges, a, b)| {
            let (lo, hi) = if a < b {
                (a, b)
            } else if b < a {
                (b, a)
            } else if a + 1 < n {
                (a, a + 1)
            } else {
                (a - 1, a)
            };
            // hi -> ... -> lo as a chain, then lo depends on hi.
            for i in lo + 1..=hi {
                edges.push((i, i - 1));
            }
            edges.push((lo, hi));
            (n, edges)
        })
    })
}

fn dag_strategy_for(n: usize) -> impl Strategy<Value = Vec<(usize, usize)>> {
    proptest::collection::vec((1..n, any::<usize>()), 0..n).prop_map(move |raw| {
        raw.into_iter()
            .map(|(from, to)| (from, to % from))
            .collect()
    })
}

proptest! {
    #[test]
    fn test_run_order_is_topological((n, edges) in dag_strategy(12)) {
        let rec = Recorder::new();
        let reg = indexed_registry(n, &edges, &rec);

        let order = Scheduler::new(reg.family(&Family::Plugin)).run_order().unwrap();
        prop_assert_eq!(order.len(), n);

        let pos: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name(), i))
            .collect();
        for (from, to) in &edges {
            let dependent = format!("p{from}");
            let dependency = format!("p{to}");
            prop_assert!(pos[dependency.as_str()] < pos[dependent.as_str()]);
        }
    }

    #[test]
    fn test_executor_runs_every_class_of_a_dag((n, edges) in dag_strategy(10)) {
        let rec = Recorder::new();
        let reg = indexed_registry(n, &edges, &rec);

        let graph = Executor::new(&reg, Family::Plugin).run().unwrap();
        prop_assert_eq!(graph.len(), n);
        prop_assert!(graph.is_clean());

        let ran = rec.ran();
        for (from, to) in &edges {
            let a = ran.iter().position(|p| *p == format!("p{to}")).unwrap();
            let b = ran.iter().position(|p| *p == format!("p{from}")).unwrap();
            prop_assert!(a < b);
        }
    }

    #[test]
    fn test_cycles_are_detected((n, edges) in cyclic_strategy(10)) {
        let rec = Recorder::new();
        let reg = indexed_registry(n, &edges, &rec);

        let result = Scheduler::new(reg.family(&Family::Plugin)).run_order();
        let (plugin, stack) = match result {
            Err(PlugdagError::DependencyCycle { plugin, stack }) => (plugin, stack),
            other => return Err(TestCaseError::fail(format!(
                "expected a cycle, got {:?}",
                other.map(|o| o.len())
            ))),
        };
        prop_assert!(stack.contains(&plugin));

        // The reported plugin is reachable from one of its own dependencies.
        let graph = PluginGraph::from_classes(reg.family(&Family::Plugin));
        let reported = PluginId::plugin(&plugin);
        let on_cycle = graph
            .dependencies_of(&reported)
            .into_iter()
            .any(|dep| *dep == reported || graph.downstream_of(dep).contains(&&reported));
        prop_assert!(on_cycle);

        prop_assert!(graph.validate_acyclic().is_err());
        prop_assert!(rec.ran().is_empty());
    }
}

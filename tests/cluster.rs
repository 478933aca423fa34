// tests/cluster.rs

use std::collections::BTreeMap;
use std::error::Error;

use plugdag::config::from_str;
use plugdag::{
    ClusterExecutor, Declaration, Executor, Family, PluginId, Registry, ResultGraph, RoleFilter,
    Value,
};
use plugdag_test_utils::init_tracing;

struct Fleet {
    registry: Registry,
    version: PluginId,
}

/// Every member reports its version; `broken_role` fails instead.
fn member_graphs(
    roles: &[(&str, &str)],
    broken_role: Option<&str>,
) -> Result<(Fleet, BTreeMap<String, ResultGraph>), Box<dyn Error>> {
    let mut graphs = BTreeMap::new();
    let mut fleet = None;

    for (role, version) in roles {
        let mut reg = Registry::new();
        let version = version.to_string();
        let broken = broken_role == Some(*role);
        let id = reg.declare(Declaration::plugin("facts::Version").process(move |_| {
            if broken {
                anyhow::bail!("cannot read version");
            }
            Ok(Some(Value::new(version.clone())))
        }))?;
        graphs.insert(role.to_string(), Executor::new(&reg, Family::Plugin).run()?);
        fleet = Some(Fleet {
            registry: reg,
            version: id,
        });
    }

    Ok((fleet.ok_or("no roles")?, graphs))
}

fn versions(binding: &plugdag::Binding) -> Vec<(String, String)> {
    binding
        .roles()
        .into_iter()
        .filter_map(|role| {
            let inst = binding.for_role(role)?.first()?;
            Some((role.to_string(), inst.output_as::<String>()?.clone()))
        })
        .collect()
}

#[test]
fn test_cross_tier_collects_every_role() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let (mut fleet, graphs) =
        member_graphs(&[("web", "1.2"), ("db", "1.1"), ("cache", "1.2")], None)?;

    let agg = fleet.registry.declare(
        Declaration::cluster("checks::VersionSpread")
            .requires(&fleet.version)
            .process(|ctx| {
                let binding = ctx.get("version").ok_or_else(|| anyhow::anyhow!("unbound"))?;
                let mut seen: Vec<String> = binding
                    .instances()
                    .filter_map(|i| i.output_as::<String>().cloned())
                    .collect();
                seen.sort();
                seen.dedup();
                Ok(Some(Value::new(seen.len())))
            }),
    )?;

    let cluster = ClusterExecutor::new(&fleet.registry, graphs).run()?;

    let inst = cluster.first(&agg).ok_or("aggregate missing")?;
    let binding = inst.get("version").ok_or("version unbound")?;
    assert_eq!(
        versions(binding),
        vec![
            ("cache".to_string(), "1.2".to_string()),
            ("db".to_string(), "1.1".to_string()),
            ("web".to_string(), "1.2".to_string()),
        ]
    );
    assert_eq!(inst.output_as::<usize>(), Some(&2));
    Ok(())
}

#[test]
fn test_role_filter_and_prefix_matching() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let (mut fleet, graphs) = member_graphs(
        &[("db-primary", "9"), ("db-replica", "9"), ("web", "3")],
        None,
    )?;

    let exact = fleet.registry.declare(
        Declaration::cluster("checks::WebOnly")
            .cross_tier(&fleet.version, Some(RoleFilter::named("web"))),
    )?;
    let db = fleet.registry.declare(
        Declaration::cluster("checks::Databases")
            .cross_tier(&fleet.version, Some(RoleFilter::named("db"))),
    )?;

    // With exact matching "db" names no member, so Databases is absent.
    let cluster = ClusterExecutor::new(&fleet.registry, graphs.clone()).run()?;
    assert!(cluster.contains(&exact));
    assert!(!cluster.contains(&db));

    let cfg = from_str("[cluster]\nrole_match = \"prefix\"\n")?;
    let cluster = ClusterExecutor::new(&fleet.registry, graphs)
        .with_config(&cfg)
        .run()?;
    let binding = cluster
        .first(&db)
        .ok_or("Databases missing")?
        .get("version")
        .ok_or("unbound")?;
    assert_eq!(binding.roles(), vec!["db-primary", "db-replica"]);
    Ok(())
}

#[test]
fn test_failed_members_are_omitted_unless_on_error() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let (mut fleet, graphs) = member_graphs(&[("a", "1"), ("b", "1")], Some("b"))?;

    let strict = fleet
        .registry
        .declare(Declaration::cluster("checks::Strict").requires(&fleet.version))?;
    let tolerant = fleet.registry.declare(
        Declaration::cluster("checks::Tolerant").require(
            plugdag::Dependency::new(&fleet.version)
                .on_error()
                .cross_tier(None),
        ),
    )?;

    let cluster = ClusterExecutor::new(&fleet.registry, graphs).run()?;

    let strict_roles = cluster
        .first(&strict)
        .ok_or("Strict missing")?
        .get("version")
        .ok_or("unbound")?
        .roles();
    assert_eq!(strict_roles, vec!["a"]);

    let tolerant_binding = cluster
        .first(&tolerant)
        .ok_or("Tolerant missing")?
        .get("version")
        .ok_or("unbound")?
        .clone();
    assert_eq!(tolerant_binding.roles(), vec!["a", "b"]);
    assert!(tolerant_binding.has_failure());
    Ok(())
}

#[test]
fn test_cluster_local_dependencies_and_absent_members() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let (mut fleet, graphs) = member_graphs(&[("only", "7")], None)?;

    let missing = PluginId::plugin("facts::Kernel");
    let summary = fleet.registry.declare(
        Declaration::cluster("checks::Summary")
            .requires(&fleet.version)
            .process(|_| Ok(Some(Value::new("ok")))),
    )?;
    let report = fleet.registry.declare(
        Declaration::cluster("checks::Report")
            .requires(&summary)
            .optional(&missing),
    )?;
    let kernel = fleet
        .registry
        .declare(Declaration::cluster("checks::KernelSpread").requires(&missing))?;

    let cluster = ClusterExecutor::new(&fleet.registry, graphs).run()?;

    let report_inst = cluster.first(&report).ok_or("Report missing")?;
    assert_eq!(report_inst.dep::<&str>("summary"), Some(&"ok"));
    assert!(report_inst.get("kernel").is_none());
    assert!(!cluster.contains(&kernel));
    // The cluster tier never runs plugin-family classes itself.
    assert!(!cluster.contains(&fleet.version));
    Ok(())
}

#[test]
fn test_plugin_family_cannot_depend_on_cluster_family() {
    let mut reg = Registry::new();
    let agg = PluginId::cluster("checks::Agg");
    let err = reg.declare(Declaration::plugin("facts::Bad").requires(&agg));
    assert!(matches!(
        err,
        Err(plugdag::PlugdagError::InvalidDependency { .. })
    ));
}

#[test]
fn test_reference_under_wrong_family_aborts_the_run() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let (mut fleet, graphs) = member_graphs(&[("only", "7")], None)?;

    // Declared as a plugin reference, registered later as a cluster class.
    let local = PluginId::plugin("checks::Local");
    fleet.registry.declare(
        Declaration::cluster("checks::Agg")
            .requires(&local)
            .process(|_| Ok(Some(Value::new("ran")))),
    )?;
    fleet.registry.declare(Declaration::cluster("checks::Local"))?;

    match ClusterExecutor::new(&fleet.registry, graphs).run() {
        Err(plugdag::PlugdagError::InvalidDependency { from, to, .. }) => {
            assert_eq!(from, "checks::Agg");
            assert!(to.contains("checks::Local"));
        }
        Err(e) => panic!("Expected InvalidDependency, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
    Ok(())
}

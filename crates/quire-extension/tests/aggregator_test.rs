//! Aggregator semantics: names and errors append, details replace.

use std::sync::Arc;
use std::thread;

use quire_extension::{
    ExtensionAggregator, ExtensionDescriptor, Module, ModuleAggregator, ModuleType, Plugin,
    PluginAggregator, PluginType,
};

#[test]
fn test_names_append_in_order() {
    let aggregator = PluginAggregator::new();
    aggregator.add_name("a");
    aggregator.add_name("b");
    assert_eq!(aggregator.names(), vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_detail_is_replaced() {
    let aggregator = PluginAggregator::new();
    let d1 = ExtensionDescriptor::<Plugin>::new("d1").with_kind_type(PluginType::Cron);
    let d2 = ExtensionDescriptor::<Plugin>::new("d2").with_kind_type(PluginType::Theme);

    aggregator.add_detail(vec![d1]);
    aggregator.add_detail(vec![d2.clone()]);

    assert_eq!(aggregator.detail(), vec![d2]);
}

#[test]
fn test_duplicate_names_are_kept() {
    let aggregator = ModuleAggregator::new();
    aggregator.add_name("pages");
    aggregator.add_name("pages");
    assert_eq!(aggregator.names().len(), 2);
}

#[test]
fn test_getters_return_snapshots() {
    let aggregator = ModuleAggregator::new();
    aggregator.add_name("pages");
    let names = aggregator.names();
    aggregator.add_name("users");
    assert_eq!(names, vec!["pages".to_string()]);
    assert_eq!(aggregator.names().len(), 2);
}

#[test]
fn test_global_instances_are_shared_per_kind() {
    let first = ExtensionAggregator::<Module>::instance();
    let second = ExtensionAggregator::<Module>::instance();
    assert!(Arc::ptr_eq(&first, &second));

    let marker = "global-instance-marker";
    first.add_name(marker);
    assert!(second.names().iter().any(|n| n == marker));
    assert!(!ExtensionAggregator::<Plugin>::instance()
        .names()
        .iter()
        .any(|n| n == marker));
}

#[test]
fn test_concurrent_appends_are_not_lost() {
    let aggregator = Arc::new(ModuleAggregator::new());
    let workers: Vec<_> = (0..8)
        .map(|i| {
            let aggregator = aggregator.clone();
            thread::spawn(move || {
                for j in 0..50 {
                    aggregator.add_name(format!("m{i}-{j}"));
                    aggregator.set_error(format!("e{i}-{j}"));
                    aggregator.add_detail(vec![ExtensionDescriptor::new(format!("d{i}"))
                        .with_kind_type(ModuleType::Service)]);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(aggregator.names().len(), 400);
    assert_eq!(aggregator.errors().len(), 400);
    assert_eq!(aggregator.detail().len(), 1);
}

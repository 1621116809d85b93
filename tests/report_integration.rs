//! Status snapshots and their per-metric fallbacks

mod common;

use std::fs;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use common::{manager, seed};
use llxc::config::IpFamily;
use llxc::manager::Privilege;
use llxc::{Config, ContainerState, Manager};

#[tokio::test]
async fn test_snapshot_without_accounting_files() {
    let (_base, manager) = manager();
    seed(&manager, "web1", ContainerState::Stopped);

    let snapshot = manager.snapshot("web1").await.unwrap();
    assert_eq!(snapshot.state, ContainerState::Stopped);
    assert_eq!(snapshot.tasks, None);
    assert_eq!(snapshot.memory_bytes, None);
    assert_eq!(snapshot.init_pid, None);
    assert_eq!(snapshot.address, None);
    assert!(!snapshot.autostart);
}

#[tokio::test]
async fn test_snapshot_reads_cgroup_files() {
    let (base, manager) = manager();
    seed(&manager, "web1", ContainerState::Running);

    let tasks = base.join("cgroup/cpuset/lxc/web1");
    fs::create_dir_all(&tasks).unwrap();
    fs::write(tasks.join("tasks"), "1\n57\n58\n").unwrap();
    let unified = base.join("cgroup/lxc.payload.web1");
    fs::create_dir_all(&unified).unwrap();
    fs::write(unified.join("memory.current"), "52428800\n").unwrap();

    let snapshot = manager.snapshot("web1").await.unwrap();
    assert_eq!(snapshot.tasks, Some(3));
    assert_eq!(snapshot.memory_bytes, Some(52428800));
    assert_eq!(snapshot.init_pid, Some(4242));
    assert_eq!(snapshot.address, Some("10.0.3.17".parse::<IpAddr>().unwrap()));
}

#[tokio::test]
async fn test_unparseable_memory_is_omitted() {
    let (base, manager) = manager();
    seed(&manager, "web1", ContainerState::Running);

    let memory = base.join("cgroup/memory/lxc/web1");
    fs::create_dir_all(&memory).unwrap();
    fs::write(memory.join("memory.usage_in_bytes"), "garbage").unwrap();

    let snapshot = manager.snapshot("web1").await.unwrap();
    assert_eq!(snapshot.memory_bytes, None);
    assert_eq!(snapshot.state, ContainerState::Running);
}

#[tokio::test]
async fn test_address_probe_times_out() {
    let (_base, manager) = manager();
    seed(&manager, "web1", ContainerState::Running);
    manager.runtime().delay_addresses(Duration::from_secs(5));

    let started = Instant::now();
    let snapshot = manager.snapshot("web1").await.unwrap();

    assert_eq!(snapshot.address, None);
    assert_eq!(snapshot.state, ContainerState::Running);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_ipv6_family() {
    let base = common::unique_test_dir();
    let mut config = Config::rooted_at(&base);
    config.family = IpFamily::Ipv6;
    let manager = Manager::new(config, common::FakeRuntime::default())
        .with_privilege(Privilege::Assume(true));
    seed(&manager, "web1", ContainerState::Running);

    let snapshot = manager.snapshot("web1").await.unwrap();
    assert!(matches!(snapshot.address, Some(IpAddr::V6(_))));
}

#[tokio::test]
async fn test_list_in_name_order() {
    let (_base, manager) = manager();
    seed(&manager, "web2", ContainerState::Running);
    seed(&manager, "db", ContainerState::Stopped);
    seed(&manager, "web1", ContainerState::Frozen);
    fs::create_dir_all(manager.config().container_root.join("not-a-container")).unwrap();

    let snapshots = manager.list().await;
    let names: Vec<&str> = snapshots.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["db", "web1", "web2"]);
    assert_eq!(snapshots[1].state, ContainerState::Frozen);
    assert_eq!(snapshots[1].address, None);
}

#[tokio::test]
async fn test_snapshot_serializes() {
    let (_base, manager) = manager();
    seed(&manager, "web1", ContainerState::Running);

    let snapshot = manager.snapshot("web1").await.unwrap();
    let json: serde_json::Value = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["name"], "web1");
    assert_eq!(json["state"], "RUNNING");
    assert_eq!(json["tasks"], serde_json::Value::Null);
}

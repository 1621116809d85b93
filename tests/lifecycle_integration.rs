//! Lifecycle controller against the scripted runtime

mod common;

use std::fs;
use std::time::{Duration, Instant};

use common::{manager, seed, seed_keypair, unique_test_dir, unprivileged, FakeRuntime};
use llxc::manager::Privilege;
use llxc::{Config, ContainerState, LlxcError, Manager, Operation};

#[tokio::test]
async fn test_start_stopped_container() {
    let (_base, manager) = manager();
    seed(&manager, "web1", ContainerState::Stopped);

    manager.start("web1").await.unwrap();

    assert_eq!(manager.state("web1").await.unwrap(), ContainerState::Running);
    let snapshot = manager.snapshot("web1").await.unwrap();
    assert!(snapshot.init_pid.unwrap() > 0);
}

#[tokio::test]
async fn test_start_running_is_noop() {
    let (_base, manager) = manager();
    seed(&manager, "web1", ContainerState::Running);

    manager.start("web1").await.unwrap();
    assert!(manager.runtime().calls().is_empty());
}

#[tokio::test]
async fn test_halt_and_kill_stopped_are_noops() {
    let (_base, manager) = manager();
    seed(&manager, "web1", ContainerState::Stopped);

    manager.halt("web1").await.unwrap();
    manager.kill("web1").await.unwrap();
    assert!(manager.runtime().calls().is_empty());
}

#[tokio::test]
async fn test_kill_frozen_container() {
    let (_base, manager) = manager();
    seed(&manager, "web1", ContainerState::Frozen);

    manager.kill("web1").await.unwrap();
    assert_eq!(manager.state("web1").await.unwrap(), ContainerState::Stopped);
    assert_eq!(manager.runtime().calls(), vec!["kill web1"]);
}

#[tokio::test]
async fn test_freeze_requires_running() {
    let (_base, manager) = manager();
    seed(&manager, "web1", ContainerState::Stopped);

    let err = manager.freeze("web1").await.unwrap_err();
    match err {
        LlxcError::InvalidState { required, actual, .. } => {
            assert_eq!(required, ContainerState::Running);
            assert_eq!(actual, ContainerState::Stopped);
        }
        other => panic!("expected InvalidState, got {:?}", other),
    }
    assert_eq!(manager.state("web1").await.unwrap(), ContainerState::Stopped);
}

#[tokio::test]
async fn test_unfreeze_requires_frozen() {
    let (_base, manager) = manager();
    seed(&manager, "web1", ContainerState::Running);

    let err = manager.unfreeze("web1").await.unwrap_err();
    assert!(matches!(
        err,
        LlxcError::InvalidState { required: ContainerState::Frozen, .. }
    ));
    assert_eq!(err.exit_code(), 409);
    assert_eq!(manager.state("web1").await.unwrap(), ContainerState::Running);
}

#[tokio::test]
async fn test_freeze_unfreeze_cycle() {
    let (_base, manager) = manager();
    seed(&manager, "web1", ContainerState::Running);

    manager.freeze("web1").await.unwrap();
    assert_eq!(manager.state("web1").await.unwrap(), ContainerState::Frozen);

    manager.unfreeze("web1").await.unwrap();
    assert_eq!(manager.state("web1").await.unwrap(), ContainerState::Running);
}

#[tokio::test]
async fn test_missing_container_is_not_found() {
    let (_base, manager) = manager();

    let err = manager.snapshot("ghost").await.unwrap_err();
    assert!(matches!(err, LlxcError::NotFound(ref n) if n == "ghost"));
    assert_eq!(err.code(), "404");
    assert_eq!(err.exit_code(), 404);

    let err = manager.start("ghost").await.unwrap_err();
    assert!(matches!(err, LlxcError::NotFound(_)));
}

#[tokio::test]
async fn test_unprivileged_mutations_have_no_side_effects() {
    let (base, privileged) = manager();
    let path = seed(&privileged, "web1", ContainerState::Stopped);
    privileged.toggle_autostart("web1").await.unwrap();

    let manager = unprivileged(&base);
    let ops = [
        Operation::Start,
        Operation::Halt,
        Operation::Kill,
        Operation::Freeze,
        Operation::Unfreeze,
        Operation::Destroy,
        Operation::ToggleAutostart,
        Operation::Archive,
        Operation::Unarchive,
    ];
    for op in ops {
        let err = manager.apply(op, "web1").await.unwrap_err();
        assert!(
            matches!(err, LlxcError::PermissionDenied),
            "{} should need privilege, got {:?}",
            op.as_str(),
            err
        );
        assert_eq!(err.exit_code(), 403);
    }

    assert!(matches!(manager.create("web2").await, Err(LlxcError::PermissionDenied)));
    assert!(matches!(
        manager.clone_container("web1", "web2").await,
        Err(LlxcError::PermissionDenied)
    ));

    assert!(manager.runtime().calls().is_empty());
    assert!(path.join("config").exists());
    assert!(manager.is_autostart("web1"));
    assert_eq!(manager.live_names(), vec!["web1"]);
    assert!(manager.list_archived().is_empty());
}

#[tokio::test]
async fn test_unprivileged_destroy_keeps_container() {
    let (base, privileged) = manager();
    seed(&privileged, "web1", ContainerState::Running);

    let manager = unprivileged(&base);
    let err = manager.destroy("web1").await.unwrap_err();
    assert_eq!(err.exit_code(), 403);
    assert_eq!(privileged.live_names(), vec!["web1"]);
}

#[tokio::test]
async fn test_create_starts_and_enables_autostart() {
    let (_base, manager) = manager();

    manager.create("web1").await.unwrap();

    assert_eq!(manager.live_names(), vec!["web1"]);
    assert_eq!(manager.state("web1").await.unwrap(), ContainerState::Running);
    assert!(manager.is_autostart("web1"));
    assert_eq!(manager.runtime().calls(), vec!["create web1", "start web1"]);
}

#[tokio::test]
async fn test_create_installs_host_key() {
    let (_base, manager) = manager();
    let key = seed_keypair(&manager);

    manager.create("web1").await.unwrap();

    let handle = manager.resolve("web1").await.unwrap();
    let authorized = fs::read_to_string(handle.rootfs.join("root/.ssh/authorized_keys")).unwrap();
    assert_eq!(authorized.trim(), key);
}

#[tokio::test]
async fn test_create_refuses_existing_names() {
    let (_base, manager) = manager();
    seed(&manager, "web1", ContainerState::Stopped);

    let err = manager.create("web1").await.unwrap_err();
    assert!(matches!(err, LlxcError::AlreadyExists(_)));

    let err = manager.create("../etc").await.unwrap_err();
    assert!(matches!(err, LlxcError::InvalidArgument(_)));
    assert!(manager.runtime().calls().is_empty());
}

#[tokio::test]
async fn test_destroy_running_container() {
    let (_base, manager) = manager();
    let path = seed(&manager, "web1", ContainerState::Running);
    manager.toggle_autostart("web1").await.unwrap();

    manager.destroy("web1").await.unwrap();

    assert!(!path.exists());
    assert!(!manager.is_autostart("web1"));
    assert!(manager.live_names().is_empty());
    assert_eq!(manager.runtime().calls(), vec!["kill web1", "destroy web1"]);
}

#[tokio::test]
async fn test_destroy_stopped_skips_kill() {
    let (_base, manager) = manager();
    seed(&manager, "web1", ContainerState::Stopped);

    manager.destroy("web1").await.unwrap();
    assert_eq!(manager.runtime().calls(), vec!["destroy web1"]);
}

#[tokio::test]
async fn test_clone_container() {
    let (_base, manager) = manager();
    seed(&manager, "web1", ContainerState::Running);

    manager.clone_container("web1", "web2").await.unwrap();

    assert_eq!(manager.live_names(), vec!["web1", "web2"]);
    assert_eq!(manager.state("web2").await.unwrap(), ContainerState::Stopped);
    assert_eq!(manager.state("web1").await.unwrap(), ContainerState::Running);

    let err = manager.clone_container("web1", "web2").await.unwrap_err();
    assert!(matches!(err, LlxcError::AlreadyExists(ref n) if n == "web2"));
}

#[tokio::test]
async fn test_toggle_autostart() {
    let (base, manager) = manager();
    seed(&manager, "web1", ContainerState::Stopped);

    assert!(!manager.is_autostart("web1"));
    assert!(manager.toggle_autostart("web1").await.unwrap());
    assert!(manager.is_autostart("web1"));

    let link = fs::read_link(base.join("auto/web1")).unwrap();
    assert_eq!(link, base.join("lxc/web1"));

    assert!(!manager.toggle_autostart("web1").await.unwrap());
    assert!(!manager.is_autostart("web1"));
}

#[tokio::test]
async fn test_runtime_failure_is_operation_failed() {
    let (_base, manager) = manager();
    seed(&manager, "web1", ContainerState::Stopped);
    manager.runtime().fail("web1");

    let err = manager.start("web1").await.unwrap_err();
    assert!(matches!(err, LlxcError::OperationFailed { op: "start", .. }));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_destroy_waits_grace_before_kill() {
    let base = unique_test_dir();
    let mut config = Config::rooted_at(&base);
    config.destroy_grace = Duration::from_millis(200);
    let manager = Manager::new(config, FakeRuntime::default())
        .with_privilege(Privilege::Assume(true));
    seed(&manager, "web1", ContainerState::Frozen);

    let started = Instant::now();
    manager.destroy("web1").await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(200));
    assert_eq!(manager.runtime().calls(), vec!["kill web1", "destroy web1"]);
}

#[tokio::test]
async fn test_destroy_stopped_skips_grace() {
    let base = unique_test_dir();
    let mut config = Config::rooted_at(&base);
    config.destroy_grace = Duration::from_secs(5);
    let manager = Manager::new(config, FakeRuntime::default())
        .with_privilege(Privilege::Assume(true));
    seed(&manager, "web1", ContainerState::Stopped);

    let started = Instant::now();
    manager.destroy("web1").await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
}

//! Launch hardening: single-instance start under concurrency
//!
//! Uses the real flock launch lock and filesystem store; the spawner and
//! probe are mocks so no update is actually launched.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tempfile::TempDir;
use tokio::task::JoinSet;

use kvmd_core::application::{SettleConfig, UpdateLauncher};
use kvmd_core::domain::UpdateResult;
use kvmd_core::error::AppError;
use kvmd_core::port::liveness_probe::mocks::MockLivenessProbe;
use kvmd_core::port::process_launcher::mocks::MockProcessLauncher;
use kvmd_core::port::{LaunchLock, ResultStore};
use kvmd_infra_fs::{FlockLaunchLock, FsResultStore};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_starts_spawn_exactly_once() {
    let dir = TempDir::new().unwrap();
    let probe = Arc::new(MockLivenessProbe::not_running());
    let spawner = Arc::new(MockProcessLauncher::new().marks_running(probe.clone()));
    let launcher = Arc::new(UpdateLauncher::new(
        probe.clone(),
        Arc::new(FsResultStore::new(dir.path().join("logs"))),
        spawner.clone(),
        Arc::new(FlockLaunchLock::in_dir(dir.path().join("state"))),
    ));

    let mut set = JoinSet::new();
    for _ in 0..8 {
        let launcher = launcher.clone();
        set.spawn(async move { launcher.start().await });
    }

    let mut started = 0;
    let mut refused = 0;
    while let Some(joined) = set.join_next().await {
        match joined.unwrap() {
            Ok(()) => started += 1,
            Err(AppError::AlreadyInProgress) => refused += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(started, 1);
    assert_eq!(refused, 7);
    assert_eq!(spawner.spawn_count(), 1);
}

#[tokio::test]
async fn test_lock_held_by_other_instance_refuses_without_mutation() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FsResultStore::new(dir.path().join("logs")));
    store
        .write(&UpdateResult::failure("previous", Utc::now()))
        .await
        .unwrap();

    // Another server process mid-launch
    let other = FlockLaunchLock::in_dir(dir.path().join("state"));
    let _held = other.try_acquire().unwrap().unwrap();

    let probe = Arc::new(MockLivenessProbe::not_running());
    let spawner = Arc::new(MockProcessLauncher::new());
    let launcher = UpdateLauncher::new(
        probe,
        store.clone(),
        spawner.clone(),
        Arc::new(FlockLaunchLock::in_dir(dir.path().join("state"))),
    );

    let result = launcher.start().await;

    assert!(matches!(result, Err(AppError::AlreadyInProgress)));
    assert_eq!(spawner.spawn_count(), 0);
    assert_eq!(
        store.read().await.unwrap().unwrap().error(),
        Some("previous")
    );
}

#[tokio::test]
async fn test_lock_released_after_settle_timeout() {
    let dir = TempDir::new().unwrap();
    // Probe never sees the updater, e.g. the service failed immediately
    let probe = Arc::new(MockLivenessProbe::not_running());
    let spawner = Arc::new(MockProcessLauncher::new());
    let lock = Arc::new(FlockLaunchLock::in_dir(dir.path()));
    let launcher = UpdateLauncher::new(
        probe,
        Arc::new(FsResultStore::new(dir.path())),
        spawner.clone(),
        lock.clone(),
    )
    .with_settle(SettleConfig {
        poll_interval: Duration::from_millis(5),
        timeout: Duration::from_millis(25),
    });

    launcher.start().await.unwrap();
    assert!(lock.try_acquire().unwrap().is_some());

    // Nothing visible in the process table, so a retry is allowed
    launcher.start().await.unwrap();
    assert_eq!(spawner.spawn_count(), 2);
}

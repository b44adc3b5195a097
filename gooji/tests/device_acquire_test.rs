use std::sync::Arc;
use std::time::Duration;

use gooji_lib::device::{
    AcquireStatus, CombinedPermission, DeviceAcquirer, DeviceError, DeviceInventory,
    PermissionState, PermissionStatus, RetryPolicy, StreamConstraints,
};
use gooji_lib::media::FakeMediaBackend;

fn short_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(1))
}

#[tokio::test]
async fn test_acquire_binds_preview_and_reports_ready() {
    let backend = Arc::new(FakeMediaBackend::new());
    let mut acquirer = DeviceAcquirer::new(backend.clone());

    let handle = acquirer
        .acquire(&StreamConstraints::default())
        .await
        .unwrap();

    assert!(acquirer.status().is_ready());
    assert_eq!(acquirer.current_stream(), Some(&handle));
    assert_eq!(backend.preview_binds(), vec![handle.raw()]);
}

#[tokio::test]
async fn test_single_live_handle_policy() {
    let backend = Arc::new(FakeMediaBackend::new());
    let mut acquirer = DeviceAcquirer::new(backend.clone());
    let constraints = StreamConstraints::default();

    let first = acquirer.acquire(&constraints).await.unwrap();
    let second = acquirer.acquire(&constraints).await.unwrap();
    assert_ne!(first, second);

    // The previous handle was released before the new one was issued
    assert_eq!(backend.live_stream_count(), 1);
    assert_eq!(backend.released_streams(), vec![first.raw()]);

    acquirer.release().await;
    assert_eq!(backend.live_stream_count(), 0);
    assert_eq!(acquirer.status(), &AcquireStatus::Idle);
}

#[tokio::test]
async fn test_failure_classified_in_status() {
    let backend = Arc::new(FakeMediaBackend::new());
    backend.script_acquire_failures(1, DeviceError::DeviceNotFound);

    let mut acquirer = DeviceAcquirer::new(backend);
    let result = acquirer.acquire(&StreamConstraints::default()).await;

    assert_eq!(result, Err(DeviceError::DeviceNotFound));
    match acquirer.status() {
        AcquireStatus::Error { kind, message } => {
            assert_eq!(kind, &DeviceError::DeviceNotFound);
            assert!(message.contains("No capture device"));
        }
        other => panic!("Expected error status, got {other:?}"),
    }
}

#[tokio::test]
async fn test_retry_recovers_within_budget() {
    let backend = Arc::new(FakeMediaBackend::new());
    backend.script_acquire_failures(2, DeviceError::Unknown("flaky".to_string()));

    let mut acquirer = DeviceAcquirer::new(backend.clone());
    let result = acquirer
        .acquire_with_retry(&StreamConstraints::default(), &short_retry())
        .await;

    assert!(result.is_ok());
    assert_eq!(backend.acquire_attempts(), 3);
    assert!(acquirer.status().is_ready());
}

#[tokio::test]
async fn test_retry_budget_exhaustion_is_terminal() {
    let backend = Arc::new(FakeMediaBackend::new());
    backend.script_acquire_failures(10, DeviceError::PermissionDenied);

    let mut acquirer = DeviceAcquirer::new(backend.clone());
    let result = acquirer
        .acquire_with_retry(&StreamConstraints::default(), &short_retry())
        .await;

    assert_eq!(result, Err(DeviceError::PermissionDenied));

    // Exactly the budgeted attempts, and no further automatic retry
    assert_eq!(backend.acquire_attempts(), 3);
    assert!(acquirer.status().is_error());
    assert!(acquirer.current_stream().is_none());
}

#[tokio::test]
async fn test_explicit_retry_after_exhaustion() {
    let backend = Arc::new(FakeMediaBackend::new());
    backend.script_acquire_failures(3, DeviceError::PermissionDenied);

    let mut acquirer = DeviceAcquirer::new(backend.clone());
    let constraints = StreamConstraints::default();

    assert!(acquirer
        .acquire_with_retry(&constraints, &short_retry())
        .await
        .is_err());

    // The user-action retry control goes through acquire() directly
    assert!(acquirer.acquire(&constraints).await.is_ok());
    assert!(acquirer.status().is_ready());
}

#[tokio::test]
async fn test_empty_inventory_is_warning_not_error() {
    let backend = Arc::new(FakeMediaBackend::new());
    backend.set_inventory(DeviceInventory::default());

    let mut acquirer = DeviceAcquirer::new(backend);
    let inventory = acquirer.enumerate().await.unwrap();

    assert!(inventory.is_empty());
    assert!(matches!(
        acquirer.status(),
        AcquireStatus::Warning { .. }
    ));
}

#[tokio::test]
async fn test_permission_combination_precedence() {
    let backend = Arc::new(FakeMediaBackend::new());
    let acquirer = DeviceAcquirer::new(backend.clone());

    assert_eq!(
        acquirer.combined_permission().await,
        CombinedPermission::Granted
    );

    backend.set_permission_status(PermissionStatus::new(
        PermissionState::Granted,
        PermissionState::Denied,
    ));
    assert_eq!(
        acquirer.combined_permission().await,
        CombinedPermission::Denied
    );

    backend.set_permission_status(PermissionStatus::new(
        PermissionState::Granted,
        PermissionState::Prompt,
    ));
    assert_eq!(
        acquirer.combined_permission().await,
        CombinedPermission::PartiallyGranted
    );

    backend.set_permission_status(PermissionStatus::unknown());
    assert_eq!(
        acquirer.combined_permission().await,
        CombinedPermission::Unknown
    );
}

#[tokio::test]
async fn test_constraints_reach_backend_defaults() {
    // The default constraints mirror the capture page: 720p, front camera,
    // audio on
    let constraints = StreamConstraints::default();
    assert_eq!(constraints.ideal_width, 1280);
    assert_eq!(constraints.ideal_height, 720);
    assert!(constraints.audio);
}

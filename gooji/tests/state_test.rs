use gooji_lib::state::{AppState, StateChangeEvent, StateError, StateManager};

#[tokio::test]
async fn test_state_manager_default() {
    let manager = StateManager::default();
    assert!(manager.current().is_idle());
}

#[tokio::test]
async fn test_complete_capture_upload_flow() {
    let manager = StateManager::new();

    // 1. Idle -> Acquiring
    assert!(manager.transition(AppState::acquiring()).is_ok());
    assert!(manager.current().is_acquiring());

    // 2. Acquiring -> Ready
    assert!(manager.transition(AppState::ready()).is_ok());
    assert!(manager.current().is_ready());

    // 3. Ready -> Recording
    assert!(manager.transition(AppState::recording()).is_ok());
    assert!(manager.current().is_recording());

    // 4. Recording -> Sealed
    assert!(manager.transition(AppState::sealed()).is_ok());
    assert!(manager.current().is_sealed());

    // 5. Sealed -> Uploading
    assert!(manager.transition(AppState::uploading()).is_ok());
    assert!(manager.current().is_uploading());

    // 6. Uploading -> Idle (success)
    assert!(manager.transition(AppState::idle()).is_ok());
    assert!(manager.current().is_idle());
}

#[tokio::test]
async fn test_acquisition_failure_flow() {
    let manager = StateManager::new();

    manager.transition(AppState::acquiring()).unwrap();

    // Acquisition failed -> Error
    assert!(manager
        .transition(AppState::error("Camera or microphone permission denied"))
        .is_ok());
    assert!(manager.current().is_error());
    assert_eq!(
        manager.current().error_message(),
        Some("Camera or microphone permission denied")
    );

    // Recording controls stay disabled in the error state
    let event = StateChangeEvent::from(&*manager.current());
    assert!(!event.recording_enabled);
    assert!(!event.upload_enabled);

    // Error -> Acquiring (explicit user retry)
    assert!(manager.transition(AppState::acquiring()).is_ok());
}

#[tokio::test]
async fn test_upload_failure_keeps_artifact_flow() {
    let manager = StateManager::new();

    manager.transition(AppState::acquiring()).unwrap();
    manager.transition(AppState::ready()).unwrap();
    manager.transition(AppState::recording()).unwrap();
    manager.transition(AppState::sealed()).unwrap();
    manager.transition(AppState::uploading()).unwrap();

    // Failure returns to Sealed: the artifact is still there to resubmit
    assert!(manager.transition(AppState::sealed()).is_ok());
    let event = StateChangeEvent::from(&*manager.current());
    assert!(event.upload_enabled);

    // Resubmission
    assert!(manager.transition(AppState::uploading()).is_ok());
    assert!(manager.transition(AppState::idle()).is_ok());
}

#[tokio::test]
async fn test_re_record_discards_nothing_until_started() {
    let manager = StateManager::new();

    manager.transition(AppState::acquiring()).unwrap();
    manager.transition(AppState::ready()).unwrap();
    manager.transition(AppState::recording()).unwrap();
    manager.transition(AppState::sealed()).unwrap();

    // A new recording can start directly from Sealed
    assert!(manager.transition(AppState::recording()).is_ok());
    assert!(manager.transition(AppState::sealed()).is_ok());
}

#[tokio::test]
async fn test_invalid_transitions_are_rejected() {
    let manager = StateManager::new();

    let result = manager.transition(AppState::uploading());
    match result.unwrap_err() {
        StateError::InvalidTransition { from, to } => {
            assert_eq!(from, AppState::Idle);
            assert_eq!(to, AppState::Uploading);
        }
    }

    assert!(manager.transition(AppState::recording()).is_err());
    assert!(manager.transition(AppState::sealed()).is_err());

    manager.transition(AppState::acquiring()).unwrap();
    assert!(manager.transition(AppState::uploading()).is_err());
    assert!(manager.transition(AppState::recording()).is_err());
}

#[tokio::test]
async fn test_listener_notification() {
    let manager = StateManager::new();
    let mut rx = manager.subscribe().await;

    manager.transition(AppState::acquiring()).unwrap();
    manager.transition(AppState::ready()).unwrap();

    let first = tokio::time::timeout(tokio::time::Duration::from_millis(500), rx.recv())
        .await
        .expect("listener should be notified");
    assert_eq!(first, Some(AppState::Acquiring));

    let second = tokio::time::timeout(tokio::time::Duration::from_millis(500), rx.recv())
        .await
        .expect("listener should be notified");
    assert_eq!(second, Some(AppState::Ready));
}

#[tokio::test]
async fn test_state_event_controls_gating() {
    // Controls are enabled exactly by the states the flow defines
    let ready = StateChangeEvent::from(&AppState::ready());
    assert!(ready.recording_enabled);
    assert!(!ready.upload_enabled);

    let sealed = StateChangeEvent::from(&AppState::sealed());
    assert!(sealed.recording_enabled);
    assert!(sealed.upload_enabled);

    let idle = StateChangeEvent::from(&AppState::idle());
    assert!(!idle.recording_enabled);
    assert!(!idle.upload_enabled);
}

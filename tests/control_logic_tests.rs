use std::time::Duration;
use telemetry_lab::config::PipelineConfig;
use telemetry_lab::kernel::cadence::CadenceController;
use telemetry_lab::kernel::event::Mode;
use telemetry_lab::kernel::lifecycle::{LifecycleAction, LifecycleGraph, LifecycleRequest, PipelineStatus};
use telemetry_lab::kernel::state::{PipelineState, StateDelta};
use telemetry_lab::ConfigError;

#[test]
fn test_normal_mode_cadence() {
    let cadence = CadenceController::default();
    let params = cadence.parameters(Mode::Normal, 3);
    assert_eq!(params.interval, Duration::from_millis(50), "20 ticks per second");
    assert_eq!(params.effective_load, 3);
}

#[test]
fn test_power_save_cadence() {
    let cadence = CadenceController::default();
    let params = cadence.parameters(Mode::PowerSave, 3);
    assert_eq!(params.interval_ms(), 100, "10 ticks per second");
    assert_eq!(params.effective_load, 2);

    // Never drops below 1
    assert_eq!(cadence.parameters(Mode::PowerSave, 1).effective_load, 1);
}

#[test]
fn test_lifecycle_legal_transitions() {
    use LifecycleRequest::*;
    use PipelineStatus::*;

    assert_eq!(
        LifecycleGraph::transition(Stopped, Start { load: 2 }),
        Some(LifecycleAction::Launch { load: 2 })
    );
    assert_eq!(LifecycleGraph::transition(Running, Stop), Some(LifecycleAction::Halt));
    assert_eq!(
        LifecycleGraph::transition(Running, ModeChanged(Mode::PowerSave)),
        Some(LifecycleAction::Restart { mode: Mode::PowerSave })
    );
    assert_eq!(
        LifecycleGraph::transition(Running, UpdateLoad { load: 4 }),
        Some(LifecycleAction::Retune { load: 4 })
    );
}

#[test]
fn test_lifecycle_illegal_transitions_are_ignored() {
    use LifecycleRequest::*;
    use PipelineStatus::*;

    assert!(LifecycleGraph::transition(Running, Start { load: 1 }).is_none(), "duplicate start");
    assert!(LifecycleGraph::transition(Stopped, Stop).is_none());
    assert!(LifecycleGraph::transition(Stopped, UpdateLoad { load: 3 }).is_none());
    assert!(LifecycleGraph::transition(Stopped, ModeChanged(Mode::Normal)).is_none());
}

#[test]
fn test_next_status() {
    assert_eq!(
        LifecycleGraph::next_status(PipelineStatus::Stopped, LifecycleAction::Launch { load: 1 }),
        PipelineStatus::Running
    );
    assert_eq!(
        LifecycleGraph::next_status(PipelineStatus::Running, LifecycleAction::Retune { load: 5 }),
        PipelineStatus::Running
    );
    assert_eq!(
        LifecycleGraph::next_status(PipelineStatus::Running, LifecycleAction::Halt),
        PipelineStatus::Stopped
    );
}

#[test]
fn test_state_reduction() {
    let mut state = PipelineState::new(Mode::Normal, 2);
    assert!(!state.running);

    state.reduce(StateDelta::Started { load: 4 });
    assert!(state.running);
    assert_eq!(state.configured_load, 4);

    state.reduce(StateDelta::ModeObserved(Mode::PowerSave));
    state.reduce(StateDelta::LoadUpdated(1));
    state.reduce(StateDelta::Stopped);
    assert_eq!(
        state,
        PipelineState { running: false, mode: Mode::PowerSave, configured_load: 1 }
    );
}

#[test]
fn test_mode_parsing() {
    assert_eq!("normal".parse::<Mode>(), Ok(Mode::Normal));
    assert_eq!("Power-Save".parse::<Mode>(), Ok(Mode::PowerSave));
    assert!("turbo".parse::<Mode>().is_err());
}

#[test]
fn test_config_defaults() {
    let config = PipelineConfig::default();
    assert_eq!(config.queue_capacity, 10);
    assert_eq!(config.latency_history, 100);
    assert_eq!(config.log_capacity, 50);
    assert_eq!(config.jank_window_ms, 30_000);
    assert_eq!(config.load_range(), 1..=5);
    assert!(config.validate().is_ok());
}

#[test]
fn test_result_feed_capacity_rounds_to_power_of_two() {
    let config = PipelineConfig::default();
    assert_eq!(config.result_feed_capacity, 10);
    assert_eq!(config.effective_result_feed_capacity(), 16);

    let exact = PipelineConfig { result_feed_capacity: 32, ..PipelineConfig::default() };
    assert_eq!(exact.effective_result_feed_capacity(), 32);

    assert!(matches!(
        PipelineConfig::from_json_str(r#"{ "result_feed_capacity": 1000000 }"#),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_config_partial_json_keeps_defaults() {
    let config = PipelineConfig::from_json_str(r#"{ "grid_size": 64, "normal_rate_hz": 30 }"#)
        .expect("valid config");
    assert_eq!(config.grid_size, 64);
    assert_eq!(config.normal_rate_hz, 30);
    assert_eq!(config.power_save_rate_hz, 10);
}

#[test]
fn test_config_rejects_invalid_values() {
    assert!(matches!(
        PipelineConfig::from_json_str(r#"{ "queue_capacity": 0 }"#),
        Err(ConfigError::Invalid(_))
    ));
    assert!(matches!(
        PipelineConfig::from_json_str(r#"{ "default_load": 9 }"#),
        Err(ConfigError::Invalid(_))
    ));
    assert!(matches!(
        PipelineConfig::from_json_str("{ not json"),
        Err(ConfigError::Parse(_))
    ));
}

// Test Helpers Module - sample components for integration tests and demos
//
// Provides a component whose behavior is driven by command name, plus the
// state names, keys and timings tests assert against.

pub mod sample_component;

pub use sample_component::{
    choice_key, choices, commands, encoder_key, sample_hcd_info, spawn_sample_hcd,
    SampleComponentHandlers, FAILURE_REASON, IMMEDIATE_RESULT_ENCODER, INVALID_REASON,
    LONG_RUNNING_DURATION, MEDIUM_RUNNING_DURATION, SHORT_RUNNING_DURATION, SLOW_VALIDATION_DURATION,
    TEST_STATE_NAME, TEST_STATE_SETUP,
};

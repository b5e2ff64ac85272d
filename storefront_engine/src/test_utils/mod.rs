//! Helpers for setting up throwaway databases in tests. Only compiled with the `test_utils` feature.
pub mod prepare_env;

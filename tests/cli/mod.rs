//! Contract tests for the edgewise CLI

mod support;

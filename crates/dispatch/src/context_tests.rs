// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cleo_core::FakeClock;
use std::time::Duration;

#[test]
fn lock_timeout_reflects_config() {
    let paths = ProjectPaths::resolve("/tmp/cleo-test-root", |_| None);
    let mut config = PolicyConfig::default();
    config.lock.timeout_seconds = 9;
    let ctx = ProjectContext::new(paths, config, FakeClock::new());
    assert_eq!(ctx.lock_timeout(), Duration::from_secs(9));
}

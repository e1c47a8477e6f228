// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[test]
fn fake_clock_advances() {
    let clock = FakeClock::new();
    let t0 = clock.epoch_ms();
    clock.advance(Duration::from_secs(60));
    assert_eq!(clock.epoch_ms(), t0 + 60_000);
}

#[test]
fn fake_clock_set_epoch_ms() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(42);
    assert_eq!(clock.epoch_ms(), 42);
}

#[test]
fn now_rfc3339_round_trips_through_chrono() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(1_700_000_000_000);
    let s = clock.now_rfc3339();
    assert!(chrono::DateTime::parse_from_rfc3339(&s).is_ok());
}

#[test]
fn system_clock_is_monotonic_enough() {
    let clock = SystemClock;
    let a = clock.epoch_ms();
    let b = clock.epoch_ms();
    assert!(b >= a);
}

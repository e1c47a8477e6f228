// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The two-tool RPC gateway surface (spec §4.9/C10): `query` and `mutate`,
//! each taking `{domain, operation, params}` and returning the same
//! `Envelope` the dispatcher builds for the CLI. This crate adds no
//! protocol framing of its own — it is the thinnest possible adapter
//! between a tool-calling transport and `cleo-dispatch::Dispatcher`.

mod envelope;

pub use envelope::{mutate, query, Request};
pub use cleo_dispatch::{Envelope, EnvelopeMeta, ErrorPayload};

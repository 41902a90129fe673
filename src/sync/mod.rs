// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fetch, normalize, commit and publish.
//!
//! [`SyncEngine`] runs one sync of one device: it fetches the raw state,
//! normalizes it, commits it to the store and publishes the committed
//! snapshot when something changed. At most one sync per device runs at a
//! time; a second request for the same device waits for the running one and
//! shares its outcome, so a trigger racing the periodic poll can neither
//! fetch twice nor broadcast twice.
//!
//! [`Scheduler`] drives [`SyncEngine::sync_all`] at a fixed interval in a
//! background task until its [`SchedulerHandle`] is shut down.

mod engine;
mod in_flight;
mod outcome;
mod scheduler;

pub use engine::SyncEngine;
pub use outcome::{SyncOutcome, SyncSummary};
pub use scheduler::{Scheduler, SchedulerHandle};

pub use crate::event::SyncOrigin;

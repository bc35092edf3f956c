// SPDX-License-Identifier: MPL-2.0
//! Session history domain types.

mod newtypes;

pub use newtypes::{history_bounds, HistoryCapacity};

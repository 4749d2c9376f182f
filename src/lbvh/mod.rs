// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod orchestrator;
pub mod pass;
pub mod push_constants;
pub mod verify;

pub use orchestrator::Lbvh;

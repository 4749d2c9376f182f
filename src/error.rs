// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

/// Errors surfaced by the LBVH build pipeline. All variants are fatal to the
/// current build; `Lbvh::execute` never returns a partial tree.
#[derive(Debug, Error)]
pub enum LbvhError {
    #[error("invalid input: {0}")]
    InputInvalid(String),

    #[error("shader build failed: {0}")]
    ShaderBuildFailed(String),

    #[error("device allocation failed: {0}")]
    DeviceAllocationFailed(String),

    #[error("device submit failed: {0}")]
    DeviceSubmitFailed(String),

    #[error("verification failed: {0}")]
    VerificationFailed(String),
}

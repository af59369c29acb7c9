// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for run reports.

pub mod json;
pub mod text;

/// Output formatting options.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Also list skipped rules and their reasons.
    pub verbose: bool,
}

impl FormatOptions {
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

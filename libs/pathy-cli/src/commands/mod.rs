// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod activate;
pub mod doctor;
pub mod edit;
pub mod editor;
pub mod files;
pub mod ls;
pub mod run_files;

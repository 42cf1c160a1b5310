// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod event_repository_test;
pub mod rule_repository_test;
pub mod source_repository_test;

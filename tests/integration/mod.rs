// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod discovery_flow_test;
pub mod generic_flow_test;
pub mod helpers;
pub mod repositories;
pub mod rule_generator_test;
pub mod scheduler_flow_test;

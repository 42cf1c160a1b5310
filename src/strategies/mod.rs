// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod collector;
pub mod discovery;
pub mod generic;
pub mod miner;
pub mod normalize;
pub mod registry;
pub mod traits;

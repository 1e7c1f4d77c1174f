// This file is part of the terraform-provider-forwardnetworks project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Terraform provider for the Forward Networks API.

pub mod check;
pub mod client;
pub mod cloud;
pub mod collection;
pub mod collector;
pub mod config;
pub mod network;
pub mod nqe;
pub mod org;
pub mod poll;
pub mod provider;
pub mod proxy;
pub mod snapshot;
mod utils;

pub use provider::ForwardNetworksProvider;

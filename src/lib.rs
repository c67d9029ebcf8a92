//  Copyright 2024 Tiered Cache Authors
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

//! Tiered admission-and-promotion cache eviction engines.
//!
//! Two outer caches are exposed: [`Tlfu`] (tiered-LFU) and [`Tfifo`]
//! (tiered-FIFO). Both compose a probationary sub-cache, a main sub-cache,
//! and an optional ghost directory through the shared [`cascade::Cascade`]
//! engine, approximating the hit rate of scan-resistant caches in the
//! S3-FIFO / SLRU family while keeping each operation amortized O(1).

pub mod cascade;
pub mod error;
pub mod params;
pub mod request;
pub mod subcache;
pub mod tfifo;
pub mod tlfu;

pub use error::{Error, Result};
pub use params::{CommonCacheParams, MainCacheType, TfifoParams, TlfuParams};
pub use request::{ObjectHandle, Request};
pub use subcache::SubCache;
pub use tfifo::Tfifo;
pub use tlfu::Tlfu;

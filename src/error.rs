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

use thiserror::Error;

/// Errors raised while parsing a `key=value,...` configuration string.
///
/// This is the only fallible path in the crate. Invariant violations and the
/// unsupported `to_evict` operation are programmer errors, not caller input
/// errors, and are reported with `panic!`/`debug_assert!` instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{cache} does not have parameter {key}")]
    UnknownParam { cache: &'static str, key: String },

    #[error("{cache}: invalid value {value:?} for parameter {key}")]
    InvalidValue {
        cache: &'static str,
        key: String,
        value: String,
    },

    #[error("unknown main-cache-type: {value}")]
    UnknownMainCacheType { value: String },
}

pub type Result<T> = std::result::Result<T, Error>;

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

/// An immutable request presented to the outer cache.
///
/// `arrival_time` is carried for API completeness (and to mirror the
/// source's `request_t`) but no eviction decision in this crate consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub obj_id: u64,
    pub obj_size: u64,
    pub arrival_time: u64,
}

impl Request {
    pub fn new(obj_id: u64, obj_size: u64, arrival_time: u64) -> Self {
        Self {
            obj_id,
            obj_size,
            arrival_time,
        }
    }
}

/// A sub-cache's view of one resident object, handed back to the outer
/// cache on `find`/`insert`/`to_evict`.
///
/// Sub-caches return these by value: the metadata is small, and a simulator
/// that commits one cascade per request gains nothing from returning borrows
/// into a sub-cache's internal structures while also needing to mutate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectHandle {
    pub obj_id: u64,
    pub obj_size: u64,
    pub freq: u32,
}

impl ObjectHandle {
    pub fn fresh(req: &Request) -> Self {
        Self {
            obj_id: req.obj_id,
            obj_size: req.obj_size,
            freq: 0,
        }
    }
}

impl From<ObjectHandle> for Request {
    fn from(h: ObjectHandle) -> Self {
        Request {
            obj_id: h.obj_id,
            obj_size: h.obj_size,
            arrival_time: 0,
        }
    }
}

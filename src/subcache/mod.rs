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

pub mod clock;
pub mod fifo;
pub mod ghost;
pub mod lfu;

pub use clock::Clock;
pub use fifo::Fifo;
pub use ghost::Ghost;
pub use lfu::Lfu;

use crate::request::{ObjectHandle, Request};

/// The capability set the outer cache requires of every sub-cache.
///
/// This is the entire alphabet the core speaks: the outer cache (and any
/// cascade nested as another cascade's main tier, see `crate::cascade`)
/// never reaches past this trait into a sub-cache's internals.
pub trait SubCache {
    /// Look up `req.obj_id`. When `update` is true the sub-cache may mutate
    /// its own recency/frequency metadata; when false this must be a pure,
    /// side-effect-free lookup (P8).
    fn find(&mut self, req: &Request, update: bool) -> Option<ObjectHandle>;

    /// Insert `req` as a fresh object. Preconditions: `req.obj_size <=
    /// self.capacity()` and the caller has already evicted enough room.
    fn insert(&mut self, req: &Request) -> ObjectHandle;

    /// Insert `req`, seeding `freq` instead of starting at 0. Used only by
    /// the promotion path that copies frequency across tiers (TFIFO's
    /// eviction cascade, see `crate::cascade`). Sub-caches that track `freq`
    /// override this; the default drops the carried value by delegating to
    /// `insert`, which is correct for sub-caches where promotion always
    /// resets metadata (TLFU).
    fn insert_with_freq(&mut self, req: &Request, _freq: u32) -> ObjectHandle {
        self.insert(req)
    }

    /// Force-eject `obj_id` without running the sub-cache's own eviction
    /// policy. Returns whether it was resident.
    fn remove(&mut self, obj_id: u64) -> bool;

    /// Select and remove one victim per this sub-cache's own policy.
    /// No-op if the sub-cache is empty.
    fn evict(&mut self);

    /// Peek the next eviction victim without mutating any state.
    fn to_evict(&self) -> Option<ObjectHandle>;

    fn occupied_bytes(&self) -> u64;
    fn n_objects(&self) -> usize;
    fn capacity(&self) -> u64;

    /// "Look up; on miss, evict until there is room, then admit" — the
    /// shared base routine every plain sub-cache shares with the outer
    /// cache's own `get` (see `Cascade::get`). Oversized requests
    /// (`obj_size > capacity`) are silently dropped, matching `can_insert`.
    fn get(&mut self, req: &Request) -> bool {
        if self.find(req, true).is_some() {
            return true;
        }
        if req.obj_size <= self.capacity() {
            while self.n_objects() > 0 && self.occupied_bytes() + req.obj_size > self.capacity() {
                self.evict();
            }
            self.insert(req);
        }
        false
    }
}

impl SubCache for Box<dyn SubCache> {
    fn find(&mut self, req: &Request, update: bool) -> Option<ObjectHandle> {
        (**self).find(req, update)
    }

    fn insert(&mut self, req: &Request) -> ObjectHandle {
        (**self).insert(req)
    }

    fn insert_with_freq(&mut self, req: &Request, freq: u32) -> ObjectHandle {
        (**self).insert_with_freq(req, freq)
    }

    fn remove(&mut self, obj_id: u64) -> bool {
        (**self).remove(obj_id)
    }

    fn evict(&mut self) {
        (**self).evict()
    }

    fn to_evict(&self) -> Option<ObjectHandle> {
        (**self).to_evict()
    }

    fn occupied_bytes(&self) -> u64 {
        (**self).occupied_bytes()
    }

    fn n_objects(&self) -> usize {
        (**self).n_objects()
    }

    fn capacity(&self) -> u64 {
        (**self).capacity()
    }
}

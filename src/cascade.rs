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

use crate::request::{ObjectHandle, Request};
use crate::subcache::{Ghost, SubCache};

/// The composition engine shared by TLFU and TFIFO: a probationary tier, a
/// main tier, and an optional ghost directory, wired together by the
/// admission-routing and promotion rules common to both.
///
/// `Cascade` itself implements `SubCache`, so it can be nested as another
/// cascade's `Main` — this is how TFIFO's main tier (a full nested S3FIFO)
/// is built: `Cascade<Fifo, Cascade<Fifo, Fifo>>`, with no bespoke fifth
/// sub-cache type.
pub struct Cascade<P, M, G = Ghost> {
    name: String,
    probationary: P,
    main: M,
    ghost: Option<G>,
    move_to_main_threshold: u32,
    /// TLFU: promote eagerly inside `find` once `freq` crosses the
    /// threshold. TFIFO: always false, promotion only happens lazily
    /// during the eviction cascade.
    promote_on_hit: bool,
    /// TFIFO copies `freq` into the promoted object's main-side counter;
    /// TLFU always hands main fresh metadata (`freq` reset to 0).
    copy_freq_on_promote: bool,
    hit_on_ghost: bool,
    warned_oversized: bool,
}

impl<P, M, G> Cascade<P, M, G>
where
    P: SubCache,
    M: SubCache,
    G: SubCache,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        probationary: P,
        main: M,
        ghost: Option<G>,
        move_to_main_threshold: u32,
        promote_on_hit: bool,
        copy_freq_on_promote: bool,
    ) -> Self {
        tracing::debug!(
            name = %name,
            probationary_capacity = probationary.capacity(),
            main_capacity = main.capacity(),
            ghost_capacity = ghost.as_ref().map(|g| g.capacity()),
            move_to_main_threshold,
            promote_on_hit,
            "constructed cascade",
        );
        Self {
            name,
            probationary,
            main,
            ghost,
            move_to_main_threshold,
            promote_on_hit,
            copy_freq_on_promote,
            hit_on_ghost: false,
            warned_oversized: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Public-facing admission gate: `req.obj_size <= probationary.capacity()`.
    /// Distinct from `SubCache::capacity`, which reports the cascade's total
    /// size when nested as someone else's main tier.
    pub fn can_insert(&self, req: &Request) -> bool {
        req.obj_size <= self.probationary.capacity()
    }

    fn carried_freq(&self, victim_freq: u32) -> u32 {
        if self.copy_freq_on_promote {
            victim_freq
        } else {
            0
        }
    }

    fn evict_probationary_cascade(&mut self) {
        loop {
            let victim = match self.probationary.to_evict() {
                Some(v) => v,
                None => return,
            };
            let req = Request::from(victim);

            let promote = if self.promote_on_hit {
                false
            } else {
                victim.freq >= self.move_to_main_threshold
            };

            let removed = self.probationary.remove(victim.obj_id);
            debug_assert!(removed, "probationary.remove failed on its own to_evict victim");

            if promote {
                self.main.insert_with_freq(&req, self.carried_freq(victim.freq));
                tracing::trace!(name = %self.name, obj_id = victim.obj_id, freq = victim.freq, "promoted probationary -> main during eviction");
                continue;
            }

            if let Some(ghost) = self.ghost.as_mut() {
                ghost.get(&req);
            }
            tracing::trace!(name = %self.name, obj_id = victim.obj_id, "evicted probationary -> ghost");
            return;
        }
    }
}

impl<P, M, G> SubCache for Cascade<P, M, G>
where
    P: SubCache,
    M: SubCache,
    G: SubCache,
{
    fn find(&mut self, req: &Request, update: bool) -> Option<ObjectHandle> {
        if !update {
            return self
                .probationary
                .find(req, false)
                .or_else(|| self.main.find(req, false));
        }

        self.hit_on_ghost = false;

        if let Some(mut handle) = self.probationary.find(req, true) {
            if self.promote_on_hit && handle.freq >= self.move_to_main_threshold {
                let promote_req = Request::from(handle);
                self.probationary.remove(handle.obj_id);
                handle = self.main.insert(&promote_req);
                tracing::trace!(name = %self.name, obj_id = handle.obj_id, "promoted probationary -> main on hit");
            }
            return Some(handle);
        }

        if let Some(ghost) = self.ghost.as_mut() {
            if ghost.remove(req.obj_id) {
                self.hit_on_ghost = true;
            }
        }

        self.main.find(req, true)
    }

    fn insert(&mut self, req: &Request) -> ObjectHandle {
        if self.hit_on_ghost {
            self.hit_on_ghost = false;
            let handle = self.main.insert(req);
            tracing::trace!(name = %self.name, obj_id = handle.obj_id, "ghost-admitted object inserted into main");
            return handle;
        }
        self.probationary.insert(req)
    }

    fn insert_with_freq(&mut self, req: &Request, freq: u32) -> ObjectHandle {
        if self.hit_on_ghost {
            self.hit_on_ghost = false;
            return self.main.insert_with_freq(req, freq);
        }
        self.probationary.insert_with_freq(req, freq)
    }

    fn remove(&mut self, obj_id: u64) -> bool {
        if self.probationary.remove(obj_id) {
            return true;
        }
        if let Some(ghost) = self.ghost.as_mut() {
            if ghost.remove(obj_id) {
                return true;
            }
        }
        self.main.remove(obj_id)
    }

    fn evict(&mut self) {
        if self.main.occupied_bytes() > self.main.capacity() || self.probationary.occupied_bytes() == 0 {
            self.main.evict();
            return;
        }
        self.evict_probationary_cascade();
    }

    fn to_evict(&self) -> Option<ObjectHandle> {
        panic!(
            "{}: to_evict is unsupported on the outer cascade (the eviction candidate is unknowable without committing the cascade)",
            self.name
        );
    }

    fn occupied_bytes(&self) -> u64 {
        self.probationary.occupied_bytes() + self.main.occupied_bytes()
    }

    fn n_objects(&self) -> usize {
        self.probationary.n_objects() + self.main.n_objects()
    }

    fn capacity(&self) -> u64 {
        self.probationary.capacity() + self.main.capacity()
    }

    fn get(&mut self, req: &Request) -> bool {
        if self.find(req, true).is_some() {
            return true;
        }

        if !self.can_insert(req) {
            if !self.warned_oversized {
                tracing::warn!(
                    name = %self.name,
                    obj_id = req.obj_id,
                    obj_size = req.obj_size,
                    probationary_capacity = self.probationary.capacity(),
                    "oversized object rejected at admission",
                );
                self.warned_oversized = true;
            }
            return false;
        }

        // Room is made in whichever tier will actually receive the object:
        // probationary for a fresh admission, main for a ghost-driven one.
        // `evict` (the cascade) decides which sub-cache to actually drain;
        // it naturally targets main once a ghost admission has pushed it
        // over its own quota (see `evict`'s first condition). The cascade
        // can also promote victims into main as a side effect of draining
        // probationary, so main's own capacity is checked independently of
        // which tier is the actual admission target.
        while self.n_objects() > 0
            && (self.target_tier_occupied(req) > self.target_tier_capacity()
                || self.main.occupied_bytes() > self.main.capacity())
        {
            self.evict();
        }
        self.insert(req);
        debug_assert!(self.occupied_bytes() <= self.capacity());
        false
    }
}

impl<P, M, G> Cascade<P, M, G>
where
    P: SubCache,
    M: SubCache,
    G: SubCache,
{
    fn target_tier_capacity(&self) -> u64 {
        if self.hit_on_ghost {
            self.main.capacity()
        } else {
            self.probationary.capacity()
        }
    }

    fn target_tier_occupied(&self, req: &Request) -> u64 {
        let base = if self.hit_on_ghost {
            self.main.occupied_bytes()
        } else {
            self.probationary.occupied_bytes()
        };
        base + req.obj_size
    }
}

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

use ahash::RandomState;
use hashbrown::HashMap;

use crate::request::{ObjectHandle, Request};
use crate::subcache::SubCache;

struct Slot {
    handle: ObjectHandle,
    counter: u32,
}

/// An n-bit-counter CLOCK sub-cache (`n_bits` in {1, 2}, i.e. `clock` /
/// `clock2` in `main-cache-type`). Resident objects sit in a circular
/// buffer; the hand sweeps forward on eviction, decrementing counters until
/// one reaches zero, which is the victim.
pub struct Clock {
    capacity: u64,
    occupied_bytes: u64,
    max_counter: u32,
    slots: Vec<Option<Slot>>,
    free: Vec<usize>,
    index: HashMap<u64, usize, RandomState>,
    hand: usize,
}

impl Clock {
    pub fn new(capacity: u64, n_bits: u8) -> Self {
        assert!((1..=2).contains(&n_bits), "clock supports 1 or 2 bit counters");
        Self {
            capacity,
            occupied_bytes: 0,
            max_counter: (1u32 << n_bits) - 1,
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::default(),
            hand: 0,
        }
    }

    fn advance(&mut self) {
        if !self.slots.is_empty() {
            self.hand = (self.hand + 1) % self.slots.len();
        }
    }
}

impl SubCache for Clock {
    fn find(&mut self, req: &Request, update: bool) -> Option<ObjectHandle> {
        let &idx = self.index.get(&req.obj_id)?;
        let slot = self.slots[idx].as_mut().expect("clock index points at empty slot");
        if update {
            slot.handle.freq += 1;
            slot.counter = self.max_counter;
        }
        Some(slot.handle)
    }

    fn insert(&mut self, req: &Request) -> ObjectHandle {
        let handle = ObjectHandle::fresh(req);
        let slot = Slot { handle, counter: 0 };
        let idx = if let Some(idx) = self.free.pop() {
            self.slots[idx] = Some(slot);
            idx
        } else {
            self.slots.push(Some(slot));
            self.slots.len() - 1
        };
        self.index.insert(req.obj_id, idx);
        self.occupied_bytes += req.obj_size;
        handle
    }

    fn remove(&mut self, obj_id: u64) -> bool {
        match self.index.remove(&obj_id) {
            Some(idx) => {
                let slot = self.slots[idx].take().expect("clock index points at empty slot");
                self.occupied_bytes -= slot.handle.obj_size;
                self.free.push(idx);
                true
            }
            None => false,
        }
    }

    fn evict(&mut self) {
        if self.index.is_empty() {
            return;
        }
        loop {
            let idx = self.hand;
            let evict_now = match &mut self.slots[idx] {
                Some(slot) if slot.counter == 0 => true,
                Some(slot) => {
                    slot.counter -= 1;
                    false
                }
                None => false,
            };
            if evict_now {
                let slot = self.slots[idx].take().unwrap();
                self.index.remove(&slot.handle.obj_id);
                self.free.push(idx);
                self.occupied_bytes -= slot.handle.obj_size;
                self.advance();
                return;
            }
            self.advance();
        }
    }

    fn to_evict(&self) -> Option<ObjectHandle> {
        if self.index.is_empty() {
            return None;
        }
        let mut hand = self.hand;
        loop {
            if let Some(slot) = &self.slots[hand] {
                if slot.counter == 0 {
                    return Some(slot.handle);
                }
            }
            hand = (hand + 1) % self.slots.len();
            if hand == self.hand {
                // every resident slot has a nonzero counter: the sweep in
                // `evict` would decrement them all to zero before picking
                // one, so report the one the hand currently sits on.
                return self.slots[self.hand].as_ref().map(|s| s.handle);
            }
        }
    }

    fn occupied_bytes(&self) -> u64 {
        self.occupied_bytes
    }

    fn n_objects(&self) -> usize {
        self.index.len()
    }

    fn capacity(&self) -> u64 {
        self.capacity
    }
}

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

use std::collections::VecDeque;

use ahash::RandomState;
use hashbrown::HashMap;

use crate::request::{ObjectHandle, Request};
use crate::subcache::SubCache;

/// Plain FIFO sub-cache: eviction order is pure insertion order. `find`
/// with `update = true` still tracks `freq`, since the outer cache's
/// promotion logic needs it, but access never reorders the queue.
pub struct Fifo {
    capacity: u64,
    occupied_bytes: u64,
    queue: VecDeque<u64>,
    index: HashMap<u64, ObjectHandle, RandomState>,
}

impl Fifo {
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            occupied_bytes: 0,
            queue: VecDeque::new(),
            index: HashMap::default(),
        }
    }
}

impl SubCache for Fifo {
    fn find(&mut self, req: &Request, update: bool) -> Option<ObjectHandle> {
        let handle = self.index.get_mut(&req.obj_id)?;
        if update {
            handle.freq += 1;
        }
        Some(*handle)
    }

    fn insert(&mut self, req: &Request) -> ObjectHandle {
        self.insert_with_freq(req, 0)
    }

    fn insert_with_freq(&mut self, req: &Request, freq: u32) -> ObjectHandle {
        let mut handle = ObjectHandle::fresh(req);
        handle.freq = freq;
        if let Some(old) = self.index.insert(req.obj_id, handle) {
            self.occupied_bytes -= old.obj_size;
            if let Some(pos) = self.queue.iter().position(|id| *id == req.obj_id) {
                self.queue.remove(pos);
            }
        }
        self.queue.push_back(req.obj_id);
        self.occupied_bytes += req.obj_size;
        handle
    }

    fn remove(&mut self, obj_id: u64) -> bool {
        match self.index.remove(&obj_id) {
            Some(handle) => {
                self.occupied_bytes -= handle.obj_size;
                if let Some(pos) = self.queue.iter().position(|id| *id == obj_id) {
                    self.queue.remove(pos);
                }
                true
            }
            None => false,
        }
    }

    fn evict(&mut self) {
        if let Some(obj_id) = self.queue.pop_front() {
            let handle = self.index.remove(&obj_id).expect("fifo queue/index out of sync");
            self.occupied_bytes -= handle.obj_size;
        }
    }

    fn to_evict(&self) -> Option<ObjectHandle> {
        let obj_id = self.queue.front()?;
        self.index.get(obj_id).copied()
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

#[cfg(test)]
mod tests {
    use super::*;

    fn req(id: u64, size: u64) -> Request {
        Request::new(id, size, 0)
    }

    #[test]
    fn test_fifo_order() {
        let mut fifo = Fifo::new(40);
        for i in 0..4 {
            fifo.insert(&req(i, 10));
        }
        assert_eq!(fifo.occupied_bytes(), 40);

        fifo.evict();
        assert_eq!(fifo.n_objects(), 3);
        assert!(fifo.find(&req(0, 10), false).is_none());
        assert!(fifo.find(&req(1, 10), false).is_some());
    }

    #[test]
    fn test_fifo_find_does_not_reorder() {
        let mut fifo = Fifo::new(30);
        for i in 0..3 {
            fifo.insert(&req(i, 10));
        }
        // touch the oldest object a few times, FIFO must still evict it first.
        fifo.find(&req(0, 10), true);
        fifo.find(&req(0, 10), true);
        assert_eq!(fifo.to_evict().unwrap().obj_id, 0);
    }

    #[test]
    fn test_fifo_remove_mid_queue() {
        let mut fifo = Fifo::new(30);
        for i in 0..3 {
            fifo.insert(&req(i, 10));
        }
        assert!(fifo.remove(1));
        assert!(!fifo.remove(1));
        assert_eq!(fifo.to_evict().unwrap().obj_id, 0);
        fifo.evict();
        assert_eq!(fifo.to_evict().unwrap().obj_id, 2);
    }
}

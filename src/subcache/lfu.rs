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

use std::collections::BTreeSet;

use ahash::RandomState;
use hashbrown::HashMap;

use crate::request::{ObjectHandle, Request};
use crate::subcache::SubCache;

/// Least-frequently-used sub-cache with FIFO tie-break: the victim is the
/// resident object with the smallest `freq`, and among equal `freq` the one
/// admitted earliest.
///
/// Ordering is kept in a `BTreeSet<(freq, seq, obj_id)>` rather than the
/// classic frequency-bucketed doubly-linked-list (which needs an intrusive
/// list per distinct frequency to stay O(1)): sub-caches are external
/// collaborators per the core's contract, and a `BTreeSet` gives the same
/// victim ordering with a simpler, safe implementation at O(log n) instead
/// of O(1) per operation.
pub struct Lfu {
    capacity: u64,
    occupied_bytes: u64,
    next_seq: u64,
    order: BTreeSet<(u32, u64, u64)>,
    index: HashMap<u64, (ObjectHandle, u64), RandomState>,
}

impl Lfu {
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            occupied_bytes: 0,
            next_seq: 0,
            order: BTreeSet::new(),
            index: HashMap::default(),
        }
    }
}

impl SubCache for Lfu {
    fn find(&mut self, req: &Request, update: bool) -> Option<ObjectHandle> {
        let (handle, seq) = self.index.get_mut(&req.obj_id)?;
        if update {
            let seq = *seq;
            self.order.remove(&(handle.freq, seq, handle.obj_id));
            handle.freq += 1;
            self.order.insert((handle.freq, seq, handle.obj_id));
        }
        Some(*handle)
    }

    fn insert(&mut self, req: &Request) -> ObjectHandle {
        self.insert_with_freq(req, 0)
    }

    fn insert_with_freq(&mut self, req: &Request, freq: u32) -> ObjectHandle {
        self.remove(req.obj_id);
        let mut handle = ObjectHandle::fresh(req);
        handle.freq = freq;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert((handle.freq, seq, handle.obj_id));
        self.index.insert(req.obj_id, (handle, seq));
        self.occupied_bytes += req.obj_size;
        handle
    }

    fn remove(&mut self, obj_id: u64) -> bool {
        match self.index.remove(&obj_id) {
            Some((handle, seq)) => {
                self.order.remove(&(handle.freq, seq, obj_id));
                self.occupied_bytes -= handle.obj_size;
                true
            }
            None => false,
        }
    }

    fn evict(&mut self) {
        if let Some(&(freq, seq, obj_id)) = self.order.iter().next() {
            self.order.remove(&(freq, seq, obj_id));
            let (handle, _) = self.index.remove(&obj_id).expect("lfu order/index out of sync");
            self.occupied_bytes -= handle.obj_size;
        }
    }

    fn to_evict(&self) -> Option<ObjectHandle> {
        let &(_, _, obj_id) = self.order.iter().next()?;
        self.index.get(&obj_id).map(|(handle, _)| *handle)
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
    fn test_lfu_evicts_least_frequent() {
        let mut lfu = Lfu::new(30);
        for i in 0..3 {
            lfu.insert(&req(i, 10));
        }
        lfu.find(&req(1, 10), true);
        lfu.find(&req(2, 10), true);
        lfu.find(&req(2, 10), true);
        // 0 has freq 0, 1 has freq 1, 2 has freq 2: 0 evicts first.
        assert_eq!(lfu.to_evict().unwrap().obj_id, 0);
        lfu.evict();
        assert_eq!(lfu.to_evict().unwrap().obj_id, 1);
    }

    #[test]
    fn test_lfu_fifo_tiebreak() {
        let mut lfu = Lfu::new(30);
        for i in 0..3 {
            lfu.insert(&req(i, 10));
        }
        // all freq 0, oldest admitted (0) evicts first.
        assert_eq!(lfu.to_evict().unwrap().obj_id, 0);
    }
}

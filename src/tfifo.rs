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

use crate::cascade::Cascade;
use crate::error::Result;
use crate::params::{CommonCacheParams, TfifoParams};
use crate::request::{ObjectHandle, Request};
use crate::subcache::{Fifo, Ghost, SubCache};

/// The nested S3FIFO main tier: fixed internal ratios matching the
/// source's `S3FIFO_init` call (probationary 25% of the main capacity,
/// ghost 75%, promotion threshold 2, no promote-on-hit).
const NESTED_PROBATIONARY_RATIO: f64 = 0.25;
const NESTED_GHOST_RATIO: f64 = 0.75;
const NESTED_MOVE_TO_MAIN_THRESHOLD: u32 = 2;

type S3Fifo = Cascade<Fifo, Fifo, Ghost>;

fn build_nested_s3fifo(capacity: u64) -> S3Fifo {
    let probationary_capacity = (capacity as f64 * NESTED_PROBATIONARY_RATIO) as u64;
    let main_capacity = capacity - probationary_capacity;
    let ghost_capacity = (capacity as f64 * NESTED_GHOST_RATIO) as u64;
    Cascade::new(
        "S3FIFO".to_string(),
        Fifo::new(probationary_capacity),
        Fifo::new(main_capacity),
        if ghost_capacity > 0 { Some(Ghost::new(ghost_capacity)) } else { None },
        NESTED_MOVE_TO_MAIN_THRESHOLD,
        false,
        true,
    )
}

/// Tiered-FIFO: a small FIFO probationary tier feeding a nested S3FIFO main
/// tier, with a ghost directory routing "second chance" re-admissions into
/// main. Promotion always happens lazily during the eviction cascade, and
/// carries the victim's `freq` into the promoted object's main-side counter.
pub struct Tfifo {
    cascade: Cascade<Fifo, S3Fifo, Ghost>,
    params: TfifoParams,
    name: String,
}

impl Tfifo {
    pub fn new(common: CommonCacheParams, params: &str) -> Result<Self> {
        let parsed = TfifoParams::parse(params)?;
        if parsed.print {
            println!("{parsed}");
            std::process::exit(0);
        }

        let probationary_capacity = (common.capacity as f64 * parsed.probationary_size_ratio) as u64;
        let main_capacity = common.capacity - probationary_capacity;
        let ghost_capacity = (common.capacity as f64 * parsed.ghost_size_ratio) as u64;

        let name = format!("TFIFO-{:.4}-{}", parsed.probationary_size_ratio, parsed.move_to_main_threshold);

        let ghost = if ghost_capacity > 0 { Some(Ghost::new(ghost_capacity)) } else { None };

        let cascade = Cascade::new(
            name.clone(),
            Fifo::new(probationary_capacity),
            build_nested_s3fifo(main_capacity),
            ghost,
            parsed.move_to_main_threshold,
            false,
            true,
        );

        Ok(Self { cascade, params: parsed, name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &TfifoParams {
        &self.params
    }

    pub fn get(&mut self, req: &Request) -> bool {
        self.cascade.get(req)
    }

    pub fn find(&mut self, req: &Request, update: bool) -> Option<ObjectHandle> {
        self.cascade.find(req, update)
    }

    pub fn remove(&mut self, obj_id: u64) -> bool {
        self.cascade.remove(obj_id)
    }

    pub fn occupied_bytes(&self) -> u64 {
        self.cascade.occupied_bytes()
    }

    pub fn n_objects(&self) -> usize {
        self.cascade.n_objects()
    }

    pub fn capacity(&self) -> u64 {
        self.cascade.capacity()
    }

    pub fn can_insert(&self, req: &Request) -> bool {
        self.cascade.can_insert(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(id: u64, size: u64) -> Request {
        Request::new(id, size, 0)
    }

    #[test]
    fn test_name_format() {
        let tfifo = Tfifo::new(CommonCacheParams { capacity: 1000 }, "").unwrap();
        assert_eq!(tfifo.name(), "TFIFO-0.1000-2");
    }

    #[test]
    fn test_basic_get_roundtrip() {
        let mut tfifo = Tfifo::new(CommonCacheParams { capacity: 1000 }, "").unwrap();
        assert!(!tfifo.get(&req(1, 100)));
        assert!(tfifo.get(&req(1, 100)));
        assert_eq!(tfifo.occupied_bytes(), 100);
    }

    #[test]
    fn test_bad_param_surfaces_error() {
        let err = Tfifo::new(CommonCacheParams { capacity: 1000 }, "bogus=1");
        assert!(err.is_err());
    }
}

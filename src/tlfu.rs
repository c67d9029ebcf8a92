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
use crate::params::{CommonCacheParams, MainCacheType, TlfuParams};
use crate::request::{ObjectHandle, Request};
use crate::subcache::{Clock, Ghost, Lfu, SubCache};

/// Tiered-LFU: a small LFU probationary tier feeding a larger main tier
/// (LFU, or 1-/2-bit Clock), with a ghost directory routing "second chance"
/// re-admissions straight into main.
pub struct Tlfu {
    cascade: Cascade<Lfu, Box<dyn SubCache>, Ghost>,
    params: TlfuParams,
    name: String,
}

impl Tlfu {
    pub fn new(common: CommonCacheParams, params: &str) -> Result<Self> {
        let parsed = TlfuParams::parse(params)?;
        if parsed.print {
            println!("{parsed}");
            std::process::exit(0);
        }

        let probationary_capacity = (common.capacity as f64 * parsed.probationary_size_ratio) as u64;
        let main_capacity = common.capacity - probationary_capacity;
        let ghost_capacity = (common.capacity as f64 * parsed.ghost_size_ratio) as u64;

        let main: Box<dyn SubCache> = match parsed.main_cache_type {
            MainCacheType::Lfu => Box::new(Lfu::new(main_capacity)),
            MainCacheType::Clock => Box::new(Clock::new(main_capacity, 1)),
            MainCacheType::Clock2 => Box::new(Clock::new(main_capacity, 2)),
        };

        let name = format!(
            "TLFU-{}-{}-{:.4}-{}",
            parsed.main_cache_type, parsed.promote_on_hit as u8, parsed.probationary_size_ratio, parsed.move_to_main_threshold
        );

        let ghost = if ghost_capacity > 0 { Some(Ghost::new(ghost_capacity)) } else { None };

        let cascade = Cascade::new(
            name.clone(),
            Lfu::new(probationary_capacity),
            main,
            ghost,
            parsed.move_to_main_threshold,
            parsed.promote_on_hit,
            false,
        );

        Ok(Self { cascade, params: parsed, name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &TlfuParams {
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
        let tlfu = Tlfu::new(CommonCacheParams { capacity: 1000 }, "").unwrap();
        assert_eq!(tlfu.name(), "TLFU-lfu-1-0.1000-1");
    }

    #[test]
    fn test_basic_get_roundtrip() {
        let mut tlfu = Tlfu::new(CommonCacheParams { capacity: 1000 }, "").unwrap();
        assert!(!tlfu.get(&req(1, 100)));
        assert!(tlfu.get(&req(1, 100)));
        assert_eq!(tlfu.occupied_bytes(), 100);
    }

    #[test]
    fn test_clock_main_cache_type() {
        let tlfu = Tlfu::new(CommonCacheParams { capacity: 1000 }, "main-cache-type=clock2").unwrap();
        assert_eq!(tlfu.name(), "TLFU-clock2-1-0.1000-1");
    }

    #[test]
    fn test_bad_param_surfaces_error() {
        let err = Tlfu::new(CommonCacheParams { capacity: 1000 }, "bogus=1");
        assert!(err.is_err());
    }
}

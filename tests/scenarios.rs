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

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tiered_cache::{CommonCacheParams, Request, Tfifo, Tlfu};

fn req(id: u64, size: u64) -> Request {
    Request::new(id, size, 0)
}

fn tlfu(capacity: u64, params: &str) -> Tlfu {
    Tlfu::new(CommonCacheParams { capacity }, params).unwrap()
}

fn tfifo(capacity: u64, params: &str) -> Tfifo {
    Tfifo::new(CommonCacheParams { capacity }, params).unwrap()
}

// Scenario 1: scan resistance. A single pass over distinct objects never
// promotes anything and leaves only the tail resident in probationary.
#[test]
fn scenario_scan_resistance() {
    let mut cache = tlfu(1000, "");
    for i in 1..=200u64 {
        assert!(!cache.get(&req(i, 10)));
    }
    // last 10 objects resident, nothing promoted to main.
    for i in 191..=200u64 {
        assert!(cache.find(&req(i, 10), false).is_some(), "object {i} should still be resident");
    }
    assert_eq!(cache.occupied_bytes(), 100);
    assert_eq!(cache.n_objects(), 10);
    for i in 1..=190u64 {
        assert!(cache.find(&req(i, 10), false).is_none(), "object {i} should have been evicted");
    }
}

// Scenario 2: promotion on second access (TLFU, promote-on-hit, threshold 1).
#[test]
fn scenario_promotion_on_second_access() {
    let mut cache = tlfu(100, "promote-on-hit=1,move-to-main-threshold=1");
    assert!(!cache.get(&req(1, 10)));
    assert!(cache.get(&req(1, 10)));
    assert_eq!(cache.occupied_bytes(), 10);
    assert_eq!(cache.n_objects(), 1);
}

// Scenario 3: ghost-driven admission. An object recently evicted into
// ghost is admitted straight into main on its next access.
#[test]
fn scenario_ghost_driven_admission() {
    let mut cache = tlfu(100, "probationary-size-ratio=0.5,ghost-size-ratio=0.5");
    for i in 1..=5u64 {
        cache.get(&req(i, 10));
    }
    // fill probationary (5 objects of 10 bytes = 50 bytes = its capacity),
    // then push 5 more through, evicting 1..5 into ghost.
    for i in 6..=10u64 {
        cache.get(&req(i, 10));
    }
    // object 1 was evicted into ghost; its next admission should land in main.
    assert!(!cache.get(&req(1, 10)));
    assert!(cache.find(&req(1, 10), false).is_some());
}

// Scenario 4: oversized rejection.
#[test]
fn scenario_oversized_rejection() {
    let mut cache = tlfu(100, "probationary-size-ratio=0.10");
    assert!(!cache.can_insert(&req(1, 50)));
    let before = cache.occupied_bytes();
    assert!(!cache.get(&req(1, 50)));
    assert_eq!(cache.occupied_bytes(), before);
}

// Scenario 5: TFIFO promotes a hot object during the eviction cascade
// instead of dropping it to ghost.
#[test]
fn scenario_tfifo_promotion_on_eviction() {
    // probationary holds exactly the first 10 objects (ratio 0.25 of 400),
    // so object 5 is still resident when hit, rather than already pushed
    // out by the later inserts that make room for 11..20.
    let mut cache = tfifo(400, "probationary-size-ratio=0.25,move-to-main-threshold=2");
    for i in 1..=10u64 {
        cache.get(&req(i, 10));
    }
    // hit object 5 twice: freq reaches the threshold.
    cache.get(&req(5, 10));
    cache.get(&req(5, 10));
    for i in 11..=20u64 {
        cache.get(&req(i, 10));
    }
    assert!(cache.find(&req(5, 10), false).is_some(), "hot object should have been promoted, not evicted");
}

// Scenario 6 / P1-P3: 10,000-operation interleaving fuzz, 50% hit rate,
// checked after every operation. Mirrors foyer-memory's seeded fuzz test.
#[test_log::test]
fn scenario_interleaving_fuzz() {
    let mut rng = SmallRng::seed_from_u64(114514);
    let mut cache = tlfu(1000, "");
    let mut seen = Vec::new();

    for _ in 0..10_000u64 {
        let id = if !seen.is_empty() && rng.gen_bool(0.5) {
            seen[rng.gen_range(0..seen.len())]
        } else {
            let id = rng.gen_range(0..5000u64);
            seen.push(id);
            id
        };
        cache.get(&req(id, 10));

        // P1: capacity never exceeded.
        assert!(cache.occupied_bytes() <= cache.capacity());
        // P3: occupied_bytes only reflects resident objects, bounded by capacity
        // regardless of how large the ghost has grown.
        assert!(cache.occupied_bytes() <= 1000);
    }
}

// P7: can_insert agrees exactly with whether insert is a no-op.
#[test]
fn invariant_oversized_admission_is_rejected_consistently() {
    let mut cache = tlfu(200, "probationary-size-ratio=0.10");
    let oversized = req(1, 100);
    assert!(!cache.can_insert(&oversized));
    assert!(!cache.get(&oversized));
    assert_eq!(cache.n_objects(), 0);

    let fits = req(2, 10);
    assert!(cache.can_insert(&fits));
}

// P8: find(update=false) is a pure, repeatable lookup.
#[test]
fn invariant_idempotent_find() {
    let mut cache = tlfu(1000, "");
    cache.get(&req(1, 10));
    let occupied_before = cache.occupied_bytes();
    let a = cache.find(&req(1, 10), false);
    let b = cache.find(&req(1, 10), false);
    assert_eq!(a, b);
    assert_eq!(cache.occupied_bytes(), occupied_before);
}

// P9: remove totality across tiers.
#[test]
fn invariant_remove_totality() {
    let mut cache = tlfu(1000, "");
    cache.get(&req(1, 10));
    cache.get(&req(1, 10)); // second hit, may or may not promote depending on threshold
    assert!(cache.remove(1));
    assert!(cache.find(&req(1, 10), false).is_none());
    assert!(!cache.remove(1));
}

// Round-trip law: insert then remove with no intervening eviction restores
// occupancy to its pre-insert value.
#[test]
fn round_trip_insert_remove() {
    let mut cache = tlfu(1000, "");
    let before = cache.occupied_bytes();
    cache.get(&req(42, 10));
    assert!(cache.remove(42));
    assert_eq!(cache.occupied_bytes(), before);
}

#[test_log::test]
fn tfifo_interleaving_fuzz() {
    let mut rng = SmallRng::seed_from_u64(2468);
    let mut cache = tfifo(1000, "");
    let mut seen = Vec::new();

    for _ in 0..10_000u64 {
        let id = if !seen.is_empty() && rng.gen_bool(0.5) {
            seen[rng.gen_range(0..seen.len())]
        } else {
            let id = rng.gen_range(0..5000u64);
            seen.push(id);
            id
        };
        cache.get(&req(id, 10));
        assert!(cache.occupied_bytes() <= cache.capacity());
    }
}

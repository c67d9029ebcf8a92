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

use std::fmt;

use itertools::Itertools;

use crate::error::{Error, Result};

/// Constructor input shared by both outer caches: the total capacity in
/// bytes. Probationary/main/ghost capacities are all derived from this by
/// the parsed ratios, never supplied directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommonCacheParams {
    pub capacity: u64,
}

/// `main-cache-type` selector for TLFU's main tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainCacheType {
    Lfu,
    Clock,
    Clock2,
}

impl fmt::Display for MainCacheType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MainCacheType::Lfu => "lfu",
            MainCacheType::Clock => "clock",
            MainCacheType::Clock2 => "clock2",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for MainCacheType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lfu" => Ok(MainCacheType::Lfu),
            "clock" => Ok(MainCacheType::Clock),
            "clock2" => Ok(MainCacheType::Clock2),
            _ => Err(()),
        }
    }
}

/// Splits `key=value,key=value,...` into trimmed `(key, value)` pairs.
/// Whitespace after a comma is tolerated, matching the source's parser.
/// `print` is the one key with no value; it is returned with an empty
/// value string, same as the pseudo-argument behavior in the source.
fn tokenize(params: &str) -> Vec<(String, String)> {
    params
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.trim().to_ascii_lowercase(), v.trim().to_string()),
            None => (pair.trim().to_ascii_lowercase(), String::new()),
        })
        .collect_vec()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TlfuParams {
    pub probationary_size_ratio: f64,
    pub ghost_size_ratio: f64,
    pub main_cache_type: MainCacheType,
    pub move_to_main_threshold: u32,
    pub promote_on_hit: bool,
    /// If set, the constructor prints the resolved settings and calls
    /// `std::process::exit(0)` instead of returning, same as the source's
    /// `print` pseudo-argument.
    pub print: bool,
}

impl Default for TlfuParams {
    fn default() -> Self {
        Self {
            probationary_size_ratio: 0.10,
            ghost_size_ratio: 0.90,
            main_cache_type: MainCacheType::Lfu,
            move_to_main_threshold: 1,
            promote_on_hit: true,
            print: false,
        }
    }
}

impl fmt::Display for TlfuParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "probationary-size-ratio={:.4},ghost-size-ratio={:.4},main-cache-type={},\
             move-to-main-threshold={},promote-on-hit={}",
            self.probationary_size_ratio,
            self.ghost_size_ratio,
            self.main_cache_type,
            self.move_to_main_threshold,
            self.promote_on_hit as u8,
        )
    }
}

impl TlfuParams {
    pub fn parse(params: &str) -> Result<Self> {
        let mut this = Self::default();
        for (key, value) in tokenize(params) {
            match key.as_str() {
                "probationary-size-ratio" => this.probationary_size_ratio = parse_f64("TLFU", &key, &value)?,
                "ghost-size-ratio" => this.ghost_size_ratio = parse_f64("TLFU", &key, &value)?,
                "main-cache-type" => {
                    this.main_cache_type = value
                        .parse()
                        .map_err(|_| Error::UnknownMainCacheType { value: value.clone() })?
                }
                "move-to-main-threshold" => this.move_to_main_threshold = parse_u32("TLFU", &key, &value)?,
                "promote-on-hit" => this.promote_on_hit = parse_bool("TLFU", &key, &value)?,
                "print" => this.print = true,
                _ => {
                    return Err(Error::UnknownParam {
                        cache: "TLFU",
                        key,
                    })
                }
            }
        }
        Ok(this)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TfifoParams {
    pub probationary_size_ratio: f64,
    pub ghost_size_ratio: f64,
    pub move_to_main_threshold: u32,
    /// See `TlfuParams::print`.
    pub print: bool,
}

impl Default for TfifoParams {
    fn default() -> Self {
        Self {
            probationary_size_ratio: 0.10,
            ghost_size_ratio: 0.90,
            move_to_main_threshold: 2,
            print: false,
        }
    }
}

impl fmt::Display for TfifoParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "probationary-size-ratio={:.4},ghost-size-ratio={:.4},move-to-main-threshold={}",
            self.probationary_size_ratio, self.ghost_size_ratio, self.move_to_main_threshold,
        )
    }
}

impl TfifoParams {
    pub fn parse(params: &str) -> Result<Self> {
        let mut this = Self::default();
        for (key, value) in tokenize(params) {
            match key.as_str() {
                "probationary-size-ratio" => this.probationary_size_ratio = parse_f64("TFIFO", &key, &value)?,
                "ghost-size-ratio" => this.ghost_size_ratio = parse_f64("TFIFO", &key, &value)?,
                "move-to-main-threshold" => this.move_to_main_threshold = parse_u32("TFIFO", &key, &value)?,
                "print" => this.print = true,
                _ => {
                    return Err(Error::UnknownParam {
                        cache: "TFIFO",
                        key,
                    })
                }
            }
        }
        Ok(this)
    }
}

fn parse_f64(cache: &'static str, key: &str, value: &str) -> Result<f64> {
    value.parse().map_err(|_| Error::InvalidValue {
        cache,
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(cache: &'static str, key: &str, value: &str) -> Result<u32> {
    value.parse().map_err(|_| Error::InvalidValue {
        cache,
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(cache: &'static str, key: &str, value: &str) -> Result<bool> {
    match value {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(Error::InvalidValue {
            cache,
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tlfu_defaults() {
        let params = TlfuParams::parse("").unwrap();
        assert_eq!(params, TlfuParams::default());
    }

    #[test]
    fn test_tlfu_overlay() {
        let params = TlfuParams::parse("probationary-size-ratio=0.2, promote-on-hit=0,main-cache-type=clock2").unwrap();
        assert_eq!(params.probationary_size_ratio, 0.2);
        assert!(!params.promote_on_hit);
        assert_eq!(params.main_cache_type, MainCacheType::Clock2);
        // untouched keys keep their defaults.
        assert_eq!(params.move_to_main_threshold, 1);
    }

    #[test]
    fn test_unknown_key_is_fatal() {
        let err = TlfuParams::parse("bogus-key=1").unwrap_err();
        assert_eq!(
            err,
            Error::UnknownParam {
                cache: "TLFU",
                key: "bogus-key".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_main_cache_type() {
        let err = TlfuParams::parse("main-cache-type=bogus").unwrap_err();
        assert_eq!(
            err,
            Error::UnknownMainCacheType {
                value: "bogus".to_string()
            }
        );
    }

    #[test]
    fn test_tfifo_defaults() {
        let params = TfifoParams::parse("").unwrap();
        assert_eq!(params, TfifoParams::default());
    }

    #[test]
    fn test_print_is_recognized_without_value() {
        let params = TlfuParams::parse("print").unwrap();
        assert!(params.print);
    }
}

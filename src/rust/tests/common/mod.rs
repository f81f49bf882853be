//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Common test utilities
//!
//! Requires the 'sim' feature.

use std::sync::Mutex;

use lazy_static::lazy_static;
use rand::distributions::{Distribution, Standard};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

lazy_static! {
    pub static ref PRNG: Prng = {
        let prng = Prng::new(0x5eed_cafe);
        prng.init();
        prng
    };
}

pub struct Prng {
    seed: u64,
    rng: Mutex<Option<ChaCha20Rng>>,
}

impl Prng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Mutex::new(None),
        }
    }

    // Use a freshly seeded PRNG for each test
    pub fn init(&self) {
        let mut opt = self.rng.lock().unwrap();
        let _ = opt.replace(ChaCha20Rng::seed_from_u64(self.seed));
    }

    pub fn gen<T>(&self) -> T
    where
        Standard: Distribution<T>,
    {
        self.rng.lock().unwrap().as_mut().unwrap().gen::<T>()
    }
}

pub fn test_init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

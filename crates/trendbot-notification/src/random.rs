//! 응답 선택용 난수 소스.

use std::sync::Mutex;

use rand::{rngs::StdRng, Rng, SeedableRng};

/// `0..len` 범위의 인덱스를 고르는 난수 소스.
pub trait RandomSource: Send + Sync {
    /// `len`은 1 이상이어야 합니다. 0이면 0을 반환합니다.
    fn pick(&self, len: usize) -> usize;
}

/// 스레드 로컬 난수 생성기를 사용하는 기본 소스.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..len)
    }
}

/// 시드 고정 난수 소스. 재현 가능한 테스트용입니다.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(0..len)
    }
}

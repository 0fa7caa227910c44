//! 種子空間
//!
//! 種子是 35 字元表上的 8 字元識別碼，整個空間 35^8 ≈ 2.25e12。
//! 搜尋以連續索引區段或隨機抽樣走訪，8 個一批送進向量評估。

use std::fmt;

use rand::Rng;

use crate::game::constants::SEED_ALPHABET;
use crate::game::rng::{SeedCtx, SeedCtxVec, LANES, SEED_LEN};

use super::mask::Mask8;

/// 種子空間大小（35^8）
pub const SEED_SPACE: u64 = {
    let mut n: u64 = 1;
    let mut i = 0;
    while i < SEED_LEN {
        n *= SEED_ALPHABET.len() as u64;
        i += 1;
    }
    n
};

/// 一個 8 字元種子
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Seed {
    bytes: [u8; SEED_LEN],
}

impl Seed {
    /// 由字串解析；小寫自動轉大寫，字元表外的輸入拒絕
    pub fn parse(s: &str) -> Option<Seed> {
        if s.len() != SEED_LEN {
            return None;
        }
        let mut bytes = [0u8; SEED_LEN];
        for (b, c) in bytes.iter_mut().zip(s.bytes()) {
            let upper = c.to_ascii_uppercase();
            if !SEED_ALPHABET.contains(&upper) {
                return None;
            }
            *b = upper;
        }
        Some(Seed { bytes })
    }

    /// 空間內第 n 個種子（base-35，高位在前）
    pub fn from_index(index: u64) -> Seed {
        debug_assert!(index < SEED_SPACE);
        let base = SEED_ALPHABET.len() as u64;
        let mut bytes = [SEED_ALPHABET[0]; SEED_LEN];
        let mut rest = index;
        for b in bytes.iter_mut().rev() {
            *b = SEED_ALPHABET[(rest % base) as usize];
            rest /= base;
        }
        Seed { bytes }
    }

    /// 種子的空間索引
    pub fn to_index(self) -> u64 {
        let base = SEED_ALPHABET.len() as u64;
        self.bytes.iter().fold(0, |acc, &b| {
            let digit = SEED_ALPHABET.iter().position(|&a| a == b).unwrap() as u64;
            acc * base + digit
        })
    }

    pub fn as_str(&self) -> &str {
        // 字元表是 ASCII 子集
        std::str::from_utf8(&self.bytes).unwrap()
    }

    pub fn ctx(&self) -> SeedCtx {
        SeedCtx::new(self.bytes)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({})", self.as_str())
    }
}

// ============================================================================
// 走訪
// ============================================================================

/// 連續索引區段
#[derive(Clone, Debug)]
pub struct SeedRange {
    next: u64,
    end: u64,
}

impl SeedRange {
    pub fn new(start: u64, count: u64) -> Self {
        let end = start.saturating_add(count).min(SEED_SPACE);
        Self {
            next: start.min(SEED_SPACE),
            end,
        }
    }

    /// 整個種子空間
    pub fn full() -> Self {
        Self::new(0, SEED_SPACE)
    }

    pub fn remaining(&self) -> u64 {
        self.end - self.next
    }
}

impl Iterator for SeedRange {
    type Item = Seed;

    fn next(&mut self) -> Option<Seed> {
        if self.next >= self.end {
            return None;
        }
        let seed = Seed::from_index(self.next);
        self.next += 1;
        Some(seed)
    }
}

/// 隨機抽樣 n 個種子（允許重複；空間大到碰撞可忽略）
pub fn random_seeds<R: Rng>(rng: &mut R, count: u64) -> impl Iterator<Item = Seed> + '_ {
    (0..count).map(move |_| Seed::from_index(rng.gen_range(0..SEED_SPACE)))
}

// ============================================================================
// 批次
// ============================================================================

/// 一批最多 8 個種子
#[derive(Clone, Copy, Debug)]
pub struct SeedBatch {
    seeds: [Seed; LANES],
    len: usize,
}

impl SeedBatch {
    /// 從迭代器收集一批；迭代器耗盡且一個都沒有時回傳 None。
    /// 不足 8 個時以第一個種子補滿 lane（以 `valid()` 遮蔽）。
    pub fn fill(iter: &mut impl Iterator<Item = Seed>) -> Option<SeedBatch> {
        let first = iter.next()?;
        let mut seeds = [first; LANES];
        let mut len = 1;
        for slot in seeds.iter_mut().skip(1) {
            match iter.next() {
                Some(s) => {
                    *slot = s;
                    len += 1;
                }
                None => break,
            }
        }
        Some(SeedBatch { seeds, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 有效 lane 遮罩（補滿的 lane 不算）
    pub fn valid(&self) -> Mask8 {
        Mask8::first(self.len)
    }

    pub fn seed(&self, lane: usize) -> Seed {
        self.seeds[lane]
    }

    pub fn ctx_vec(&self) -> SeedCtxVec {
        let mut bytes = [[0u8; SEED_LEN]; LANES];
        for (b, s) in bytes.iter_mut().zip(self.seeds.iter()) {
            *b = s.bytes;
        }
        SeedCtxVec::new(bytes)
    }
}

// ============================================================================
// 單元測試
// ============================================================================

//! 種子決定性 PRNG 原語
//!
//! 遊戲內容完全由 8 字元種子決定，透過三層原語展開：
//! - `pseudohash`: 把字串折疊成 (0,1) 的 double
//! - 流節點推進: 每個 key 持有一個 node，每次抽取前推進一步
//! - `LuaRandom`: 腳本引擎的 TW223 generator，從 double 播種
//!
//! 每次抽取都以流的下一個 uniform 重新播種一個 `LuaRandom`，
//! 這是遊戲可觀察的契約，也是流可以做成廉價 owned 游標的原因。
//! 所有 key 字串集中在本模組，與流的推進順序一起構成生成契約。

use std::f64::consts::{E, PI};

/// 向量路徑的 lane 數（8 個種子一批）
pub const LANES: usize = 8;

/// 種子長度（固定 8 字元）
pub const SEED_LEN: usize = 8;

// ============================================================================
// pseudohash
// ============================================================================

/// 把字節串折疊成 (0,1) 的 double，從最後一個字元往前迭代
pub fn pseudohash(bytes: &[u8]) -> f64 {
    fold_reversed(1.0, bytes, 0)
}

/// `pseudohash(prefix ++ suffix)`，不需要實際串接
///
/// 流 key 是 `key ++ seed` 的形式；先處理 suffix（位置偏移 prefix 長度）
/// 再處理 prefix，與串接後的結果 bit-for-bit 相同。
pub fn pseudohash_pair(prefix: &[u8], suffix: &[u8]) -> f64 {
    let num = fold_reversed(1.0, suffix, prefix.len());
    fold_reversed(num, prefix, 0)
}

fn fold_reversed(mut num: f64, bytes: &[u8], offset: usize) -> f64 {
    for (i, &b) in bytes.iter().enumerate().rev() {
        num = ((1.123_928_502_3 / num) * (b as f64) * PI + PI * ((offset + i + 1) as f64)) % 1.0;
    }
    num
}

/// 四捨五入到小數點後 13 位（對應 `string.format("%.13f")`）
pub fn round13(x: f64) -> f64 {
    (x * 1e13).round() / 1e13
}

// ============================================================================
// LuaRandom - 腳本引擎的 TW223 generator
// ============================================================================

/// Tausworthe (TW223) 偽隨機數生成器
///
/// 四個 64-bit word，從 double 播種（每個 word 經過 `d = d*PI + E`
/// 與低位下限保護），播種後空轉 10 步。
pub struct LuaRandom {
    state: [u64; 4],
}

impl LuaRandom {
    pub fn new(seed: f64) -> Self {
        let mut d = seed;
        let mut r: u32 = 0x11090601;
        let mut state = [0u64; 4];
        for word in state.iter_mut() {
            let m = 1u64 << (r & 0xff);
            r >>= 8;
            d = d * PI + E;
            let mut u = d.to_bits();
            if u < m {
                u += m;
            }
            *word = u;
        }
        let mut rng = Self { state };
        for _ in 0..10 {
            rng.step();
        }
        rng
    }

    /// TW223 一步，回傳混合後的 64-bit
    fn step(&mut self) -> u64 {
        let mut r = 0u64;
        r ^= Self::tw223(&mut self.state[0], 63, 31, 18);
        r ^= Self::tw223(&mut self.state[1], 58, 19, 28);
        r ^= Self::tw223(&mut self.state[2], 55, 24, 7);
        r ^= Self::tw223(&mut self.state[3], 47, 21, 8);
        r
    }

    #[inline]
    fn tw223(z: &mut u64, k: u32, q: u32, s: u32) -> u64 {
        let x = (((*z << q) ^ *z) >> (k - s)) ^ ((*z & (u64::MAX << (64 - k))) << s);
        *z = x;
        x
    }

    /// [0, 1) 的 double（取高 52 bits 接到 1.0 的尾數上）
    pub fn random(&mut self) -> f64 {
        let bits = (self.step() & 0x000f_ffff_ffff_ffff) | 0x3ff0_0000_0000_0000;
        f64::from_bits(bits) - 1.0
    }

    /// 閉區間 [lo, hi] 的整數，對應 `math.random(lo, hi)`
    pub fn randint(&mut self, lo: usize, hi: usize) -> usize {
        debug_assert!(lo <= hi);
        lo + (self.random() * ((hi - lo + 1) as f64)) as usize
    }
}

// ============================================================================
// 種子上下文
// ============================================================================

/// 單一種子的雜湊上下文（種子字節 + 預先算好的 pseudohash）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeedCtx {
    pub bytes: [u8; SEED_LEN],
    pub hashed: f64,
}

impl SeedCtx {
    pub fn new(bytes: [u8; SEED_LEN]) -> Self {
        Self {
            bytes,
            hashed: pseudohash(&bytes),
        }
    }
}

/// 8 個種子一批的上下文（struct-of-arrays）
#[derive(Clone, Copy, Debug)]
pub struct SeedCtxVec {
    pub bytes: [[u8; SEED_LEN]; LANES],
    pub hashed: [f64; LANES],
}

impl SeedCtxVec {
    pub fn new(seeds: [[u8; SEED_LEN]; LANES]) -> Self {
        let mut hashed = [0.0; LANES];
        for (h, s) in hashed.iter_mut().zip(seeds.iter()) {
            *h = pseudohash(s);
        }
        Self {
            bytes: seeds,
            hashed,
        }
    }

    /// 取出單一 lane 的標量上下文
    pub fn lane(&self, lane: usize) -> SeedCtx {
        SeedCtx {
            bytes: self.bytes[lane],
            hashed: self.hashed[lane],
        }
    }
}

// ============================================================================
// 流 key
// ============================================================================

/// 流 key 的棧上緩衝（熱路徑不做堆分配）
#[derive(Clone, Copy)]
pub struct KeyBuf {
    buf: [u8; 32],
    len: usize,
}

impl KeyBuf {
    pub fn new(base: &str) -> Self {
        let mut k = Self {
            buf: [0; 32],
            len: 0,
        };
        k.push_str(base);
        k
    }

    pub fn push_str(&mut self, s: &str) {
        let bytes = s.as_bytes();
        self.buf[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
    }

    /// 推入十進位數字（ante、resample 計數）
    pub fn push_num(&mut self, n: usize) {
        if n >= 10 {
            self.push_num(n / 10);
        }
        self.buf[self.len] = b'0' + (n % 10) as u8;
        self.len += 1;
    }

    /// 帶 `_resample{n}` 後綴的衍生 key（n 從 2 起算，與遊戲一致）
    pub fn resample(&self, n: usize) -> KeyBuf {
        let mut k = *self;
        k.push_str("_resample");
        k.push_num(n);
        k
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// 組合 `{base}{ante}` 形式的 key
pub fn ante_key(base: &str, ante: u8) -> KeyBuf {
    let mut k = KeyBuf::new(base);
    k.push_num(ante as usize);
    k
}

/// 組合 `{base}{src}{ante}` 形式的 key（商店/卡包來源後綴）
pub fn source_key(base: &str, src: &str, ante: u8) -> KeyBuf {
    let mut k = KeyBuf::new(base);
    k.push_str(src);
    k.push_num(ante as usize);
    k
}

// ============================================================================
// 游標：單一 key 的推進狀態
// ============================================================================

/// 單一 key 的流游標（標量）
///
/// node 初始為 `pseudohash(key ++ seed)`，每次抽取推進
/// `node = round13((node * 1.72431234 + 2.134453429141) % 1)`，
/// 交給 generator 的 uniform 是 `(node + pseudohash(seed)) / 2`。
#[derive(Clone, Copy)]
pub struct Cursor {
    node: f64,
    hashed_seed: f64,
}

impl Cursor {
    pub fn new(key: &KeyBuf, seed: &SeedCtx) -> Self {
        Self {
            node: pseudohash_pair(key.as_bytes(), &seed.bytes),
            hashed_seed: seed.hashed,
        }
    }

    pub fn next_uniform(&mut self) -> f64 {
        self.node = round13((self.node * 1.724_312_34 + 2.134_453_429_141) % 1.0);
        (self.node + self.hashed_seed) / 2.0
    }

    /// 下一個 [0,1) 浮點
    pub fn random(&mut self) -> f64 {
        LuaRandom::new(self.next_uniform()).random()
    }

    /// 下一個 [lo, hi] 整數
    pub fn randint(&mut self, lo: usize, hi: usize) -> usize {
        LuaRandom::new(self.next_uniform()).randint(lo, hi)
    }
}

/// 8-lane 流游標，lane i 與標量游標（種子 i）逐 bit 一致
#[derive(Clone, Copy)]
pub struct CursorVec {
    node: [f64; LANES],
    hashed_seed: [f64; LANES],
}

impl CursorVec {
    pub fn new(key: &KeyBuf, seeds: &SeedCtxVec) -> Self {
        let mut node = [0.0; LANES];
        for (n, s) in node.iter_mut().zip(seeds.bytes.iter()) {
            *n = pseudohash_pair(key.as_bytes(), s);
        }
        Self {
            node,
            hashed_seed: seeds.hashed,
        }
    }

    pub fn next_uniform(&mut self) -> [f64; LANES] {
        let mut out = [0.0; LANES];
        for lane in 0..LANES {
            self.node[lane] =
                round13((self.node[lane] * 1.724_312_34 + 2.134_453_429_141) % 1.0);
            out[lane] = (self.node[lane] + self.hashed_seed[lane]) / 2.0;
        }
        out
    }

    pub fn random(&mut self) -> [f64; LANES] {
        let uniforms = self.next_uniform();
        let mut out = [0.0; LANES];
        for lane in 0..LANES {
            out[lane] = LuaRandom::new(uniforms[lane]).random();
        }
        out
    }

    pub fn randint(&mut self, lo: usize, hi: usize) -> [usize; LANES] {
        let uniforms = self.next_uniform();
        let mut out = [0; LANES];
        for lane in 0..LANES {
            out[lane] = LuaRandom::new(uniforms[lane]).randint(lo, hi);
        }
        out
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(s: &str) -> SeedCtx {
        let mut bytes = [0u8; SEED_LEN];
        bytes.copy_from_slice(s.as_bytes());
        SeedCtx::new(bytes)
    }

    #[test]
    fn test_pseudohash_range_and_determinism() {
        let a = pseudohash(b"Voucher1ABCDEFGH");
        let b = pseudohash(b"Voucher1ABCDEFGH");
        assert_eq!(a, b);
        assert!((0.0..1.0).contains(&a));
        // 不同輸入應該得到不同雜湊
        assert_ne!(a, pseudohash(b"Voucher2ABCDEFGH"));
    }

    #[test]
    fn test_pseudohash_pair_matches_concat() {
        let concat = pseudohash(b"Tag3AAAAAAAA");
        let pair = pseudohash_pair(b"Tag3", b"AAAAAAAA");
        assert_eq!(concat, pair);
    }

    #[test]
    fn test_round13() {
        assert_eq!(round13(0.12345678901234567), 0.1234567890123);
        assert_eq!(round13(0.9999999999999699), 1.0);
    }

    #[test]
    fn test_lua_random_range() {
        let mut rng = LuaRandom::new(0.3251);
        for _ in 0..1000 {
            let x = rng.random();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_lua_randint_bounds() {
        let mut rng = LuaRandom::new(0.77);
        let mut seen_lo = false;
        let mut seen_hi = false;
        for _ in 0..2000 {
            let v = rng.randint(3, 7);
            assert!((3..=7).contains(&v));
            seen_lo |= v == 3;
            seen_hi |= v == 7;
        }
        assert!(seen_lo && seen_hi);
    }

    #[test]
    fn test_cursor_deterministic() {
        let ctx = seed("1A2B3C4D");
        let key = ante_key("Voucher", 1);
        let mut a = Cursor::new(&key, &ctx);
        let mut b = Cursor::new(&key, &ctx);
        for _ in 0..16 {
            assert_eq!(a.next_uniform(), b.next_uniform());
        }
    }

    #[test]
    fn test_cursor_vec_matches_scalar() {
        let seeds = SeedCtxVec::new([
            *b"AAAAAAAA", *b"BBBBBBBB", *b"12345678", *b"SEEDSEED",
            *b"ZZZZZZZZ", *b"A1B2C3D4", *b"QWERTYUI", *b"99999999",
        ]);
        let key = source_key("Joker1", "sho", 2);
        let mut vec_cursor = CursorVec::new(&key, &seeds);
        let mut scalars: Vec<Cursor> = (0..LANES)
            .map(|lane| Cursor::new(&key, &seeds.lane(lane)))
            .collect();
        for _ in 0..8 {
            let vs = vec_cursor.randint(0, 60);
            for (lane, s) in scalars.iter_mut().enumerate() {
                assert_eq!(vs[lane], s.randint(0, 60));
            }
        }
    }

    #[test]
    fn test_key_buf() {
        let mut k = KeyBuf::new("rarity");
        k.push_num(12);
        k.push_str("sho");
        assert_eq!(k.as_bytes(), b"rarity12sho");
        assert_eq!(k.resample(2).as_bytes(), b"rarity12sho_resample2");
        assert_eq!(ante_key("shop_pack", 4).as_bytes(), b"shop_pack4");
    }
}

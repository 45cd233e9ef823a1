use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::board::Board;
use crate::moves::Move;
use crate::score::Score;
use crate::util::Color;

const BUCKET_SIZE: usize = 4;
const SEGMENTS: usize = 256;

/// One cached search result: score bounds for the position at a given depth
/// plus the move that produced them.
#[derive(Copy, Clone, Debug)]
pub struct HashSlot {
    pub hash_key: u64,
    pub lower_bound: Score,
    pub upper_bound: Score,
    pub depth: i32,
    pub mv: Move,
}

impl HashSlot {
    fn empty() -> HashSlot {
        HashSlot {
            hash_key: 0,
            lower_bound: Score::min(),
            upper_bound: Score::max(),
            depth: 0,
            mv: Move::invalid(),
        }
    }
}

struct HashBucket {
    slots: [HashSlot; BUCKET_SIZE],
}

impl HashBucket {
    fn new() -> HashBucket {
        HashBucket {
            slots: [HashSlot::empty(); BUCKET_SIZE],
        }
    }
}

/// Concurrent fixed-size position cache.
///
/// Two tables, one per side to move, share one contiguous allocation of
/// 4-slot buckets.  Stored keys are the board hash XORed with a generation
/// counter, so `clear` is a counter bump: every older entry stops matching.
/// Buckets are guarded by 256 segment locks; readers lock too, because a
/// hit bubbles the entry to the front of its bucket.
pub struct TranspositionTable {
    hash_size: usize,
    buckets: Vec<UnsafeCell<HashBucket>>,
    locks: Vec<Mutex<()>>,
    generation: AtomicU64,
}

unsafe impl Sync for TranspositionTable {}
unsafe impl Send for TranspositionTable {}

fn is_prime(n: usize) -> bool {
    if n == 2 {
        return true;
    }
    if n < 2 || n % 2 == 0 {
        return false;
    }
    let mut i = 3;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 2;
    }
    return true;
}

fn next_prime(mut n: usize) -> usize {
    while !is_prime(n) {
        n += 1;
    }
    return n;
}

impl TranspositionTable {
    /// `size` is the rough total byte budget; the bucket count per side is
    /// rounded up to the next prime.
    pub fn new(size: usize) -> TranspositionTable {
        let hash_size = next_prime((size / std::mem::size_of::<HashBucket>() / 2).max(1));
        let mut buckets = Vec::with_capacity(hash_size * 2);
        for _ in 0..hash_size * 2 {
            buckets.push(UnsafeCell::new(HashBucket::new()));
        }
        let mut locks = Vec::with_capacity(SEGMENTS);
        for _ in 0..SEGMENTS {
            locks.push(Mutex::new(()));
        }
        TranspositionTable {
            hash_size,
            buckets,
            locks,
            generation: AtomicU64::new(0),
        }
    }

    /// Forget everything, in O(1): keys of earlier generations no longer
    /// compare equal.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::Relaxed);
    }

    fn board_key(&self, board: &Board) -> u64 {
        return board.hash_key() ^ self.generation.load(Ordering::Relaxed);
    }

    fn bucket_index(&self, board: &Board, key: u64) -> usize {
        let side_offset = if board.turn == Color::White {
            self.hash_size
        } else {
            0
        };
        return side_offset + (key % self.hash_size as u64) as usize;
    }

    fn lock_for(&self, key: u64) -> &Mutex<()> {
        return &self.locks[(key % SEGMENTS as u64) as usize];
    }

    // On a hit the entry bubbles toward the front of its bucket, so the
    // bucket stays most-recently-used first.
    fn find_key(bucket: &mut HashBucket, key: u64) -> Option<usize> {
        for i in 0..BUCKET_SIZE {
            if bucket.slots[i].hash_key == key {
                for j in (1..=i).rev() {
                    bucket.slots.swap(j - 1, j);
                }
                return Some(0);
            }
        }
        return None;
    }

    /// Look the position up; on a hit the stored slot is returned by value.
    pub fn find(&self, board: &Board) -> Option<HashSlot> {
        let key = self.board_key(board);
        let _guard = self.lock_for(key).lock().unwrap();
        let bucket = unsafe { &mut *self.buckets[self.bucket_index(board, key)].get() };
        return TranspositionTable::find_key(bucket, key).map(|i| bucket.slots[i]);
    }

    /// Store bounds for the position.  A shallower result never overwrites
    /// a deeper one; an equal-depth result tightens the stored bounds; a
    /// new key evicts the oldest entry of the bucket.
    pub fn insert(
        &self,
        board: &Board,
        depth: i32,
        lower_bound: Score,
        upper_bound: Score,
        mv: Move,
    ) {
        let key = self.board_key(board);
        let _guard = self.lock_for(key).lock().unwrap();
        let bucket = unsafe { &mut *self.buckets[self.bucket_index(board, key)].get() };

        let mut lower_bound = lower_bound;
        let mut upper_bound = upper_bound;
        match TranspositionTable::find_key(bucket, key) {
            None => {
                for i in (1..BUCKET_SIZE).rev() {
                    bucket.slots[i] = bucket.slots[i - 1];
                }
            }
            Some(_) => {
                let cand = &bucket.slots[0];
                if cand.depth > depth {
                    return;
                }
                if cand.depth == depth {
                    lower_bound = lower_bound.max(cand.lower_bound);
                    upper_bound = upper_bound.min(cand.upper_bound);
                }
            }
        }

        bucket.slots[0] = HashSlot {
            hash_key: key,
            lower_bound,
            upper_bound,
            depth,
            mv,
        };
    }
}

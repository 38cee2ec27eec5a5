//! Arena pool: a small bounded pool of `RequestArena` instances (§4.4).
//!
//! Acquisition reuses a released instance or creates a new one up to the
//! ceiling; above the ceiling, arenas are destroyed on release rather than
//! pooled. Models the "connection pool" shape no teacher module happens to
//! need, built directly from the spec's own description.

use super::RequestArena;

pub struct ArenaPool {
    ceiling: usize,
    idle: Vec<RequestArena>,
    in_flight: usize,
}

impl ArenaPool {
    pub fn new(ceiling: usize) -> Self {
        Self { ceiling, idle: Vec::new(), in_flight: 0 }
    }

    /// Acquire an arena, reusing an idle one if available, else creating a
    /// fresh one up to `ceiling`. Returns `None` if the in-flight
    /// concurrency ceiling is already reached.
    pub fn acquire(&mut self) -> Option<RequestArena> {
        if let Some(arena) = self.idle.pop() {
            self.in_flight += 1;
            return Some(arena);
        }
        if self.in_flight < self.ceiling {
            self.in_flight += 1;
            return Some(RequestArena::new());
        }
        None
    }

    /// Release an arena back to the pool. If the pool is already at
    /// capacity (can happen if the ceiling was lowered), the arena is
    /// dropped instead of pooled.
    pub fn release(&mut self, arena: RequestArena) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.idle.len() < self.ceiling {
            self.idle.push(arena);
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_blocks_above_ceiling() {
        let mut pool = ArenaPool::new(2);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert!(pool.acquire().is_none());
        pool.release(a);
        assert!(pool.acquire().is_some());
        pool.release(b);
    }

    #[test]
    fn released_arena_is_reused() {
        let mut pool = ArenaPool::new(1);
        let a = pool.acquire().unwrap();
        pool.release(a);
        assert_eq!(pool.idle_count(), 1);
        let _ = pool.acquire().unwrap();
        assert_eq!(pool.idle_count(), 0);
    }
}

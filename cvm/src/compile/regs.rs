use crate::{error::Error, grammer::token::Pos};
use arch::reg::{Reg, GPR_COUNT};

/// Virtual register pool over `r0` .. `r15`.
/// Allocation always takes the lowest free register; there is no spilling.
#[derive(Debug, Default)]
pub struct RegPool {
    used: [bool; GPR_COUNT],
}

impl RegPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, pos: &Pos) -> Result<Reg, Error> {
        let idx = self
            .used
            .iter()
            .position(|used| !used)
            .ok_or_else(|| Error::RegisterExhausted(pos.into()))?;
        let reg = Reg::gpr(idx).ok_or_else(|| Error::RegisterExhausted(pos.into()))?;
        self.used[idx] = true;
        Ok(reg)
    }

    /// Special registers are never pooled; freeing them is a no-op.
    pub fn free(&mut self, reg: Reg) {
        if reg.is_gpr() {
            self.used[u8::from(reg) as usize] = false;
        }
    }

    pub fn live(&self) -> usize {
        self.used.iter().filter(|used| **used).count()
    }

    pub fn live_regs(&self) -> Vec<Reg> {
        self.used
            .iter()
            .enumerate()
            .filter(|(_, used)| **used)
            .filter_map(|(idx, _)| Reg::gpr(idx))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POS: Pos = Pos {
        file: "test.c",
        row: 1,
        col: 1,
    };

    #[test]
    fn lowest_first() {
        let mut pool = RegPool::new();
        assert_eq!(pool.alloc(&POS).ok(), Some(Reg::R0));
        assert_eq!(pool.alloc(&POS).ok(), Some(Reg::R1));
        assert_eq!(pool.alloc(&POS).ok(), Some(Reg::R2));
        pool.free(Reg::R1);
        assert_eq!(pool.alloc(&POS).ok(), Some(Reg::R1));
        assert_eq!(pool.live(), 3);
    }

    #[test]
    fn exhaustion() {
        let mut pool = RegPool::new();
        for _ in 0..GPR_COUNT {
            assert!(pool.alloc(&POS).is_ok());
        }
        match pool.alloc(&POS) {
            Err(Error::RegisterExhausted(loc)) => assert_eq!(loc.row, 1),
            other => panic!("expected exhaustion, got {:?}", other),
        }
        pool.free(Reg::R15);
        assert_eq!(pool.alloc(&POS).ok(), Some(Reg::R15));
    }

    #[test]
    fn live_regs() {
        let mut pool = RegPool::new();
        let a = pool.alloc(&POS).unwrap();
        let b = pool.alloc(&POS).unwrap();
        let c = pool.alloc(&POS).unwrap();
        pool.free(b);
        assert_eq!(pool.live_regs(), vec![a, c]);
        pool.free(Reg::RV);
        assert_eq!(pool.live(), 2);
        pool.free(a);
        pool.free(c);
        assert_eq!(pool.live(), 0);
    }
}

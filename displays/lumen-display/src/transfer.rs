//! Transfer state shared between thread and interrupt context
//!
//! A bus has exactly one in-flight burst at a time. The flag below is the
//! only datum both contexts touch, so it is an atomic with explicit
//! orderings: acquisition re-validates idleness in the same atomic step
//! (no two callers can both observe Idle and both arm the channel), and the
//! completion handler's release is a store-release performed after all
//! hardware acknowledgment, so a spinning caller never observes Idle while
//! the hardware or control lines are still unsettled.

use core::num::NonZeroU32;
use core::sync::atomic::{AtomicBool, Ordering};

/// The busy-wait exceeded its configured bound
///
/// Only produced when a stall limit is configured; the default is to spin
/// indefinitely, matching the hardware assumption that an armed burst
/// always eventually completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stalled;

/// One step of a busy-wait loop
///
/// The engine spins through this trait rather than calling a hint
/// instruction directly, so an integrator can substitute a cooperative
/// yield, a WFE, or an instrumented waiter without touching the buses.
pub trait Relax {
    /// Called once per failed readiness check
    fn relax(&mut self);
}

/// Default waiter: a spin-loop hint
///
/// Appropriate for transfers in the microsecond-to-millisecond range,
/// where a blocking wait/wake primitive would cost more than the spin.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinRelax;

impl Relax for SpinRelax {
    fn relax(&mut self) {
        core::hint::spin_loop();
    }
}

/// Idle/Active state of one bus's DMA transfer
///
/// Set Active only by the transmit path, cleared only by the completion
/// handler. Allocated by the integrator (a `static`) and shared by
/// reference with both sides.
#[derive(Debug)]
pub struct TransferFlag(AtomicBool);

impl TransferFlag {
    /// A new flag in the Idle state
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Non-blocking busy check
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Attempt the Idle -> Active transition
    ///
    /// The compare-exchange re-validates the busy check immediately before
    /// the transition; there is no window in which two callers can both
    /// succeed.
    pub fn try_acquire(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_ok()
    }

    /// The Active -> Idle transition, with release ordering
    ///
    /// Must be the completion handler's last action.
    pub fn release(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Spin until the flag is Idle
    ///
    /// Backpressure for the command path: a register write must not
    /// interleave with an in-flight burst. `limit` bounds the spin in relax
    /// steps; `None` spins indefinitely.
    pub fn wait_idle<R: Relax>(
        &self,
        relax: &mut R,
        limit: Option<NonZeroU32>,
    ) -> Result<(), Stalled> {
        let mut spins: u32 = 0;
        while self.is_active() {
            if let Some(limit) = limit {
                if spins >= limit.get() {
                    return Err(Stalled);
                }
            }
            relax.relax();
            spins = spins.wrapping_add(1);
        }
        Ok(())
    }

    /// Spin until the Idle -> Active transition succeeds
    ///
    /// Backpressure for the data path: callers pushing frames faster than
    /// the hardware drains them block here.
    pub fn acquire<R: Relax>(
        &self,
        relax: &mut R,
        limit: Option<NonZeroU32>,
    ) -> Result<(), Stalled> {
        let mut spins: u32 = 0;
        while !self.try_acquire() {
            if let Some(limit) = limit {
                if spins >= limit.get() {
                    return Err(Stalled);
                }
            }
            relax.relax();
            spins = spins.wrapping_add(1);
        }
        Ok(())
    }
}

impl Default for TransferFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Waiter that releases a flag after a controlled number of steps,
    /// standing in for a completion interrupt firing mid-spin.
    struct ReleaseAfter<'a> {
        flag: &'a TransferFlag,
        steps_left: u32,
        steps_taken: u32,
    }

    impl Relax for ReleaseAfter<'_> {
        fn relax(&mut self) {
            self.steps_taken += 1;
            if self.steps_left > 0 {
                self.steps_left -= 1;
                if self.steps_left == 0 {
                    self.flag.release();
                }
            }
        }
    }

    #[test]
    fn acquire_on_idle_flag_takes_no_spins() {
        let flag = TransferFlag::new();
        let mut relax = ReleaseAfter {
            flag: &flag,
            steps_left: 0,
            steps_taken: 0,
        };
        assert!(flag.acquire(&mut relax, None).is_ok());
        assert_eq!(relax.steps_taken, 0);
        assert!(flag.is_active());
    }

    #[test]
    fn second_acquire_spins_until_released() {
        let flag = TransferFlag::new();
        assert!(flag.try_acquire());

        let mut relax = ReleaseAfter {
            flag: &flag,
            steps_left: 5,
            steps_taken: 0,
        };
        assert!(flag.acquire(&mut relax, None).is_ok());
        assert_eq!(relax.steps_taken, 5);
        assert!(flag.is_active());
    }

    #[test]
    fn acquire_is_exclusive() {
        let flag = TransferFlag::new();
        assert!(flag.try_acquire());
        assert!(!flag.try_acquire());
        flag.release();
        assert!(flag.try_acquire());
    }

    #[test]
    fn bounded_wait_reports_stall() {
        let flag = TransferFlag::new();
        assert!(flag.try_acquire());

        let mut relax = ReleaseAfter {
            flag: &flag,
            steps_left: 0, // never released
            steps_taken: 0,
        };
        let limit = NonZeroU32::new(16);
        assert_eq!(flag.wait_idle(&mut relax, limit), Err(Stalled));
        assert_eq!(flag.acquire(&mut relax, limit), Err(Stalled));
        // the stuck flag is untouched
        assert!(flag.is_active());
    }
}

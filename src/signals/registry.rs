/*!
 * Custom Reason Registry
 * Fixed table binding custom reasons to extension handlers
 */

use super::types::{
    HandlerFn, ProcSignalReason, SignalError, SignalResult, NUM_CUSTOM_PROCSIGNALS,
};
use log::{error, info, warn};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

const PHASE_STARTUP: u8 = 0;
const PHASE_PRELOAD: u8 = 1;
const PHASE_FROZEN: u8 = 2;

/// Registration lifecycle of a process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryPhase {
    /// Before preload libraries are loaded; registration not yet legal
    Startup,
    /// Preload libraries are loading; registration is legal
    Preload,
    /// Preload finished; the table is read-only
    Frozen,
}

/// Table of custom signal handlers
///
/// Written only while the owning process is in its preload phase, which
/// is single-threaded, then read-only for the rest of the process's life.
/// Every entry is write-once and there is no unregistration.
pub struct ReasonRegistry {
    phase: AtomicU8,
    handlers: [OnceLock<HandlerFn>; NUM_CUSTOM_PROCSIGNALS],
}

impl ReasonRegistry {
    pub const fn new() -> Self {
        Self {
            phase: AtomicU8::new(PHASE_STARTUP),
            handlers: [const { OnceLock::new() }; NUM_CUSTOM_PROCSIGNALS],
        }
    }

    /// Open the registry for the preload window
    pub fn begin_preload(&self) {
        match self.phase.compare_exchange(
            PHASE_STARTUP,
            PHASE_PRELOAD,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => info!("Custom signal registration open"),
            Err(PHASE_PRELOAD) => {}
            Err(_) => warn!("Preload already finished; custom signal registry stays frozen"),
        }
    }

    /// Close the preload window and freeze the table
    pub fn finish_preload(&self) {
        let previous = self.phase.swap(PHASE_FROZEN, Ordering::AcqRel);
        if previous != PHASE_FROZEN {
            info!(
                "Custom signal registry frozen with {} of {} reasons in use",
                self.count(),
                NUM_CUSTOM_PROCSIGNALS
            );
        }
    }

    pub fn phase(&self) -> RegistryPhase {
        match self.phase.load(Ordering::Acquire) {
            PHASE_STARTUP => RegistryPhase::Startup,
            PHASE_PRELOAD => RegistryPhase::Preload,
            _ => RegistryPhase::Frozen,
        }
    }

    #[inline]
    pub fn in_preload(&self) -> bool {
        self.phase.load(Ordering::Acquire) == PHASE_PRELOAD
    }

    /// Bind `handler` to the first free custom reason
    ///
    /// Returns `RegistrationClosed` outside the preload phase and
    /// `ReasonsExhausted` when every custom reason is taken.
    pub fn try_register<F>(&self, handler: F) -> SignalResult<ProcSignalReason>
    where
        F: Fn() -> SignalResult<()> + Send + Sync + 'static,
    {
        if !self.in_preload() {
            return Err(SignalError::RegistrationClosed);
        }

        let mut handler: HandlerFn = Arc::new(handler);
        for (index, slot) in self.handlers.iter().enumerate() {
            match slot.set(handler) {
                Ok(()) => {
                    let reason = ProcSignalReason::custom(index)
                        .ok_or(SignalError::InvalidReason(index as u8))?;
                    info!("Registered custom signal handler for {}", reason);
                    return Ok(reason);
                }
                // Occupied: take the handler back and keep scanning
                Err(rejected) => handler = rejected,
            }
        }

        warn!(
            "Custom signal registration failed: all {} reasons in use",
            NUM_CUSTOM_PROCSIGNALS
        );
        Err(SignalError::ReasonsExhausted(NUM_CUSTOM_PROCSIGNALS))
    }

    /// Bind `handler` to the first free custom reason
    ///
    /// Returns [`ProcSignalReason::INVALID`] when the table is full; the
    /// caller must check for it.
    ///
    /// # Panics
    /// Registering outside the preload phase is a programming error in the
    /// extension. Different processes would disagree on the mapping, so the
    /// process is brought down instead.
    pub fn register<F>(&self, handler: F) -> ProcSignalReason
    where
        F: Fn() -> SignalResult<()> + Send + Sync + 'static,
    {
        match self.try_register(handler) {
            Ok(reason) => reason,
            Err(SignalError::ReasonsExhausted(_)) => ProcSignalReason::INVALID,
            Err(err) => {
                error!("FATAL: {}", err);
                panic!("{}", err);
            }
        }
    }

    /// Handler bound at custom `index`, if any
    #[inline]
    pub fn handler(&self, index: usize) -> Option<&HandlerFn> {
        self.handlers.get(index).and_then(OnceLock::get)
    }

    pub fn is_registered(&self, reason: ProcSignalReason) -> bool {
        reason
            .custom_index()
            .and_then(|index| self.handler(index))
            .is_some()
    }

    /// Number of custom reasons in use
    pub fn count(&self) -> usize {
        self.handlers.iter().filter(|slot| slot.get().is_some()).count()
    }

    /// Reasons currently bound, in ascending order
    pub fn registered_reasons(&self) -> Vec<ProcSignalReason> {
        self.handlers
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.get().is_some())
            .filter_map(|(index, _)| ProcSignalReason::custom(index))
            .collect()
    }
}

impl Default for ReasonRegistry {
    fn default() -> Self {
        Self::new()
    }
}

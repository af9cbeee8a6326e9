//! Cooperative cancellation driven by SIGINT
//!
//! The first interrupt sets a shared [`CancellationFlag`]; tree-walking loops
//! check it before launching their next unit and stop early. A second
//! interrupt, received while the flag is set, exits the process immediately
//! with [`FORCED_EXIT_STATUS`].

use crate::error::Result;
use signal_hook::consts::SIGINT;
use signal_hook::iterator::{Handle, Signals};
use signal_hook::SigId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Exit status used when a second interrupt forces termination
pub const FORCED_EXIT_STATUS: i32 = 1;

/// Warning printed on the first interrupt
pub const INTERRUPT_WARNING: &str = "Exiting... Interrupt again to exit immediately.";

/// Process-wide "stop launching new units" flag, shared by clone
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Request a graceful stop
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Installed SIGINT handlers; dropping it leaves them in place
pub struct InterruptHandler {
    ids: Vec<SigId>,
    signals: Handle,
    watcher: Option<JoinHandle<()>>,
}

impl InterruptHandler {
    /// Unregister the handlers and stop the warning thread
    pub fn uninstall(mut self) {
        for id in self.ids.drain(..) {
            signal_hook::low_level::unregister(id);
        }
        self.signals.close();
        if let Some(watcher) = self.watcher.take() {
            let _ = watcher.join();
        }
    }
}

/// Route SIGINT to `flag`
///
/// Inside the signal handler only two things happen: the process exits if
/// the flag is already set, otherwise the flag is set. The warning is
/// written by a watcher thread outside signal context.
pub fn install_interrupt_handler(flag: &CancellationFlag) -> Result<InterruptHandler> {
    // Registration order matters: the exit check must see the flag before
    // this same delivery sets it.
    let shutdown =
        signal_hook::flag::register_conditional_shutdown(SIGINT, FORCED_EXIT_STATUS, Arc::clone(&flag.0))?;
    let set = signal_hook::flag::register(SIGINT, Arc::clone(&flag.0))?;

    let mut signals = Signals::new([SIGINT])?;
    let handle = signals.handle();
    let watcher = thread::spawn(move || {
        let mut warned = false;
        for _ in signals.forever() {
            if !warned {
                eprintln!("\n{}", INTERRUPT_WARNING);
                log::warn!("Interrupt received, finishing the current test before stopping");
                warned = true;
            }
        }
    });

    Ok(InterruptHandler {
        ids: vec![shutdown, set],
        signals: handle,
        watcher: Some(watcher),
    })
}

// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! Signal trap: installs a handler on every catchable signal that runs the
//! shutdown path and exits.
//!
//! Uses `signal_hook`'s low-level `register` API, which runs the handler
//! body directly rather than deferring through a self-pipe. A self-pipe
//! would be the more conservative choice -- the handler body below must
//! stay allocation-free and avoid blocking I/O -- but calling shutdown
//! directly keeps the teardown path simple.

use rpio_core::Result;

/// Job-control and I/O notifications that are routine rather than fatal;
/// left untouched rather than treated as a trigger for shutdown.
const BENIGN: &[libc::c_int] = &[libc::SIGCHLD, libc::SIGTSTP, libc::SIGWINCH, libc::SIGIO];

/// Installs the fatal-signal handler on every signal number 1..=63 except
/// `SIGKILL`/`SIGSTOP` (uncatchable) and the benign set above.
pub fn install() -> Result<()> {
    for signum in 1..=63 {
        if signum == libc::SIGKILL || signum == libc::SIGSTOP {
            continue;
        }
        if BENIGN.contains(&signum) {
            continue;
        }
        unsafe {
            // Real-time signal numbers vary by libc; registering an
            // unsupported number fails harmlessly and is ignored.
            let _ = signal_hook::low_level::register(signum, handle_fatal_signal);
        }
    }
    Ok(())
}

fn handle_fatal_signal() {
    crate::engine::emergency_shutdown();
    std::process::exit(1);
}

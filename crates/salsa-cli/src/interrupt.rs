//! Ctrl-C handling.
//!
//! While an operation is running Ctrl-C cancels its token. Outside of an
//! operation Ctrl-C exits the program.

use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

#[derive(Clone, Default)]
pub struct Interrupts {
    active: Arc<Mutex<Option<CancellationToken>>>,
}

impl Interrupts {
    /// Start listening for Ctrl-C. Must be called inside a tokio runtime.
    pub fn install() -> Self {
        let interrupts = Self::default();
        let active = interrupts.active.clone();

        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                let token = active.lock().ok().and_then(|mut slot| slot.take());
                match token {
                    Some(token) => {
                        log::info!("Interrupted, cancelling current operation");
                        token.cancel();
                    }
                    None => {
                        eprintln!();
                        std::process::exit(130);
                    }
                }
            }
        });

        interrupts
    }

    /// Begin a cancellable operation; the token is released when the guard drops
    pub fn begin(&self) -> OperationGuard {
        let token = CancellationToken::new();
        if let Ok(mut slot) = self.active.lock() {
            *slot = Some(token.clone());
        }
        OperationGuard {
            token,
            active: self.active.clone(),
        }
    }
}

pub struct OperationGuard {
    token: CancellationToken,
    active: Arc<Mutex<Option<CancellationToken>>>,
}

impl OperationGuard {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.active.lock() {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_clears_active_token() {
        let interrupts = Interrupts::default();
        {
            let guard = interrupts.begin();
            assert!(!guard.token().is_cancelled());
            assert!(interrupts.active.lock().unwrap().is_some());
        }
        assert!(interrupts.active.lock().unwrap().is_none());
    }
}

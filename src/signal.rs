//! Signal handling for graceful shutdown.

use std::fmt;
use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::info;

/// Why the process is shutting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShutdownSignal {
    /// SIGINT or Ctrl+C.
    Interrupt,
    /// SIGTERM.
    Terminate,
    /// SIGHUP.
    Hangup,
    /// SIGQUIT.
    Quit,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownSignal::Interrupt => write!(f, "SIGINT"),
            ShutdownSignal::Terminate => write!(f, "SIGTERM"),
            ShutdownSignal::Hangup => write!(f, "SIGHUP"),
            ShutdownSignal::Quit => write!(f, "SIGQUIT"),
        }
    }
}

/// Turns OS signals into a one-shot shutdown request.
#[derive(Clone, Default)]
pub(crate) struct SignalHandler {
    token: CancellationToken,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_shutdown(&self, signal: ShutdownSignal) {
        if !self.token.is_cancelled() {
            info!(signal = %signal, "Shutdown requested");
        }
        self.token.cancel();
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once shutdown has been requested.
    pub fn shutdown_requested(&self) -> impl Future<Output = ()> + Send + 'static {
        self.token.clone().cancelled_owned()
    }

    /// Install SIGINT, SIGTERM, SIGHUP and SIGQUIT listeners (Unix).
    #[cfg(unix)]
    pub fn setup_os_signals(&self) -> std::io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sighup = signal(SignalKind::hangup())?;
        let mut sigquit = signal(SignalKind::quit())?;

        let handler = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => handler.request_shutdown(ShutdownSignal::Terminate),
                _ = sigint.recv() => handler.request_shutdown(ShutdownSignal::Interrupt),
                _ = sighup.recv() => handler.request_shutdown(ShutdownSignal::Hangup),
                _ = sigquit.recv() => handler.request_shutdown(ShutdownSignal::Quit),
            }
        });

        info!("OS signal handlers installed (SIGTERM, SIGINT, SIGHUP, SIGQUIT)");
        Ok(())
    }

    /// Install a Ctrl+C listener (non-Unix).
    #[cfg(not(unix))]
    pub fn setup_os_signals(&self) -> std::io::Result<()> {
        let handler = self.clone();
        tokio::spawn(async move {
            if let Ok(()) = tokio::signal::ctrl_c().await {
                handler.request_shutdown(ShutdownSignal::Interrupt);
            }
        });

        info!("OS signal handlers installed (Ctrl+C only)");
        Ok(())
    }
}

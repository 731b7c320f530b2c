use std::io;
use std::process;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Cancels `shutdown` on the first SIGINT or SIGTERM. A second signal exits the process
/// straight away, without waiting for open connections.
pub fn spawn_listener(shutdown: CancellationToken) -> Result<(), io::Error> {
    let mut signals = Signals::new()?;
    let (tx, rx) = mpsc::channel(2);

    tokio::spawn(async move {
        loop {
            let name = signals.recv().await;
            if tx.send(name).await.is_err() {
                break;
            }
        }
    });
    tokio::spawn(handoff(rx, shutdown, |code| process::exit(code)));

    Ok(())
}

/// Turns received signal names into the shutdown sequence: the first cancels `shutdown`,
/// the second calls `exit` with status 1.
async fn handoff(
    mut signals: mpsc::Receiver<&'static str>,
    shutdown: CancellationToken,
    exit: impl FnOnce(i32),
) {
    let Some(name) = signals.recv().await else {
        return;
    };
    log::info!("Received {}, shutting down gracefully", name);
    log::info!("Send the signal again to force immediate shutdown");
    shutdown.cancel();

    let Some(name) = signals.recv().await else {
        return;
    };
    log::warn!("Received {} during shutdown, exiting now", name);
    exit(1);
}

#[cfg(unix)]
struct Signals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    fn new() -> Result<Self, io::Error> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
        }
    }
}

#[cfg(not(unix))]
struct Signals;

#[cfg(not(unix))]
impl Signals {
    fn new() -> Result<Self, io::Error> {
        Ok(Self)
    }

    async fn recv(&mut self) -> &'static str {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "Ctrl-C",
            Err(e) => {
                log::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending().await
            }
        }
    }
}

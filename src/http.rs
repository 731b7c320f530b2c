use crate::config::Timeouts;
use crate::tcp::{self, TimeoutIo};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use std::convert::Infallible;
use std::future::Future;
use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

/// Serves HTTP/1.1 on `listener` until `shutdown` is cancelled, then stops accepting and gives
/// open connections up to `timeouts.drain` to finish.
pub async fn run_server<S, F, B>(
    listener: TcpListener,
    state: S,
    handle_req: F,
    timeouts: Timeouts,
    shutdown: CancellationToken,
) -> Result<(), io::Error>
where
    S: Send + Sync + 'static,
    F: for<'s> ServiceFn<'s, Request<Incoming>, S, Response<B>> + Copy + Send + 'static,
    B: Body + Send + 'static,
    <B as Body>::Data: Send,
    <B as Body>::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let state = Arc::new(state);
    let graceful = GracefulShutdown::new();

    let mut builder = http1::Builder::new();
    builder
        .timer(TokioTimer::new())
        .header_read_timeout(timeouts.read);

    loop {
        let stream = tokio::select! {
            accepted = tcp::accept(&listener) => accepted?,
            () = shutdown.cancelled() => break,
        };
        let io = TokioIo::new(TimeoutIo::new(stream, timeouts.idle, timeouts.write));

        let state = Arc::clone(&state);
        let serve = service_fn(move |req| {
            let state = Arc::clone(&state);
            async move { Ok::<_, Infallible>(handle_req(req, &state).await) }
        });

        let conn = graceful.watch(builder.serve_connection(io, serve));
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                log::debug!("Error serving connection: {}", e);
            }
        });
    }

    drop(listener);
    log::info!("Stopped accepting connections, waiting for open connections to finish");
    match timeout(timeouts.drain, graceful.shutdown()).await {
        Ok(()) => log::info!("All connections closed"),
        Err(_) => log::warn!(
            "Connections still open after {:?}, closing anyway",
            timeouts.drain
        ),
    }

    Ok(())
}

// Work around the lack of HKT bounds.
// Because the future will borrow from the state argument, we need to write bounds like this:
// ```
// where
//     F: for<'s> FnOnce(Request<Body>, &'s S) -> Fut<'s>
//     Fut<'s>: Future<Output = Response<B>> + 's
// ```
// Which can't currently be done. Instead, factor both bounds out to a dedicated trait,
// which is implemented for all matching functions.
pub trait ServiceFn<'s, T, S, R>
where
    Self: FnOnce(T, &'s S) -> Self::Fut,
    Self::Fut: Future<Output = R> + Send + 's,
    S: 's,
{
    type Fut;
}

impl<'s, T, S, R, F, Fut> ServiceFn<'s, T, S, R> for F
where
    F: FnOnce(T, &'s S) -> Fut,
    Fut: Future<Output = R> + Send + 's,
    S: 's,
{
    type Fut = Fut;
}

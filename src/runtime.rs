//! Global tokio runtime for fire-and-forget submission.
//!
//! [`Dispatcher::submit`](crate::Dispatcher::submit) spawns here so callers
//! in synchronous contexts (UI code, FFI entry points) get asynchronous
//! dispatch without owning a runtime. Code already inside a runtime should
//! prefer [`Dispatcher::dispatch`](crate::Dispatcher::dispatch).

use std::sync::OnceLock;

use tokio::runtime::Runtime;

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Initialize the runtime explicitly. Optional; first use initializes it
/// on demand.
pub fn init() -> &'static Runtime {
    RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("failed to create tokio runtime")
    })
}

/// Get the runtime, initializing it if needed.
pub fn get() -> &'static Runtime {
    init()
}

/// Spawn a future on the global runtime.
pub fn spawn<F>(future: F) -> tokio::task::JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    get().spawn(future)
}

/// Block the current thread on a future using the global runtime.
///
/// Do not call from within an async context.
pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
    get().block_on(future)
}

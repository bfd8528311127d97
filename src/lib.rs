pub mod app;
pub mod caller;
pub mod config;
pub mod event;
pub mod handler;
pub mod instructions;
pub mod session;
pub mod sms;
pub mod tenant;
pub mod tools;

pub fn spawn<F>(future: F) -> tokio::task::JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(future)
}

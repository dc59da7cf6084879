/// Injected connectivity signal. Production wires this to the host
/// environment's online/offline events; tests flip a flag and fire callbacks
/// by hand.
pub type OnlineCallback = Box<dyn Fn() + Send + Sync>;

pub trait ConnectivityObserver: Send + Sync {
    fn is_online(&self) -> bool;

    /// Register a callback invoked every time connectivity is restored.
    fn subscribe_online(&self, callback: OnlineCallback);
}

use parking_lot::Mutex;
use std::sync::Arc;

/// State touched from more than one task (poll loop + HTTP handlers).
pub type Shared<T> = Arc<Mutex<T>>;

pub fn new_state<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

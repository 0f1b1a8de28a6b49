use std::time::Duration;

/// Blocking pause between poll ticks.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

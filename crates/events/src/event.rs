use chrono::{DateTime, Utc};

/// A fact that has been committed and will not change.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted name such as `inventory.stock.moved`.
    fn event_type(&self) -> &'static str;

    /// Bumped whenever the payload shape changes.
    fn version(&self) -> u32;

    /// Business time supplied by the command, not the time of journaling.
    fn occurred_at(&self) -> DateTime<Utc>;
}

use chrono::{DateTime, Utc};

/// Snapshot of a session's state after a committed turn.
#[derive(Debug, Clone)]
pub struct Checkpoint<S> {
    /// Unique id (uuid v4).
    pub id: String,
    pub state: S,
    /// Number of committed turns in the session, this one included.
    pub step: u64,
    pub created_at: DateTime<Utc>,
}

impl<S> Checkpoint<S> {
    pub fn new(state: S, step: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            state,
            step,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_assigns_unique_ids() {
        let a = Checkpoint::new(1u8, 1);
        let b = Checkpoint::new(1u8, 1);
        assert_ne!(a.id, b.id);
        assert_eq!(a.step, 1);
    }
}

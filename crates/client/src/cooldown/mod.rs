// Client-side cooldown countdown
//
// Purely advisory: the server enforces the cooldown. The clock ticks down
// once per second for display and is overwritten whenever the server reports
// an authoritative remaining time.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownClock {
    Ready,
    Cooling { remaining: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// One second elapsed.
    Tick,
    /// Fresh remaining time (seconds) from the server.
    Sync(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockNotice {
    /// The countdown just ran out.
    Ready,
}

impl CooldownClock {
    pub fn new() -> Self {
        Self::Ready
    }

    pub fn remaining(&self) -> u64 {
        match self {
            Self::Ready => 0,
            Self::Cooling { remaining } => *remaining,
        }
    }

    pub fn is_cooling(&self) -> bool {
        matches!(self, Self::Cooling { .. })
    }

    pub fn apply(&mut self, event: ClockEvent) -> Option<ClockNotice> {
        match (*self, event) {
            (Self::Ready, ClockEvent::Tick) => None,
            (Self::Cooling { remaining }, ClockEvent::Tick) => {
                if remaining <= 1 {
                    *self = Self::Ready;
                    Some(ClockNotice::Ready)
                } else {
                    *self = Self::Cooling {
                        remaining: remaining - 1,
                    };
                    None
                }
            }
            (_, ClockEvent::Sync(0)) => {
                *self = Self::Ready;
                None
            }
            (_, ClockEvent::Sync(remaining)) => {
                *self = Self::Cooling { remaining };
                None
            }
        }
    }
}

impl Default for CooldownClock {
    fn default() -> Self {
        Self::new()
    }
}

/// `m:ss` rendering used by the status panel and banners.
pub fn format_remaining(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

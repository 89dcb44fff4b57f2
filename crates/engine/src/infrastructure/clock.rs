//! Clock and random implementations.

use crate::infrastructure::ports::{ClockPort, RandomPort};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// System clock - uses real time.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// System random - uses real randomness.
pub struct SystemRandom;

impl SystemRandom {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPort for SystemRandom {
    fn die_face(&self) -> u8 {
        use rand::Rng;
        rand::thread_rng().gen_range(1..=6)
    }

    fn gen_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Fixed clock for testing.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Hands out a fixed list of faces in order.
#[cfg(test)]
pub struct ScriptedRandom {
    faces: std::sync::Mutex<std::collections::VecDeque<u8>>,
}

#[cfg(test)]
impl ScriptedRandom {
    pub fn new(faces: impl IntoIterator<Item = u8>) -> Self {
        Self {
            faces: std::sync::Mutex::new(faces.into_iter().collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.faces.lock().map(|f| f.len()).unwrap_or(0)
    }
}

#[cfg(test)]
impl RandomPort for ScriptedRandom {
    fn die_face(&self) -> u8 {
        let mut faces = self.faces.lock().expect("scripted dice lock");
        faces.pop_front().expect("scripted dice exhausted")
    }

    fn gen_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}

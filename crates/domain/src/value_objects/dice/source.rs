//! Random source abstraction.
//!
//! The domain never owns an RNG. Callers inject faces through this trait,
//! which makes every roll reproducible under a scripted source.

/// Supplies d6 faces.
pub trait RandomSource {
    /// A face in `1..=6`. Out-of-range values are clamped by the roller.
    fn next_die_face(&mut self) -> u8;
}

impl<F> RandomSource for F
where
    F: FnMut() -> u8,
{
    fn next_die_face(&mut self) -> u8 {
        self()
    }
}

/// Deterministic source that hands out a fixed list of faces in order.
#[cfg(test)]
pub(crate) struct ScriptedDice {
    faces: Vec<u8>,
    cursor: usize,
}

#[cfg(test)]
impl ScriptedDice {
    pub(crate) fn new(faces: impl Into<Vec<u8>>) -> Self {
        Self {
            faces: faces.into(),
            cursor: 0,
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.faces.len() - self.cursor
    }
}

#[cfg(test)]
impl RandomSource for ScriptedDice {
    fn next_die_face(&mut self) -> u8 {
        assert!(
            self.cursor < self.faces.len(),
            "scripted dice exhausted after {} faces",
            self.faces.len()
        );
        let face = self.faces[self.cursor];
        self.cursor += 1;
        face
    }
}

use crate::field::ConcentrationField;

/// Two equally sized fields addressed by index plus the seed they started from.
///
/// One buffer is "current" and is what renderers read; the other is the target
/// of the next step. Committing a step flips the index, nothing is copied.
#[derive(Debug, Clone)]
pub struct DoubleBuffer {
    fields: [ConcentrationField; 2],
    current: usize,
    snapshot: ConcentrationField,
}

impl DoubleBuffer {
    pub fn new(seed: ConcentrationField) -> Self {
        Self {
            fields: [seed.clone(), seed.clone()],
            current: 0,
            snapshot: seed,
        }
    }

    pub fn current(&self) -> &ConcentrationField {
        &self.fields[self.current]
    }

    pub fn snapshot(&self) -> &ConcentrationField {
        &self.snapshot
    }

    /// Borrows the current buffer for reading and the other one for writing.
    pub fn split(&mut self) -> (&ConcentrationField, &mut ConcentrationField) {
        let (first, second) = self.fields.split_at_mut(1);
        if self.current == 0 {
            (&first[0], &mut second[0])
        } else {
            (&second[0], &mut first[0])
        }
    }

    /// Makes the buffer written since the last commit the current one.
    pub fn commit(&mut self) {
        self.current = 1 - self.current;
    }

    /// Copies the seed snapshot over the current buffer.
    pub fn reload(&mut self) {
        let current = self.current;
        self.fields[current].copy_from(&self.snapshot);
    }

    /// Replaces the snapshot and both buffers with a new seed, which may have new dims.
    pub fn reseed(&mut self, seed: ConcentrationField) {
        *self = Self::new(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Dims, Species};

    #[test]
    fn test_commit_flips_without_copying() {
        let mut buffers = DoubleBuffer::new(ConcentrationField::new(Dims::cube(2)));

        {
            let (current, next) = buffers.split();
            assert_eq!(1.0, current.get(Species::A, 0, 0, 0));
            next.set(Species::A, 0, 0, 0, 0.5);
        }
        assert_eq!(1.0, buffers.current().get(Species::A, 0, 0, 0));

        buffers.commit();
        assert_eq!(0.5, buffers.current().get(Species::A, 0, 0, 0));

        // the old current is now the write target
        let (current, next) = buffers.split();
        assert_eq!(0.5, current.get(Species::A, 0, 0, 0));
        assert_eq!(1.0, next.get(Species::A, 0, 0, 0));
    }

    #[test]
    fn test_reload_restores_snapshot() {
        let seed = ConcentrationField::filled(Dims::cube(3), 0.7, 0.3);
        let mut buffers = DoubleBuffer::new(seed.clone());

        buffers.split().1.set(Species::B, 1, 1, 1, 0.9);
        buffers.commit();
        assert_ne!(&seed, buffers.current());

        buffers.reload();
        assert_eq!(&seed, buffers.current());
        assert_eq!(&seed, buffers.snapshot());
    }
}

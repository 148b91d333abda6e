/// Sum over a fixed-length window of the most recently pushed values.
#[derive(Clone, Debug)]
pub struct RunningSum {
    history: Vec<u32>,
    pointer: usize,
}

impl RunningSum {
    /// Creates a new zeroed window of `length` values.
    ///
    /// # Panics
    /// If `length` is zero.
    #[must_use]
    pub fn new(length: usize) -> Self {
        assert!(length > 0, "running sum length must be non-zero");
        RunningSum {
            history: vec![0; length],
            pointer: 0,
        }
    }

    /// Replace the oldest value with `value`.
    pub fn push(&mut self, value: u32) {
        self.history[self.pointer] = value;
        self.pointer = (self.pointer + 1) % self.history.len();
    }

    #[must_use]
    pub fn sum(&self) -> u32 {
        self.history.iter().sum()
    }

    /// Zero all values, keeping the window length.
    pub fn clear(&mut self) {
        self.history.iter_mut().for_each(|v| *v = 0);
    }
}

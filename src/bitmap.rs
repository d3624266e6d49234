#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Bitmap(u32);

impl Bitmap {
    pub fn new() -> Self {
        Bitmap(0)
    }

    pub fn get(&self, i: u32) -> bool {
        self.0 & (1 << i) != 0
    }

    pub fn set(&self, i: u32) -> Self {
        Bitmap(self.0 | (1 << i))
    }

    pub fn unset(&self, i: u32) -> Self {
        Bitmap(self.0 & !(1 << i))
    }

    /// Number of set bits below `i`.
    pub fn rank(&self, i: u32) -> usize {
        (self.0 & ((1 << i) - 1)).count_ones() as usize
    }

    pub fn size(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn is_disjoint(&self, other: Self) -> bool {
        self.0 & other.0 == 0
    }
}

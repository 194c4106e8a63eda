/// Draw layer. Layers are recorded in declaration order; each maps to one pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DrawLayer {
    Opaque,
    AlphaTested,
    AlphaTestedSprites,
    /// Blended; always last.
    Transparent,
}

impl DrawLayer {
    /// Every layer in submission order.
    pub const ALL: [DrawLayer; 4] = [
        DrawLayer::Opaque,
        DrawLayer::AlphaTested,
        DrawLayer::AlphaTestedSprites,
        DrawLayer::Transparent,
    ];

    pub const COUNT: usize = Self::ALL.len();

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_fixed() {
        let idx: Vec<usize> = DrawLayer::ALL.iter().map(|l| l.index()).collect();
        assert_eq!(idx, vec![0, 1, 2, 3]);
        assert!(DrawLayer::Opaque < DrawLayer::Transparent);
        assert_eq!(DrawLayer::ALL.last(), Some(&DrawLayer::Transparent));
    }
}

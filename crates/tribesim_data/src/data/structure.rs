use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum StructureKind {
    Hut = 0,
    Farm = 1,
    Mine = 2,
    Workshop = 3,
    Wall = 4,
}

impl StructureKind {
    pub const ALL: [StructureKind; 5] = [
        StructureKind::Hut,
        StructureKind::Farm,
        StructureKind::Mine,
        StructureKind::Workshop,
        StructureKind::Wall,
    ];

    #[inline]
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

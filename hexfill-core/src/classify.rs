//! Ownership and influence classification
//!
//! Every valid cell gets exactly one [`Class`] describing who owns it, whose
//! border it sits on, and who could still capture it. Codes are only
//! meaningful for the board snapshot they were computed from.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::grid::Origins;
use crate::scratch::Scratch;

/// Number of classification codes
pub const NUM_CLASSES: usize = 11;

/// Classification code of one cell, from the perspective of `origins.mine`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Class {
    /// Not examined, or out of reach of both players
    Vacant = 0,
    /// On his border, and I could get it
    HisBorder = 1,
    /// On both borders
    SharedBorder = 2,
    /// He owns it
    His = 3,
    /// Not mine yet, but only I can ever own it
    Reachable = 4,
    /// Not his yet, but only he can ever own it
    HisReachable = 5,
    /// On my border, and he could get it
    Border = 6,
    /// I own it
    Mine = 7,
    /// Either of us can get it and it is on neither border
    Free = 8,
    /// On my border, and he can't get it
    InternalBorder = 9,
    /// On his border, and I can't get it
    HisInternalBorder = 10,
}

impl Class {
    pub const ALL: [Class; NUM_CLASSES] = [
        Class::Vacant,
        Class::HisBorder,
        Class::SharedBorder,
        Class::His,
        Class::Reachable,
        Class::HisReachable,
        Class::Border,
        Class::Mine,
        Class::Free,
        Class::InternalBorder,
        Class::HisInternalBorder,
    ];

    /// The same cell as the opponent would classify it
    pub const fn mirrored(self) -> Class {
        match self {
            Class::Vacant => Class::Vacant,
            Class::HisBorder => Class::Border,
            Class::SharedBorder => Class::SharedBorder,
            Class::His => Class::Mine,
            Class::Reachable => Class::HisReachable,
            Class::HisReachable => Class::Reachable,
            Class::Border => Class::HisBorder,
            Class::Mine => Class::His,
            Class::Free => Class::Free,
            Class::InternalBorder => Class::HisInternalBorder,
            Class::HisInternalBorder => Class::InternalBorder,
        }
    }
}

/// Set of classes, used to test aggregate properties of a cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ClassSet(u16);

/// Cells that will end up mine whatever happens
pub const MUST_BE_MINE: ClassSet =
    ClassSet::of(&[Class::Mine, Class::Reachable, Class::InternalBorder]);

/// Cells that will end up his whatever happens
pub const MUST_BE_HIS: ClassSet =
    ClassSet::of(&[Class::His, Class::HisReachable, Class::HisInternalBorder]);

/// Cells still contested
pub const MUST_BE_FREE: ClassSet = ClassSet::of(&[
    Class::Border,
    Class::SharedBorder,
    Class::HisBorder,
    Class::Free,
]);

/// Border cells I can take this turn
pub const MY_BORDER: ClassSet = ClassSet::of(&[Class::Border, Class::SharedBorder]);

impl ClassSet {
    pub const EMPTY: ClassSet = ClassSet(0);

    pub const fn of(classes: &[Class]) -> Self {
        let mut bits = 0u16;
        let mut i = 0;
        while i < classes.len() {
            bits |= 1 << classes[i] as u16;
            i += 1;
        }
        ClassSet(bits)
    }

    pub const fn contains(&self, class: Class) -> bool {
        self.0 & (1 << class as u16) != 0
    }

    pub const fn with(self, class: Class) -> Self {
        ClassSet(self.0 | (1 << class as u16))
    }
}

/// Which side a flood is running for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Me,
    Him,
}

impl Side {
    fn own(self) -> Class {
        match self {
            Side::Me => Class::Mine,
            Side::Him => Class::His,
        }
    }

    fn border(self) -> Class {
        match self {
            Side::Me => Class::Border,
            Side::Him => Class::HisBorder,
        }
    }

    fn other(self) -> Side {
        match self {
            Side::Me => Side::Him,
            Side::Him => Side::Me,
        }
    }
}

/// Classify every cell of `board` into `scratch`.
///
/// Panics if an origin is not a valid cell, the origins coincide, or the
/// scratch was sized for a different grid.
pub fn classify(board: &Board, origins: Origins, scratch: &mut Scratch) {
    let grid = board.grid();
    assert_eq!(scratch.len(), board.len(), "scratch does not match board");
    assert!(grid.valid(origins.mine), "origin {} is not a valid cell", origins.mine);
    assert!(grid.valid(origins.theirs), "origin {} is not a valid cell", origins.theirs);
    assert_ne!(origins.mine, origins.theirs, "players share an origin");

    scratch.reset();
    scratch.reset_reachable();

    allocate(board, origins.mine, scratch, Side::Me);
    allocate(board, origins.theirs, scratch, Side::Him);
    allocate_reachable(board, scratch, Side::Me);
    allocate_reachable(board, scratch, Side::Him);

    let Scratch {
        classes,
        reachable,
        his_reachable,
        ..
    } = scratch;

    for i in 0..classes.len() {
        let current = classes[i];
        classes[i] = match (reachable[i], his_reachable[i]) {
            (true, false) if current == Class::Border => Class::InternalBorder,
            (true, false) => Class::Reachable,
            (true, true) if current == Class::Vacant => Class::Free,
            (false, true) if current == Class::HisBorder => Class::HisInternalBorder,
            (false, true) => Class::HisReachable,
            _ => current,
        };
    }
}

/// Ownership flood from one origin.
///
/// The origin's connected color becomes `side.own()`. Any touched cell of
/// another color is a border cell, and the border spreads through that
/// cell's same-colored neighbours, since choosing its color takes them all.
/// A border cell already on the other side's border becomes shared.
fn allocate(board: &Board, origin: usize, scratch: &mut Scratch, side: Side) {
    let grid = board.grid();
    let own = side.own();
    let my_border = side.border();
    let his = side.other().own();
    let his_border = side.other().border();

    scratch.reset_listed();
    let Scratch {
        classes,
        listed,
        stack,
        ..
    } = scratch;

    let color = board.get(origin);
    classes[origin] = own;
    listed[origin] = true;
    for &q in grid.neighbors(origin) {
        listed[q] = true;
        stack.push(q);
    }

    while let Some(p) = stack.pop() {
        let current = classes[p];
        if current != Class::Vacant && current != his_border {
            continue;
        }

        let p_color = board.get(p);
        if p_color == color {
            classes[p] = own;
            for &q in grid.neighbors(p) {
                if !listed[q] {
                    listed[q] = true;
                    stack.push(q);
                }
            }
        } else if current == his_border {
            classes[p] = Class::SharedBorder;
        } else {
            classes[p] = my_border;
            for &q in grid.neighbors(p) {
                if !listed[q] && board.get(q) == p_color && classes[q] != his {
                    listed[q] = true;
                    stack.push(q);
                }
            }
        }
    }
}

/// Mark every cell one side's border could eventually spread into
fn allocate_reachable(board: &Board, scratch: &mut Scratch, side: Side) {
    let grid = board.grid();
    let my_border = side.border();

    scratch.reset_listed();
    let Scratch {
        classes,
        listed,
        stack,
        reachable,
        his_reachable,
        ..
    } = scratch;
    let reach = match side {
        Side::Me => reachable,
        Side::Him => his_reachable,
    };

    for (i, &c) in classes.iter().enumerate() {
        if c == my_border || c == Class::SharedBorder {
            listed[i] = true;
            stack.push(i);
        }
    }

    while let Some(p) = stack.pop() {
        match classes[p] {
            Class::Vacant | Class::Border | Class::SharedBorder | Class::HisBorder => {
                reach[p] = true;
                for &q in grid.neighbors(p) {
                    if !listed[q] {
                        listed[q] = true;
                        stack.push(q);
                    }
                }
            }
            _ => {}
        }
    }
}

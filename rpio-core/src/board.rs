// This file is part of rpio.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

//! Header-position <-> BCM line translation for P1, revisions 1 and 2.
//!
//! The tables below are the board-to-BCM pin tables straight out of RPIO's
//! `c_gpio`/`py_gpio` sources: index is the P1 header position (1-based,
//! index 0 unused), value is the BCM line number or -1 for "not present on
//! P1". Board position 13 differs between revisions (GPIO 21 vs. GPIO 27);
//! everything else is identical.

use crate::error::{Error, Result};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BoardRevision {
    Rev1,
    Rev2,
}

const PIN_TO_GPIO_REV1: [i8; 27] = [
    -1, -1, -1, 0, -1, 1, -1, 4, 14, -1, 15, 17, 18, 21, -1, 22, 23, -1, 24, 10, -1, 9, 25, 11, 8,
    -1, 7,
];

const PIN_TO_GPIO_REV2: [i8; 27] = [
    -1, -1, -1, 2, -1, 3, -1, 4, 14, -1, 15, 17, 18, 27, -1, 22, 23, -1, 24, 10, -1, 9, 25, 11, 8,
    -1, 7,
];

impl BoardRevision {
    /// Parses `/proc/cpuinfo`'s `Revision` field the way RPIO's
    /// `cpuinfo.c` does: `0002`/`0003` (and their `1000xxxx` over-voltage
    /// variants) are revision 1; anything else observed on a BCM2708 board
    /// is revision 2.
    pub fn detect(cpuinfo: &str) -> Result<BoardRevision> {
        let revision_hex = cpuinfo
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(key, _)| key.trim() == "Revision")
            .map(|(_, value)| value.trim().to_string())
            .ok_or_else(|| Error::InvalidArg {
                what: "cpuinfo",
                value: "no Revision field found".to_string(),
            })?;
        Ok(match revision_hex.as_str() {
            "0002" | "1000002" | "0003" | "1000003" => BoardRevision::Rev1,
            _ => BoardRevision::Rev2,
        })
    }

    fn table(self) -> &'static [i8; 27] {
        match self {
            BoardRevision::Rev1 => &PIN_TO_GPIO_REV1,
            BoardRevision::Rev2 => &PIN_TO_GPIO_REV2,
        }
    }

    /// Translates a P1 header position to a BCM line. Fails `InvalidArg` if
    /// the position is out of range or unpopulated on P1.
    pub fn board_to_bcm(self, position: u32) -> Result<u32> {
        let table = self.table();
        let gpio = usize::try_from(position)
            .ok()
            .and_then(|p| table.get(p))
            .copied()
            .unwrap_or(-1);
        if gpio < 0 {
            return Err(Error::InvalidArg {
                what: "board pin",
                value: position.to_string(),
            });
        }
        Ok(gpio as u32)
    }

    /// Reverse of `board_to_bcm`: the first P1 header position wired to
    /// `bcm`, if any.
    pub fn bcm_to_board(self, bcm: u32) -> Result<u32> {
        self.table()
            .iter()
            .position(|&g| g >= 0 && g as u32 == bcm)
            .map(|p| p as u32)
            .ok_or(Error::InvalidArg {
                what: "bcm line",
                value: bcm.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rev2_board_pin_11_is_bcm_17() {
        assert_eq!(BoardRevision::Rev2.board_to_bcm(11).unwrap(), 17);
    }

    #[test]
    fn rev1_board_pin_13_is_bcm_21() {
        assert_eq!(BoardRevision::Rev1.board_to_bcm(13).unwrap(), 21);
    }

    #[test]
    fn rev2_board_pin_13_is_bcm_27() {
        assert_eq!(BoardRevision::Rev2.board_to_bcm(13).unwrap(), 27);
    }

    #[test]
    fn unpopulated_position_is_invalid() {
        assert!(BoardRevision::Rev2.board_to_bcm(1).is_err());
        assert!(BoardRevision::Rev2.board_to_bcm(27).is_err());
    }

    #[test]
    fn round_trip_every_populated_p1_position() {
        for rev in [BoardRevision::Rev1, BoardRevision::Rev2] {
            for position in 1..=26u32 {
                if let Ok(bcm) = rev.board_to_bcm(position) {
                    assert_eq!(rev.bcm_to_board(bcm).unwrap(), position);
                }
            }
        }
    }

    #[test]
    fn detect_rev1_from_cpuinfo() {
        let cpuinfo = "Hardware\t: BCM2708\nRevision\t: 0003\n";
        assert_eq!(BoardRevision::detect(cpuinfo).unwrap(), BoardRevision::Rev1);
    }

    #[test]
    fn detect_rev2_from_cpuinfo() {
        let cpuinfo = "Hardware\t: BCM2708\nRevision\t: 000e\n";
        assert_eq!(BoardRevision::detect(cpuinfo).unwrap(), BoardRevision::Rev2);
    }
}

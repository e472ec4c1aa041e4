//! Parsing of tower orders supplied on the command line.

use std::{error::Error, fmt, str::FromStr};

use path_defence_core::{CellCoord, TowerKind, UnknownArchetype};

/// Delimiter separating the archetype from the cell in a placement order.
const KIND_DELIMITER: char = '@';
/// Delimiter separating the column from the row.
const CELL_DELIMITER: char = ',';

/// Request to build a tower, written as `kind@column,row`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TowerOrder {
    /// Archetype to build.
    pub(crate) kind: TowerKind,
    /// Cell to build on.
    pub(crate) cell: CellCoord,
}

impl FromStr for TowerOrder {
    type Err = OrderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(OrderError::Empty);
        }

        let (kind, cell) = trimmed
            .split_once(KIND_DELIMITER)
            .ok_or_else(|| OrderError::MissingCell(trimmed.to_owned()))?;
        let kind = kind.parse::<TowerKind>().map_err(OrderError::UnknownKind)?;
        let cell = parse_cell(cell)?;

        Ok(Self { kind, cell })
    }
}

/// Cell written as `column,row`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CellArg(pub(crate) CellCoord);

impl FromStr for CellArg {
    type Err = OrderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_cell(value).map(Self)
    }
}

/// Errors that can occur while parsing tower orders.
#[derive(Debug)]
pub(crate) enum OrderError {
    /// The order was empty or contained only whitespace.
    Empty,
    /// The order did not name a cell after the archetype.
    MissingCell(String),
    /// The archetype is not a known tower.
    UnknownKind(UnknownArchetype),
    /// The cell could not be parsed.
    InvalidCell(String),
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "tower order was empty"),
            Self::MissingCell(order) => {
                write!(f, "tower order '{order}' is missing '@column,row'")
            }
            Self::UnknownKind(error) => write!(f, "{error}"),
            Self::InvalidCell(cell) => write!(f, "could not parse cell '{cell}'"),
        }
    }
}

impl Error for OrderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnknownKind(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_cell(cell: &str) -> Result<CellCoord, OrderError> {
    let invalid = || OrderError::InvalidCell(cell.trim().to_owned());
    let (column, row) = cell.split_once(CELL_DELIMITER).ok_or_else(invalid)?;

    let column = column.trim().parse::<u32>().map_err(|_| invalid())?;
    let row = row.trim().parse::<u32>().map_err(|_| invalid())?;

    Ok(CellCoord::new(column, row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_order_parses_kind_and_cell() {
        let order: TowerOrder = "sniper@4,11".parse().expect("order parses");
        assert_eq!(
            order,
            TowerOrder {
                kind: TowerKind::Sniper,
                cell: CellCoord::new(4, 11),
            }
        );
    }

    #[test]
    fn whitespace_and_case_are_tolerated() {
        let order: TowerOrder = " Splash@ 0 , 2 ".parse().expect("order parses");
        assert_eq!(order.kind, TowerKind::Splash);
        assert_eq!(order.cell, CellCoord::new(0, 2));
    }

    #[test]
    fn malformed_orders_are_rejected() {
        assert!(matches!("".parse::<TowerOrder>(), Err(OrderError::Empty)));
        assert!(matches!(
            "basic".parse::<TowerOrder>(),
            Err(OrderError::MissingCell(_))
        ));
        assert!(matches!(
            "cannon@1,1".parse::<TowerOrder>(),
            Err(OrderError::UnknownKind(_))
        ));
        assert!(matches!(
            "basic@1;1".parse::<TowerOrder>(),
            Err(OrderError::InvalidCell(_))
        ));
        assert!(matches!(
            "3,-1".parse::<CellArg>(),
            Err(OrderError::InvalidCell(_))
        ));
    }

    #[test]
    fn error_messages_name_the_offending_input() {
        let error = "basic@x,1".parse::<TowerOrder>().expect_err("invalid cell");
        assert_eq!(error.to_string(), "could not parse cell 'x,1'");
    }
}

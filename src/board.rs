// Board graph and per-tick board state
//
// The grid is an arena of cells addressed by index (x + y * width). Adjacency
// is computed once in BoardGraph; BoardState holds the occupancy that is
// rebuilt from every map update.

use crate::error::EngineError;
use crate::types::{Direction, Map};

/// What occupies a cell this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Empty,
    Food,
    Obstacle,
    Head,
    Body,
    Tail,
}

/// Occupancy of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub kind: CellKind,
    /// Part of our own snake
    pub own: bool,
    /// Sensed but never traversed through
    pub terminal: bool,
}

impl Cell {
    const EMPTY: Cell = Cell {
        kind: CellKind::Empty,
        own: false,
        terminal: false,
    };

    fn clear(&mut self) {
        *self = Cell::EMPTY;
    }

    // Food only changes the category, it never lifts a terminal flag.
    fn set_food(&mut self) {
        self.kind = CellKind::Food;
    }

    fn set_obstacle(&mut self) {
        self.kind = CellKind::Obstacle;
        self.terminal = true;
    }

    fn set_snake(&mut self, kind: CellKind, own: bool) {
        self.kind = kind;
        self.own = own;
        self.terminal = true;
    }
}

/// Static four-way adjacency over a fixed-size grid
#[derive(Debug, Clone)]
pub struct BoardGraph {
    width: usize,
    height: usize,
    edges: Vec<[Option<usize>; 4]>,
}

impl BoardGraph {
    /// Links every cell to its in-bounds neighbours, indexed by Direction::index
    pub fn new(width: usize, height: usize) -> Self {
        let mut edges = vec![[None; 4]; width * height];

        for y in 0..height {
            for x in 0..width {
                let links = &mut edges[x + y * width];
                if y > 0 {
                    links[Direction::Up.index()] = Some(x + (y - 1) * width);
                }
                if y + 1 < height {
                    links[Direction::Down.index()] = Some(x + (y + 1) * width);
                }
                if x > 0 {
                    links[Direction::Left.index()] = Some(x - 1 + y * width);
                }
                if x + 1 < width {
                    links[Direction::Right.index()] = Some(x + 1 + y * width);
                }
            }
        }

        BoardGraph {
            width,
            height,
            edges,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells on the board
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn index_of(&self, x: usize, y: usize) -> usize {
        x + y * self.width
    }

    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    pub fn neighbor(&self, index: usize, dir: Direction) -> Option<usize> {
        self.edges[index][dir.index()]
    }

    pub fn neighbors(&self, index: usize) -> &[Option<usize>; 4] {
        &self.edges[index]
    }
}

/// Occupancy of every cell for the current tick plus our head position
#[derive(Debug, Clone)]
pub struct BoardState {
    cells: Vec<Cell>,
    own_head: Option<usize>,
}

impl BoardState {
    pub fn new(graph: &BoardGraph) -> Self {
        BoardState {
            cells: vec![Cell::EMPTY; graph.len()],
            own_head: None,
        }
    }

    /// Rebuilds the occupancy from a map update
    ///
    /// The snapshot is validated before anything is marked: positions must lie
    /// on the board and exactly one live snake must carry `own_id`. On error the
    /// board is left cleared with no head.
    pub fn refresh(&mut self, graph: &BoardGraph, map: &Map, own_id: &str) -> Result<(), EngineError> {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.own_head = None;

        Self::validate(graph, map, own_id)?;

        for snake in map.snake_infos.iter().filter(|s| !s.positions.is_empty()) {
            let own = snake.id == own_id;

            for &position in &snake.positions {
                self.cells[position].set_snake(CellKind::Body, own);
            }

            let head = snake.positions[0];
            let tail = snake.positions[snake.positions.len() - 1];
            self.cells[head].set_snake(CellKind::Head, own);
            self.cells[tail].set_snake(CellKind::Tail, own);

            if own {
                self.own_head = Some(head);
            }
        }

        for &position in &map.obstacle_positions {
            self.cells[position].set_obstacle();
        }

        for &position in &map.food_positions {
            self.cells[position].set_food();
        }

        Ok(())
    }

    fn validate(graph: &BoardGraph, map: &Map, own_id: &str) -> Result<(), EngineError> {
        if let (Some(width), Some(height)) = (map.width, map.height) {
            if width != graph.width() || height != graph.height() {
                return Err(EngineError::DimensionMismatch {
                    expected_width: graph.width(),
                    expected_height: graph.height(),
                    width,
                    height,
                });
            }
        }

        let cells = graph.len();
        let all_positions = map
            .snake_infos
            .iter()
            .flat_map(|s| s.positions.iter())
            .chain(map.obstacle_positions.iter())
            .chain(map.food_positions.iter());
        for &position in all_positions {
            if position >= cells {
                return Err(EngineError::PositionOutOfBounds { position, cells });
            }
        }

        let matches = map
            .snake_infos
            .iter()
            .filter(|s| s.id == own_id && !s.positions.is_empty())
            .count();
        if matches != 1 {
            return Err(EngineError::MissingOwnHead {
                player_id: own_id.to_string(),
                matches,
            });
        }

        Ok(())
    }

    pub fn cell(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    /// Our head cell, available only after a successful refresh
    pub fn own_head(&self) -> Option<usize> {
        self.own_head
    }
}

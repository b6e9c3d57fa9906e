//! Core types for the layout engine

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use super::error::LayoutError;

/// A 2D point in the coordinate system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A bounding box representing the spatial extent of a region.
///
/// The origin is the top-left corner and y grows downward. Depending on
/// context the units are canvas fractions or inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a bounding box from its edge coordinates
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Create a zero-sized bounding box at the origin
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// The unit box, i.e. the whole canvas in fractional coordinates
    pub fn unit() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point of the bounding box
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Start and end of the box along one axis
    pub fn interval(&self, axis: Axis) -> (f64, f64) {
        match axis {
            Axis::X => (self.x, self.right()),
            Axis::Y => (self.y, self.bottom()),
        }
    }

    /// Check if this bounding box contains a point
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Compute the union of two bounding boxes (smallest box containing both)
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(x, y, right - x, bottom - y)
    }

    /// Scale both axes, e.g. to convert canvas fractions into inches
    pub fn scaled(&self, sx: f64, sy: f64) -> BoundingBox {
        BoundingBox::new(self.x * sx, self.y * sy, self.width * sx, self.height * sy)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::zero()
    }
}

/// Physical size of a drawing surface in inches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Extent along one axis
    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }
}

/// An axis direction of a plot region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub const BOTH: [Axis; 2] = [Axis::X, Axis::Y];

    /// Index into per-axis arrays
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// A side of a plot region or of the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// Panel creation order: left, right, top, bottom
    pub const ALL: [Side; 4] = [Side::Left, Side::Right, Side::Top, Side::Bottom];

    /// The axis a panel on this side runs along.
    ///
    /// Bottom and top panels span the parent's x extent; left and right
    /// panels span its y extent.
    pub fn axis_along(self) -> Axis {
        match self {
            Side::Left | Side::Right => Axis::Y,
            Side::Top | Side::Bottom => Axis::X,
        }
    }

    /// The axis across which a panel on this side has its thickness
    pub fn axis_across(self) -> Axis {
        self.axis_along().other()
    }

    /// True for the side closer to the coordinate origin (left, top)
    pub fn is_leading(self) -> bool {
        matches!(self, Side::Left | Side::Top)
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
            Side::Top => "top",
            Side::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Side {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "left" => Ok(Side::Left),
            "r" | "right" => Ok(Side::Right),
            "t" | "top" => Ok(Side::Top),
            "b" | "bottom" => Ok(Side::Bottom),
            other => Err(LayoutError::unknown_side(other)),
        }
    }
}

/// Parse a compact side string such as `"lrb"` into distinct sides
pub fn parse_sides(tokens: &str) -> Result<Vec<Side>, LayoutError> {
    let mut sides = Vec::new();
    for ch in tokens.chars().filter(|c| !c.is_whitespace()) {
        let side: Side = ch.to_string().parse()?;
        if sides.contains(&side) {
            return Err(LayoutError::configuration(format!(
                "side '{}' requested twice in \"{}\"",
                side, tokens
            )));
        }
        sides.push(side);
    }
    Ok(sides)
}

/// Outer whitespace around a rectangle, in inches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Margins {
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn zero() -> Self {
        Self::uniform(0.0)
    }

    pub fn get(&self, side: Side) -> f64 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
            Side::Top => self.top,
            Side::Bottom => self.bottom,
        }
    }

    pub fn set(&mut self, side: Side, value: f64) {
        match side {
            Side::Left => self.left = value,
            Side::Right => self.right = value,
            Side::Top => self.top = value,
            Side::Bottom => self.bottom = value,
        }
    }

    /// Leading and trailing margins along one axis
    pub fn along(&self, axis: Axis) -> (f64, f64) {
        match axis {
            Axis::X => (self.left, self.right),
            Axis::Y => (self.top, self.bottom),
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::zero()
    }
}

/// Identifier of a grid inside a figure's grid arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridId(pub usize);

/// Identifier of an axes node inside a figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AxesId(pub usize);

impl fmt::Display for AxesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "axes#{}", self.0)
    }
}

/// A (row-range, col-range) region of a grid
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellSpan {
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl CellSpan {
    pub fn new(rows: Range<usize>, cols: Range<usize>) -> Self {
        Self { rows, cols }
    }

    /// A single-cell span
    pub fn at(row: usize, col: usize) -> Self {
        Self::new(row..row + 1, col..col + 1)
    }

    /// The range along one axis (columns for x, rows for y)
    pub fn range(&self, axis: Axis) -> &Range<usize> {
        match axis {
            Axis::X => &self.cols,
            Axis::Y => &self.rows,
        }
    }
}

/// An addressable cell: a span inside a specific grid
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub grid: GridId,
    pub span: CellSpan,
}

impl CellRef {
    pub fn new(grid: GridId, span: CellSpan) -> Self {
        Self { grid, span }
    }
}

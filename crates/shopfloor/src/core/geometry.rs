//! Integer geometry for elements placed on a drawing surface
//!
//! All model coordinates are integers; zoom only enters when a bounding
//! rectangle is requested for display. A negative size extent mirrors the
//! shape along that axis, so the bounding rectangle always normalizes to
//! non-negative width and height.

use std::cell::Cell;

/// A point in model coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The extent of an element's bounding box
///
/// Either component may be negative, which mirrors the shape along that
/// axis without moving its anchor corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle with non-negative intent
///
/// `contains_point` treats the left and top edges as inside and the right
/// and bottom edges as outside; a rectangle with a non-positive extent
/// contains nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns true if the point lies inside the rectangle
    pub fn contains_point(&self, point: Point) -> bool {
        if self.width <= 0 || self.height <= 0 {
            return false;
        }
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }

    /// Returns true if `other` lies entirely inside this rectangle
    pub fn contains_rect(&self, other: &Rect) -> bool {
        if self.width <= 0 || self.height <= 0 || other.width < 0 || other.height < 0 {
            return false;
        }
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.height <= self.y + self.height
    }
}

/// Rounds half up, also for negative inputs
fn round(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Memoized result of the last bounding-rectangle computation
#[derive(Debug, Clone, Copy)]
struct RectCache {
    position: Point,
    size: Size,
    zoom: f64,
    rect: Rect,
}

/// Placement of an element on the surface
///
/// Holds the top-left position, the (possibly mirrored) extent, the
/// horizontal flip flag and the statistics toggle. The zoomed bounding
/// rectangle is memoized per (position, size, zoom) since hit testing
/// asks for it far more often than anything changes it.
#[derive(Debug, Clone)]
pub struct Geometry {
    position: Point,
    size: Size,
    pub flipped: bool,
    pub statistics_active: bool,
    rect_cache: Cell<Option<RectCache>>,
}

impl Geometry {
    pub fn new(size: Size) -> Self {
        Self {
            position: Point::default(),
            size,
            flipped: false,
            statistics_active: true,
            rect_cache: Cell::new(None),
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// The element's bounding rectangle at the given zoom factor
    ///
    /// A negative extent is folded into the origin so the result always
    /// has non-negative width and height.
    pub fn rect(&self, zoom: f64) -> Rect {
        if let Some(cache) = self.rect_cache.get() {
            if cache.position == self.position && cache.size == self.size && cache.zoom == zoom {
                return cache.rect;
            }
        }
        let rect = Rect::new(
            round(f64::from(self.position.x + self.size.width.min(0)) * zoom),
            round(f64::from(self.position.y + self.size.height.min(0)) * zoom),
            round(f64::from(self.size.width.abs()) * zoom),
            round(f64::from(self.size.height.abs()) * zoom),
        );
        self.rect_cache.set(Some(RectCache {
            position: self.position,
            size: self.size,
            zoom,
            rect,
        }));
        rect
    }

    /// Returns true if the point (in screen coordinates) hits the element
    pub fn contains_point(&self, point: Point, zoom: f64) -> bool {
        self.rect(zoom).contains_point(point)
    }

    /// The center of the element in model coordinates
    pub fn middle(&self) -> Point {
        Point::new(
            self.position.x + self.size.width / 2,
            self.position.y + self.size.height / 2,
        )
    }

    /// The bottom-right corner in model coordinates
    pub fn lower_right(&self) -> Point {
        Point::new(
            self.position.x + self.size.width,
            self.position.y + self.size.height,
        )
    }

    /// Position of one of the four corner handles
    ///
    /// Index order is top-left, top-right, bottom-right, bottom-left.
    pub fn handle(&self, index: usize) -> Option<Point> {
        let p = self.position;
        let s = self.size;
        match index {
            0 => Some(p),
            1 => Some(Point::new(p.x + s.width, p.y)),
            2 => Some(Point::new(p.x + s.width, p.y + s.height)),
            3 => Some(Point::new(p.x, p.y + s.height)),
            _ => None,
        }
    }

    /// Moves one corner handle, keeping the opposite corner fixed
    ///
    /// Dragging a handle past the opposite corner flips the sign of the
    /// affected size component rather than clamping.
    pub fn set_handle(&mut self, index: usize, point: Point) {
        let p1 = self.position;
        let p2 = self.lower_right();
        match index {
            0 => {
                self.position = point;
                self.size = Size::new(p2.x - point.x, p2.y - point.y);
            }
            1 => {
                self.position = Point::new(p1.x, point.y);
                self.size = Size::new(point.x - p1.x, p2.y - point.y);
            }
            2 => {
                self.size = Size::new(point.x - p1.x, point.y - p1.y);
            }
            3 => {
                self.position = Point::new(point.x, p1.y);
                self.size = Size::new(p2.x - point.x, point.y - p1.y);
            }
            _ => {}
        }
    }

    /// Anchor point where an edge towards `point` should attach
    ///
    /// Picks the midpoint of the side facing the target, offset one pixel
    /// outward so the edge does not overdraw the border. When the target
    /// sits exactly on a diagonal, the vertical anchor wins.
    pub fn connection_to(&self, point: Point) -> Point {
        let x_start = self.position.x - 1;
        let y_start = self.position.y - 1;
        let x_middle = self.position.x + self.size.width / 2;
        let y_middle = self.position.y + self.size.height / 2;
        let x_end = self.position.x + self.size.width + 1;
        let y_end = self.position.y + self.size.height + 1;

        if y_middle > point.y {
            // target lies above the element
            if point.x - x_middle < point.y - y_middle {
                return Point::new(x_start, y_middle);
            }
            if point.x - x_middle > y_middle - point.y {
                return Point::new(x_end, y_middle);
            }
            Point::new(x_middle, y_start)
        } else {
            // target lies below (or level with) the element
            if point.x - x_middle > point.y - y_middle {
                return Point::new(x_end, y_middle);
            }
            if point.x - x_middle < y_middle - point.y {
                return Point::new(x_start, y_middle);
            }
            Point::new(x_middle, y_end)
        }
    }

    /// Returns true if the element lies entirely inside the area
    ///
    /// Partial overlap does not count; area selection only picks up
    /// fully enclosed elements.
    pub fn contained_in(&self, area: &Rect) -> bool {
        area.contains_rect(&Rect::new(
            self.position.x,
            self.position.y,
            self.size.width,
            self.size.height,
        ))
    }
}

impl PartialEq for Geometry {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
            && self.size == other.size
            && self.flipped == other.flipped
            && self.statistics_active == other.statistics_active
    }
}

impl Eq for Geometry {}

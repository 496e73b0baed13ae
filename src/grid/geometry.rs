use serde::{Deserialize, Serialize};

/// Smallest extent a resize gesture may shrink an item to, in pixels.
pub const MIN_RESIZE_EXTENT: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset_from(self, origin: Point) -> Point {
        Point {
            x: self.x - origin.x,
            y: self.y - origin.y,
        }
    }

    pub fn translate(self, delta: Point) -> Point {
        Point {
            x: self.x + delta.x,
            y: self.y + delta.y,
        }
    }
}

impl From<(f32, f32)> for Point {
    fn from(value: (f32, f32)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Which edge of an item a resize gesture drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeAxis {
    Width,
    Height,
    Both,
}

impl ResizeAxis {
    pub fn affects_width(self) -> bool {
        matches!(self, ResizeAxis::Width | ResizeAxis::Both)
    }

    pub fn affects_height(self) -> bool {
        matches!(self, ResizeAxis::Height | ResizeAxis::Both)
    }

    pub fn cursor(self) -> CursorHint {
        match self {
            ResizeAxis::Both => CursorHint::NwseResize,
            ResizeAxis::Width => CursorHint::EwResize,
            ResizeAxis::Height => CursorHint::NsResize,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Auto,
    EwResize,
    NsResize,
    NwseResize,
}

impl CursorHint {
    pub fn from_axis(axis: Option<ResizeAxis>) -> Self {
        axis.map(ResizeAxis::cursor).unwrap_or(CursorHint::Auto)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CursorHint::Auto => "auto",
            CursorHint::EwResize => "ew-resize",
            CursorHint::NsResize => "ns-resize",
            CursorHint::NwseResize => "nwse-resize",
        }
    }
}

/// Resize hit-zone test for a pointer at `offset` inside a box of `size`.
///
/// The zones are the `border_size` wide strips along the right and bottom
/// edges; both bounds are exclusive. Returns `None` when `resizable` is off.
pub fn can_resize(
    offset: Point,
    size: Size,
    border_size: f32,
    resizable: bool,
) -> Option<ResizeAxis> {
    if !resizable {
        return None;
    }
    let in_right = offset.x < size.width && offset.x > size.width - border_size;
    let in_bottom = offset.y < size.height && offset.y > size.height - border_size;
    match (in_right, in_bottom) {
        (true, true) => Some(ResizeAxis::Both),
        (true, false) => Some(ResizeAxis::Width),
        (false, true) => Some(ResizeAxis::Height),
        (false, false) => None,
    }
}

/// Candidate box size for a resize that started at `origin` and has since
/// moved the pointer by `delta`.
///
/// The axes are cross-coupled: the width grows from the starting height and
/// the height from the starting width. Each is floored at
/// [`MIN_RESIZE_EXTENT`].
pub fn resize_candidate(origin: Size, delta: Point) -> Size {
    Size {
        width: (origin.height + delta.x).max(MIN_RESIZE_EXTENT),
        height: (origin.width + delta.y).max(MIN_RESIZE_EXTENT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOX: Size = Size {
        width: 400.0,
        height: 100.0,
    };

    #[test]
    fn non_resizable_never_reports_a_zone() {
        for offset in [(399.0, 99.0), (395.0, 50.0), (200.0, 95.0), (10.0, 10.0)] {
            assert_eq!(can_resize(offset.into(), BOX, 10.0, false), None);
        }
    }

    #[test]
    fn corner_reports_both() {
        assert_eq!(
            can_resize(Point::new(395.0, 95.0), BOX, 10.0, true),
            Some(ResizeAxis::Both)
        );
    }

    #[test]
    fn right_strip_reports_width() {
        assert_eq!(
            can_resize(Point::new(395.0, 40.0), BOX, 10.0, true),
            Some(ResizeAxis::Width)
        );
    }

    #[test]
    fn bottom_strip_reports_height() {
        assert_eq!(
            can_resize(Point::new(200.0, 95.0), BOX, 10.0, true),
            Some(ResizeAxis::Height)
        );
    }

    #[test]
    fn interior_and_bounds_report_none() {
        assert_eq!(can_resize(Point::new(200.0, 40.0), BOX, 10.0, true), None);
        // Both bounds of a strip are exclusive.
        assert_eq!(can_resize(Point::new(390.0, 40.0), BOX, 10.0, true), None);
        assert_eq!(can_resize(Point::new(400.0, 40.0), BOX, 10.0, true), None);
        assert_eq!(can_resize(Point::new(200.0, 100.0), BOX, 10.0, true), None);
    }

    #[test]
    fn candidate_is_cross_coupled_and_floored() {
        let origin = Size::new(400.0, 100.0);
        let grown = resize_candidate(origin, Point::new(50.0, 20.0));
        assert_eq!(grown.width, 150.0);
        assert_eq!(grown.height, 420.0);

        let shrunk = resize_candidate(origin, Point::new(-80.0, -390.0));
        assert_eq!(shrunk.width, MIN_RESIZE_EXTENT);
        assert_eq!(shrunk.height, MIN_RESIZE_EXTENT);
    }

    #[test]
    fn cursor_follows_axis() {
        assert_eq!(CursorHint::from_axis(None).as_str(), "auto");
        assert_eq!(
            CursorHint::from_axis(Some(ResizeAxis::Both)).as_str(),
            "nwse-resize"
        );
        assert_eq!(ResizeAxis::Width.cursor(), CursorHint::EwResize);
        assert_eq!(ResizeAxis::Height.cursor(), CursorHint::NsResize);
    }
}

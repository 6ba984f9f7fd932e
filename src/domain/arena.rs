use super::point::{Axis, Point};

/// Rectangular play field. Fixed for the lifetime of the server.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
    /// Distance from a horizontal bound within which an X-axis bounce scores a corner hit.
    pub corner_tolerance: f64,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            corner_tolerance: 10.0,
        }
    }
}

impl Arena {
    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }

    /// Allowed center range on `axis` for a body with the given half extents.
    ///
    /// A body wider than the arena collapses the range onto the center line.
    pub fn center_range(&self, axis: Axis, half: Point) -> (f64, f64) {
        let extent = self.extent(axis);
        let h = half.get(axis);
        let (min, max) = (h, extent - h);
        if min <= max {
            (min, max)
        } else {
            (extent / 2.0, extent / 2.0)
        }
    }

    pub fn contains(&self, center: Point, half: Point) -> bool {
        Axis::BOTH.iter().all(|&axis| {
            let (min, max) = self.center_range(axis, half);
            let v = center.get(axis);
            v >= min && v <= max
        })
    }
}

//! Pitch geometry.
//!
//! The pitch is `100 x 64` units. The home side defends `x = 0` and attacks
//! towards `x = 100`; the away side does the opposite. Team templates are
//! written as "depth from own goal" and mirrored through [`depth_to_x`].

use matchday_types::Side;

/// Goal line to goal line.
pub const PITCH_LENGTH: f64 = 100.0;

/// Touchline to touchline.
pub const PITCH_WIDTH: f64 = 64.0;

/// `y` of the centre line through both goals.
pub const CENTRE_Y: f64 = PITCH_WIDTH / 2.0;

/// Depth of each penalty area from its goal line.
pub const PENALTY_AREA_DEPTH: f64 = 16.0;

/// Half the width of each penalty area.
pub const PENALTY_AREA_HALF_WIDTH: f64 = 20.0;

/// Distance of the penalty spot from the goal line.
pub const PENALTY_SPOT_DEPTH: f64 = 11.0;

/// Depth of the goal-kick spot from the goal line.
pub const GOAL_KICK_DEPTH: f64 = 6.0;

/// A point on the pitch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Along the length.
    pub x: f64,
    /// Across the width.
    pub y: f64,
}

impl Point {
    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Centre spot.
    pub const fn centre() -> Self {
        Self::new(PITCH_LENGTH / 2.0, CENTRE_Y)
    }

    /// Euclidean distance.
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Direction from `self` to `other` in radians.
    pub fn angle_to(self, other: Self) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// The same point pulled inside the pitch.
    pub const fn clamped(self) -> Self {
        Self::new(
            self.x.clamp(0.0, PITCH_LENGTH),
            self.y.clamp(0.0, PITCH_WIDTH),
        )
    }

    /// Whether the point lies on or inside the boundary lines.
    pub const fn in_bounds(self) -> bool {
        self.x >= 0.0 && self.x <= PITCH_LENGTH && self.y >= 0.0 && self.y <= PITCH_WIDTH
    }
}

/// `x` of the goal a side defends.
pub const fn own_goal_x(side: Side) -> f64 {
    match side {
        Side::Home => 0.0,
        Side::Away => PITCH_LENGTH,
    }
}

/// `x` of the goal a side attacks.
pub const fn attacking_goal_x(side: Side) -> f64 {
    own_goal_x(side.opponent())
}

/// Convert a depth measured from a side's own goal line into `x`.
pub const fn depth_to_x(side: Side, depth: f64) -> f64 {
    match side {
        Side::Home => depth,
        Side::Away => PITCH_LENGTH - depth,
    }
}

/// Mirror a template `y` so both teams keep their left flank on their left.
pub const fn side_y(side: Side, y: f64) -> f64 {
    match side {
        Side::Home => y,
        Side::Away => PITCH_WIDTH - y,
    }
}

/// How far up the pitch `x` is from a side's own goal line.
pub const fn depth_of(side: Side, x: f64) -> f64 {
    match side {
        Side::Home => x,
        Side::Away => PITCH_LENGTH - x,
    }
}

/// Whether `x` lies in the final third for an attacking side.
pub const fn in_attacking_third(side: Side, x: f64) -> bool {
    depth_of(side, x) >= PITCH_LENGTH * 2.0 / 3.0
}

/// Whether `x` lies in a side's own half.
pub const fn in_own_half(side: Side, x: f64) -> bool {
    depth_of(side, x) <= PITCH_LENGTH / 2.0
}

/// Whether a point lies in the penalty area a side defends.
pub const fn in_penalty_area(defending: Side, point: Point) -> bool {
    depth_of(defending, point.x) <= PENALTY_AREA_DEPTH
        && (point.y - CENTRE_Y).abs() <= PENALTY_AREA_HALF_WIDTH
}

/// Centre of the goal a side attacks.
pub const fn goal_mouth(attacking: Side) -> Point {
    Point::new(attacking_goal_x(attacking), CENTRE_Y)
}

/// Penalty spot a side shoots from.
pub const fn penalty_spot(attacking: Side) -> Point {
    Point::new(
        depth_to_x(attacking, PITCH_LENGTH - PENALTY_SPOT_DEPTH),
        CENTRE_Y,
    )
}

/// Corner flag at the attacking end nearest to `y`.
pub const fn corner_flag(attacking: Side, y: f64) -> Point {
    let flag_y = if y < CENTRE_Y { 0.0 } else { PITCH_WIDTH };
    Point::new(attacking_goal_x(attacking), flag_y)
}

/// Spot a defending side takes its goal kicks from.
pub const fn goal_kick_spot(defending: Side) -> Point {
    Point::new(depth_to_x(defending, GOAL_KICK_DEPTH), CENTRE_Y)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sides_attack_opposite_goals() {
        assert!((attacking_goal_x(Side::Home) - PITCH_LENGTH).abs() < f64::EPSILON);
        assert!(attacking_goal_x(Side::Away).abs() < f64::EPSILON);
        assert!((depth_to_x(Side::Away, 10.0) - 90.0).abs() < f64::EPSILON);
        assert!((depth_of(Side::Away, 90.0) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn thirds_and_halves() {
        assert!(in_attacking_third(Side::Home, 80.0));
        assert!(!in_attacking_third(Side::Home, 50.0));
        assert!(in_attacking_third(Side::Away, 20.0));
        assert!(in_own_half(Side::Away, 70.0));
        assert!(!in_own_half(Side::Home, 70.0));
    }

    #[test]
    fn penalty_areas_belong_to_defenders() {
        let near_home_goal = Point::new(8.0, 30.0);
        assert!(in_penalty_area(Side::Home, near_home_goal));
        assert!(!in_penalty_area(Side::Away, near_home_goal));
        assert!(!in_penalty_area(Side::Home, Point::new(8.0, 2.0)));
        assert!(in_penalty_area(Side::Away, penalty_spot(Side::Home)));
    }

    #[test]
    fn clamping_keeps_points_on_the_pitch() {
        let p = Point::new(-4.0, 70.0).clamped();
        assert!(p.in_bounds());
        assert!(p.x.abs() < f64::EPSILON);
        assert!((p.y - PITCH_WIDTH).abs() < f64::EPSILON);
    }

    #[test]
    fn corner_flag_picks_nearest_touchline() {
        let flag = corner_flag(Side::Home, 10.0);
        assert!((flag.x - PITCH_LENGTH).abs() < f64::EPSILON);
        assert!(flag.y.abs() < f64::EPSILON);
        assert!((corner_flag(Side::Away, 50.0).y - PITCH_WIDTH).abs() < f64::EPSILON);
    }
}

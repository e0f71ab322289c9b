use super::body::Body;
use super::car::Car;

/// Below this longitudinal speed a bot floors it; above it coasts.
const CRUISE_SPEED: f64 = 12.0;

/// The whole bot "AI": keep the traffic rolling forward. No steering, no
/// lane changes, no awareness of anything else on the road.
pub(crate) fn act(body: &mut Body, car: &Car) {
    body.clear_forces();
    if body.longitudinal_velocity().length() < CRUISE_SPEED {
        body.add_force(body.direction() * car.drive_force());
    }
}

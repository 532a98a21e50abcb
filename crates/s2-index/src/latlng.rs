use glam::DVec3;

use crate::angle::Angle;

/// Latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: Angle,
    pub lng: Angle,
}

impl LatLng {
    pub fn new(lat: Angle, lng: Angle) -> Self {
        Self { lat, lng }
    }

    pub fn from_degrees(lat: f64, lng: f64) -> Self {
        Self::new(Angle::from_degrees(lat), Angle::from_degrees(lng))
    }

    pub fn from_point(p: DVec3) -> Self {
        let lat = p.z.atan2((p.x * p.x + p.y * p.y).sqrt());
        let lng = p.y.atan2(p.x);
        Self::new(Angle::from_radians(lat), Angle::from_radians(lng))
    }

    /// Unit vector for this coordinate.
    pub fn to_point(self) -> DVec3 {
        let phi = self.lat.radians();
        let theta = self.lng.radians();
        let cosphi = phi.cos();
        DVec3::new(theta.cos() * cosphi, theta.sin() * cosphi, phi.sin())
    }

    pub fn is_valid(self) -> bool {
        self.lat.radians().abs() <= std::f64::consts::FRAC_PI_2
            && self.lng.radians().abs() <= std::f64::consts::PI
    }
}

use core::ops::{Add, Mul, Sub};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RotationVector3D {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl Add<RotationVector3D> for RotationVector3D {
    type Output = RotationVector3D;

    fn add(self, rhs: RotationVector3D) -> Self::Output {
        Self {
            roll: self.roll + rhs.roll,
            pitch: self.pitch + rhs.pitch,
            yaw: self.yaw + rhs.yaw,
        }
    }
}

impl Sub<RotationVector3D> for RotationVector3D {
    type Output = RotationVector3D;

    fn sub(self, rhs: RotationVector3D) -> Self::Output {
        Self {
            roll: self.roll - rhs.roll,
            pitch: self.pitch - rhs.pitch,
            yaw: self.yaw - rhs.yaw,
        }
    }
}

impl Mul<f32> for RotationVector3D {
    type Output = RotationVector3D;

    fn mul(self, rhs: f32) -> Self::Output {
        Self {
            roll: self.roll * rhs,
            pitch: self.pitch * rhs,
            yaw: self.yaw * rhs,
        }
    }
}

impl From<&RotationVector2D> for RotationVector3D {
    fn from(vector_2d: &RotationVector2D) -> Self {
        RotationVector3D {
            roll: vector_2d.roll,
            pitch: vector_2d.pitch,
            yaw: 0.0_f32,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RotationVector2D {
    pub roll: f32,
    pub pitch: f32,
}

impl RotationVector2D {
    /// Body frame has pitch pointing the other way from the estimator and
    /// the gyro, so every pitch measurement is flipped before it reaches a
    /// loop. Not configurable, unlike the per-sensor sign table upstream.
    pub fn to_control_frame(self) -> Self {
        Self {
            roll: self.roll,
            pitch: -self.pitch,
        }
    }
}

impl Mul<f32> for RotationVector2D {
    type Output = RotationVector2D;

    fn mul(self, rhs: f32) -> Self::Output {
        Self {
            roll: self.roll * rhs,
            pitch: self.pitch * rhs,
        }
    }
}

impl From<&RotationVector3D> for RotationVector2D {
    fn from(vector_3d: &RotationVector3D) -> Self {
        RotationVector2D {
            roll: vector_3d.roll,
            pitch: vector_3d.pitch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_frame_flips_pitch_only() {
        let measured = RotationVector2D {
            roll: 0.2,
            pitch: 0.3,
        };
        let framed = measured.to_control_frame();
        assert_eq!(framed.roll, 0.2);
        assert_eq!(framed.pitch, -0.3);
    }

    #[test]
    fn test_rotation_vector_conversions() {
        let rates = RotationVector3D {
            roll: 1.0,
            pitch: 2.0,
            yaw: 3.0,
        };
        let planar = RotationVector2D::from(&rates);
        assert_eq!(planar.pitch, 2.0);
        assert_eq!(RotationVector3D::from(&planar).yaw, 0.0);
        assert_eq!((rates * 2.0 - rates).yaw, 3.0);
    }
}

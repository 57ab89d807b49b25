use nalgebra::{UnitQuaternion, Vector3};

/// Convert a quaternion to Euler angles (roll, pitch, yaw)
pub fn quaternion_to_euler(quat: &UnitQuaternion<f64>) -> Vector3<f64> {
    let (roll, pitch, yaw) = quat.euler_angles();
    Vector3::new(roll, pitch, yaw)
}

/// Clamp every component of `v` to `[-limit, limit]`
pub fn clamp_symmetric(v: &Vector3<f64>, limit: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(
        v.x.clamp(-limit.x, limit.x),
        v.y.clamp(-limit.y, limit.y),
        v.z.clamp(-limit.z, limit.z),
    )
}

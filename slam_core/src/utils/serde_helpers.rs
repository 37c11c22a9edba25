// slam_core/src/utils/serde_helpers.rs

//! Human-friendly (de)serialization for the noise matrices and poses held in
//! configuration files. Noise is written as standard deviations, angles in
//! degrees; in memory it is kept as diagonal variances in radians.

pub mod pose_noise_std_deg {
    use nalgebra::Matrix3;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(q: &Matrix3<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let arr = [
            q[(0, 0)].sqrt(),
            q[(1, 1)].sqrt(),
            q[(2, 2)].sqrt().to_degrees(),
        ];
        serializer.collect_seq(arr.iter())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Matrix3<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        // [sigma_x (m), sigma_y (m), sigma_yaw (deg)]
        let arr: [f64; 3] = Deserialize::deserialize(deserializer)?;
        Ok(Matrix3::from_diagonal(&nalgebra::Vector3::new(
            arr[0].powi(2),
            arr[1].powi(2),
            arr[2].to_radians().powi(2),
        )))
    }
}

pub mod range_bearing_noise_std_deg {
    use nalgebra::Matrix2;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(r: &Matrix2<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let arr = [r[(0, 0)].sqrt(), r[(1, 1)].sqrt().to_degrees()];
        serializer.collect_seq(arr.iter())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Matrix2<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        // [sigma_range (m), sigma_bearing (deg)]
        let arr: [f64; 2] = Deserialize::deserialize(deserializer)?;
        Ok(Matrix2::from_diagonal(&nalgebra::Vector2::new(
            arr[0].powi(2),
            arr[1].to_radians().powi(2),
        )))
    }
}

pub mod pose_xy_yaw_deg {
    use nalgebra::Vector3;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(pose: &Vector3<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let arr = [pose.x, pose.y, pose.z.to_degrees()];
        serializer.collect_seq(arr.iter())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vector3<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let arr: [f64; 3] = Deserialize::deserialize(deserializer)?;
        Ok(Vector3::new(arr[0], arr[1], arr[2].to_radians()))
    }
}

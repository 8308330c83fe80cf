//! Per-frame animation math. Pure functions of elapsed time, no GPU involved.

use crate::modules::config::AnimationConfig;
use glam::{Mat4, Vec2, Vec4};

/// Scalars derived from elapsed time for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    pub slow_time: f32,
    pub translation: Vec2,
    /// Radians. Grows at `rotation_rate` per unit of slowed time.
    pub angle: f32,
    pub scale: f32,
}

impl FrameParams {
    pub fn at(elapsed_secs: f32, anim: &AnimationConfig) -> Self {
        let slow_time = elapsed_secs / anim.time_divisor;
        let (sin, cos) = slow_time.sin_cos();

        Self {
            slow_time,
            translation: Vec2::new(
                sin * anim.translation_amplitude,
                cos * anim.translation_amplitude,
            ),
            angle: slow_time * anim.rotation_rate,
            scale: anim.base_scale + sin * anim.pulse_amplitude,
        }
    }

    /// The combined rotation-scale-translation transform:
    ///
    /// ```text
    /// | s*cos  -s*sin  0  tx |
    /// | s*sin   s*cos  0  ty |
    /// |   0       0    1   0 |
    /// |   0       0    0   1 |
    /// ```
    pub fn transform(&self) -> Mat4 {
        let (sin, cos) = self.angle.sin_cos();
        let s = self.scale;

        // glam is column-major; each Vec4 below is one column of the matrix above
        Mat4::from_cols(
            Vec4::new(s * cos, s * sin, 0.0, 0.0),
            Vec4::new(-s * sin, s * cos, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 1.0, 0.0),
            Vec4::new(self.translation.x, self.translation.y, 0.0, 1.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    /// Row-major view of a transform, in the layout the matrix is written down in.
    fn to_rows(m: &Mat4) -> [[f32; 4]; 4] {
        m.transpose().to_cols_array_2d()
    }

    /// Determinant of the upper-left 2x2 rotation-scale block.
    fn linear_block_determinant(m: &Mat4) -> f32 {
        m.x_axis.x * m.y_axis.y - m.y_axis.x * m.x_axis.y
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() <= EPS
    }

    fn sample_times() -> impl Iterator<Item = f32> {
        (0..20_000).map(|i| i as f32 * 0.013)
    }

    #[test]
    fn scale_stays_between_point_six_and_point_eight() {
        let anim = AnimationConfig::default();
        for t in sample_times() {
            let p = FrameParams::at(t, &anim);
            assert!(p.scale >= 0.6 - EPS && p.scale <= 0.8 + EPS, "t={t} scale={}", p.scale);
        }
    }

    #[test]
    fn translation_never_exceeds_amplitude() {
        let anim = AnimationConfig::default();
        for t in sample_times() {
            let p = FrameParams::at(t, &anim);
            assert!(p.translation.length() <= 0.3 + EPS, "t={t}");
            assert!(p.translation.x.abs() <= 0.3 + EPS);
            assert!(p.translation.y.abs() <= 0.3 + EPS);
        }
    }

    #[test]
    fn rotation_scale_block_is_invertible() {
        let anim = AnimationConfig::default();
        for t in sample_times().step_by(37) {
            let p = FrameParams::at(t, &anim);
            let m = p.transform();
            let det = linear_block_determinant(&m);
            assert!((det - p.scale * p.scale).abs() <= 1e-4, "t={t} det={det}");
            assert!(det > 0.0);
            assert!(m.determinant().abs() > 0.0);
        }
    }

    #[test]
    fn start_of_animation_is_pure_scale_with_upward_offset() {
        let p = FrameParams::at(0.0, &AnimationConfig::default());
        assert!(approx(p.translation.x, 0.0));
        assert!(approx(p.translation.y, 0.3));
        assert!(approx(p.angle, 0.0));
        assert!(approx(p.scale, 0.7));

        let rows = to_rows(&p.transform());
        let expected = [
            [0.7, 0.0, 0.0, 0.0],
            [0.0, 0.7, 0.0, 0.3],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        for (row, want) in rows.iter().zip(expected.iter()) {
            for (got, want) in row.iter().zip(want.iter()) {
                assert!(approx(*got, *want), "{rows:?}");
            }
        }
    }

    #[test]
    fn angle_uses_rate_as_radians() {
        let p = FrameParams::at(2.0, &AnimationConfig::default());
        assert!(approx(p.slow_time, 1.0));
        assert!(approx(p.angle, 25.0));

        let rows = to_rows(&p.transform());
        assert!(approx(rows[0][0], p.scale * 25.0f32.cos()));
        assert!(approx(rows[0][1], -p.scale * 25.0f32.sin()));
        assert!(approx(rows[1][0], p.scale * 25.0f32.sin()));
    }

    #[test]
    fn transform_moves_origin_to_translation() {
        let p = FrameParams::at(3.7, &AnimationConfig::default());
        let moved = p.transform() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(approx(moved.x, p.translation.x));
        assert!(approx(moved.y, p.translation.y));
        assert!(approx(moved.z, 0.0));
        assert!(approx(moved.w, 1.0));
    }

    #[test]
    fn z_passes_through_unscaled() {
        let p = FrameParams::at(5.0, &AnimationConfig::default());
        let v = p.transform() * Vec4::new(0.0, 0.0, 0.25, 1.0);
        assert!(approx(v.z, 0.25));
    }
}

//! Second-order spherical harmonics

use std::f32::consts::PI;

use glam::Vec3;
use image::Rgb32FImage;

/// Coefficients per probe
pub const SH_COEFFICIENTS: usize = 9;

/// Direction through the center of texel (x, y) of a cubemap face.
///
/// Faces are ordered +X, -X, +Y, -Y, +Z, -Z with rows running top to bottom.
pub fn cubemap_dir(face: usize, x: u32, y: u32, size: u32) -> Vec3 {
    let u = (x as f32 + 0.5) / size as f32 * 2.0 - 1.0;
    let v = (y as f32 + 0.5) / size as f32 * 2.0 - 1.0;

    let dir = match face {
        0 => Vec3::new(1.0, -v, -u),
        1 => Vec3::new(-1.0, -v, u),
        2 => Vec3::new(u, 1.0, v),
        3 => Vec3::new(u, -1.0, -v),
        4 => Vec3::new(u, -v, 1.0),
        _ => Vec3::new(-u, -v, -1.0),
    };

    dir.normalize()
}

/// Real SH basis up to band 2 evaluated at a unit direction
fn basis(d: Vec3) -> [f32; SH_COEFFICIENTS] {
    [
        0.282095,
        0.488603 * d.y,
        0.488603 * d.z,
        0.488603 * d.x,
        1.092548 * d.x * d.y,
        1.092548 * d.y * d.z,
        0.315392 * (3.0 * d.z * d.z - 1.0),
        1.092548 * d.x * d.z,
        0.546274 * (d.x * d.x - d.y * d.y),
    ]
}

/// Band of each coefficient
const BANDS: [usize; SH_COEFFICIENTS] = [0, 1, 1, 1, 2, 2, 2, 2, 2];

/// Cosine-lobe convolution factors per band
const COSINE_LOBE: [f32; 3] = [PI, 2.0 * PI / 3.0, PI / 4.0];

/// Nine RGB coefficients encoding radiance around a point
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SphericalHarmonics {
    pub coeffs: [Vec3; SH_COEFFICIENTS],
}

impl SphericalHarmonics {
    /// Project six square float faces onto the basis.
    ///
    /// Each texel is weighted by the solid angle it covers; weights are
    /// normalized so the sphere integrates to exactly 4π.
    pub fn project_cubemap(faces: &[Rgb32FImage; 6]) -> Self {
        let mut coeffs = [Vec3::ZERO; SH_COEFFICIENTS];
        let mut total_weight = 0.0f32;

        for (face, image) in faces.iter().enumerate() {
            let size = image.width().min(image.height());
            for y in 0..size {
                for x in 0..size {
                    let u = (x as f32 + 0.5) / size as f32 * 2.0 - 1.0;
                    let v = (y as f32 + 0.5) / size as f32 * 2.0 - 1.0;
                    let weight = 4.0 / ((1.0 + u * u + v * v).powf(1.5) * (size * size) as f32);
                    let [r, g, b] = image.get_pixel(x, y).0;
                    let radiance = Vec3::new(r, g, b);

                    let dir = cubemap_dir(face, x, y, size);
                    for (c, y_lm) in coeffs.iter_mut().zip(basis(dir)) {
                        *c += radiance * (y_lm * weight);
                    }
                    total_weight += weight;
                }
            }
        }

        if total_weight > 0.0 {
            let norm = 4.0 * PI / total_weight;
            for c in &mut coeffs {
                *c *= norm;
            }
        }
        Self { coeffs }
    }

    /// Reconstructed radiance in direction `dir`
    pub fn evaluate(&self, dir: Vec3) -> Vec3 {
        self.coeffs
            .iter()
            .zip(basis(dir.normalize_or_zero()))
            .fold(Vec3::ZERO, |acc, (c, y)| acc + *c * y)
    }

    /// Irradiance for a surface with normal `normal`, divided by π
    pub fn irradiance(&self, normal: Vec3) -> Vec3 {
        let y = basis(normal.normalize_or_zero());
        let mut sum = Vec3::ZERO;
        for i in 0..SH_COEFFICIENTS {
            sum += self.coeffs[i] * (COSINE_LOBE[BANDS[i]] * y[i]);
        }
        sum / PI
    }

    /// Coefficients flattened as RGB triples
    pub fn to_floats(&self) -> [f32; SH_COEFFICIENTS * 3] {
        let mut out = [0.0; SH_COEFFICIENTS * 3];
        for (i, c) in self.coeffs.iter().enumerate() {
            out[i * 3..i * 3 + 3].copy_from_slice(&c.to_array());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Rgb;

    fn uniform_faces(color: [f32; 3], size: u32) -> [Rgb32FImage; 6] {
        std::array::from_fn(|_| Rgb32FImage::from_pixel(size, size, Rgb(color)))
    }

    #[test]
    fn test_constant_environment() {
        let sh = SphericalHarmonics::project_cubemap(&uniform_faces([1.0, 0.5, 0.25], 8));
        let dc = 0.282095 * 4.0 * PI;
        assert_relative_eq!(sh.coeffs[0].x, dc, epsilon = 1e-3);
        assert_relative_eq!(sh.coeffs[0].y, dc * 0.5, epsilon = 1e-3);
        assert_relative_eq!(sh.coeffs[0].z, dc * 0.25, epsilon = 1e-3);
        for c in &sh.coeffs[1..] {
            assert!(c.length() < 1e-3, "higher bands should vanish, got {c}");
        }
        let back = sh.evaluate(Vec3::Y);
        assert_relative_eq!(back.x, 1.0, epsilon = 1e-2);
        let irradiance = sh.irradiance(Vec3::X);
        assert_relative_eq!(irradiance.x, 1.0, epsilon = 1e-2);
    }

    #[test]
    fn test_single_bright_face() {
        let mut faces = uniform_faces([0.0; 3], 8);
        faces[2] = Rgb32FImage::from_pixel(8, 8, Rgb([1.0; 3]));
        let sh = SphericalHarmonics::project_cubemap(&faces);
        // Only the +Y face is lit, so the radiance above exceeds the one below
        assert!(sh.evaluate(Vec3::Y).x > sh.evaluate(-Vec3::Y).x);
        assert!(sh.coeffs[1].x > 0.0);
    }

    #[test]
    fn test_face_centers() {
        assert_relative_eq!(cubemap_dir(0, 0, 0, 1).x, 1.0);
        assert_relative_eq!(cubemap_dir(3, 0, 0, 1).y, -1.0);
        assert_relative_eq!(cubemap_dir(5, 0, 0, 1).z, -1.0);
    }
}

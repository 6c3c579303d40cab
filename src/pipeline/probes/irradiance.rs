//! Irradiance probe grid

use glam::{UVec3, Vec3};

use super::sh::{SphericalHarmonics, SH_COEFFICIENTS};
use crate::backend::*;
use crate::error::RenderError;

/// One lattice point of the grid
#[derive(Debug, Clone)]
pub struct IrradianceProbe {
    pub position: Vec3,
    /// Cell coordinates within the grid
    pub local: UVec3,
    /// Row of this probe in the lookup texture
    pub index: usize,
    pub sh: SphericalHarmonics,
}

/// Regular 3D lattice of probes spanning an axis-aligned box
#[derive(Debug, Clone)]
pub struct IrradianceGrid {
    pub start: Vec3,
    pub end: Vec3,
    pub dim: UVec3,
    /// Spacing between neighbouring probes
    pub delta: Vec3,
    pub probes: Vec<IrradianceProbe>,
    /// Lookup texture, one row per probe and one column per coefficient
    pub texture: Option<TextureHandle>,
}

impl IrradianceGrid {
    /// Lay out probes so the first sits on `start` and the last on `end`
    pub fn new(start: Vec3, end: Vec3, dim: UVec3) -> Result<Self, RenderError> {
        if dim.min_element() == 0 {
            return Err(RenderError::InvalidGrid(dim));
        }
        let steps = (dim - UVec3::ONE).max(UVec3::ONE).as_vec3();
        let delta = Vec3::select(dim.cmpgt(UVec3::ONE), (end - start) / steps, Vec3::ZERO);

        let mut probes = Vec::with_capacity((dim.x * dim.y * dim.z) as usize);
        for z in 0..dim.z {
            for y in 0..dim.y {
                for x in 0..dim.x {
                    let local = UVec3::new(x, y, z);
                    probes.push(IrradianceProbe {
                        position: start + delta * local.as_vec3(),
                        local,
                        index: Self::linear_index(dim, local),
                        sh: SphericalHarmonics::default(),
                    });
                }
            }
        }

        Ok(Self {
            start,
            end,
            dim,
            delta,
            probes,
            texture: None,
        })
    }

    pub fn linear_index(dim: UVec3, local: UVec3) -> usize {
        (local.x + local.y * dim.x + local.z * dim.x * dim.y) as usize
    }

    pub fn probe_count(&self) -> usize {
        self.probes.len()
    }

    /// Row-major RGB floats: `probe_count` rows of nine coefficients
    pub fn coefficient_data(&self) -> Vec<f32> {
        let mut data = vec![0.0f32; self.probes.len() * SH_COEFFICIENTS * 3];
        for probe in &self.probes {
            let row = probe.index * SH_COEFFICIENTS * 3;
            data[row..row + SH_COEFFICIENTS * 3].copy_from_slice(&probe.sh.to_floats());
        }
        data
    }

    /// Replace the lookup texture with the current coefficients
    pub fn upload<B: GraphicsBackend>(&mut self, backend: &mut B) -> BackendResult<TextureHandle> {
        if let Some(old) = self.texture.take() {
            backend.destroy_texture(old);
        }
        let texture = backend.create_texture(&TextureDescriptor {
            label: Some("irradiance_lookup".to_string()),
            width: SH_COEFFICIENTS as u32,
            height: self.probes.len() as u32,
            format: TextureFormat::Rgb32Float,
            // Interpolation happens in the shader from grid coordinates
            filter: FilterMode::Nearest,
            ..Default::default()
        })?;
        backend.write_texture(texture, bytemuck::cast_slice(&self.coefficient_data()))?;
        self.texture = Some(texture);
        log::info!(
            "Uploaded irradiance lookup for {} probes ({}x{}x{})",
            self.probes.len(),
            self.dim.x,
            self.dim.y,
            self.dim.z
        );
        Ok(texture)
    }

    /// Bind the lookup texture and grid layout for shaders that sample it
    pub fn bind_uniforms<B: GraphicsBackend>(&self, backend: &mut B, slot: u32) -> bool {
        let Some(texture) = self.texture else {
            return false;
        };
        backend.set_texture("u_irr_texture", texture, slot);
        backend.set_uniform("u_irr_start", self.start);
        backend.set_uniform("u_irr_end", self.end);
        backend.set_uniform("u_irr_dims", self.dim.as_vec3());
        backend.set_uniform("u_irr_delta", self.delta);
        backend.set_uniform("u_num_probes", self.probes.len() as i32);
        true
    }

    pub fn destroy<B: GraphicsBackend>(&mut self, backend: &mut B) {
        if let Some(texture) = self.texture.take() {
            backend.destroy_texture(texture);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_two_by_two_grid_hits_corners() {
        let grid =
            IrradianceGrid::new(Vec3::ZERO, Vec3::splat(10.0), UVec3::splat(2)).unwrap();
        assert_eq!(grid.probe_count(), 8);

        let indices: HashSet<_> = grid.probes.iter().map(|p| p.index).collect();
        assert_eq!(indices, (0..8).collect::<HashSet<_>>());

        for probe in &grid.probes {
            for c in probe.position.to_array() {
                assert!(c == 0.0 || c == 10.0, "{} is not a corner", probe.position);
            }
        }
        let corners: HashSet<_> = grid
            .probes
            .iter()
            .map(|p| p.position.to_array().map(|c| c as i32))
            .collect();
        assert_eq!(corners.len(), 8);
    }

    #[test]
    fn test_last_probe_on_far_corner() {
        let end = Vec3::new(30.0, 12.0, -6.0);
        let grid = IrradianceGrid::new(Vec3::new(-10.0, 0.0, 4.0), end, UVec3::new(5, 3, 4)).unwrap();
        let last = grid.probes.last().unwrap();
        assert!((last.position - end).length() < 1e-4);
        assert_eq!(last.index, grid.probe_count() - 1);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(IrradianceGrid::new(Vec3::ZERO, Vec3::ONE, UVec3::new(2, 0, 2)).is_err());
    }

    #[test]
    fn test_upload_lookup_texture() {
        let mut backend = HeadlessBackend::new(16, 16);
        let mut grid = IrradianceGrid::new(Vec3::ZERO, Vec3::ONE, UVec3::new(3, 2, 2)).unwrap();
        let texture = grid.upload(&mut backend).unwrap();
        let desc = backend.texture_descriptor(texture).unwrap();
        assert_eq!((desc.width, desc.height), (9, 12));
        assert_eq!(desc.filter, FilterMode::Nearest);
        assert_eq!(desc.format, TextureFormat::Rgb32Float);

        let again = grid.upload(&mut backend).unwrap();
        assert!(backend.texture_descriptor(texture).is_none());
        assert!(backend.texture_descriptor(again).is_some());
    }
}

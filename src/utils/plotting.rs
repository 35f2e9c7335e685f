use crate::error::{ChainError, Result};
use crate::models::surface::SurfaceGrid;
use image::ImageFormat;
use plotters::backend::BitMapBackend;
use plotters::prelude::*;
use polars::prelude::DataFrame;
use std::ops::Range;
use std::path::Path;
use tracing::{debug, info};

/// Anything that can turn a grid into an image file
pub trait SurfaceRenderer {
    fn render(&self, underlying: &str, grid: &SurfaceGrid, output_path: &Path) -> Result<()>;
}

/// 3D surface of a chain metric over strike and time to expiration
#[derive(Debug, Clone)]
pub struct PlottersRenderer {
    pub width: u32,
    pub height: u32,
    /// Rotation around the vertical axis, radians
    pub yaw: f64,
    /// Tilt towards the viewer, radians
    pub pitch: f64,
}

impl Default for PlottersRenderer {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 900,
            yaw: 0.8,
            pitch: 0.35,
        }
    }
}

impl SurfaceRenderer for PlottersRenderer {
    fn render(&self, underlying: &str, grid: &SurfaceGrid, output_path: &Path) -> Result<()> {
        let buffer = self.render_in_memory(underlying, grid)?;
        image::save_buffer_with_format(
            output_path,
            &buffer,
            self.width,
            self.height,
            image::ColorType::Rgb8,
            ImageFormat::Png,
        )?;
        Ok(())
    }
}

impl PlottersRenderer {
    /// Render into an RGB buffer of `width * height * 3` bytes
    pub fn render_in_memory(&self, underlying: &str, grid: &SurfaceGrid) -> Result<Vec<u8>> {
        let (value_min, value_max) = grid
            .value_range()
            .ok_or_else(|| ChainError::EmptyGrid(grid.metric.clone()))?;
        let strike_axis = padded_range(&grid.strikes);
        let yte_axis = padded_range(&grid.year_fractions);
        let value_axis = padded_range(&[value_min, value_max]);

        let color_gradient = colorous::VIRIDIS;
        let shade = |value: f64| {
            let span = value_max - value_min;
            let t = if span > 0.0 { (value - value_min) / span } else { 0.5 };
            let color = color_gradient.eval_continuous(t.clamp(0.0, 1.0));
            RGBColor(color.r, color.g, color.b)
        };

        let quads = surface_quads(grid);
        debug!(
            "Rendering {} {} with {} observed cells and {} quads",
            underlying,
            grid.metric,
            grid.observed_count(),
            quads.len()
        );

        let mut buffer = vec![0u8; (self.width * self.height * 3) as usize];
        {
            let size = (self.width, self.height);
            let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| ChainError::RenderError(e.to_string()))?;

            let mut chart = ChartBuilder::on(&root)
                .caption(
                    format!("{} {} Surface", underlying, grid.metric),
                    ("sans-serif", 30).into_font(),
                )
                .margin(20)
                .build_cartesian_3d(strike_axis, value_axis, yte_axis)
                .map_err(|e| ChainError::RenderError(e.to_string()))?;

            chart.with_projection(|mut pb| {
                pb.yaw = self.yaw;
                pb.pitch = self.pitch;
                pb.scale = 0.8;
                pb.into_matrix()
            });

            chart
                .configure_axes()
                .light_grid_style(BLACK.mix(0.15))
                .max_light_lines(3)
                .draw()
                .map_err(|e| ChainError::RenderError(e.to_string()))?;

            chart
                .draw_series(quads.into_iter().map(|(corners, value)| {
                    Polygon::new(corners, shade(value).mix(0.85).filled())
                }))
                .map_err(|e| ChainError::RenderError(e.to_string()))?;

            chart
                .draw_series(grid.observed().map(|(yte, strike, value)| {
                    Circle::new((strike, value, yte), 3, shade(value).filled())
                }))
                .map_err(|e| ChainError::RenderError(e.to_string()))?;

            root.draw_text(
                &format!("x: Strike   y: {}   z: YTE", grid.metric),
                &TextStyle::from(("sans-serif", 15)).color(&BLACK),
                (10, self.height as i32 - 50),
            )
            .map_err(|e| ChainError::RenderError(e.to_string()))?;

            root.draw_text(
                &format!(
                    "Generated: {}",
                    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
                ),
                &TextStyle::from(("sans-serif", 15)).color(&BLACK),
                (10, self.height as i32 - 30),
            )
            .map_err(|e| ChainError::RenderError(e.to_string()))?;

            root.present()
                .map_err(|e| ChainError::RenderError(e.to_string()))?;
        }

        Ok(buffer)
    }
}

/// Grid one metric of a persisted chain and render it to `output_path`
pub fn plot_chain_surface<R: SurfaceRenderer>(
    renderer: &R,
    underlying: &str,
    chain: &DataFrame,
    metric: &str,
    output_path: &Path,
) -> Result<SurfaceGrid> {
    let grid = SurfaceGrid::from_dataframe(chain, metric)?;
    renderer.render(underlying, &grid, output_path)?;
    info!(
        "Rendered {} {} surface ({} x {}) to {}",
        underlying,
        metric,
        grid.year_fractions.len(),
        grid.strikes.len(),
        output_path.display()
    );
    Ok(grid)
}

pub type Quad = (Vec<(f64, f64, f64)>, f64);

/// One polygon per grid cell whose four corners were all observed, with the
/// mean corner value for shading. Cells touching a gap are left out.
pub fn surface_quads(grid: &SurfaceGrid) -> Vec<Quad> {
    let (rows, cols) = grid.values.dim();
    let mut quads = Vec::new();
    for i in 0..rows.saturating_sub(1) {
        for j in 0..cols.saturating_sub(1) {
            let corners = [(i, j), (i, j + 1), (i + 1, j + 1), (i + 1, j)];
            let values: Option<Vec<f64>> = corners.iter().map(|&(a, b)| grid.get(a, b)).collect();
            if let Some(values) = values {
                let points = corners
                    .iter()
                    .zip(&values)
                    .map(|(&(a, b), &v)| (grid.strikes[b], v, grid.year_fractions[a]))
                    .collect();
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                quads.push((points, mean));
            }
        }
    }
    quads
}

/// Axis range covering `values` with 5% headroom; a single value gets a unit span
fn padded_range(values: &[f64]) -> Range<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let span = max - min;
    if span <= 0.0 {
        let half = if min == 0.0 { 0.5 } else { min.abs() * 0.05 };
        return (min - half)..(max + half);
    }
    (min - 0.05 * span)..(max + 0.05 * span)
}

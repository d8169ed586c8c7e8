use anyhow::{Context, Result, bail};
use lightsout_core::{LAMP_COUNT, Snapshot, TrialPhase};
use std::time::{Duration, Instant};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Transform};

const LAMP_LIT: [u8; 4] = [225, 6, 0, 255];
const LAMP_LIT_RIM: [u8; 4] = [120, 0, 0, 255];
const LAMP_OFF: [u8; 4] = [90, 90, 90, 255];
const LAMP_OFF_RIM: [u8; 4] = [60, 60, 60, 255];
const HOUSING: [u8; 4] = [30, 30, 30, 255];

#[repr(usize)]
#[derive(Debug, Clone, Copy)]
enum SpriteIndex {
    LampOff = 0,
    LampLit = 1,
}

impl SpriteIndex {
    const COUNT: usize = 2;
}

fn color([r, g, b, a]: [u8; 4]) -> Color {
    Color::from_rgba8(r, g, b, a)
}

fn background(phase: TrialPhase) -> [u8; 4] {
    match phase {
        TrialPhase::Completed => [10, 40, 20, 255],
        TrialPhase::Faulted => [50, 10, 10, 255],
        _ => [15, 15, 20, 255],
    }
}

#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    pub clear: Duration,
    pub lamps: Duration,
    pub copy: Duration,
    pub total: Duration,
    /// False when the snapshot was unchanged and the frame was left as is
    pub redrawn: bool,
}

/// Draws the start gantry: a housing bar with five lamps, on a background
/// tinted by the trial outcome.
pub struct LampRenderer {
    width: u32,
    height: u32,
    radius: f32,
    centers: [(f32, f32); LAMP_COUNT],

    sprites: Vec<Pixmap>,
    canvas: Pixmap,

    last: Option<Snapshot>,
    first_frame: bool,
}

impl LampRenderer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let canvas = Pixmap::new(width, height)
            .with_context(|| format!("cannot allocate {width}x{height} canvas"))?;
        let radius = Self::lamp_radius(width, height);

        Ok(Self {
            width,
            height,
            radius,
            centers: Self::layout(width, height, radius),
            sprites: Self::build_sprites(radius)?,
            canvas,
            last: None,
            first_frame: true,
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<()> {
        *self = Self::new(new_width, new_height)?;
        Ok(())
    }

    fn lamp_radius(width: u32, height: u32) -> f32 {
        let by_width = width as f32 / (LAMP_COUNT as f32 * 3.0);
        let by_height = height as f32 / 6.0;
        by_width.min(by_height).max(4.0)
    }

    /// Lamps are evenly spaced and centred on the canvas
    fn layout(width: u32, height: u32, radius: f32) -> [(f32, f32); LAMP_COUNT] {
        let spacing = radius * 3.0;
        let x0 = width as f32 / 2.0 - spacing * LAMP_COUNT as f32 / 2.0 + spacing / 2.0;
        let cy = height as f32 / 2.0;
        std::array::from_fn(|i| (x0 + spacing * i as f32, cy))
    }

    fn build_sprites(radius: f32) -> Result<Vec<Pixmap>> {
        let mut sprites = Vec::with_capacity(SpriteIndex::COUNT);
        sprites.insert(
            SpriteIndex::LampOff as usize,
            render_lamp_sprite(radius, LAMP_OFF, LAMP_OFF_RIM)?,
        );
        sprites.insert(
            SpriteIndex::LampLit as usize,
            render_lamp_sprite(radius, LAMP_LIT, LAMP_LIT_RIM)?,
        );
        Ok(sprites)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn lamp_centers(&self) -> [(f32, f32); LAMP_COUNT] {
        self.centers
    }

    pub fn lamp_radius_px(&self) -> f32 {
        self.radius
    }

    /// Renders `snapshot` and copies it into an RGBA8 frame of the canvas size
    pub fn render_frame(&mut self, snapshot: &Snapshot, frame: &mut [u8]) -> Result<FrameStats> {
        let expected = self.canvas.data().len();
        if frame.len() != expected {
            bail!(
                "frame buffer is {} bytes, expected {expected} for {}x{}",
                frame.len(),
                self.width,
                self.height
            );
        }

        if !self.first_frame && self.last.as_ref() == Some(snapshot) {
            return Ok(FrameStats::default());
        }
        self.first_frame = false;

        let started = Instant::now();

        let t = Instant::now();
        self.canvas.fill(color(background(snapshot.phase)));
        let clear = t.elapsed();

        let t = Instant::now();
        self.draw_gantry(snapshot)?;
        let lamps = t.elapsed();

        let t = Instant::now();
        frame.copy_from_slice(self.canvas.data());
        let copy = t.elapsed();

        self.last = Some(snapshot.clone());

        Ok(FrameStats {
            clear,
            lamps,
            copy,
            total: started.elapsed(),
            redrawn: true,
        })
    }

    fn draw_gantry(&mut self, snapshot: &Snapshot) -> Result<()> {
        let spacing = self.radius * 3.0;
        let (first_x, cy) = self.centers[0];
        let housing = Rect::from_xywh(
            first_x - spacing / 2.0,
            cy - self.radius * 1.6,
            spacing * LAMP_COUNT as f32,
            self.radius * 3.2,
        )
        .context("degenerate housing rect")?;

        let mut paint = Paint::default();
        paint.set_color(color(HOUSING));
        self.canvas
            .fill_rect(housing, &paint, Transform::identity(), None);

        for (index, lit) in snapshot.lamps.iter().enumerate() {
            let sprite = if lit {
                SpriteIndex::LampLit
            } else {
                SpriteIndex::LampOff
            };
            self.blit_sprite(sprite, self.centers[index]);
        }
        Ok(())
    }

    fn blit_sprite(&mut self, index: SpriteIndex, center: (f32, f32)) {
        let sprite = &self.sprites[index as usize];
        let x = (center.0 - sprite.width() as f32 / 2.0).round() as i32;
        let y = (center.1 - sprite.height() as f32 / 2.0).round() as i32;
        self.canvas.draw_pixmap(
            x,
            y,
            sprite.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
}

/// A lamp with a darker rim, centred in a transparent square pixmap
pub fn render_lamp_sprite(radius: f32, fill: [u8; 4], rim: [u8; 4]) -> Result<Pixmap> {
    let side = (radius * 2.0).ceil() as u32 + 2;
    let mut pm = Pixmap::new(side, side).context("lamp sprite")?;
    let c = side as f32 / 2.0;

    let mut paint = Paint::default();
    paint.anti_alias = true;

    for (r, rgba) in [(radius, rim), (radius * 0.8, fill)] {
        let path = PathBuilder::from_circle(c, c, r).context("lamp circle")?;
        paint.set_color(color(rgba));
        pm.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
    Ok(pm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightsout_core::{FaultReason, LampBank};

    const W: u32 = 640;
    const H: u32 = 360;

    fn pixel(frame: &[u8], (x, y): (f32, f32)) -> [u8; 4] {
        let idx = ((y as u32 * W + x as u32) * 4) as usize;
        [frame[idx], frame[idx + 1], frame[idx + 2], frame[idx + 3]]
    }

    fn sequencing(lit: usize) -> Snapshot {
        let mut lamps = LampBank::new();
        if lit > 0 {
            lamps.light_through(lit - 1);
        }
        Snapshot {
            trial_id: 1,
            lamps,
            phase: TrialPhase::Sequencing,
            ..Snapshot::default()
        }
    }

    #[test]
    fn lit_lamps_are_red_and_unlit_gray() {
        let mut r = LampRenderer::new(W, H).unwrap();
        let mut frame = vec![0u8; (W * H * 4) as usize];
        let stats = r.render_frame(&sequencing(3), &mut frame).unwrap();
        assert!(stats.redrawn);

        let centers = r.lamp_centers();
        for (i, c) in centers.iter().enumerate() {
            let expected = if i < 3 { LAMP_LIT } else { LAMP_OFF };
            let got = pixel(&frame, *c);
            let close = got.iter().zip(expected).all(|(a, b)| a.abs_diff(b) <= 2);
            assert!(close, "lamp {i}: {got:?} vs {expected:?}");
        }
    }

    #[test]
    fn lamps_are_centred_and_ordered() {
        let r = LampRenderer::new(W, H).unwrap();
        let centers = r.lamp_centers();
        assert!(centers.windows(2).all(|w| w[0].0 < w[1].0));
        let mid = (centers[0].0 + centers[LAMP_COUNT - 1].0) / 2.0;
        assert!((mid - W as f32 / 2.0).abs() < 1.0);
        assert!(centers.iter().all(|c| c.1 == H as f32 / 2.0));
    }

    #[test]
    fn background_reflects_outcome() {
        let mut r = LampRenderer::new(W, H).unwrap();
        let mut frame = vec![0u8; (W * H * 4) as usize];
        let faulted = Snapshot {
            phase: TrialPhase::Faulted,
            fault_reason: Some(FaultReason::EarlyPress),
            ..sequencing(2)
        };
        r.render_frame(&faulted, &mut frame).unwrap();
        assert_eq!(pixel(&frame, (2.0, 2.0)), background(TrialPhase::Faulted));
    }

    #[test]
    fn unchanged_snapshot_skips_redraw() {
        let mut r = LampRenderer::new(W, H).unwrap();
        let mut frame = vec![0u8; (W * H * 4) as usize];
        let snap = sequencing(1);
        assert!(r.render_frame(&snap, &mut frame).unwrap().redrawn);
        assert!(!r.render_frame(&snap, &mut frame).unwrap().redrawn);
        assert!(r.render_frame(&sequencing(2), &mut frame).unwrap().redrawn);
    }

    #[test]
    fn wrong_frame_size_is_an_error() {
        let mut r = LampRenderer::new(W, H).unwrap();
        let mut frame = vec![0u8; 16];
        assert!(r.render_frame(&Snapshot::default(), &mut frame).is_err());
    }

    #[test]
    fn resize_relayouts() {
        let mut r = LampRenderer::new(W, H).unwrap();
        r.resize(1280, 720).unwrap();
        assert_eq!(r.size(), (1280, 720));
        let mut frame = vec![0u8; 1280 * 720 * 4];
        r.render_frame(&Snapshot::default(), &mut frame).unwrap();
        assert!(LampRenderer::new(0, 0).is_err());
    }
}

//! Contrast-limited adaptive histogram equalization.
//!
//! The image is split into a `tiles_x × tiles_y` grid. Sizes that do not
//! divide evenly are extended on the right/bottom by mirror reflection (edge
//! pixel not repeated) so every tile has the same area. Each tile histogram is
//! clipped and its excess spread uniformly before building a lookup table;
//! output pixels blend the four nearest tile tables bilinearly.

use image::GrayImage;

use crate::config::ClaheConfig;

const BINS: usize = 256;

/// Mirror index `i` into `0..n` without repeating the edge sample.
fn reflect101(i: u32, n: u32) -> u32 {
    if i < n {
        return i;
    }
    if n == 1 {
        return 0;
    }
    let period = 2 * (n - 1);
    let m = i % period;
    if m < n {
        m
    } else {
        period - m
    }
}

fn clip_histogram(hist: &mut [u32; BINS], clip: u32) {
    let mut excess = 0u32;
    for h in hist.iter_mut() {
        if *h > clip {
            excess += *h - clip;
            *h = clip;
        }
    }
    let batch = excess / BINS as u32;
    let mut residual = excess - batch * BINS as u32;
    for h in hist.iter_mut() {
        *h += batch;
    }
    if residual > 0 {
        let step = (BINS as u32 / residual).max(1) as usize;
        let mut i = 0usize;
        while i < BINS && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

/// Equalize `image` with the given clip limit and tile grid.
pub(crate) fn equalize(image: &GrayImage, config: &ClaheConfig) -> GrayImage {
    let (w, h) = image.dimensions();
    let [tiles_x, tiles_y] = config.tile_grid;
    if w == 0 || h == 0 {
        return image.clone();
    }

    let tile_w = w.div_ceil(tiles_x);
    let tile_h = h.div_ceil(tiles_y);
    let tile_area = tile_w * tile_h;
    let clip = ((config.clip_limit * tile_area as f32 / BINS as f32) as u32).max(1);
    let lut_scale = 255.0 / tile_area as f32;

    let mut luts = vec![[0u8; BINS]; (tiles_x * tiles_y) as usize];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let mut hist = [0u32; BINS];
            for y in ty * tile_h..(ty + 1) * tile_h {
                let sy = reflect101(y, h);
                for x in tx * tile_w..(tx + 1) * tile_w {
                    let sx = reflect101(x, w);
                    hist[image.get_pixel(sx, sy)[0] as usize] += 1;
                }
            }
            clip_histogram(&mut hist, clip);

            let lut = &mut luts[(ty * tiles_x + tx) as usize];
            let mut cumulative = 0u32;
            for (bin, count) in hist.iter().enumerate() {
                cumulative += count;
                lut[bin] = (cumulative as f32 * lut_scale).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    let inv_tw = 1.0 / tile_w as f32;
    let inv_th = 1.0 / tile_h as f32;
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        let tyf = y as f32 * inv_th - 0.5;
        let ty1 = tyf.floor();
        let ya = tyf - ty1;
        let ty2 = ((ty1 as i64 + 1).min(tiles_y as i64 - 1)).max(0) as u32;
        let ty1 = (ty1 as i64).max(0) as u32;
        for x in 0..w {
            let txf = x as f32 * inv_tw - 0.5;
            let tx1 = txf.floor();
            let xa = txf - tx1;
            let tx2 = ((tx1 as i64 + 1).min(tiles_x as i64 - 1)).max(0) as u32;
            let tx1 = (tx1 as i64).max(0) as u32;

            let v = image.get_pixel(x, y)[0] as usize;
            let lut = |tx: u32, ty: u32| luts[(ty * tiles_x + tx) as usize][v] as f32;
            let top = lut(tx1, ty1) * (1.0 - xa) + lut(tx2, ty1) * xa;
            let bottom = lut(tx1, ty2) * (1.0 - xa) + lut(tx2, ty2) * xa;
            let res = top * (1.0 - ya) + bottom * ya;
            out.put_pixel(x, y, image::Luma([res.round().clamp(0.0, 255.0) as u8]));
        }
    }
    out
}

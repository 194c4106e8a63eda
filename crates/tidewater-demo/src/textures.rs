//! Procedural textures standing in for image files.

use tidewater_engine::render::TextureData;
use tidewater_engine::RenderResult;

pub const GRASS: u32 = 0;
pub const WATER: u32 = 1;
pub const FENCE: u32 = 2;
pub const BRICK: u32 = 3;
pub const STONE: u32 = 4;
pub const TILE: u32 = 5;
pub const TREE: u32 = 6;

const SIZE: u32 = 64;

/// Every demo texture, ordered by the index constants above.
pub fn load_all() -> RenderResult<Vec<TextureData>> {
    Ok(vec![
        noise("grass", [72, 122, 48], 28, 1)?,
        noise("water", [40, 90, 140], 20, 2)?,
        fence()?,
        bricks("brick", [150, 60, 45], [200, 195, 185])?,
        noise("stone", [120, 118, 112], 36, 3)?,
        tiles()?,
        tree()?,
    ])
}

fn build(name: &str, pixel: impl Fn(u32, u32) -> [u8; 4]) -> RenderResult<TextureData> {
    let mut rgba = Vec::with_capacity((SIZE * SIZE * 4) as usize);
    for y in 0..SIZE {
        for x in 0..SIZE {
            rgba.extend(pixel(x, y));
        }
    }
    TextureData::new(name, SIZE, SIZE, rgba)
}

/// Cheap integer hash in 0..=255.
fn hash(x: u32, y: u32, seed: u32) -> u8 {
    let mut h = x.wrapping_mul(374_761_393) ^ y.wrapping_mul(668_265_263) ^ seed.wrapping_mul(2_246_822_519);
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    (h >> 24) as u8
}

fn shade(base: [u8; 3], amount: i32) -> [u8; 4] {
    let c = |v: u8| (v as i32 + amount).clamp(0, 255) as u8;
    [c(base[0]), c(base[1]), c(base[2]), 255]
}

fn noise(name: &str, base: [u8; 3], spread: i32, seed: u32) -> RenderResult<TextureData> {
    build(name, |x, y| {
        let n = hash(x, y, seed) as i32 * spread / 255 - spread / 2;
        shade(base, n)
    })
}

fn bricks(name: &str, brick: [u8; 3], mortar: [u8; 3]) -> RenderResult<TextureData> {
    build(name, |x, y| {
        let row = y / 8;
        let offset = if row % 2 == 0 { 0 } else { 8 };
        let in_mortar = y % 8 == 0 || (x + offset) % 16 == 0;
        if in_mortar {
            shade(mortar, 0)
        } else {
            shade(brick, hash(x, y, 4) as i32 / 16 - 8)
        }
    })
}

fn tiles() -> RenderResult<TextureData> {
    build("tile", |x, y| {
        let dark = ((x / 16) + (y / 16)) % 2 == 0;
        let edge = x % 16 == 0 || y % 16 == 0;
        match (edge, dark) {
            (true, _) => [60, 60, 60, 255],
            (false, true) => [170, 170, 175, 255],
            (false, false) => [215, 215, 220, 255],
        }
    })
}

/// Wire mesh with transparent gaps; drawn through the alpha-tested pipeline.
fn fence() -> RenderResult<TextureData> {
    build("fence", |x, y| {
        let wire = (x + y) % 16 < 2 || (x + SIZE - y) % 16 < 2;
        if wire { [150, 150, 140, 255] } else { [0, 0, 0, 0] }
    })
}

/// Stylised conifer silhouette on a transparent background.
fn tree() -> RenderResult<TextureData> {
    build("tree", |x, y| {
        let cx = SIZE as i32 / 2;
        let dx = (x as i32 - cx).abs();
        let (y, top) = (y as i32, 4);
        let trunk_start = SIZE as i32 - 12;

        if y >= trunk_start && dx <= 3 {
            return [90, 60, 30, 255];
        }
        // Crown widens linearly from the tip to the trunk.
        let half_width = (y - top) * 26 / (trunk_start - top);
        if y >= top && y < trunk_start && dx <= half_width {
            shade([40, 100, 45], hash(x as u32, y as u32, 5) as i32 / 10 - 12)
        } else {
            [0, 0, 0, 0]
        }
    })
}

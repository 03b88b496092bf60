use image::{GrayImage, Luma};

/// Standard quiet zone width in modules.
pub const QUIET_ZONE: u32 = 4;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Square matrix of modules without quiet zone, `true` is dark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGrid {
    w: usize,
    modules: Vec<bool>,
}

impl ModuleGrid {
    /// # Panics
    ///
    /// Panics if `modules` does not hold exactly `w * w` entries.
    pub fn new(w: usize, modules: Vec<bool>) -> Self {
        assert_eq!(modules.len(), w * w, "Module count doesn't match grid width {w}");
        Self { w, modules }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn is_dark(&self, r: usize, c: usize) -> bool {
        self.modules[r * self.w + c]
    }
}

/// How the symbol is fitted onto a canvas whose aspect ratio may not be square.
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
pub enum ScaleMode {
    /// Keep modules square: scale to the shorter side and centre on a light canvas.
    #[default]
    Fit,
    /// Scale each axis independently to fill the whole canvas.
    Stretch,
}

/// Renders `grid` surrounded by `quiet_zone` light modules into a `width x height`
/// grayscale image with nearest-neighbour sampling.
///
/// Along an axis of `n` pixels spanning `m` modules, pixel `p` takes the colour of
/// module `p * m / n` (rounded down). Scale factors need not be integral, and when
/// `n < m` some modules are dropped.
pub fn render(
    grid: &ModuleGrid,
    quiet_zone: u32,
    width: u32,
    height: u32,
    mode: ScaleMode,
) -> GrayImage {
    let span = grid.width() + 2 * quiet_zone as usize;
    let (cols, rows) = match mode {
        ScaleMode::Fit => {
            let side = width.min(height);
            (
                axis_lookup(width, (width - side) / 2, side, span, quiet_zone),
                axis_lookup(height, (height - side) / 2, side, span, quiet_zone),
            )
        }
        ScaleMode::Stretch => (
            axis_lookup(width, 0, width, span, quiet_zone),
            axis_lookup(height, 0, height, span, quiet_zone),
        ),
    };

    GrayImage::from_fn(width, height, |x, y| match (rows[y as usize], cols[x as usize]) {
        (Some(r), Some(c)) if grid.is_dark(r, c) => DARK,
        _ => LIGHT,
    })
}

/// Draws `grid` on the terminal, two characters per module to keep the aspect ratio.
pub fn to_str(grid: &ModuleGrid, quiet_zone: u32, module_sz: usize) -> String {
    let qz = quiet_zone as usize;
    let span = grid.width() + 2 * qz;
    let mut canvas = String::new();
    for i in 0..span {
        let mut line = String::new();
        for j in 0..span {
            let dark = (qz..qz + grid.width()).contains(&i)
                && (qz..qz + grid.width()).contains(&j)
                && grid.is_dark(i - qz, j - qz);
            let ch = if dark { '█' } else { ' ' };
            line.extend(std::iter::repeat(ch).take(module_sz * 2));
        }
        line.push('\n');
        canvas.push_str(&line.repeat(module_sz));
    }
    canvas
}

// For every pixel along an axis, the symbol module it samples. None for quiet zone
// and for canvas outside the scaled symbol.
fn axis_lookup(
    len: u32,
    offset: u32,
    side: u32,
    span: usize,
    quiet_zone: u32,
) -> Vec<Option<usize>> {
    let qz = quiet_zone as usize;
    (0..len)
        .map(|p| {
            if p < offset || p >= offset + side {
                return None;
            }
            let module = (p - offset) as usize * span / side as usize;
            module.checked_sub(qz).filter(|&m| m < span - 2 * qz)
        })
        .collect()
}

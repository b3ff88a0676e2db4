use rgb::RGB8;

/// matplotlib "tab10" qualitative palette.
pub const TAB10: [RGB8; 10] = [
    RGB8 { r: 0x1f, g: 0x77, b: 0xb4 },
    RGB8 { r: 0xff, g: 0x7f, b: 0x0e },
    RGB8 { r: 0x2c, g: 0xa0, b: 0x2c },
    RGB8 { r: 0xd6, g: 0x27, b: 0x28 },
    RGB8 { r: 0x94, g: 0x67, b: 0xbd },
    RGB8 { r: 0x8c, g: 0x56, b: 0x4b },
    RGB8 { r: 0xe3, g: 0x77, b: 0xc2 },
    RGB8 { r: 0x7f, g: 0x7f, b: 0x7f },
    RGB8 { r: 0xbc, g: 0xbd, b: 0x22 },
    RGB8 { r: 0x17, g: 0xbe, b: 0xcf },
];

// control points of the "Blues" colormap, light to dark
static BLUES: [RGB8; 9] = [
    RGB8 { r: 0xf7, g: 0xfb, b: 0xff },
    RGB8 { r: 0xde, g: 0xeb, b: 0xf7 },
    RGB8 { r: 0xc6, g: 0xdb, b: 0xef },
    RGB8 { r: 0x9e, g: 0xca, b: 0xe1 },
    RGB8 { r: 0x6b, g: 0xae, b: 0xd6 },
    RGB8 { r: 0x42, g: 0x92, b: 0xc6 },
    RGB8 { r: 0x21, g: 0x71, b: 0xb5 },
    RGB8 { r: 0x08, g: 0x51, b: 0x9c },
    RGB8 { r: 0x08, g: 0x30, b: 0x6b },
];

/// Binds worker counts to `TAB10` colors.
///
/// Categories are sorted ascending and take palette entries in that order,
/// cycling after ten, so the binding depends only on the set of worker counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryColors {
    categories: Vec<u32>,
}

impl CategoryColors {
    pub fn new(workers: impl IntoIterator<Item = u32>) -> Self {
        let mut categories: Vec<u32> = workers.into_iter().collect();
        categories.sort_unstable();
        categories.dedup();
        Self { categories }
    }

    pub fn categories(&self) -> &[u32] {
        &self.categories
    }

    pub fn color_of(&self, workers: u32) -> Option<RGB8> {
        self.categories
            .binary_search(&workers)
            .ok()
            .map(|idx| TAB10[idx % TAB10.len()])
    }

    pub fn legend(&self) -> impl Iterator<Item = (u32, RGB8)> + '_ {
        self.categories
            .iter()
            .enumerate()
            .map(|(idx, &workers)| (workers, TAB10[idx % TAB10.len()]))
    }
}

/// `n` shades of the Blues colormap sampled at `linspace(0, 1, n + 2)[1:-1]`.
pub fn blues(n: usize) -> Vec<RGB8> {
    (1..=n)
        .map(|i| sample(&BLUES, i as f64 / (n + 1) as f64))
        .collect()
}

fn sample(stops: &[RGB8], t: f64) -> RGB8 {
    let scaled = t.clamp(0.0, 1.0) * (stops.len() - 1) as f64;
    let idx = (scaled.floor() as usize).min(stops.len() - 2);
    let frac = scaled - idx as f64;
    let (lo, hi) = (stops[idx], stops[idx + 1]);
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    RGB8 {
        r: lerp(lo.r, hi.r),
        g: lerp(lo.g, hi.g),
        b: lerp(lo.b, hi.b),
    }
}

#[cfg(test)]
mod test {
    use rgb::RGB8;

    use super::{blues, CategoryColors, TAB10};

    #[test]
    fn colors_follow_sorted_worker_order() {
        let colors = CategoryColors::new([4, 1, 16, 4, 2]);
        assert_eq!(&[1, 2, 4, 16], colors.categories());
        assert_eq!(Some(TAB10[0]), colors.color_of(1));
        assert_eq!(Some(TAB10[2]), colors.color_of(4));
        assert_eq!(Some(TAB10[3]), colors.color_of(16));
        assert_eq!(None, colors.color_of(3));

        // first-appearance order must not matter
        assert_eq!(colors, CategoryColors::new([16, 2, 1, 4]));
    }

    #[test]
    fn palette_cycles_after_ten_categories() {
        let colors = CategoryColors::new(1..=12);
        assert_eq!(colors.color_of(1), colors.color_of(11));
        assert_eq!(colors.color_of(2), colors.color_of(12));
        assert_eq!(12, colors.legend().count());
    }

    #[test]
    fn blues_get_darker() {
        let shades = blues(4);
        assert_eq!(4, shades.len());
        let lightness = |c: &RGB8| u32::from(c.r) + u32::from(c.g) + u32::from(c.b);
        for pair in shades.windows(2) {
            assert!(lightness(&pair[1]) < lightness(&pair[0]), "{pair:?}");
        }
        // a single bar sits in the middle of the colormap
        assert_eq!(super::BLUES[4], blues(1)[0]);
    }
}

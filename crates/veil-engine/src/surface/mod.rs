//! CPU pixel buffers.
//!
//! Every widget owns two of these (content + display). The root widget's
//! display surface is what a [`crate::backend::Display`] presents.

use crate::coords::{Point, Rect, Size};
use crate::paint::Color;

/// An owned RGBA buffer with alpha.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Surface {
    size: Size,
    pixels: Vec<Color>,
}

impl Surface {
    /// Creates a fully transparent surface.
    pub fn new(size: Size) -> Self {
        Self::filled(size, Color::TRANSPARENT)
    }

    /// Creates a surface with every pixel set to `color`.
    pub fn filled(size: Size, color: Color) -> Self {
        let size = Size::new(size.w.max(0), size.h.max(0));
        Self { size, pixels: vec![color; size.area()] }
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(Point::zero(), self.size)
    }

    #[inline]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Pixel at `p`, or `None` outside the surface.
    pub fn get(&self, p: Point) -> Option<Color> {
        self.bounds().contains(p).then(|| self.pixels[self.index(p)])
    }

    #[inline]
    fn index(&self, p: Point) -> usize {
        p.y as usize * self.size.w as usize + p.x as usize
    }

    /// Overwrites every pixel with `color`.
    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Overwrites the pixels inside `rect` (clipped) with `color`.
    ///
    /// This replaces rather than blends, so a translucent fill onto a
    /// transparent surface yields a translucent overlay.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(clip) = rect.intersect(self.bounds()) else {
            return;
        };
        let stride = self.size.w as usize;
        for y in clip.origin.y..clip.bottom() {
            let row = y as usize * stride;
            let start = row + clip.origin.x as usize;
            let end = row + clip.right() as usize;
            self.pixels[start..end].fill(color);
        }
    }

    /// Composites `src` onto this surface with its top-left corner at `at`.
    ///
    /// Source-over alpha blending, clipped to both surfaces.
    pub fn blit(&mut self, src: &Surface, at: Point) {
        let target = Rect::from_origin_size(at, src.size);
        let Some(clip) = target.intersect(self.bounds()) else {
            return;
        };
        let dst_stride = self.size.w as usize;
        let src_stride = src.size.w as usize;
        for y in clip.origin.y..clip.bottom() {
            let sy = (y - at.y) as usize;
            for x in clip.origin.x..clip.right() {
                let sx = (x - at.x) as usize;
                let s = src.pixels[sy * src_stride + sx];
                let d = &mut self.pixels[y as usize * dst_stride + x as usize];
                *d = s.over(*d);
            }
        }
    }

    /// Copies `src` verbatim (no blending) when sizes match, otherwise clears
    /// and blits.
    pub fn copy_from(&mut self, src: &Surface) {
        if self.size == src.size {
            self.pixels.copy_from_slice(&src.pixels);
        } else {
            self.fill(Color::TRANSPARENT);
            self.blit(src, Point::zero());
        }
    }

    /// Writes the surface into `out` as packed `0RGB` words, row-major.
    ///
    /// `out` must hold at least `width * height` words.
    pub fn write_0rgb(&self, out: &mut [u32]) {
        for (dst, px) in out.iter_mut().zip(&self.pixels) {
            *dst = px.to_0rgb();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_surface_is_transparent() {
        let s = Surface::new(Size::new(3, 2));
        assert_eq!(s.pixels().len(), 6);
        assert!(s.pixels().iter().all(|p| *p == Color::TRANSPARENT));
    }

    #[test]
    fn negative_size_is_clamped_to_empty() {
        let s = Surface::new(Size::new(-4, 10));
        assert_eq!(s.size(), Size::new(0, 10));
        assert!(s.pixels().is_empty());
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut s = Surface::new(Size::new(4, 4));
        s.fill_rect(Rect::new(2, 2, 10, 10), Color::WHITE);
        assert_eq!(s.get(Point::new(1, 1)), Some(Color::TRANSPARENT));
        assert_eq!(s.get(Point::new(2, 2)), Some(Color::WHITE));
        assert_eq!(s.get(Point::new(3, 3)), Some(Color::WHITE));
    }

    #[test]
    fn fill_rect_replaces_instead_of_blending() {
        let mut s = Surface::filled(Size::new(2, 2), Color::WHITE);
        let shade = Color::rgba(0, 0, 0, 175);
        s.fill_rect(Rect::new(0, 0, 1, 1), shade);
        assert_eq!(s.get(Point::new(0, 0)), Some(shade));
    }

    #[test]
    fn blit_offsets_and_clips() {
        let mut dst = Surface::filled(Size::new(4, 4), Color::BLACK);
        let src = Surface::filled(Size::new(2, 2), Color::WHITE);
        dst.blit(&src, Point::new(3, -1));
        assert_eq!(dst.get(Point::new(3, 0)), Some(Color::WHITE));
        assert_eq!(dst.get(Point::new(3, 1)), Some(Color::BLACK));
        assert_eq!(dst.get(Point::new(2, 0)), Some(Color::BLACK));
    }

    #[test]
    fn blit_blends_translucent_source() {
        let mut dst = Surface::filled(Size::new(1, 1), Color::WHITE);
        let src = Surface::filled(Size::new(1, 1), Color::rgba(0, 0, 0, 175));
        dst.blit(&src, Point::zero());
        assert_eq!(dst.get(Point::zero()), Some(Color::rgb(80, 80, 80)));
    }

    #[test]
    fn blit_transparent_source_is_noop() {
        let mut dst = Surface::filled(Size::new(2, 2), Color::BLUE);
        let before = dst.clone();
        dst.blit(&Surface::new(Size::new(2, 2)), Point::zero());
        assert_eq!(dst, before);
    }

    #[test]
    fn copy_from_replaces_pixels() {
        let mut dst = Surface::filled(Size::new(2, 1), Color::WHITE);
        let src = Surface::filled(Size::new(2, 1), Color::rgba(0, 0, 0, 10));
        dst.copy_from(&src);
        assert_eq!(dst, src);
    }

    #[test]
    fn write_0rgb_row_major() {
        let mut s = Surface::new(Size::new(2, 1));
        s.fill_rect(Rect::new(1, 0, 1, 1), Color::rgb(1, 2, 3));
        let mut out = [0xffff_ffffu32; 2];
        s.write_0rgb(&mut out);
        assert_eq!(out, [0, 0x0001_0203]);
    }
}
